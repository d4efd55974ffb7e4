use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "census",
    version,
    about = "Readme Census - consolidate project READMEs and document status into one table",
    long_about = "Readme Census scans a directory of project folders, reads the fields of each README, checks which supporting documents are present or signed, and writes one CSV row per project. It can also write discovered filenames and statuses back into the READMEs."
)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan project folders into a table
    #[command(about = "Scan every project folder under a root directory into a CSV table")]
    Scan(ScanArgs),

    /// Apply statuses from an edited table
    #[command(about = "Write the Status column of an edited table back into the READMEs")]
    Apply(ApplyArgs),

    /// Write the default configuration
    #[command(name = "init-config", about = "Write the default configuration as TOML")]
    InitConfig(InitConfigArgs),
}

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Root directory holding one folder per project
    #[arg(help = "Directory containing the project folders")]
    pub root: PathBuf,

    /// Output table
    #[arg(short, long, help = "CSV file to write")]
    pub output: PathBuf,

    /// Persist discovered filenames and status into the READMEs
    #[arg(long, help = "Write discovered filenames and statuses back into each README")]
    pub write_back: bool,

    /// Append rows to an existing table
    #[arg(long, help = "Append to the output instead of overwriting it (no header row)")]
    pub append: bool,

    /// Sort directory entries before matching
    #[arg(long, help = "Process folders and files in name order")]
    pub sorted: bool,

    /// Anchor labels at the start of the line
    #[arg(long, help = "Match README labels only at the start of a line")]
    pub prefix_match: bool,

    /// Candidate encodings, in preference order
    #[arg(long = "encoding", help = "Candidate README encoding (repeatable, in preference order)")]
    pub encodings: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct ApplyArgs {
    /// Root directory holding one folder per project
    #[arg(help = "Directory containing the project folders")]
    pub root: PathBuf,

    /// Edited table
    #[arg(short, long, help = "CSV file with Folder and Status columns")]
    pub table: PathBuf,
}

#[derive(Parser, Debug)]
pub struct InitConfigArgs {
    /// Destination file
    #[arg(help = "Where to write the configuration", default_value = "census.toml")]
    pub path: PathBuf,

    /// Replace an existing file
    #[arg(long, help = "Overwrite the file if it exists")]
    pub force: bool,
}
