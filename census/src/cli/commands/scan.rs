//! Scan command

use anyhow::{Context, Result};
use census_core::{Encoding, MatchPolicy, scan};
use std::path::Path;
use tracing::info;

use super::load_config;
use crate::cli::app::ScanArgs;

/// Execute the scan command
pub fn execute(args: ScanArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path)?;

    // Flags only ever switch behavior on
    config.write_back |= args.write_back;
    config.append_mode |= args.append;
    config.sorted_walk |= args.sorted;
    if args.prefix_match {
        config.match_policy = MatchPolicy::Prefix;
    }
    if !args.encodings.is_empty() {
        config.encodings = args
            .encodings
            .iter()
            .map(|name| name.parse::<Encoding>())
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid --encoding value")?;
    }

    info!("Scanning {} into {}", args.root.display(), args.output.display());
    let rows = scan(&args.root, &args.output, &config)
        .with_context(|| format!("Failed to scan {}", args.root.display()))?;

    println!("Wrote {} rows to {}", rows, args.output.display());
    Ok(())
}
