use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Parse CLI arguments first to get verbosity level
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Scan(args) => {
            info!("Scan command: {:?}", args);
            cli::commands::scan::execute(args, cli.config.as_deref())?;
        }
        Commands::Apply(args) => {
            info!("Apply command: {:?}", args);
            cli::commands::apply::execute(args, cli.config.as_deref())?;
        }
        Commands::InitConfig(args) => {
            info!("Init-config command: {:?}", args);
            cli::commands::init_config::execute(args)?;
        }
    }

    Ok(())
}
