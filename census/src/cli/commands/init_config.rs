//! Init-config command

use anyhow::{Context, Result, bail};
use census_core::ScanConfig;

use crate::cli::app::InitConfigArgs;

/// Execute the init-config command
pub fn execute(args: InitConfigArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", args.path.display());
    }

    ScanConfig::default()
        .save(&args.path)
        .with_context(|| format!("Failed to write {}", args.path.display()))?;

    println!("Wrote default configuration to {}", args.path.display());
    Ok(())
}
