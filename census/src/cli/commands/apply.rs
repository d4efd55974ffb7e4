//! Apply command

use anyhow::{Context, Result};
use census_core::apply_table;
use std::path::Path;

use super::load_config;
use crate::cli::app::ApplyArgs;

/// Execute the apply command
pub fn execute(args: ApplyArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    let updated = apply_table(&args.root, &args.table, &config)
        .with_context(|| format!("Failed to apply {}", args.table.display()))?;

    println!("Updated {} READMEs under {}", updated, args.root.display());
    Ok(())
}
