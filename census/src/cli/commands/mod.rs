//! Command handlers

pub mod apply;
pub mod init_config;
pub mod scan;

use anyhow::{Context, Result};
use census_core::ScanConfig;
use std::path::Path;

/// Load the configuration file, or the defaults when none is given
pub fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    match path {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(ScanConfig::default()),
    }
}
