//! Core functionality for readme-census
//!
//! This crate scans a directory of project folders, extracts labeled fields
//! from each README, classifies the supporting documents every project is
//! expected to carry, and writes one consolidated table row per folder.

pub mod classifier;
pub mod config;
pub mod decoder;
pub mod error;
pub mod extractor;
pub mod reconciler;
pub mod record;
pub mod report;
pub mod scanner;
pub mod signature;
pub mod vcs;

#[cfg(test)]
mod tests;

pub use classifier::{DocumentKindSpec, DocumentStatus, FilenamePattern};
pub use config::{FieldRole, FieldSpec, ScanConfig};
pub use decoder::Encoding;
pub use error::{ScanError, ScanResult};
pub use extractor::MatchPolicy;
pub use record::StatusRecord;
pub use scanner::{BatchScanner, ScanSummary};
pub use signature::{PdfSignatureInspector, SignatureInspector};
pub use vcs::{CommitInfo, CommitSource, GitCommitSource};

use std::path::Path;

/// Scan `root` into the CSV at `output` with git and PDF inspection
pub fn scan(root: &Path, output: &Path, config: &ScanConfig) -> ScanResult<usize> {
    let commits = GitCommitSource::new();
    let inspector = PdfSignatureInspector::new();
    BatchScanner::new(config, &commits, &inspector)?.scan_to_csv(root, output)
}

/// Apply the statuses of an edited table to the READMEs under `root`
pub fn apply_table(root: &Path, table: &Path, config: &ScanConfig) -> ScanResult<usize> {
    let commits = GitCommitSource::new();
    let inspector = PdfSignatureInspector::new();
    BatchScanner::new(config, &commits, &inspector)?.apply_table(root, table)
}
