//! Batch scanning over a directory of project folders
//!
//! Folders are processed one at a time in listing order. A folder-level
//! failure never stops the batch: recoverable ones still produce a row,
//! the rest are logged and skipped.

use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::reconciler::{FolderOutcome, Reconciler};
use crate::record::{FOLDER_COLUMN, STATUS_COLUMN};
use crate::report::{CsvReport, ReportSink, read_table};
use crate::signature::SignatureInspector;
use crate::vcs::CommitSource;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Counts from one scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Rows written to the table
    pub rows: usize,
    /// Rows written with some values missing
    pub partial: usize,
    /// Folders skipped after an unexpected error
    pub skipped: usize,
}

/// Scans every project folder under a root
pub struct BatchScanner<'a> {
    config: &'a ScanConfig,
    reconciler: Reconciler<'a>,
}

impl<'a> BatchScanner<'a> {
    pub fn new(
        config: &'a ScanConfig,
        commits: &'a dyn CommitSource,
        inspector: &'a dyn SignatureInspector,
    ) -> ScanResult<Self> {
        config.validate()?;
        let reconciler = Reconciler::new(config, commits, inspector)?;
        Ok(Self { config, reconciler })
    }

    /// Immediate subdirectories of `root`, in listing order unless sorting is on
    pub fn project_folders(&self, root: &Path) -> ScanResult<Vec<PathBuf>> {
        let entries = fs::read_dir(root).map_err(|e| ScanError::from_io(root, e))?;

        let mut folders = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Unreadable entry in {:?}: {}", root, e);
                    continue;
                }
            };
            let path = entry.path();
            if path.is_dir() {
                folders.push(path);
            } else {
                debug!("Skipping non-directory {:?}", path);
            }
        }

        if self.config.sorted_walk {
            folders.sort();
        }
        Ok(folders)
    }

    /// Scan `root` into `sink`
    ///
    /// Only failing to list the root or to write the sink is fatal.
    pub fn scan(&self, root: &Path, sink: &mut dyn ReportSink) -> ScanResult<ScanSummary> {
        let folders = self.project_folders(root)?;
        info!("Scanning {} project folders under {:?}", folders.len(), root);

        if !self.config.append_mode {
            sink.write_header(&self.config.columns())?;
        }

        let mut summary = ScanSummary::default();
        for folder in &folders {
            match self.reconciler.reconcile(folder) {
                Ok(FolderOutcome::Complete(record)) => {
                    sink.write_record(&record)?;
                    summary.rows += 1;
                }
                Ok(FolderOutcome::Partial { record, error }) => {
                    warn!("Partial row for {:?}: {}", folder, error);
                    sink.write_record(&record)?;
                    summary.rows += 1;
                    summary.partial += 1;
                }
                Err(e) => {
                    error!("Skipping folder {:?}: {}", folder, e);
                    summary.skipped += 1;
                }
            }
        }

        sink.flush()?;
        info!(
            "Scan finished: {} rows ({} partial), {} folders skipped",
            summary.rows, summary.partial, summary.skipped
        );
        Ok(summary)
    }

    /// Scan `root` into a CSV file, returning the number of rows written
    pub fn scan_to_csv(&self, root: &Path, output: &Path) -> ScanResult<usize> {
        let mut report = CsvReport::create(output, self.config.append_mode)?;
        Ok(self.scan(root, &mut report)?.rows)
    }

    /// Write the `Status` column of an edited table back into the READMEs
    ///
    /// Returns the number of READMEs changed.
    pub fn apply_table(&self, root: &Path, table_path: &Path) -> ScanResult<usize> {
        let table = read_table(table_path, &self.config.encodings)?;
        let status_idx = table.column_index(STATUS_COLUMN).ok_or_else(|| ScanError::Report {
            message: format!("{} has no '{}' column", table_path.display(), STATUS_COLUMN),
        })?;
        if table.headers.first().map(String::as_str) != Some(FOLDER_COLUMN) {
            debug!("First column of {:?} is not '{}', using it as the folder name", table_path, FOLDER_COLUMN);
        }

        let mut changed = 0;
        for row in &table.rows {
            let (Some(folder), Some(status)) = (row.first(), row.get(status_idx)) else {
                continue;
            };
            let status = status.trim();
            if folder.is_empty() || status.is_empty() {
                continue;
            }

            let folder_path = root.join(folder);
            if !folder_path.is_dir() {
                warn!("{:?} listed in the table does not exist, skipping", folder_path);
                continue;
            }

            match self.reconciler.apply_status(&folder_path, status) {
                Ok(true) => changed += 1,
                Ok(false) => debug!("{:?} already has status '{}'", folder_path, status),
                Err(e) => warn!("Could not update the README of {:?}: {}", folder_path, e),
            }
        }

        info!("Updated {} READMEs from {:?}", changed, table_path);
        Ok(changed)
    }
}
