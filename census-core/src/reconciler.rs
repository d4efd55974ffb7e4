//! Status reconciliation and README write-back
//!
//! A folder's record is assembled from three sources: README fields, the
//! document classifier and the last commit. In write-back mode the README
//! is updated with the filenames the classifier found and with the status
//! value. Line edits are pure functions over the line sequence; the result
//! is written to a temporary file next to the README and renamed over it.

use crate::classifier::{DocumentClassifier, FolderClassification};
use crate::config::{FieldRole, ScanConfig};
use crate::decoder::{DecodedDocument, decode_file};
use crate::error::{ScanError, ScanResult};
use crate::extractor::{FieldLabel, MatchPolicy, extract, locate};
use crate::record::{COMMIT_COLUMNS, FOLDER_COLUMN, StatusRecord};
use crate::signature::SignatureInspector;
use crate::vcs::CommitSource;
use census_patterns::project_code;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Index at which a missing status section is inserted
const STATUS_INSERT_INDEX: usize = 2;

/// Append `filename` to the line carrying `label`
///
/// Returns `None` when the label is absent or the line already names the file.
pub fn append_filename(
    lines: &[String],
    label: &FieldLabel,
    filename: &str,
    policy: MatchPolicy,
) -> Option<Vec<String>> {
    let idx = locate(lines, label, policy)?;
    if lines[idx].contains(filename) {
        return None;
    }

    let mut updated = lines.to_vec();
    updated[idx] = format!("{} {}", lines[idx].trim_end(), filename);
    Some(updated)
}

/// Put `status` on the line after `heading`, inserting the section if needed
///
/// Returns `None` when the document already carries exactly this status.
pub fn set_status(
    lines: &[String],
    heading: &FieldLabel,
    status: &str,
    policy: MatchPolicy,
) -> Option<Vec<String>> {
    let mut updated = lines.to_vec();
    match locate(lines, heading, policy) {
        Some(idx) => match lines.get(idx + 1) {
            Some(current) if current == status => return None,
            Some(_) => updated[idx + 1] = status.to_string(),
            None => updated.push(status.to_string()),
        },
        None => {
            let at = STATUS_INSERT_INDEX.min(updated.len());
            updated.splice(at..at, [heading.text().to_string(), status.to_string(), String::new()]);
        }
    }
    Some(updated)
}

/// Write a document as UTF-8 through a temporary file and a rename
pub fn write_document(doc: &DecodedDocument) -> ScanResult<()> {
    let dir = doc.path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ScanError::from_io(dir, e))?;
    tmp.write_all(doc.render().as_bytes()).map_err(|e| ScanError::from_io(&doc.path, e))?;
    tmp.as_file().sync_all().map_err(|e| ScanError::from_io(&doc.path, e))?;

    if let Ok(meta) = fs::metadata(&doc.path) {
        if let Err(e) = fs::set_permissions(tmp.path(), meta.permissions()) {
            debug!("Could not copy permissions of {:?}: {}", doc.path, e);
        }
    }

    tmp.persist(&doc.path).map_err(|e| ScanError::from_io(&doc.path, e.error))?;
    Ok(())
}

/// What a folder produced
#[derive(Debug)]
pub enum FolderOutcome {
    Complete(StatusRecord),
    /// Row still written; `error` explains the missing values
    Partial { record: StatusRecord, error: ScanError },
}

impl FolderOutcome {
    pub fn record(&self) -> &StatusRecord {
        match self {
            FolderOutcome::Complete(record) | FolderOutcome::Partial { record, .. } => record,
        }
    }

    pub fn into_record(self) -> StatusRecord {
        match self {
            FolderOutcome::Complete(record) | FolderOutcome::Partial { record, .. } => record,
        }
    }
}

/// Builds records for project folders
pub struct Reconciler<'a> {
    config: &'a ScanConfig,
    classifier: DocumentClassifier<'a>,
    commits: &'a dyn CommitSource,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        config: &'a ScanConfig,
        commits: &'a dyn CommitSource,
        inspector: &'a dyn SignatureInspector,
    ) -> ScanResult<Self> {
        let classifier =
            DocumentClassifier::new(&config.expected_kinds, inspector)?.with_sorted_walk(config.sorted_walk);
        Ok(Self { config, classifier, commits })
    }

    pub fn readme_path(&self, folder: &Path) -> PathBuf {
        folder.join(&self.config.readme_name)
    }

    /// Build the record of one folder
    ///
    /// `Err` means the folder must be skipped; recoverable failures come
    /// back as [`FolderOutcome::Partial`].
    pub fn reconcile(&self, folder: &Path) -> ScanResult<FolderOutcome> {
        let name = folder.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let mut record = StatusRecord::with_columns(self.config.columns());
        record.set(FOLDER_COLUMN, Some(name.clone()));

        let mut partial: Option<ScanError> = None;
        let mut keep = |err: ScanError| -> ScanResult<()> {
            if !err.keeps_partial_row() {
                return Err(err);
            }
            if partial.is_none() {
                partial = Some(err);
            }
            Ok(())
        };

        let readme = match decode_file(&self.readme_path(folder), &self.config.encodings) {
            Ok(doc) => Some(doc),
            Err(ScanError::NotFound { path }) => {
                info!("{:?} not found", path);
                None
            }
            Err(ScanError::DecodeFailure { .. }) => None,
            Err(e) => {
                keep(e)?;
                None
            }
        };
        let lines: &[String] = readme.as_ref().map(|d| d.lines.as_slice()).unwrap_or(&[]);

        let mut code = None;
        for field in &self.config.fields {
            let mut value = self.field(lines, &field.label);
            if field.role == FieldRole::Code {
                value = value
                    .and_then(|raw| project_code::normalize(&raw, self.config.code_prefix.as_deref()))
                    .or_else(|| {
                        debug!("No '{}' field in the README of {}", field.label, name);
                        project_code::from_folder_name(&name)
                    });
                code = value.clone();
            }
            record.set(&field.column, value);
        }

        let mut classification = self.classifier.classify(folder, code.as_deref());
        for result in &classification.results {
            record.set(&result.kind.status_column, Some(result.status.to_string()));
            let filename = result
                .filename
                .clone()
                .or_else(|| result.kind.readme_label.as_deref().and_then(|label| self.field(lines, label)));
            record.set(&result.kind.filename_column, filename);
        }
        if let Some(err) = classification.walk_error.take() {
            keep(err)?;
        }

        match self.commits.last_commit(folder) {
            Ok(commit) => {
                record.set(COMMIT_COLUMNS[0], Some(commit.date));
                record.set(COMMIT_COLUMNS[1], Some(commit.author));
                record.set(COMMIT_COLUMNS[2], Some(commit.message));
            }
            Err(e @ ScanError::NotARepository { .. }) => {
                info!("{} is not a git repository, commit fields left empty", name);
                keep(e)?;
            }
            Err(e) => keep(e)?,
        }

        if self.config.write_back {
            if let Some(doc) = &readme {
                let status = self.config.status_field().and_then(|f| record.get(&f.column)).map(str::to_string);
                if let Err(e) = self.write_back(doc, &classification, status.as_deref()) {
                    warn!("Write-back failed for {:?}: {}", doc.path, e);
                    keep(e)?;
                }
            }
        }

        Ok(match partial {
            Some(error) => FolderOutcome::Partial { record, error },
            None => FolderOutcome::Complete(record),
        })
    }

    /// Persist discovered filenames and `status` into the README
    ///
    /// Returns whether the file changed.
    pub fn write_back(
        &self,
        doc: &DecodedDocument,
        classification: &FolderClassification,
        status: Option<&str>,
    ) -> ScanResult<bool> {
        let policy = self.config.match_policy;
        let mut lines = doc.lines.clone();

        for result in &classification.results {
            let (Some(filename), Some(label)) = (&result.filename, &result.kind.readme_label) else {
                continue;
            };
            if let Some(updated) = append_filename(&lines, &FieldLabel::parse(label), filename, policy) {
                debug!("Recording {} under '{}' in {:?}", filename, label, doc.path);
                lines = updated;
            }
        }

        if let (Some(status), Some(field)) = (status, self.config.status_field()) {
            if let Some(updated) = set_status(&lines, &FieldLabel::parse(&field.label), status, policy) {
                lines = updated;
            }
        }

        self.persist(doc, lines)
    }

    /// Write `status` into the README of `folder`
    pub fn apply_status(&self, folder: &Path, status: &str) -> ScanResult<bool> {
        let field = self.config.status_field().ok_or_else(|| ScanError::Config {
            message: "no status field configured".to_string(),
        })?;
        let doc = decode_file(&self.readme_path(folder), &self.config.encodings)?;
        let heading = FieldLabel::parse(&field.label);

        match set_status(&doc.lines, &heading, status, self.config.match_policy) {
            Some(lines) => self.persist(&doc, lines),
            None => Ok(false),
        }
    }

    fn persist(&self, doc: &DecodedDocument, lines: Vec<String>) -> ScanResult<bool> {
        if lines == doc.lines {
            return Ok(false);
        }
        write_document(&doc.with_lines(lines))?;
        info!("Updated {:?}", doc.path);
        Ok(true)
    }

    fn field(&self, lines: &[String], label: &str) -> Option<String> {
        extract(lines, &FieldLabel::parse(label), self.config.match_policy).filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_append_filename_once() {
        let doc = lines(&["# p", "- Sol·licitud:", "- Pressupost: old.pdf"]);
        let label = FieldLabel::parse("- Sol·licitud:");

        let once = append_filename(&doc, &label, "SSPT_20240206_a.pdf", MatchPolicy::Substring).unwrap();
        assert_eq!(once[1], "- Sol·licitud: SSPT_20240206_a.pdf");
        assert_eq!(once[0], doc[0]);
        assert_eq!(once[2], doc[2]);
        assert!(append_filename(&once, &label, "SSPT_20240206_a.pdf", MatchPolicy::Substring).is_none());
    }

    #[test]
    fn test_append_filename_missing_label() {
        let doc = lines(&["# p"]);
        assert!(append_filename(&doc, &"- Pressupost:".into(), "a.pdf", MatchPolicy::Substring).is_none());
    }

    #[test]
    fn test_set_status_replaces_value_line() {
        let doc = lines(&["# p", "", "### Status", "Old", "", "- Nom: x"]);
        let heading = FieldLabel::parse("### Status");

        let updated = set_status(&doc, &heading, "Pendent validacions finals", MatchPolicy::Substring).unwrap();
        assert_eq!(updated, lines(&["# p", "", "### Status", "Pendent validacions finals", "", "- Nom: x"]));
        assert!(set_status(&updated, &heading, "Pendent validacions finals", MatchPolicy::Substring).is_none());
    }

    #[test]
    fn test_set_status_inserts_section() {
        let doc = lines(&["# p", "intro", "- Nom: x"]);
        let heading = FieldLabel::parse("### Status");

        let updated = set_status(&doc, &heading, "Actiu", MatchPolicy::Substring).unwrap();
        assert_eq!(updated, lines(&["# p", "intro", "### Status", "Actiu", "", "- Nom: x"]));
        assert!(set_status(&updated, &heading, "Actiu", MatchPolicy::Substring).is_none());

        let short = set_status(&lines(&["# p"]), &heading, "Actiu", MatchPolicy::Substring).unwrap();
        assert_eq!(short, lines(&["# p", "### Status", "Actiu", ""]));
    }

    #[test]
    fn test_set_status_heading_on_last_line() {
        let doc = lines(&["# p", "### Status"]);
        let updated = set_status(&doc, &"### Status".into(), "Actiu", MatchPolicy::Substring).unwrap();
        assert_eq!(updated, lines(&["# p", "### Status", "Actiu"]));
    }
}
