//! Supporting document classification
//!
//! Each expected document kind is matched by filename over a recursive walk
//! of the project folder. The first structurally valid match wins; signable
//! kinds are then escalated to signed when the signature inspector says so.

use crate::error::{ScanError, ScanResult};
use crate::signature::SignatureInspector;
use census_patterns::{date_token, filename};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Tri-state document status, ordered by completeness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocumentStatus {
    #[default]
    Absent,
    Present,
    Signed,
}

impl DocumentStatus {
    /// Table representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Absent => "NO",
            DocumentStatus::Present => "YES",
            DocumentStatus::Signed => "SIGNED",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the distinguishing text sits in the filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilenamePattern {
    Prefix(String),
    Contains(String),
    Suffix(String),
}

impl FilenamePattern {
    pub fn text(&self) -> &str {
        match self {
            FilenamePattern::Prefix(t) | FilenamePattern::Contains(t) | FilenamePattern::Suffix(t) => t,
        }
    }
}

/// An expected supporting document kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentKindSpec {
    /// Display name used in logs
    pub name: String,
    /// Filename must carry a valid `YYYYMMDD` token
    #[serde(default)]
    pub dated: bool,
    /// File extension without the dot
    pub extension: String,
    /// Consult the signature inspector on match
    #[serde(default)]
    pub signable: bool,
    /// Filename must contain the project code
    #[serde(default)]
    pub requires_code: bool,
    /// Column receiving the status
    pub status_column: String,
    /// Column receiving the matched filename
    pub filename_column: String,
    /// README label the filename is recorded under
    #[serde(default)]
    pub readme_label: Option<String>,
    pub pattern: FilenamePattern,
}

impl DocumentKindSpec {
    /// Compile the filename regex
    pub fn compile(&self) -> ScanResult<Regex> {
        let compiled = match &self.pattern {
            FilenamePattern::Prefix(text) => filename::prefixed(text, self.dated, &self.extension),
            FilenamePattern::Contains(text) => filename::containing(text, self.dated, &self.extension),
            FilenamePattern::Suffix(text) => filename::suffixed(text, self.dated, &self.extension),
        };
        compiled.map_err(|e| ScanError::Config {
            message: format!("invalid pattern for document kind '{}': {}", self.name, e),
        })
    }
}

/// Result of classifying one document kind in one folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: DocumentKindSpec,
    pub status: DocumentStatus,
    /// Matched filename
    pub filename: Option<String>,
    /// Full path of the matched file
    pub path: Option<PathBuf>,
    /// Date token of the matched file, for dated kinds
    pub date: Option<NaiveDate>,
}

impl Classification {
    fn absent(kind: &DocumentKindSpec) -> Self {
        Self { kind: kind.clone(), status: DocumentStatus::Absent, filename: None, path: None, date: None }
    }
}

/// Classification of every kind in a folder
#[derive(Debug)]
pub struct FolderClassification {
    pub results: Vec<Classification>,
    /// First error hit while walking; results only cover readable entries
    pub walk_error: Option<ScanError>,
}

impl FolderClassification {
    pub fn get(&self, kind_name: &str) -> Option<&Classification> {
        self.results.iter().find(|c| c.kind.name == kind_name)
    }
}

struct CompiledKind {
    spec: DocumentKindSpec,
    regex: Regex,
}

/// A file seen during the walk
#[derive(Debug, Clone)]
struct WalkedFile {
    path: PathBuf,
    name: String,
}

/// Matches folder contents against the expected document kinds
pub struct DocumentClassifier<'a> {
    kinds: Vec<CompiledKind>,
    inspector: &'a dyn SignatureInspector,
    sorted: bool,
}

impl<'a> DocumentClassifier<'a> {
    /// Compile every kind's pattern
    pub fn new(kinds: &[DocumentKindSpec], inspector: &'a dyn SignatureInspector) -> ScanResult<Self> {
        let kinds = kinds
            .iter()
            .map(|spec| Ok(CompiledKind { spec: spec.clone(), regex: spec.compile()? }))
            .collect::<ScanResult<Vec<_>>>()?;
        Ok(Self { kinds, inspector, sorted: false })
    }

    /// Sort directory entries by name during the walk
    pub fn with_sorted_walk(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    /// Classify every kind in `folder`
    pub fn classify(&self, folder: &Path, code: Option<&str>) -> FolderClassification {
        let (files, walk_error) = self.walk(folder);
        if let Some(err) = &walk_error {
            warn!("Incomplete walk of {:?}: {}", folder, err);
        }

        let results = self.kinds.iter().map(|kind| self.classify_kind(kind, &files, code)).collect();
        FolderClassification { results, walk_error }
    }

    fn classify_kind(&self, kind: &CompiledKind, files: &[WalkedFile], code: Option<&str>) -> Classification {
        let spec = &kind.spec;
        if spec.requires_code && code.is_none() {
            debug!("No project code, document kind '{}' cannot match", spec.name);
            return Classification::absent(spec);
        }

        for file in files {
            if !kind.regex.is_match(&file.name) {
                continue;
            }
            if let Some(code) = code.filter(|_| spec.requires_code) {
                if !file.name.contains(code) {
                    continue;
                }
            }

            let date = if spec.dated {
                match date_token::extract(&file.name) {
                    Some(date) => Some(date),
                    None => {
                        debug!("Skipping {:?}: date token is not a calendar date", file.path);
                        continue;
                    }
                }
            } else {
                None
            };

            return Classification {
                kind: spec.clone(),
                status: self.inspect(spec, &file.path),
                filename: Some(file.name.clone()),
                path: Some(file.path.clone()),
                date,
            };
        }

        Classification::absent(spec)
    }

    fn inspect(&self, spec: &DocumentKindSpec, path: &Path) -> DocumentStatus {
        if !spec.signable {
            return DocumentStatus::Present;
        }
        match self.inspector.is_signed(path) {
            Ok(true) => DocumentStatus::Signed,
            Ok(false) => DocumentStatus::Present,
            Err(e) => {
                warn!("Signature check failed for {:?}, keeping it as present: {}", path, e);
                DocumentStatus::Present
            }
        }
    }

    fn walk(&self, folder: &Path) -> (Vec<WalkedFile>, Option<ScanError>) {
        let mut walker = WalkDir::new(folder).follow_links(false);
        if self.sorted {
            walker = walker.sort_by_file_name();
        }

        let mut files = Vec::new();
        let mut first_error = None;
        for entry in walker.into_iter().filter_entry(|e| e.depth() == 0 || e.file_name() != ".git") {
            match entry {
                Ok(entry) if entry.file_type().is_file() => files.push(WalkedFile {
                    path: entry.path().to_path_buf(),
                    name: entry.file_name().to_string_lossy().into_owned(),
                }),
                Ok(_) => {}
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(ScanError::from_walk(folder, e));
                    }
                }
            }
        }
        (files, first_error)
    }
}
