//! Scan configuration
//!
//! Everything that used to be ambient (encodings, write-back and append
//! switches, the document kinds to look for) is spelled out here and passed
//! explicitly to the scanner.

use crate::classifier::{DocumentKindSpec, FilenamePattern};
use crate::decoder::Encoding;
use crate::error::{ScanError, ScanResult};
use crate::extractor::MatchPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// What a README field feeds in the record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    #[default]
    Plain,
    /// Project code, normalized and used by code-bound document kinds
    Code,
    /// Project status, the value of the status heading
    Status,
}

/// A README field copied into the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Output column
    pub column: String,
    /// Label searched in the README
    pub label: String,
    #[serde(default)]
    pub role: FieldRole,
}

impl FieldSpec {
    pub fn new(column: &str, label: &str, role: FieldRole) -> Self {
        Self { column: column.to_string(), label: label.to_string(), role }
    }
}

/// Main configuration for a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// README filename inside each project folder
    pub readme_name: String,

    /// Candidate encodings, in preference order
    pub encodings: Vec<Encoding>,

    /// Label matching policy
    pub match_policy: MatchPolicy,

    /// Registry prefix stripped from project codes
    pub code_prefix: Option<String>,

    /// Persist discovered filenames and status into READMEs
    pub write_back: bool,

    /// Append to an existing table instead of overwriting it
    pub append_mode: bool,

    /// Sort directory entries so first-match-wins is reproducible
    pub sorted_walk: bool,

    /// README fields copied into the table
    pub fields: Vec<FieldSpec>,

    /// Supporting documents looked for in each folder
    pub expected_kinds: Vec<DocumentKindSpec>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            readme_name: "README.md".to_string(),
            encodings: Encoding::defaults(),
            match_policy: MatchPolicy::Substring,
            code_prefix: Some("PRISIB".to_string()),
            write_back: false,
            append_mode: false,
            sorted_walk: false,
            fields: vec![
                FieldSpec::new("Codi", "- Codi:", FieldRole::Code),
                FieldSpec::new("Status", "### Status", FieldRole::Status),
                FieldSpec::new("Nom", "- Nom:", FieldRole::Plain),
                FieldSpec::new("Correu", "- Correu:", FieldRole::Plain),
                FieldSpec::new("Data inici", "- Data inici:", FieldRole::Plain),
            ],
            expected_kinds: default_kinds(),
        }
    }
}

/// The four document kinds every project is expected to carry
pub fn default_kinds() -> Vec<DocumentKindSpec> {
    vec![
        DocumentKindSpec {
            name: "SSPT".to_string(),
            pattern: FilenamePattern::Prefix("SSPT".to_string()),
            dated: true,
            extension: "pdf".to_string(),
            signable: true,
            requires_code: false,
            status_column: "SSPT Status".to_string(),
            filename_column: "Solicitud".to_string(),
            readme_label: Some("- Sol·licitud:".to_string()),
        },
        DocumentKindSpec {
            name: "PSPT".to_string(),
            pattern: FilenamePattern::Prefix("PSPT".to_string()),
            dated: true,
            extension: "pdf".to_string(),
            signable: true,
            requires_code: false,
            status_column: "PSPT Status".to_string(),
            filename_column: "Pressupost".to_string(),
            readme_label: Some("- Pressupost:".to_string()),
        },
        DocumentKindSpec {
            name: "CEIM".to_string(),
            pattern: FilenamePattern::Contains("Dictamen_CEI".to_string()),
            dated: false,
            extension: "pdf".to_string(),
            signable: true,
            requires_code: false,
            status_column: "CEIM Status".to_string(),
            filename_column: "Dictamen CEI".to_string(),
            readme_label: Some("- Dictamen CEI:".to_string()),
        },
        DocumentKindSpec {
            name: "Data Model".to_string(),
            pattern: FilenamePattern::Contains("Data Model".to_string()),
            dated: false,
            extension: "xlsx".to_string(),
            signable: false,
            requires_code: true,
            status_column: "Data Model Status".to_string(),
            filename_column: "Data Model".to_string(),
            readme_label: Some("- Data Model:".to_string()),
        },
    ]
}

impl ScanConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> ScanResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ScanError::from_io(path, e))?;

        let config: Self = toml::from_str(&content).map_err(|e| ScanError::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML
    pub fn save(&self, path: &Path) -> ScanResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ScanError::Config { message: format!("failed to serialize config: {e}") })?;

        std::fs::write(path, content).map_err(|e| ScanError::from_io(path, e))
    }

    /// Check invariants the scanner relies on
    pub fn validate(&self) -> ScanResult<()> {
        if self.encodings.is_empty() {
            return Err(ScanError::Config { message: "at least one encoding is required".into() });
        }
        if self.readme_name.trim().is_empty() {
            return Err(ScanError::Config { message: "readme_name must not be empty".into() });
        }

        let mut seen = HashSet::new();
        for column in self.columns() {
            if !seen.insert(column.clone()) {
                return Err(ScanError::Config { message: format!("duplicate column '{column}'") });
            }
        }

        for kind in &self.expected_kinds {
            if kind.pattern.text().is_empty() || kind.extension.trim_start_matches('.').is_empty() {
                return Err(ScanError::Config {
                    message: format!("document kind '{}' needs a pattern and an extension", kind.name),
                });
            }
        }
        Ok(())
    }

    /// Output columns in table order
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec![crate::record::FOLDER_COLUMN.to_string()];
        columns.extend(self.fields.iter().map(|f| f.column.clone()));
        columns.extend(crate::record::COMMIT_COLUMNS.iter().map(|c| c.to_string()));
        columns.extend(self.expected_kinds.iter().map(|k| k.status_column.clone()));
        columns.extend(self.expected_kinds.iter().map(|k| k.filename_column.clone()));
        columns
    }

    /// The field holding the status heading, if configured
    pub fn status_field(&self) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.role == FieldRole::Status)
    }

    /// The field holding the project code, if configured
    pub fn code_field(&self) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.role == FieldRole::Code)
    }
}
