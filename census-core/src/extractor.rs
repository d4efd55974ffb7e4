//! README field extraction
//!
//! Two label forms exist. Inline labels (`- Codi:`) carry their value after
//! the first colon of the matching line. Heading labels (`### Status`)
//! carry their value on the line that follows. Matching is case-insensitive
//! and the first matching line wins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a label is compared against a line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// The line contains the label anywhere
    #[default]
    Substring,
    /// The line, ignoring leading whitespace, starts with the label
    Prefix,
}

/// A field label and the extraction rule implied by its form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldLabel {
    /// `- Label:` style, value inline
    Inline(String),
    /// `### Heading` style, value on the next line
    Heading(String),
}

impl FieldLabel {
    /// Classify a label by its syntax: labels starting with `#` are headings
    pub fn parse(label: &str) -> Self {
        if label.trim_start().starts_with('#') {
            FieldLabel::Heading(label.trim().to_string())
        } else {
            FieldLabel::Inline(label.to_string())
        }
    }

    pub fn text(&self) -> &str {
        match self {
            FieldLabel::Inline(text) | FieldLabel::Heading(text) => text,
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, FieldLabel::Heading(_))
    }
}

impl fmt::Display for FieldLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl From<&str> for FieldLabel {
    fn from(label: &str) -> Self {
        FieldLabel::parse(label)
    }
}

/// Whether `line` matches `label` under `policy`
pub fn line_matches(line: &str, label: &str, policy: MatchPolicy) -> bool {
    let line = line.to_lowercase();
    let label = label.to_lowercase();
    match policy {
        MatchPolicy::Substring => line.contains(&label),
        MatchPolicy::Prefix => line.trim_start().starts_with(label.trim_start()),
    }
}

/// Index of the first line matching `label`
pub fn locate<S: AsRef<str>>(lines: &[S], label: &FieldLabel, policy: MatchPolicy) -> Option<usize> {
    lines.iter().position(|line| line_matches(line.as_ref(), label.text(), policy))
}

/// Extract the value associated with `label`
pub fn extract<S: AsRef<str>>(lines: &[S], label: &FieldLabel, policy: MatchPolicy) -> Option<String> {
    let idx = locate(lines, label, policy)?;
    match label {
        FieldLabel::Heading(_) => lines.get(idx + 1).map(|next| next.as_ref().trim().to_string()),
        FieldLabel::Inline(_) => lines[idx]
            .as_ref()
            .split_once(':')
            .map(|(_, value)| value.trim().to_string()),
    }
}
