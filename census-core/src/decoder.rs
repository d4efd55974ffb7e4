//! Text decoding for README documents
//!
//! README files in the wild are saved by different editors on different
//! platforms. The decoder tries an explicit, ordered list of candidate
//! encodings and keeps the first one that decodes the whole file without
//! error. Line terminators are recorded so unchanged documents render back
//! byte for byte.

use crate::error::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Bytes with no mapping in Windows-1252
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// Candidate text encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    #[serde(rename = "utf-8", alias = "utf8", alias = "UTF-8")]
    Utf8,
    #[serde(rename = "iso-8859-1", alias = "latin-1", alias = "latin1", alias = "ISO-8859-1")]
    Latin1,
    #[serde(rename = "windows-1252", alias = "cp1252", alias = "Windows-1252")]
    Windows1252,
}

impl Encoding {
    /// Default preference order
    pub fn defaults() -> Vec<Encoding> {
        vec![Encoding::Utf8, Encoding::Latin1, Encoding::Windows1252]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "iso-8859-1",
            Encoding::Windows1252 => "windows-1252",
        }
    }

    /// Decode the whole buffer, or `None` if any byte sequence is invalid
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Encoding::Utf8 => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                encoding_rs::UTF_8
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(|text| text.into_owned())
            }
            Encoding::Latin1 => Some(encoding_rs::mem::decode_latin1(bytes).into_owned()),
            Encoding::Windows1252 => {
                if bytes.iter().any(|b| CP1252_UNDEFINED.contains(b)) {
                    return None;
                }
                encoding_rs::WINDOWS_1252
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(|text| text.into_owned())
            }
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "iso-8859-1" | "latin-1" | "latin1" => Ok(Encoding::Latin1),
            "windows-1252" | "cp1252" => Ok(Encoding::Windows1252),
            other => Err(ScanError::Config { message: format!("unknown encoding '{other}'") }),
        }
    }
}

/// Line terminator style of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A decoded text document split into lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDocument {
    /// Source path
    pub path: PathBuf,
    /// Encoding the document was read with
    pub encoding: Encoding,
    /// Lines without terminators
    pub lines: Vec<String>,
    /// Terminator used when rendering
    pub line_ending: LineEnding,
    /// Whether the text ended with a terminator
    pub trailing_newline: bool,
}

impl DecodedDocument {
    /// Split decoded text into lines
    pub fn from_text(path: impl Into<PathBuf>, encoding: Encoding, text: &str) -> Self {
        let line_ending = match text.find('\n') {
            Some(idx) if idx > 0 && text.as_bytes()[idx - 1] == b'\r' => LineEnding::CrLf,
            _ => LineEnding::Lf,
        };

        let mut lines: Vec<String> = text
            .split('\n')
            .map(|line| match line_ending {
                LineEnding::CrLf => line.strip_suffix('\r').unwrap_or(line).to_string(),
                LineEnding::Lf => line.to_string(),
            })
            .collect();

        let trailing_newline = text.ends_with('\n');
        if trailing_newline || text.is_empty() {
            lines.pop();
        }

        Self { path: path.into(), encoding, lines, line_ending, trailing_newline }
    }

    /// Same document with different lines
    pub fn with_lines(&self, lines: Vec<String>) -> Self {
        Self { lines, ..self.clone() }
    }

    /// Rebuild the text
    pub fn render(&self) -> String {
        let mut text = self.lines.join(self.line_ending.as_str());
        if self.trailing_newline && !self.lines.is_empty() {
            text.push_str(self.line_ending.as_str());
        }
        text
    }
}

/// Read `path` and decode it with the first candidate that succeeds
pub fn decode_file(path: &Path, encodings: &[Encoding]) -> ScanResult<DecodedDocument> {
    let bytes = fs::read(path).map_err(|e| ScanError::from_io(path, e))?;
    decode_bytes(path, &bytes, encodings)
}

/// Decode an in-memory buffer read from `path`
pub fn decode_bytes(path: &Path, bytes: &[u8], encodings: &[Encoding]) -> ScanResult<DecodedDocument> {
    for encoding in encodings {
        match encoding.decode(bytes) {
            Some(text) => {
                debug!("Decoded {:?} as {}", path, encoding);
                return Ok(DecodedDocument::from_text(path, *encoding, &text));
            }
            None => debug!("{:?} is not valid {}", path, encoding),
        }
    }

    let tried = encodings.iter().map(Encoding::name).collect::<Vec<_>>().join(", ");
    warn!("Could not decode {:?} with any candidate encoding ({})", path, tried);
    Err(ScanError::DecodeFailure { path: path.to_path_buf(), tried })
}
