//! PDF signature inspection

use crate::error::{ScanError, ScanResult};
use lopdf::{Document, Object};
use std::path::Path;
use tracing::debug;

/// Answers whether a document carries a digital signature
pub trait SignatureInspector {
    /// `Err` when the file cannot be inspected; callers treat that as unsigned
    fn is_signed(&self, path: &Path) -> ScanResult<bool>;
}

/// Reads the interactive form of a PDF: signed iff `AcroForm.SigFlags` is non-zero
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfSignatureInspector;

impl PdfSignatureInspector {
    pub fn new() -> Self {
        Self
    }

    fn sig_flags(doc: &Document) -> Result<i64, lopdf::Error> {
        let catalog = doc.catalog()?;
        let acro_form = match catalog.get(b"AcroForm") {
            Ok(object) => object,
            Err(_) => return Ok(0),
        };
        let (_, acro_form) = doc.dereference(acro_form)?;
        let flags = match acro_form.as_dict()?.get(b"SigFlags") {
            Ok(object) => object,
            Err(_) => return Ok(0),
        };
        match doc.dereference(flags)?.1 {
            Object::Integer(value) => Ok(*value),
            _ => Ok(0),
        }
    }
}

impl SignatureInspector for PdfSignatureInspector {
    fn is_signed(&self, path: &Path) -> ScanResult<bool> {
        let malformed = |reason: String| ScanError::MalformedDocument { path: path.to_path_buf(), reason };

        if !path.exists() {
            return Err(ScanError::NotFound { path: path.to_path_buf() });
        }
        let doc = Document::load(path).map_err(|e| malformed(e.to_string()))?;
        if doc.trailer.get(b"Encrypt").is_ok() {
            return Err(malformed("document is encrypted".to_string()));
        }

        let flags = Self::sig_flags(&doc).map_err(|e| malformed(e.to_string()))?;
        debug!("{:?} has SigFlags {}", path, flags);
        Ok(flags != 0)
    }
}
