//! Text extraction from downloaded files, dispatched by extension.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ExtractError;
use crate::models::ExtractedDocument;

/// Converts a local file into zero or more (text, metadata) records.
///
/// Dispatch is by file extension. Unrecognized extensions yield an empty
/// record set so the ingestion pipeline can skip them with a warning
/// instead of failing.
#[derive(Debug, Default)]
pub struct Extractor;

impl Extractor {
    pub fn new() -> Self {
        Self
    }

    /// Whether this extractor recognizes the file's extension.
    pub fn supports(&self, path: &Path) -> bool {
        matches!(
            extension_of(path).as_deref(),
            Some("txt" | "md" | "markdown" | "csv" | "log" | "json" | "pdf")
        )
    }

    /// Extract text records from a file.
    ///
    /// Unsupported extensions return an empty vec. Read or parse failures
    /// for supported extensions are reported as errors; the pipeline
    /// downgrades them to per-file warnings.
    pub fn extract(&self, path: &Path) -> Result<Vec<ExtractedDocument>, ExtractError> {
        match extension_of(path).as_deref() {
            Some("txt" | "md" | "markdown" | "csv" | "log" | "json") => {
                let text = std::fs::read_to_string(path)?;
                Ok(vec![ExtractedDocument {
                    text,
                    metadata: BTreeMap::new(),
                }])
            }
            Some("pdf") => extract_pdf(path),
            _ => Ok(Vec::new()),
        }
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

fn extract_pdf(path: &Path) -> Result<Vec<ExtractedDocument>, ExtractError> {
    let text = pdf_extract::extract_text(path).map_err(|e| ExtractError::ExtractionFailed {
        path: path.to_string_lossy().to_string(),
        reason: e.to_string(),
    })?;

    let mut metadata = BTreeMap::new();
    metadata.insert("format".to_string(), "pdf".to_string());

    Ok(vec![ExtractedDocument { text, metadata }])
}
