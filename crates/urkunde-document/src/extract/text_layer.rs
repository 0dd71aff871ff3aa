// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text-layer extraction — digital PDFs through `lopdf`, plain text files as
// UTF-8.

use std::path::Path;

use lopdf::Document;
use tracing::{debug, instrument};
use urkunde_core::error::{Result, UrkundeError};

use super::TextExtractor;

/// Reads text that is already present in the file.
///
/// Scanned PDFs without a text layer come back empty, which lets a
/// [`ChainedExtractor`](super::ChainedExtractor) move on to OCR.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLayerExtractor;

impl TextLayerExtractor {
    /// Text of every page of the PDF at `path`, in page order.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn pdf_text(path: &Path) -> Result<String> {
        let document = Document::load(path).map_err(|err| {
            UrkundeError::PdfError(format!("failed to open {}: {}", path.display(), err))
        })?;

        let pages: Vec<u32> = document.get_pages().keys().copied().collect();
        debug!(pages = pages.len(), "PDF loaded");
        if pages.is_empty() {
            return Ok(String::new());
        }

        document.extract_text(&pages).map_err(|err| {
            UrkundeError::PdfError(format!(
                "failed to extract text from {}: {}",
                path.display(),
                err
            ))
        })
    }
}

impl TextExtractor for TextLayerExtractor {
    fn name(&self) -> &str {
        "text_layer"
    }

    fn extract(&self, path: &Path, _lang: &str) -> Result<String> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("pdf") => Self::pdf_text(path),
            Some("txt" | "text") => {
                let bytes = std::fs::read(path)?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            other => Err(UrkundeError::Extraction(format!(
                "no text layer for {} (extension {:?})",
                path.display(),
                other.unwrap_or("")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_plain_text_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotarare.TXT");
        std::fs::write(&path, "Curtea de Apel Chișinău").unwrap();

        let text = TextLayerExtractor.extract(&path, "ron").unwrap();
        assert_eq!(text, "Curtea de Apel Chișinău");
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cp1251.txt");
        // "суд" in Windows-1251.
        std::fs::write(&path, [0xF1, 0xF3, 0xE4]).unwrap();

        let text = TextLayerExtractor.extract(&path, "rus").unwrap();
        assert_eq!(text.chars().filter(|c| *c == '\u{FFFD}').count(), 3);
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, b"not really a png").unwrap();

        assert!(matches!(
            TextLayerExtractor.extract(&path, "ron"),
            Err(UrkundeError::Extraction(_))
        ));
    }

    #[test]
    fn corrupt_pdf_is_a_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"definitely not a PDF").unwrap();

        assert!(matches!(
            TextLayerExtractor.extract(&path, "ron"),
            Err(UrkundeError::PdfError(_))
        ));
    }
}
