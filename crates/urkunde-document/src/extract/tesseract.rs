// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR through an installed `tesseract` binary.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, instrument};
use urkunde_core::error::{Result, UrkundeError};

use super::TextExtractor;

/// Runs `tesseract <path> stdout -l <lang>` and returns its standard output.
///
/// Tesseract's language packs use the same ISO 639-3 codes as the rest of
/// the pipeline (`ron`, `rus`, `eng`).
#[derive(Debug, Clone)]
pub struct TesseractExtractor {
    binary: PathBuf,
}

impl Default for TesseractExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TesseractExtractor {
    /// Use `tesseract` from `PATH`.
    pub fn new() -> Self {
        Self::with_binary("tesseract")
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl TextExtractor for TesseractExtractor {
    fn name(&self) -> &str {
        "tesseract"
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    fn extract(&self, path: &Path, lang: &str) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg(path)
            .arg("stdout")
            .arg("-l")
            .arg(lang)
            .output()
            .map_err(|err| {
                UrkundeError::OcrError(format!(
                    "failed to run {}: {}",
                    self.binary.display(),
                    err
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(UrkundeError::OcrError(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.chars().count(), "tesseract finished");
        Ok(text)
    }
}
