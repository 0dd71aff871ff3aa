// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extraction adapter — runs a text extraction capability on a blocking worker
// with a timeout, and degrades to a byte scan when the capability fails.
//
// Flow:
//   SourceDocument::load(path)      -- the only step that can fail
//        │
//        ▼
//   spawn_blocking(extractor.extract) under tokio::time::timeout
//        │ ok, non-empty            │ error / panic / timeout / empty
//        ▼                          ▼
//   Capability(name)           fallback::printable_runs(bytes)

pub mod fallback;
pub mod tesseract;
pub mod text_layer;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use urkunde_core::config::ExtractionConfig;
use urkunde_core::error::{Result, UrkundeError};
use urkunde_core::types::ExtractionMethod;

use self::tesseract::TesseractExtractor;
use self::text_layer::TextLayerExtractor;

/// A capability that turns a document on disk into text.
///
/// Implementations are synchronous and may block; the adapter moves them
/// onto tokio's blocking pool.
pub trait TextExtractor: Send + Sync {
    /// Short identifier recorded as the extraction method.
    fn name(&self) -> &str;

    /// Extract the text of the document at `path`. `lang` is an ISO 639-3
    /// hint (`ron`, `rus`, ...) that OCR capabilities pass to their models.
    fn extract(&self, path: &Path, lang: &str) -> Result<String>;
}

/// A document read into memory.
///
/// The raw bytes are kept for the fallback scan.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    /// Read the document at `path`.
    ///
    /// A document that cannot be read fails the whole verification for that
    /// document; it is not a case for the fallback extractor.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bytes = tokio::fs::read(&path).await?;
        debug!(bytes = bytes.len(), "document loaded");
        Ok(Self { path, bytes })
    }

    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }
}

/// Text produced by the adapter and how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub text: String,
    pub method: ExtractionMethod,
    /// Language guessed from the text's diacritics, if any stood out.
    pub detected_lang: Option<&'static str>,
}

const ROMANIAN_MARKS: &[char] = &['ă', 'â', 'î', 'ș', 'ț', 'ş', 'ţ'];
const RUSSIAN_MARKS: &[char] = &['ё', 'ъ', 'ы', 'э'];

/// Guess `ron` or `rus` by counting letters only one of the two alphabets
/// uses. Romanian wins only on a strict majority; `None` when neither
/// alphabet shows up.
pub fn detect_language(text: &str) -> Option<&'static str> {
    let (mut romanian, mut russian) = (0usize, 0usize);
    for c in text.chars().flat_map(char::to_lowercase) {
        if ROMANIAN_MARKS.contains(&c) {
            romanian += 1;
        } else if RUSSIAN_MARKS.contains(&c) {
            russian += 1;
        }
    }
    if romanian > russian {
        Some("ron")
    } else if russian > 0 {
        Some("rus")
    } else {
        None
    }
}

/// Wraps a [`TextExtractor`] with a timeout, a fallback and a confidence
/// heuristic.
#[derive(Clone)]
pub struct ExtractionAdapter {
    extractor: Arc<dyn TextExtractor>,
    config: ExtractionConfig,
}

impl ExtractionAdapter {
    pub fn new(extractor: Arc<dyn TextExtractor>, config: ExtractionConfig) -> Self {
        Self { extractor, config }
    }

    /// Extract text from `document`. Never fails; the worst case is an empty
    /// fallback string.
    ///
    /// A capability that times out keeps running on its blocking thread until
    /// it returns on its own; its result is discarded.
    #[instrument(skip_all, fields(path = %document.path.display(), lang = %lang, extractor = self.extractor.name()))]
    pub async fn extract(&self, document: &SourceDocument, lang: &str) -> Extraction {
        let extractor = Arc::clone(&self.extractor);
        let path = document.path.clone();
        let lang_owned = lang.to_owned();
        let task = tokio::task::spawn_blocking(move || extractor.extract(&path, &lang_owned));

        let reason = match tokio::time::timeout(self.config.timeout(), task).await {
            Ok(Ok(Ok(text))) if !text.trim().is_empty() => {
                info!(chars = text.chars().count(), "text extracted");
                return Extraction {
                    detected_lang: detect_language(&text),
                    text,
                    method: ExtractionMethod::Capability(self.extractor.name().to_owned()),
                };
            }
            Ok(Ok(Ok(_))) => "capability returned no text".to_owned(),
            Ok(Ok(Err(err))) => err.to_string(),
            Ok(Err(join_err)) => UrkundeError::Task(join_err.to_string()).to_string(),
            Err(_) => format!("capability timed out after {}s", self.config.timeout_secs),
        };

        warn!(%reason, "extraction degraded to printable-run scan");
        let text = fallback::printable_runs(&document.bytes, self.config.min_printable_run);
        Extraction {
            detected_lang: detect_language(&text),
            text,
            method: ExtractionMethod::Fallback,
        }
    }

    /// Load `path` and extract it.
    pub async fn extract_path(&self, path: impl AsRef<Path>, lang: &str) -> Result<Extraction> {
        let document = SourceDocument::load(path).await?;
        Ok(self.extract(&document, lang).await)
    }

    /// Heuristic confidence in `[0, 1]` for extracted text.
    ///
    /// One point per thousand characters, capped at 1, plus 0.2 when a
    /// configured keyword occurs. Blank text scores 0.
    pub fn confidence(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }
        let base = (text.chars().count() as f64 / 1000.0).min(1.0);
        let lowered = text.to_lowercase();
        let has_keyword = self
            .config
            .confidence_keywords
            .iter()
            .any(|keyword| lowered.contains(&keyword.to_lowercase()));
        if has_keyword {
            (base + 0.2).min(1.0)
        } else {
            base
        }
    }
}

/// Tries each capability in order and returns the first non-empty result.
pub struct ChainedExtractor {
    name: String,
    extractors: Vec<Box<dyn TextExtractor>>,
}

impl ChainedExtractor {
    pub fn new(extractors: Vec<Box<dyn TextExtractor>>) -> Self {
        let name = extractors
            .iter()
            .map(|e| e.name())
            .collect::<Vec<_>>()
            .join("+");
        Self { name, extractors }
    }
}

impl TextExtractor for ChainedExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, path: &Path, lang: &str) -> Result<String> {
        let mut failures = Vec::new();
        for extractor in &self.extractors {
            match extractor.extract(path, lang) {
                Ok(text) if !text.trim().is_empty() => {
                    debug!(extractor = extractor.name(), "capability succeeded");
                    return Ok(text);
                }
                Ok(_) => failures.push(format!("{}: no text", extractor.name())),
                Err(err) => failures.push(format!("{}: {err}", extractor.name())),
            }
        }
        Err(UrkundeError::Extraction(if failures.is_empty() {
            "no extraction capability configured".to_owned()
        } else {
            failures.join("; ")
        }))
    }
}

/// The built-in capability chain: PDF text layer, then OCR models when the
/// `ocr` feature is enabled and the models are installed, then Tesseract.
pub fn default_extractor() -> Arc<dyn TextExtractor> {
    let mut extractors: Vec<Box<dyn TextExtractor>> = vec![Box::new(TextLayerExtractor)];

    #[cfg(feature = "ocr")]
    match crate::scan::ocr::OcrsExtractor::with_defaults() {
        Ok(ocr) => extractors.push(Box::new(ocr)),
        Err(err) => debug!(%err, "ocrs models unavailable"),
    }

    extractors.push(Box::new(TesseractExtractor::new()));
    Arc::new(ChainedExtractor::new(extractors))
}
