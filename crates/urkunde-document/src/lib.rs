// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// urkunde-document — Getting text out of source documents.
//
// Provides the extraction adapter (capability call with timeout, byte-scan
// fallback, confidence heuristic), the built-in extraction capabilities
// (PDF text layer, Tesseract, and pure-Rust OCR behind the `ocr` feature),
// and codepage / font conversion checks on the extracted text.

pub mod encoding;
pub mod extract;
pub mod scan;

pub use encoding::{FontConversion, check_encoding, convert_font_encoding};
pub use extract::{
    ChainedExtractor, Extraction, ExtractionAdapter, SourceDocument, TextExtractor,
    default_extractor, detect_language,
};
pub use extract::tesseract::TesseractExtractor;
pub use extract::text_layer::TextLayerExtractor;

#[cfg(feature = "ocr")]
pub use scan::ocr::OcrsExtractor;
