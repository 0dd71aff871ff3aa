// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Urkunde.

use thiserror::Error;

/// Top-level error type for all Urkunde operations.
///
/// Only failures that make a single document unverifiable surface here.
/// Extraction problems degrade to the fallback extractor, unresolved tokens
/// become `authentic = false`, and codepage problems are recorded as
/// encoding issues instead.
#[derive(Debug, Error)]
pub enum UrkundeError {
    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("text extraction failed: {0}")]
    Extraction(String),

    // -- Pipeline errors --
    #[error("translation {source_lang} -> {target_lang} failed: {detail}")]
    Translation {
        source_lang: String,
        target_lang: String,
        detail: String,
    },

    #[error("invalid file pattern: {0}")]
    Pattern(String),

    #[error("background task failed: {0}")]
    Task(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Storage / persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, UrkundeError>;
