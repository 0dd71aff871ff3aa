// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Urkunde authenticity pipeline.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of hex characters of a token carried inside an embedded marker.
pub const TOKEN_PREFIX_LEN: usize = 8;

/// Integrity token issued by the token registry for one embedding call.
///
/// A lowercase hex SHA-256 digest. Only the first [`TOKEN_PREFIX_LEN`]
/// characters travel inside marked text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token(pub String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The truncated form embedded in marker headers.
    pub fn prefix(&self) -> &str {
        let end = self.0.len().min(TOKEN_PREFIX_LEN);
        self.0.get(..end).unwrap_or(self.0.as_str())
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of authenticity marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    /// Authorship marker placed on the original text.
    Primary,
    /// Re-issued marker placed on derived text (e.g. after translation).
    Delegated,
}

impl MarkerKind {
    /// All kinds, in the order verification scans for them.
    pub const ALL: [MarkerKind; 2] = [MarkerKind::Primary, MarkerKind::Delegated];

    /// Canonical label written at the head of marked text.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Primary => "A©tor",
            Self::Delegated => "A©t0r",
        }
    }

    /// Visually confusable variant (`©` swapped for Cyrillic `й`) that a
    /// forged marker carries.
    pub fn homoglyph_label(&self) -> &'static str {
        match self {
            Self::Primary => "Aйtor",
            Self::Delegated => "Aйt0r",
        }
    }
}

/// Metadata stored in the registry for every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub issued_token: Token,
    pub created_at: DateTime<Utc>,
}

/// Which label a marker scan matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerMatch {
    Canonical(MarkerKind),
    Homoglyph(MarkerKind),
}

/// Outcome of verifying a piece of marked text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerVerification {
    pub authentic: bool,
    pub marker_found: Option<MarkerMatch>,
    pub token_valid: bool,
    pub distortion_flag: bool,
    pub checked_at: DateTime<Utc>,
}

/// A `(source, target)` language pair in ISO 639-3 codes (`ron`, `eng`, `rus`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl std::fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.source, self.target)
    }
}

/// One executed hop of a translation chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationStep {
    pub source_lang: String,
    pub target_lang: String,
    pub input_text: String,
    pub output_text: String,
    /// Translator confidence times the cumulative substitution decay.
    pub confidence: f64,
    /// Token of the delegated marker embedded on `output_text`.
    pub token: Token,
    pub substitutions: usize,
    pub marker_verified: bool,
}

/// How a translation chain run ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChainStatus {
    /// At least one step ran and none fell below the abort threshold.
    Completed,
    /// No step's source language matched; text passed through unchanged.
    Skipped,
    /// Step `step` (0-based index into the configured list) fell below the
    /// confidence threshold.
    Aborted { step: usize, confidence: f64 },
}

/// Which of the independent distortion checks fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistortionTrigger {
    Similarity,
    LegalTerms,
    Length,
}

/// Result of comparing an original text with a derived one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistortionAnalysis {
    pub similarity_ratio: f64,
    pub lost_terms: BTreeSet<String>,
    pub length_delta_ratio: f64,
    pub distorted: bool,
    pub triggers: BTreeSet<DistortionTrigger>,
}

impl DistortionAnalysis {
    /// Penalty magnitude used by the scorer: `1 - similarity`.
    pub fn distortion_score(&self) -> f64 {
        (1.0 - self.similarity_ratio).clamp(0.0, 1.0)
    }
}

/// Which extractor produced a document's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "name", rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// A real extraction capability, identified by name.
    Capability(String),
    /// Printable-run byte scan after the capability failed or timed out.
    Fallback,
}

/// A codepage or formatting problem detected in extracted text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingIssue {
    #[serde(rename = "cyrillic_encoding_issue")]
    CyrillicCodepage,
    #[serde(rename = "romanian_diacritics_issue")]
    RomanianDiacritics,
    #[serde(rename = "formatting_loss_detected")]
    FormattingLoss,
    #[serde(rename = "conversion_failed")]
    ConversionFailed(String),
}

impl EncodingIssue {
    /// Stable key used in reports.
    pub fn key(&self) -> &'static str {
        match self {
            Self::CyrillicCodepage => "cyrillic_encoding_issue",
            Self::RomanianDiacritics => "romanian_diacritics_issue",
            Self::FormattingLoss => "formatting_loss_detected",
            Self::ConversionFailed(_) => "conversion_failed",
        }
    }
}

impl std::fmt::Display for EncodingIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConversionFailed(detail) => write!(f, "conversion_failed: {detail}"),
            other => f.write_str(other.key()),
        }
    }
}

/// Full verification record for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticityCheck {
    pub document_id: String,
    pub source_path: PathBuf,
    pub source_lang: String,
    pub extraction_method: ExtractionMethod,
    pub extraction_confidence: f64,
    pub original_text: String,
    /// Output of the last executed chain step (the original when skipped).
    pub translated_text: String,
    pub back_translated: Option<String>,
    pub chain: Vec<TranslationStep>,
    pub chain_status: ChainStatus,
    pub distortion: DistortionAnalysis,
    pub tokens_all_valid: bool,
    pub encoding_issues: Vec<EncodingIssue>,
    pub score: f64,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_prefix_is_eight_chars() {
        let token = Token("0123456789abcdef".into());
        assert_eq!(token.prefix(), "01234567");
    }

    #[test]
    fn token_prefix_of_short_token() {
        let token = Token("abc".into());
        assert_eq!(token.prefix(), "abc");
    }

    #[test]
    fn homoglyph_labels_differ_by_one_char() {
        for kind in MarkerKind::ALL {
            let canonical: Vec<char> = kind.label().chars().collect();
            let forged: Vec<char> = kind.homoglyph_label().chars().collect();
            assert_eq!(canonical.len(), forged.len());
            let differing = canonical
                .iter()
                .zip(&forged)
                .filter(|(a, b)| a != b)
                .count();
            assert_eq!(differing, 1, "{kind:?}");
        }
    }

    #[test]
    fn encoding_issue_serializes_to_report_key() {
        let json = serde_json::to_string(&EncodingIssue::RomanianDiacritics).unwrap();
        assert_eq!(json, "\"romanian_diacritics_issue\"");
        assert_eq!(EncodingIssue::FormattingLoss.to_string(), "formatting_loss_detected");
    }

    #[test]
    fn distortion_score_is_inverse_similarity() {
        let analysis = DistortionAnalysis {
            similarity_ratio: 0.25,
            lost_terms: BTreeSet::new(),
            length_delta_ratio: 0.0,
            distorted: true,
            triggers: BTreeSet::from([DistortionTrigger::Similarity]),
        };
        assert!((analysis.distortion_score() - 0.75).abs() < 1e-12);
    }
}
