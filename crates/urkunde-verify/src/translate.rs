// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Translation capability and the built-in phrase-table translator.

use std::collections::BTreeMap;

use tracing::debug;
use urkunde_core::config::DistortionConfig;
use urkunde_core::error::{Result, UrkundeError};

/// Output of one translation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub text: String,
    /// Translator's own confidence in `[0, 1]`, before chain decay.
    pub confidence: f64,
    /// Number of literal phrase replacements made.
    pub substitutions: usize,
}

/// A machine translation capability.
///
/// Languages are ISO 639-3 codes. An unsupported pair is an error.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<Translation>;
}

/// Confidence reported before any legal-term penalty.
const BASE_CONFIDENCE: f64 = 0.95;
/// Applied when legal terminology in the input has no counterpart in the output.
const MISSING_TERMS_FACTOR: f64 = 0.7;

const RON_ENG: &[(&str, &str)] = &[
    ("Cerere de chemare în judecată", "Summons to court"),
    ("articolul", "article"),
    ("codul penal", "criminal code"),
    ("procuror", "prosecutor"),
    ("judecător", "judge"),
];

const ENG_RUS: &[(&str, &str)] = &[
    ("Summons to court", "Вызов в суд"),
    ("article", "статья"),
    ("criminal code", "уголовный кодекс"),
    ("prosecutor", "прокурор"),
    ("judge", "судья"),
];

/// Deterministic translator that substitutes a fixed list of legal phrases.
///
/// Each phrase found in the text (case-insensitively) is replaced wherever it
/// occurs with its exact casing, and counts as one substitution either way.
/// Text outside the table passes through untouched.
#[derive(Debug, Clone)]
pub struct PhraseTableTranslator {
    tables: BTreeMap<(String, String), Vec<(String, String)>>,
    legal_terms: BTreeMap<String, Vec<String>>,
}

impl Default for PhraseTableTranslator {
    fn default() -> Self {
        Self::new(DistortionConfig::default().legal_terms)
    }
}

impl PhraseTableTranslator {
    /// Built-in tables for `ron <-> eng` and `eng <-> rus`, with
    /// `legal_terms` driving the confidence penalty.
    pub fn new(legal_terms: BTreeMap<String, Vec<String>>) -> Self {
        let owned = |pairs: &[(&str, &str)]| -> Vec<(String, String)> {
            pairs
                .iter()
                .map(|(from, to)| ((*from).to_owned(), (*to).to_owned()))
                .collect()
        };
        let reversed = |pairs: &[(&str, &str)]| -> Vec<(String, String)> {
            pairs
                .iter()
                .map(|(from, to)| ((*to).to_owned(), (*from).to_owned()))
                .collect()
        };

        let mut tables = BTreeMap::new();
        tables.insert(("ron".to_owned(), "eng".to_owned()), owned(RON_ENG));
        tables.insert(("eng".to_owned(), "ron".to_owned()), reversed(RON_ENG));
        tables.insert(("eng".to_owned(), "rus".to_owned()), owned(ENG_RUS));
        tables.insert(("rus".to_owned(), "eng".to_owned()), reversed(ENG_RUS));

        Self {
            tables,
            legal_terms,
        }
    }

    /// Add or replace the phrase table for one direction.
    pub fn with_table(
        mut self,
        source: &str,
        target: &str,
        phrases: Vec<(String, String)>,
    ) -> Self {
        self.tables
            .insert((source.to_owned(), target.to_owned()), phrases);
        self
    }

    pub fn supports(&self, source: &str, target: &str) -> bool {
        self.tables
            .contains_key(&(source.to_owned(), target.to_owned()))
    }

    fn has_legal_term(&self, lang: &str, lowered: &str) -> bool {
        self.legal_terms
            .get(lang)
            .is_some_and(|terms| terms.iter().any(|term| lowered.contains(term.as_str())))
    }
}

impl Translator for PhraseTableTranslator {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<Translation> {
        let table = self
            .tables
            .get(&(source.to_owned(), target.to_owned()))
            .ok_or_else(|| UrkundeError::Translation {
                source_lang: source.to_owned(),
                target_lang: target.to_owned(),
                detail: "no phrase table for this pair".to_owned(),
            })?;

        let mut output = text.to_owned();
        let mut substitutions = 0;
        for (from, to) in table {
            if output.to_lowercase().contains(&from.to_lowercase()) {
                output = output.replace(from.as_str(), to);
                substitutions += 1;
            }
        }

        let mut confidence = BASE_CONFIDENCE;
        if self.has_legal_term(source, &text.to_lowercase())
            && !self.has_legal_term(target, &output.to_lowercase())
        {
            confidence *= MISSING_TERMS_FACTOR;
        }

        debug!(source, target, substitutions, confidence, "phrase table applied");
        Ok(Translation {
            text: output,
            confidence,
            substitutions,
        })
    }
}
