// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Distortion detector — compares an original text with its derived form.
//
// Three independent checks, any of which marks the text distorted:
//   similarity    normalized Levenshtein ratio below the threshold
//   legal terms   a legal term occurs on one side only
//   length        word count changed by more than the threshold

use std::collections::BTreeSet;

use tracing::debug;
use urkunde_core::config::DistortionConfig;
use urkunde_core::types::{DistortionAnalysis, DistortionTrigger};

#[derive(Debug, Clone)]
pub struct DistortionDetector {
    similarity_threshold: f64,
    length_delta_threshold: f64,
    /// Union of every language's legal terms, lowercase.
    legal_terms: BTreeSet<String>,
}

impl DistortionDetector {
    pub fn new(config: &DistortionConfig) -> Self {
        let legal_terms = config
            .legal_terms
            .values()
            .flatten()
            .map(|term| term.to_lowercase())
            .collect();
        Self {
            similarity_threshold: config.similarity_threshold,
            length_delta_threshold: config.length_delta_threshold,
            legal_terms,
        }
    }

    /// Compare `original` with `derived`.
    pub fn compare(&self, original: &str, derived: &str) -> DistortionAnalysis {
        let similarity_ratio = strsim::normalized_levenshtein(original, derived);

        let original_words = words(original);
        let derived_words = words(derived);

        let original_terms = self.terms_in(&original_words);
        let derived_terms = self.terms_in(&derived_words);
        let lost_terms: BTreeSet<String> = original_terms
            .symmetric_difference(&derived_terms)
            .map(|term| (*term).to_owned())
            .collect();

        let length_delta_ratio = length_delta(original_words.len(), derived_words.len());

        let mut triggers = BTreeSet::new();
        if similarity_ratio < self.similarity_threshold {
            triggers.insert(DistortionTrigger::Similarity);
        }
        if !lost_terms.is_empty() {
            triggers.insert(DistortionTrigger::LegalTerms);
        }
        if length_delta_ratio > self.length_delta_threshold {
            triggers.insert(DistortionTrigger::Length);
        }

        debug!(
            similarity_ratio,
            lost_terms = lost_terms.len(),
            length_delta_ratio,
            ?triggers,
            "texts compared"
        );

        DistortionAnalysis {
            similarity_ratio,
            lost_terms,
            length_delta_ratio,
            distorted: !triggers.is_empty(),
            triggers,
        }
    }

    fn terms_in<'a>(&'a self, words: &[String]) -> BTreeSet<&'a str> {
        let words: BTreeSet<&str> = words.iter().map(String::as_str).collect();
        self.legal_terms
            .iter()
            .filter(|term| words.contains(term.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Lowercase words of `text` with surrounding punctuation trimmed.
fn words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

/// Relative change in word count.
fn length_delta(original: usize, derived: usize) -> f64 {
    if original == 0 {
        return if derived == 0 { 0.0 } else { 1.0 };
    }
    original.abs_diff(derived) as f64 / original as f64
}
