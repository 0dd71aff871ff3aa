// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Translation-chain engine — walks the configured language path, marks every
// hop with a delegated marker, and stops when confidence drops too far.
//
// Per-step lifecycle:
//
//   Pending ──(source != current language)──> Skipped
//      │
//      └─ translate ─> Translated ─(confidence × decay < threshold)─> Aborted
//                          │
//                          └─ embed ─> Marked ─ verify ok ─> Verified

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use urkunde_core::config::ChainConfig;
use urkunde_core::error::Result;
use urkunde_core::types::{ChainStatus, MarkerKind, TranslationStep};
use urkunde_security::MarkerEngine;

use crate::translate::Translator;

/// Where a configured step ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Pending,
    Translated,
    Marked,
    Verified,
    Skipped,
    Aborted,
}

/// Result of running the chain over one text.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutcome {
    /// Executed, recorded steps in order.
    pub steps: Vec<TranslationStep>,
    pub status: ChainStatus,
    /// Output of the last recorded step, or the input when none ran.
    pub final_text: String,
    pub final_lang: String,
    /// One entry per configured step.
    pub states: Vec<StepState>,
}

impl ChainOutcome {
    /// Every recorded step's delegated marker verified.
    pub fn markers_verified(&self) -> bool {
        self.steps.iter().all(|step| step.marker_verified)
    }
}

/// Runs texts through the configured sequence of translations.
#[derive(Clone)]
pub struct TranslationChain {
    config: ChainConfig,
    translator: Arc<dyn Translator>,
    markers: MarkerEngine,
}

impl TranslationChain {
    pub fn new(config: ChainConfig, translator: Arc<dyn Translator>, markers: MarkerEngine) -> Self {
        Self {
            config,
            translator,
            markers,
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Translate `text` from `source_lang` along the configured steps.
    ///
    /// A step runs only when its source is the current language. The
    /// substitution decay is cumulative over the whole chain. A step whose
    /// decayed confidence falls below the abort threshold is not recorded and
    /// ends the chain; that is an outcome, not an error. Translator errors
    /// are propagated.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub fn run(&self, text: &str, source_lang: &str) -> Result<ChainOutcome> {
        let mut states = vec![StepState::Pending; self.config.steps.len()];
        let mut steps = Vec::new();
        let mut current_text = text.to_owned();
        let mut current_lang = source_lang.to_owned();
        let mut decay = 1.0_f64;
        let keep = 1.0 - self.config.decay_per_substitution;

        for (index, pair) in self.config.steps.iter().enumerate() {
            if pair.source != current_lang {
                states[index] = StepState::Skipped;
                continue;
            }

            let translation =
                self.translator
                    .translate(&current_text, &pair.source, &pair.target)?;
            states[index] = StepState::Translated;

            let exponent = i32::try_from(translation.substitutions).unwrap_or(i32::MAX);
            decay *= keep.powi(exponent);
            let confidence = translation.confidence * decay;

            if confidence < self.config.abort_threshold {
                states[index] = StepState::Aborted;
                warn!(
                    step = index,
                    %pair,
                    confidence,
                    threshold = self.config.abort_threshold,
                    "chain aborted on low confidence"
                );
                return Ok(ChainOutcome {
                    status: ChainStatus::Aborted {
                        step: index,
                        confidence,
                    },
                    final_text: current_text,
                    final_lang: current_lang,
                    steps,
                    states,
                });
            }

            let (marked, token) = self
                .markers
                .embed_issued(&translation.text, MarkerKind::Delegated);
            states[index] = StepState::Marked;

            let marker_verified = self.markers.verify(&marked).authentic;
            if marker_verified {
                states[index] = StepState::Verified;
            }

            debug!(step = index, %pair, confidence, marker_verified, "step recorded");
            steps.push(TranslationStep {
                source_lang: pair.source.clone(),
                target_lang: pair.target.clone(),
                input_text: current_text,
                output_text: translation.text.clone(),
                confidence,
                token,
                substitutions: translation.substitutions,
                marker_verified,
            });

            current_text = translation.text;
            current_lang = pair.target.clone();
        }

        let status = if steps.is_empty() {
            ChainStatus::Skipped
        } else {
            ChainStatus::Completed
        };
        info!(steps = steps.len(), ?status, "chain finished");

        Ok(ChainOutcome {
            steps,
            status,
            final_text: current_text,
            final_lang: current_lang,
            states,
        })
    }

    /// Translate the chain's final text back into `source_lang`.
    ///
    /// `None` when the chain ended in the source language already.
    pub fn back_translate(&self, outcome: &ChainOutcome, source_lang: &str) -> Result<Option<String>> {
        if outcome.final_lang == source_lang {
            return Ok(None);
        }
        let translation =
            self.translator
                .translate(&outcome.final_text, &outcome.final_lang, source_lang)?;
        debug!(from = %outcome.final_lang, to = source_lang, "back-translated");
        Ok(Some(translation.text))
    }
}
