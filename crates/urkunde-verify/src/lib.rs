// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// urkunde-verify — The authenticity verification pipeline.
//
// Takes a document through extraction, marking, a chain of translations,
// distortion analysis and scoring, and summarises batches as JSON reports.

pub mod batch;
pub mod chain;
pub mod distortion;
pub mod pipeline;
pub mod report;
pub mod scorer;
pub mod translate;

pub use batch::{BatchFailure, BatchOutcome};
pub use chain::{ChainOutcome, StepState, TranslationChain};
pub use distortion::DistortionDetector;
pub use pipeline::AuthenticityVerifier;
pub use report::{VerificationReport, build_report};
pub use scorer::authenticity_score;
pub use translate::{PhraseTableTranslator, Translation, Translator};
