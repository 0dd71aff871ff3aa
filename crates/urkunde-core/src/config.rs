// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Verifier configuration, persisted as pretty-printed JSON.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::LanguagePair;
use crate::error::{Result, UrkundeError};

/// Settings for the extraction adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Upper bound on a single call into the extraction capability.
    pub timeout_secs: u64,
    /// Minimum run of printable bytes kept by the fallback extractor.
    pub min_printable_run: usize,
    /// Keywords whose presence boosts extraction confidence by 0.2.
    pub confidence_keywords: Vec<String>,
    /// Font the source documents were typeset in, for the monospace
    /// conversion check.
    pub source_font: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            min_printable_run: 10,
            confidence_keywords: ["суд", "дело", "закон", "право"]
                .into_iter()
                .map(String::from)
                .collect(),
            source_font: "Times New Roman".to_owned(),
        }
    }
}

impl ExtractionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings for the translation chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Directed path of language hops, scanned in order.
    pub steps: Vec<LanguagePair>,
    /// Steps whose decayed confidence falls below this abort the chain.
    pub abort_threshold: f64,
    /// Fractional confidence loss per literal phrase substitution.
    pub decay_per_substitution: f64,
    /// Translate the final text back into the source language and compare
    /// against that instead of the final text.
    pub back_translate: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            steps: vec![
                LanguagePair::new("ron", "eng"),
                LanguagePair::new("eng", "rus"),
                LanguagePair::new("rus", "eng"),
            ],
            abort_threshold: 0.5,
            decay_per_substitution: 0.02,
            back_translate: false,
        }
    }
}

/// Settings for the distortion detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistortionConfig {
    /// Texts less similar than this are distorted.
    pub similarity_threshold: f64,
    /// Relative word-count change above which a text is distorted.
    pub length_delta_threshold: f64,
    /// Legally significant terms per language code, lowercase.
    pub legal_terms: BTreeMap<String, Vec<String>>,
}

impl Default for DistortionConfig {
    fn default() -> Self {
        let terms = |words: &[&str]| -> Vec<String> { words.iter().map(|w| (*w).to_owned()).collect() };
        let mut legal_terms = BTreeMap::new();
        legal_terms.insert(
            "ron".to_owned(),
            terms(&[
                "articolul",
                "codul",
                "penal",
                "procesual",
                "curtea",
                "judecătoriei",
                "procuror",
            ]),
        );
        legal_terms.insert(
            "eng".to_owned(),
            terms(&[
                "article",
                "code",
                "criminal",
                "procedural",
                "court",
                "prosecutor",
                "judge",
            ]),
        );
        legal_terms.insert(
            "rus".to_owned(),
            terms(&[
                "статья",
                "кодекс",
                "уголовный",
                "процессуальный",
                "суд",
                "прокурор",
                "судья",
                "дело",
                "закон",
                "право",
                "реабилитация",
                "жалоба",
            ]),
        );
        Self {
            similarity_threshold: 0.7,
            length_delta_threshold: 0.3,
            legal_terms,
        }
    }
}

/// Score thresholds used when summarising a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub minimum_authenticity: f64,
    pub high_authenticity: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            minimum_authenticity: 0.7,
            high_authenticity: 0.9,
        }
    }
}

/// Upper bound on `batch.max_concurrent_documents`.
pub const MAX_CONCURRENT_DOCUMENTS: usize = 1024;

/// Settings for batch runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Glob pattern used when the caller does not supply one.
    pub default_pattern: String,
    /// Source language assumed for every document in a batch.
    pub source_lang: String,
    /// Documents verified at once. 1 keeps processing strictly sequential.
    pub max_concurrent_documents: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            default_pattern: "*.pdf".to_owned(),
            source_lang: "ron".to_owned(),
            max_concurrent_documents: 1,
        }
    }
}

/// Complete verifier configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    pub extraction: ExtractionConfig,
    pub chain: ChainConfig,
    pub distortion: DistortionConfig,
    pub report: ReportConfig,
    pub batch: BatchConfig,
}

impl VerifierConfig {
    /// Read a configuration file. Missing sections fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file, or use defaults when it is absent or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "using default configuration");
            Self::default()
        })
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(UrkundeError::Config(format!(
                    "{name} must be within [0, 1], got {value}"
                )))
            }
        };
        unit("chain.abort_threshold", self.chain.abort_threshold)?;
        unit("chain.decay_per_substitution", self.chain.decay_per_substitution)?;
        unit("distortion.similarity_threshold", self.distortion.similarity_threshold)?;
        unit("report.minimum_authenticity", self.report.minimum_authenticity)?;
        unit("report.high_authenticity", self.report.high_authenticity)?;

        if self.distortion.length_delta_threshold < 0.0 {
            return Err(UrkundeError::Config(
                "distortion.length_delta_threshold must not be negative".into(),
            ));
        }
        if self.extraction.timeout_secs == 0 {
            return Err(UrkundeError::Config(
                "extraction.timeout_secs must be at least 1".into(),
            ));
        }
        if !(1..=MAX_CONCURRENT_DOCUMENTS).contains(&self.batch.max_concurrent_documents) {
            return Err(UrkundeError::Config(format!(
                "batch.max_concurrent_documents must be within [1, {MAX_CONCURRENT_DOCUMENTS}], got {}",
                self.batch.max_concurrent_documents
            )));
        }
        Ok(())
    }
}
