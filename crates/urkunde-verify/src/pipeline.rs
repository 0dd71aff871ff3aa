// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-document verification pipeline.
//
//   load ─> extract ─> embed primary marker ─> translation chain
//        ─> (back-translate) ─> distortion ─> encoding checks ─> score
//
// Stages run strictly in this order for one document. Only loading the file
// and translator failures abort a document.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::{info, instrument, warn};
use urkunde_core::VerifierConfig;
use urkunde_core::error::Result;
use urkunde_core::types::{AuthenticityCheck, MarkerKind};
use urkunde_document::{
    ExtractionAdapter, SourceDocument, TextExtractor, convert_font_encoding,
};
use urkunde_security::{
    AuditStage, AuditTrail, MarkerEngine, TokenRegistry, hash_bytes, hash_text,
};

use crate::chain::TranslationChain;
use crate::distortion::DistortionDetector;
use crate::report;
use crate::scorer::authenticity_score;
use crate::translate::Translator;

/// Verifies documents end to end.
///
/// Cheap to clone; clones share the token registry and the audit trail.
#[derive(Clone)]
pub struct AuthenticityVerifier {
    config: Arc<VerifierConfig>,
    adapter: ExtractionAdapter,
    markers: MarkerEngine,
    chain: TranslationChain,
    detector: DistortionDetector,
    audit: Option<Arc<Mutex<AuditTrail>>>,
}

impl AuthenticityVerifier {
    pub fn new(
        config: VerifierConfig,
        registry: Arc<TokenRegistry>,
        extractor: Arc<dyn TextExtractor>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        let markers = MarkerEngine::new(registry);
        let adapter = ExtractionAdapter::new(extractor, config.extraction.clone());
        let chain = TranslationChain::new(config.chain.clone(), translator, markers.clone());
        let detector = DistortionDetector::new(&config.distortion);
        Self {
            config: Arc::new(config),
            adapter,
            markers,
            chain,
            detector,
            audit: None,
        }
    }

    /// Record every stage of every document to `audit`.
    pub fn with_audit(mut self, audit: Arc<Mutex<AuditTrail>>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<TokenRegistry> {
        self.markers.registry()
    }

    /// Run the full pipeline on the document at `path`, written in `lang`.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn verify_document(&self, path: impl AsRef<Path>, lang: &str) -> Result<AuthenticityCheck> {
        let path = path.as_ref();
        let document_id = document_id(path);

        let document = SourceDocument::load(path).await?;
        let extraction = self.adapter.extract(&document, lang).await;
        let extraction_confidence = self.adapter.confidence(&extraction.text);
        if let Some(detected) = extraction.detected_lang.filter(|detected| *detected != lang) {
            warn!(requested = lang, detected, "text looks like a different language");
        }
        self.record(
            &document_id,
            AuditStage::Extract,
            None,
            true,
            Some(&format!(
                "{:?} confidence={extraction_confidence:.3} lang={} sha256={}",
                extraction.method,
                extraction.detected_lang.unwrap_or("unknown"),
                hash_bytes(&document.bytes)
            )),
        );

        let original_text = extraction.text;
        let (marked, primary_token) = self.markers.embed_issued(&original_text, MarkerKind::Primary);
        let primary_valid = self.markers.verify(&marked).authentic;
        self.record(
            &document_id,
            AuditStage::Embed,
            Some(primary_token.prefix()),
            primary_valid,
            None,
        );

        let outcome = match self.chain.run(&original_text, lang) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.record(&document_id, AuditStage::Translate, None, false, Some(&err.to_string()));
                return Err(err);
            }
        };
        for step in &outcome.steps {
            self.record(
                &document_id,
                AuditStage::Translate,
                Some(step.token.prefix()),
                step.marker_verified,
                Some(&format!("{}->{}", step.source_lang, step.target_lang)),
            );
        }

        let back_translated = if self.config.chain.back_translate {
            self.chain.back_translate(&outcome, lang)?
        } else {
            None
        };
        let compared = back_translated.as_deref().unwrap_or(&outcome.final_text);
        let distortion = self.detector.compare(&original_text, compared);

        let tokens_all_valid = primary_valid && outcome.markers_verified();
        self.record(&document_id, AuditStage::Verify, None, tokens_all_valid, None);

        let conversion =
            convert_font_encoding(&original_text, &self.config.extraction.source_font, None);
        let encoding_issues = conversion.issues;

        let score = authenticity_score(
            extraction_confidence,
            &distortion,
            tokens_all_valid,
            encoding_issues.len(),
        );
        self.record(
            &document_id,
            AuditStage::Score,
            None,
            score >= self.config.report.minimum_authenticity,
            Some(&format!("{score:.3}")),
        );

        info!(
            %document_id,
            score,
            distorted = distortion.distorted,
            tokens_all_valid,
            steps = outcome.steps.len(),
            "document verified"
        );

        Ok(AuthenticityCheck {
            document_id,
            source_path: path.to_path_buf(),
            source_lang: lang.to_owned(),
            extraction_method: extraction.method,
            extraction_confidence,
            original_text,
            translated_text: outcome.final_text,
            back_translated,
            chain: outcome.steps,
            chain_status: outcome.status,
            distortion,
            tokens_all_valid,
            encoding_issues,
            score,
            timestamp: Utc::now(),
        })
    }

    /// JSON report over `checks` using the configured thresholds.
    pub fn build_report(&self, checks: &[AuthenticityCheck]) -> Result<String> {
        report::build_report(checks, &self.config.report)
    }

    /// Append to the audit trail, if one is attached. Audit failures are
    /// logged and never fail the document.
    pub(crate) fn record(
        &self,
        document_id: &str,
        stage: AuditStage,
        token_prefix: Option<&str>,
        success: bool,
        details: Option<&str>,
    ) {
        let Some(audit) = &self.audit else {
            return;
        };
        let trail = audit.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = trail.record(document_id, stage, token_prefix, success, details) {
            warn!(%err, stage = stage.as_str(), "audit write failed");
        }
    }
}

/// `doc_<first 8 hex of SHA-256(path)>_<UTC timestamp>`.
fn document_id(path: &Path) -> String {
    let digest = hash_text(&[path.to_string_lossy().as_ref()]);
    let short = digest.get(..8).unwrap_or(&digest);
    format!("doc_{short}_{}", Utc::now().format("%Y%m%dT%H%M%S%.6f"))
}

#[cfg(test)]
mod tests {
    use urkunde_core::error::UrkundeError;
    use urkunde_core::types::{ChainStatus, EncodingIssue, ExtractionMethod};
    use urkunde_document::TextLayerExtractor;

    use super::*;
    use crate::translate::PhraseTableTranslator;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn verifier(config: VerifierConfig) -> AuthenticityVerifier {
        AuthenticityVerifier::new(
            config,
            Arc::new(TokenRegistry::new()),
            Arc::new(TextLayerExtractor),
            Arc::new(PhraseTableTranslator::default()),
        )
    }

    /// About 1250 characters of ASCII Romanian court text.
    fn romanian_ruling() -> String {
        "Conform articolul 22 din codul penal, procuror a cerut ca dosarul sa fie trimis \
         spre rejudecare la instanta de fond competenta. "
            .repeat(10)
    }

    #[tokio::test]
    async fn legal_text_scores_high_through_full_chain() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotarare.txt");
        let text = romanian_ruling();
        assert!(text.chars().count() >= 1200);
        std::fs::write(&path, &text).unwrap();

        let check = verifier(VerifierConfig::default())
            .verify_document(&path, "ron")
            .await
            .unwrap();

        assert_eq!(check.extraction_method, ExtractionMethod::Capability("text_layer".into()));
        assert_eq!(check.extraction_confidence, 1.0);
        assert_eq!(check.chain_status, ChainStatus::Completed);
        assert_eq!(check.chain.len(), 3);
        assert!(check.tokens_all_valid);
        assert!(check.encoding_issues.is_empty());
        // Romanian legal terms became English ones.
        assert!(check.distortion.lost_terms.contains("articolul"));
        assert!(check.distortion.lost_terms.contains("article"));
        assert!(check.distortion.distorted);
        assert!((0.8..=1.0).contains(&check.score), "score {}", check.score);
        assert!(check.document_id.starts_with("doc_"));
    }

    #[tokio::test]
    async fn skipped_chain_is_undistorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urteil.txt");
        let text = "Das Gericht hat entschieden, dass die Berufung zulässig ist. ".repeat(20);
        std::fs::write(&path, &text).unwrap();

        let check = verifier(VerifierConfig::default())
            .verify_document(&path, "deu")
            .await
            .unwrap();

        assert_eq!(check.chain_status, ChainStatus::Skipped);
        assert!(check.chain.is_empty());
        assert_eq!(check.translated_text, check.original_text);
        assert_eq!(check.distortion.similarity_ratio, 1.0);
        assert!(!check.distortion.distorted);
        // "ä" has no Windows-1251 encoding.
        assert_eq!(check.encoding_issues, vec![EncodingIssue::CyrillicCodepage]);
        assert!((check.score - 0.9).abs() < 1e-9, "score {}", check.score);
    }

    #[tokio::test]
    async fn back_translation_is_compared_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotarare.txt");
        std::fs::write(&path, romanian_ruling()).unwrap();

        let mut config = VerifierConfig::default();
        config.chain.back_translate = true;
        let check = verifier(config).verify_document(&path, "ron").await.unwrap();

        let back = check.back_translated.as_deref().unwrap();
        assert_eq!(back, check.original_text);
        assert!(!check.distortion.distorted);
        assert_eq!(check.score, 1.0);
    }

    #[tokio::test]
    async fn binary_document_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.bin");
        std::fs::write(&path, b"\x00\x01Judecatoria Sectorului 1\xff\x00").unwrap();

        let check = verifier(VerifierConfig::default())
            .verify_document(&path, "ron")
            .await
            .unwrap();

        assert_eq!(check.extraction_method, ExtractionMethod::Fallback);
        assert_eq!(check.original_text, "Judecatoria Sectorului 1");
    }

    #[tokio::test]
    async fn missing_document_is_an_error() {
        let result = verifier(VerifierConfig::default())
            .verify_document("/nonexistent/dosar.txt", "ron")
            .await;
        assert!(matches!(result, Err(UrkundeError::Io(_))));
    }

    #[tokio::test]
    async fn stages_are_audited() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotarare.txt");
        std::fs::write(&path, romanian_ruling()).unwrap();

        let audit = Arc::new(Mutex::new(AuditTrail::open_in_memory().unwrap()));
        let check = verifier(VerifierConfig::default())
            .with_audit(Arc::clone(&audit))
            .verify_document(&path, "ron")
            .await
            .unwrap();

        let trail = audit.lock().unwrap();
        let entries = trail.entries_for_document(&check.document_id).unwrap();
        let stages: Vec<&str> = entries.iter().map(|entry| entry.stage.as_str()).collect();
        assert_eq!(
            stages,
            ["extract", "embed", "translate", "translate", "translate", "verify", "score"]
        );
        let extract_details = entries[0].details.as_deref().unwrap_or_default();
        assert!(extract_details.contains("lang=unknown"), "{extract_details}");
    }

    #[test]
    fn document_ids_share_path_hash() {
        let a = document_id(Path::new("/archive/dosar.pdf"));
        let b = document_id(Path::new("/archive/dosar.pdf"));
        let c = document_id(Path::new("/archive/other.pdf"));
        assert_eq!(a.get(..12), b.get(..12));
        assert_ne!(a.get(..12), c.get(..12));
    }
}
