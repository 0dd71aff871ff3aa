// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch report — summary statistics and per-document rows, serialized as
// pretty-printed JSON with stable camelCase keys.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use urkunde_core::config::ReportConfig;
use urkunde_core::error::Result;
use urkunde_core::types::AuthenticityCheck;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub verification_summary: VerificationSummary,
    pub average_scores: AverageScores,
    /// Occurrences of each encoding issue key across all documents.
    pub font_issues_summary: BTreeMap<String, usize>,
    pub verification_timestamp: DateTime<Utc>,
    pub detailed_checks: Vec<DetailedCheck>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSummary {
    pub total_documents: usize,
    /// Scores at or above `minimum_authenticity`.
    pub authentic_documents: usize,
    /// Scores at or above `high_authenticity`.
    pub high_authenticity: usize,
    pub distorted_documents: usize,
    /// Documents whose markers all verified.
    pub quantum_verified: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageScores {
    pub authenticity: f64,
    /// Fraction of documents flagged as distorted.
    pub distortion_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedCheck {
    pub document_id: String,
    pub authenticity_score: f64,
    pub distortion_detected: bool,
    pub quantum_verified: bool,
    pub font_conversion_issues: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl VerificationReport {
    pub fn summarize(checks: &[AuthenticityCheck], config: &ReportConfig) -> Self {
        let denominator = checks.len().max(1) as f64;
        let at_least = |threshold: f64| checks.iter().filter(|c| c.score >= threshold).count();

        let verification_summary = VerificationSummary {
            total_documents: checks.len(),
            authentic_documents: at_least(config.minimum_authenticity),
            high_authenticity: at_least(config.high_authenticity),
            distorted_documents: checks.iter().filter(|c| c.distortion.distorted).count(),
            quantum_verified: checks.iter().filter(|c| c.tokens_all_valid).count(),
        };

        let average_scores = AverageScores {
            authenticity: checks.iter().map(|c| c.score).sum::<f64>() / denominator,
            distortion_level: verification_summary.distorted_documents as f64 / denominator,
        };

        let mut font_issues_summary = BTreeMap::new();
        for issue in checks.iter().flat_map(|c| &c.encoding_issues) {
            *font_issues_summary.entry(issue.key().to_owned()).or_insert(0) += 1;
        }

        let detailed_checks = checks
            .iter()
            .map(|check| DetailedCheck {
                document_id: check.document_id.clone(),
                authenticity_score: check.score,
                distortion_detected: check.distortion.distorted,
                quantum_verified: check.tokens_all_valid,
                font_conversion_issues: check
                    .encoding_issues
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
                timestamp: check.timestamp,
            })
            .collect();

        Self {
            verification_summary,
            average_scores,
            font_issues_summary,
            verification_timestamp: Utc::now(),
            detailed_checks,
        }
    }
}

/// Pretty-printed JSON report over `checks`.
pub fn build_report(checks: &[AuthenticityCheck], config: &ReportConfig) -> Result<String> {
    let report = VerificationReport::summarize(checks, config);
    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    use serde_json::Value;
    use urkunde_core::types::{
        ChainStatus, DistortionAnalysis, DistortionTrigger, EncodingIssue, ExtractionMethod,
    };

    use super::*;

    fn check(id: &str, score: f64, distorted: bool, issues: Vec<EncodingIssue>) -> AuthenticityCheck {
        AuthenticityCheck {
            document_id: id.to_owned(),
            source_path: PathBuf::from(format!("{id}.pdf")),
            source_lang: "ron".to_owned(),
            extraction_method: ExtractionMethod::Capability("text_layer".to_owned()),
            extraction_confidence: 1.0,
            original_text: "text".to_owned(),
            translated_text: "text".to_owned(),
            back_translated: None,
            chain: Vec::new(),
            chain_status: ChainStatus::Skipped,
            distortion: DistortionAnalysis {
                similarity_ratio: if distorted { 0.5 } else { 1.0 },
                lost_terms: BTreeSet::new(),
                length_delta_ratio: 0.0,
                distorted,
                triggers: if distorted {
                    BTreeSet::from([DistortionTrigger::Similarity])
                } else {
                    BTreeSet::new()
                },
            },
            tokens_all_valid: !distorted,
            encoding_issues: issues,
            score,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn summary_counts_and_averages() {
        let checks = vec![
            check("doc_a", 0.95, false, vec![]),
            check("doc_b", 0.75, false, vec![EncodingIssue::FormattingLoss]),
            check(
                "doc_c",
                0.35,
                true,
                vec![EncodingIssue::FormattingLoss, EncodingIssue::CyrillicCodepage],
            ),
        ];
        let report = VerificationReport::summarize(&checks, &ReportConfig::default());

        let summary = &report.verification_summary;
        assert_eq!(summary.total_documents, 3);
        assert_eq!(summary.authentic_documents, 2);
        assert_eq!(summary.high_authenticity, 1);
        assert_eq!(summary.distorted_documents, 1);
        assert_eq!(summary.quantum_verified, 2);

        assert!((report.average_scores.authenticity - 2.05 / 3.0).abs() < 1e-12);
        assert!((report.average_scores.distortion_level - 1.0 / 3.0).abs() < 1e-12);

        assert_eq!(report.font_issues_summary["formatting_loss_detected"], 2);
        assert_eq!(report.font_issues_summary["cyrillic_encoding_issue"], 1);
    }

    #[test]
    fn json_uses_stable_keys() {
        let checks = vec![check(
            "doc_a",
            0.9,
            false,
            vec![EncodingIssue::ConversionFailed("no monospace mapping".into())],
        )];
        let json = build_report(&checks, &ReportConfig::default()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        for key in [
            "verificationSummary",
            "averageScores",
            "fontIssuesSummary",
            "verificationTimestamp",
            "detailedChecks",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["verificationSummary"]["quantumVerified"], 1);
        assert_eq!(value["averageScores"]["distortionLevel"], 0.0);

        let row = &value["detailedChecks"][0];
        assert_eq!(row["documentId"], "doc_a");
        assert_eq!(row["authenticityScore"], 0.9);
        assert_eq!(row["distortionDetected"], false);
        assert_eq!(row["quantumVerified"], true);
        assert_eq!(
            row["fontConversionIssues"][0],
            "conversion_failed: no monospace mapping"
        );
        assert!(row["timestamp"].is_string());
    }

    #[test]
    fn empty_batch_reports_zeroes() {
        let report = VerificationReport::summarize(&[], &ReportConfig::default());
        assert_eq!(report.verification_summary.total_documents, 0);
        assert_eq!(report.average_scores.authenticity, 0.0);
        assert!(report.detailed_checks.is_empty());
        assert!(report.font_issues_summary.is_empty());
    }
}
