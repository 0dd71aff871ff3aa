// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Authenticity score — one number in [0, 1] from the pipeline's findings.
//
//   score = 1
//         - (1 - extraction confidence) × 0.3
//         - (1 - similarity) × 0.4          when distorted
//         - 0.2                             when any marker failed to verify
//         - 0.1 × encoding issue count
//   clamped to [0, 1]

use urkunde_core::types::DistortionAnalysis;

const CONFIDENCE_WEIGHT: f64 = 0.3;
const DISTORTION_WEIGHT: f64 = 0.4;
const INVALID_TOKEN_PENALTY: f64 = 0.2;
const ENCODING_ISSUE_PENALTY: f64 = 0.1;

pub fn authenticity_score(
    extraction_confidence: f64,
    distortion: &DistortionAnalysis,
    tokens_all_valid: bool,
    encoding_issues: usize,
) -> f64 {
    let mut score = 1.0;
    score -= (1.0 - extraction_confidence.clamp(0.0, 1.0)) * CONFIDENCE_WEIGHT;
    if distortion.distorted {
        score -= distortion.distortion_score() * DISTORTION_WEIGHT;
    }
    if !tokens_all_valid {
        score -= INVALID_TOKEN_PENALTY;
    }
    score -= encoding_issues as f64 * ENCODING_ISSUE_PENALTY;
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use urkunde_core::types::DistortionTrigger;

    use super::*;

    fn analysis(similarity_ratio: f64, distorted: bool) -> DistortionAnalysis {
        DistortionAnalysis {
            similarity_ratio,
            lost_terms: BTreeSet::new(),
            length_delta_ratio: 0.0,
            distorted,
            triggers: if distorted {
                BTreeSet::from([DistortionTrigger::Similarity])
            } else {
                BTreeSet::new()
            },
        }
    }

    #[test]
    fn perfect_inputs_score_one() {
        assert_eq!(authenticity_score(1.0, &analysis(1.0, false), true, 0), 1.0);
    }

    #[test]
    fn each_penalty_applies() {
        let clean = analysis(1.0, false);
        assert!((authenticity_score(0.5, &clean, true, 0) - 0.85).abs() < 1e-12);
        assert!((authenticity_score(1.0, &analysis(0.5, true), true, 0) - 0.8).abs() < 1e-12);
        assert!((authenticity_score(1.0, &clean, false, 0) - 0.8).abs() < 1e-12);
        assert!((authenticity_score(1.0, &clean, true, 2) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn similarity_ignored_when_not_distorted() {
        assert_eq!(authenticity_score(1.0, &analysis(0.75, false), true, 0), 1.0);
    }

    #[test]
    fn score_is_clamped() {
        assert_eq!(authenticity_score(0.0, &analysis(0.0, true), false, 10), 0.0);
    }

    #[test]
    fn score_is_monotonic_in_every_input() {
        let base = authenticity_score(0.8, &analysis(0.6, true), true, 1);

        assert!(authenticity_score(0.9, &analysis(0.6, true), true, 1) >= base);
        assert!(authenticity_score(0.8, &analysis(0.7, true), true, 1) >= base);
        assert!(authenticity_score(0.8, &analysis(0.6, false), true, 1) >= base);
        assert!(authenticity_score(0.8, &analysis(0.6, true), false, 1) <= base);
        assert!(authenticity_score(0.8, &analysis(0.6, true), true, 2) <= base);

        let mut previous = f64::INFINITY;
        for issues in 0..15 {
            let score = authenticity_score(0.8, &analysis(0.6, true), true, issues);
            assert!(score <= previous);
            assert!((0.0..=1.0).contains(&score));
            previous = score;
        }
    }
}
