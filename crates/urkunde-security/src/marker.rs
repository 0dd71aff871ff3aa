// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Marker engine — embeds `<label>[<token prefix>]` headers and checks them.
//
// Header layout:
//   A©tor[1a2b3c4d]<original text, unmodified>
//   └─┬─┘ └──┬───┘
//   label   first 8 hex chars of the registry token
//
// A forged header swaps `©` for the Cyrillic lookalike `й`. Verification
// reports that as a distortion rather than a missing marker.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};
use urkunde_core::types::{
    MarkerKind, MarkerMatch, MarkerVerification, TOKEN_PREFIX_LEN, Token,
};

use crate::registry::TokenRegistry;

/// Embeds and verifies authenticity markers against a shared registry.
#[derive(Debug, Clone)]
pub struct MarkerEngine {
    registry: Arc<TokenRegistry>,
}

impl MarkerEngine {
    pub fn new(registry: Arc<TokenRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<TokenRegistry> {
        &self.registry
    }

    /// Prepend a marker header of `kind` to `text`.
    pub fn embed(&self, text: &str, kind: MarkerKind) -> String {
        self.embed_issued(text, kind).0
    }

    /// Like [`embed`](Self::embed), also returning the full token issued.
    pub fn embed_issued(&self, text: &str, kind: MarkerKind) -> (String, Token) {
        let token = self.registry.issue(text, kind);
        let marked = format!("{}[{}]{}", kind.label(), token.prefix(), text);
        (marked, token)
    }

    /// Check `text` for a marker header.
    ///
    /// A well-formed header at the very start of the text is checked first,
    /// canonical or forged; the body is never consulted when one is present.
    /// Otherwise kinds are scanned in order (primary, then delegated) anywhere
    /// in the text, a canonical label winning over its homoglyph; the first
    /// hit decides the result.
    #[instrument(skip_all, fields(len = text.len()))]
    pub fn verify(&self, text: &str) -> MarkerVerification {
        if let Some((kind, prefix)) = leading_header(text) {
            let token_valid = self.registry.resolve(prefix).is_some();
            debug!(?kind, token_valid, "leading marker header found");
            return canonical(kind, token_valid);
        }
        if let Some(kind) = leading_forged_header(text) {
            debug!(?kind, "leading homoglyph header found");
            return forged(kind);
        }

        for kind in MarkerKind::ALL {
            if let Some(pos) = text.find(kind.label()) {
                let after_label = &text[pos + kind.label().len()..];
                let token_valid = embedded_prefix(after_label)
                    .is_some_and(|prefix| self.registry.resolve(prefix).is_some());
                debug!(?kind, token_valid, "canonical marker found");
                return canonical(kind, token_valid);
            }
            if text.contains(kind.homoglyph_label()) {
                debug!(?kind, "homoglyph marker found");
                return forged(kind);
            }
        }

        debug!("no marker found");
        MarkerVerification {
            authentic: false,
            marker_found: None,
            token_valid: false,
            distortion_flag: false,
            checked_at: Utc::now(),
        }
    }

    /// Text after a leading canonical header, or `text` unchanged when it
    /// does not start with one.
    pub fn strip<'a>(&self, text: &'a str) -> &'a str {
        leading_header(text)
            .and_then(|(kind, _)| text.get(kind.label().len() + TOKEN_PREFIX_LEN + 2..))
            .unwrap_or(text)
    }

    /// Replace every canonical label with its homoglyph, as a forger would.
    pub fn forge(marked: &str) -> String {
        MarkerKind::ALL.iter().fold(marked.to_owned(), |acc, kind| {
            acc.replace(kind.label(), kind.homoglyph_label())
        })
    }
}

fn canonical(kind: MarkerKind, token_valid: bool) -> MarkerVerification {
    MarkerVerification {
        authentic: token_valid,
        marker_found: Some(MarkerMatch::Canonical(kind)),
        token_valid,
        distortion_flag: false,
        checked_at: Utc::now(),
    }
}

fn forged(kind: MarkerKind) -> MarkerVerification {
    MarkerVerification {
        authentic: false,
        marker_found: Some(MarkerMatch::Homoglyph(kind)),
        token_valid: false,
        distortion_flag: true,
        checked_at: Utc::now(),
    }
}

/// Kind and token prefix of a well-formed header starting `text`.
fn leading_header(text: &str) -> Option<(MarkerKind, &str)> {
    MarkerKind::ALL.into_iter().find_map(|kind| {
        let rest = text.strip_prefix(kind.label())?;
        embedded_prefix(rest).map(|prefix| (kind, prefix))
    })
}

/// Kind of a well-formed header starting `text` whose label is a homoglyph.
fn leading_forged_header(text: &str) -> Option<MarkerKind> {
    MarkerKind::ALL.into_iter().find(|kind| {
        text.strip_prefix(kind.homoglyph_label())
            .and_then(embedded_prefix)
            .is_some()
    })
}

/// Parse `[xxxxxxxx]` at the start of `s`, returning the 8 lowercase hex chars.
fn embedded_prefix(s: &str) -> Option<&str> {
    let body = s.strip_prefix('[')?;
    let prefix = body.get(..TOKEN_PREFIX_LEN)?;
    let is_hex = prefix
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    let closed = body.get(TOKEN_PREFIX_LEN..)?.starts_with(']');
    (is_hex && closed).then_some(prefix)
}
