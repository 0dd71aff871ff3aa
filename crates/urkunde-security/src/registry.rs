// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Token registry — process-lifetime, insert-only store of issued markers.
//
// Marked text only carries the first 8 hex characters of a token, so lookups
// are prefix matches against full stored tokens. When several stored tokens
// share a prefix the earliest issued one wins. Entries are never evicted; a
// long-lived service needs an expiry policy on top of this.

use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use ring::rand::{SecureRandom, SystemRandom};
use tracing::{debug, warn};
use urkunde_core::types::{Marker, MarkerKind, Token};
use uuid::Uuid;

use crate::integrity::hash_text;

/// Insert-only registry mapping integrity tokens to the markers that
/// produced them.
///
/// Safe to share behind an `Arc` between concurrently verified documents.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    /// Markers in issue order. Order matters for prefix resolution.
    entries: RwLock<Vec<Marker>>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token for `text` and remember which kind of marker it
    /// belongs to.
    ///
    /// The token is SHA-256 over the text, the RFC 3339 issue time, and 16
    /// random bytes, so embedding the same text twice yields two tokens.
    pub fn issue(&self, text: &str, kind: MarkerKind) -> Token {
        let created_at = Utc::now();
        let nonce = hex::encode(nonce_bytes());
        let token = Token(hash_text(&[text, &created_at.to_rfc3339(), &nonce]));

        self.insert(Marker {
            kind,
            issued_token: token.clone(),
            created_at,
        });

        debug!(prefix = token.prefix(), ?kind, "token issued");
        token
    }

    /// Resolve an embedded token prefix to the first marker whose full token
    /// starts with it.
    pub fn resolve(&self, prefix: &str) -> Option<Marker> {
        if prefix.is_empty() {
            return None;
        }
        self.read()
            .iter()
            .find(|marker| marker.issued_token.as_str().starts_with(prefix))
            .cloned()
    }

    /// Number of stored tokens sharing `prefix`. More than one means
    /// [`resolve`](Self::resolve) had to pick the earliest.
    pub fn matches(&self, prefix: &str) -> usize {
        if prefix.is_empty() {
            return 0;
        }
        self.read()
            .iter()
            .filter(|marker| marker.issued_token.as_str().starts_with(prefix))
            .count()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn insert(&self, marker: Marker) {
        // A writer that panicked mid-push cannot leave a torn Vec behind, so a
        // poisoned lock is still usable.
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(marker);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Marker>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 16 bytes from the OS CSPRNG, or a v4 UUID when the CSPRNG is unavailable.
fn nonce_bytes() -> [u8; 16] {
    let mut nonce = [0u8; 16];
    match SystemRandom::new().fill(&mut nonce) {
        Ok(()) => nonce,
        Err(_) => {
            warn!("system RNG unavailable, using UUIDv4 nonce");
            *Uuid::new_v4().as_bytes()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn marker_with_token(token: &str, kind: MarkerKind) -> Marker {
        Marker {
            kind,
            issued_token: Token(token.to_owned()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issue_then_resolve_by_prefix() {
        let registry = TokenRegistry::new();
        let token = registry.issue("Cerere de chemare în judecată", MarkerKind::Primary);

        assert_eq!(token.as_str().len(), 64);
        let marker = registry.resolve(token.prefix()).expect("token resolves");
        assert_eq!(marker.issued_token, token);
        assert_eq!(marker.kind, MarkerKind::Primary);
    }

    #[test]
    fn same_text_yields_distinct_tokens() {
        let registry = TokenRegistry::new();
        let a = registry.issue("same", MarkerKind::Primary);
        let b = registry.issue("same", MarkerKind::Primary);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unknown_prefix_is_not_found() {
        let registry = TokenRegistry::new();
        registry.issue("text", MarkerKind::Delegated);
        // Tokens are lowercase hex, so an uppercase prefix never matches.
        assert!(registry.resolve("ZZZZZZZZ").is_none());
        assert!(registry.resolve("").is_none());
    }

    #[test]
    fn colliding_prefix_resolves_to_first_issued() {
        let registry = TokenRegistry::new();
        registry.insert(marker_with_token("deadbeef00", MarkerKind::Delegated));
        registry.insert(marker_with_token("deadbeef11", MarkerKind::Primary));

        assert_eq!(registry.matches("deadbeef"), 2);
        let winner = registry.resolve("deadbeef").unwrap();
        assert_eq!(winner.issued_token.as_str(), "deadbeef00");
        assert_eq!(winner.kind, MarkerKind::Delegated);
    }

    #[test]
    fn concurrent_issue_keeps_every_entry() {
        let registry = Arc::new(TokenRegistry::new());
        std::thread::scope(|scope| {
            for worker in 0..4 {
                let registry = Arc::clone(&registry);
                scope.spawn(move || {
                    for i in 0..25 {
                        registry.issue(&format!("doc {worker}/{i}"), MarkerKind::Delegated);
                    }
                });
            }
        });
        assert_eq!(registry.len(), 100);
    }
}
