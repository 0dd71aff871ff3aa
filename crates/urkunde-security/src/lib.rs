// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! urkunde-security — integrity tokens and authenticity markers.
//!
//! The [`TokenRegistry`] issues a token for every marker embedded in a text
//! and later resolves the truncated token a marker carries. The
//! [`MarkerEngine`] writes and checks those marker headers, and the
//! [`AuditTrail`] keeps an append-only record of each pipeline stage.
//!
//! Tokens are unsalted content hashes held in process memory. They detect
//! accidental or naive tampering, not a motivated forger.

pub mod audit;
pub mod integrity;
pub mod marker;
pub mod registry;

pub use audit::{AuditEntry, AuditStage, AuditTrail};
pub use integrity::{hash_bytes, hash_text};
pub use marker::MarkerEngine;
pub use registry::TokenRegistry;
