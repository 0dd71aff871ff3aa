// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for token issuing, marker verification, and audit
// recording in the urkunde-security crate.

use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use urkunde_core::MarkerKind;
use urkunde_security::{AuditStage, AuditTrail, MarkerEngine, TokenRegistry};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark embedding a primary marker in a one-page (about 2 KiB) text.
fn bench_embed(c: &mut Criterion) {
    let engine = MarkerEngine::new(Arc::new(TokenRegistry::new()));
    let text = "Cerere de chemare în judecată conform articolul 22. ".repeat(40);

    c.bench_function("marker_embed (2 KiB)", |b| {
        b.iter(|| black_box(engine.embed(black_box(&text), MarkerKind::Primary)));
    });
}

/// Benchmark verification against registries of growing size.
///
/// Resolution is a linear prefix scan, so this tracks how lookups degrade
/// as a long batch accumulates tokens.
fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("marker_verify");
    for &size in &[100usize, 1_000, 10_000] {
        let engine = MarkerEngine::new(Arc::new(TokenRegistry::new()));
        for i in 0..size {
            engine.embed(&format!("filler {i}"), MarkerKind::Delegated);
        }
        let marked = engine.embed("target", MarkerKind::Primary);

        group.bench_function(format!("{size} tokens"), |b| {
            b.iter(|| black_box(engine.verify(black_box(&marked))));
        });
    }
    group.finish();
}

/// Benchmark recording an audit entry to an in-memory SQLite database.
fn bench_audit_record(c: &mut Criterion) {
    c.bench_function("audit_record (in-memory SQLite)", |b| {
        let trail = AuditTrail::open_in_memory().expect("open in-memory audit trail");

        b.iter(|| {
            trail
                .record(
                    black_box("doc_1a2b3c4d"),
                    AuditStage::Verify,
                    black_box(Some("1a2b3c4d")),
                    black_box(true),
                    black_box(Some("benchmark test entry")),
                )
                .expect("record failed");
        });
    });
}

criterion_group!(benches, bench_embed, bench_verify, bench_audit_record);
criterion_main!(benches);
