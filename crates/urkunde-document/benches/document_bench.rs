// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the urkunde-document crate: the fallback byte scan
// and the codepage checks, both of which run over whole documents.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use urkunde_document::check_encoding;
use urkunde_document::extract::fallback::printable_runs;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark the printable-run scan over 1 MiB of synthetic PDF-like bytes:
/// short binary gaps between ASCII runs of varying length.
fn bench_printable_runs(c: &mut Criterion) {
    let mut bytes = Vec::with_capacity(1 << 20);
    let mut i = 0usize;
    while bytes.len() < (1 << 20) {
        bytes.extend_from_slice(&b"Dosar nr. 1234/2024 Tribunalul"[..5 + i % 25]);
        bytes.extend_from_slice(&[0x00, 0xFF, 0x0A]);
        i += 1;
    }

    c.bench_function("printable_runs (1 MiB)", |b| {
        b.iter(|| black_box(printable_runs(black_box(&bytes), 10)));
    });
}

/// Benchmark codepage checks on a mixed Romanian/Russian page.
fn bench_check_encoding(c: &mut Criterion) {
    let page = "Judecătoria Sectorului 1 a hotărât. Уголовный кодекс, статья 125. ".repeat(50);

    c.bench_function("check_encoding (mixed page)", |b| {
        b.iter(|| black_box(check_encoding(black_box(&page))));
    });
}

criterion_group!(benches, bench_printable_runs, bench_check_encoding);
criterion_main!(benches);
