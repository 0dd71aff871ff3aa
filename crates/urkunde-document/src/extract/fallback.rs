// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Degraded extractor used when no capability produced text.

/// Runs of at least `min_run` printable ASCII bytes (0x20..=0x7E) in `bytes`,
/// joined with single spaces.
///
/// Runs are kept as found, so a run that itself ends in spaces keeps them.
pub fn printable_runs(bytes: &[u8], min_run: usize) -> String {
    let min_run = min_run.max(1);
    bytes
        .split(|b| !(0x20..=0x7E).contains(b))
        .filter(|run| run.len() >= min_run)
        // Every byte in a run is ASCII, so this never substitutes anything.
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}
