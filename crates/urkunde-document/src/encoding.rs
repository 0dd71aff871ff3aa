// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Codepage and font conversion checks on extracted text.
//
// Court archives in the region still pass documents through Windows-1251
// (Cyrillic) and ISO-8859-2 (Latin-2) systems, and re-typeset them in
// monospace fonts. Characters those codepages cannot hold are lost on the
// way, so they are reported as issues against the document.

use std::collections::BTreeSet;

use tracing::debug;
use urkunde_core::types::EncodingIssue;

/// Romanian letters with diacritics, both the comma-below (ș ț) and the
/// breve/circumflex forms.
const ROMANIAN_DIACRITICS: &[char] = &['ă', 'â', 'î', 'ș', 'ț', 'Ă', 'Â', 'Î', 'Ș', 'Ț'];

/// Monospace replacements used when documents are re-typeset.
const FONT_MAP: &[(&str, &str)] = &[
    ("Times New Roman", "Consolas"),
    ("Arial", "Courier New"),
    ("Calibri", "Lucida Console"),
];

/// Result of converting a document's text to a monospace font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontConversion {
    pub source_font: String,
    pub target_font: Option<String>,
    pub text: String,
    /// Conversion failures followed by [`check_encoding`] results, sorted and
    /// without duplicates.
    pub issues: Vec<EncodingIssue>,
}

/// Monospace font that `source_font` is converted to.
pub fn monospace_font(source_font: &str) -> Option<&'static str> {
    FONT_MAP
        .iter()
        .find(|(source, _)| source.eq_ignore_ascii_case(source_font))
        .map(|(_, target)| *target)
}

/// Codepage and formatting problems in `text`.
///
/// - `CyrillicCodepage`: a character has no Windows-1251 encoding.
/// - `RomanianDiacritics`: Romanian diacritics are present and a character
///   has no ISO-8859-2 encoding.
/// - `FormattingLoss`: a tab or a double space, which monospace
///   re-typesetting collapses.
pub fn check_encoding(text: &str) -> Vec<EncodingIssue> {
    let mut issues = Vec::new();

    if !text.chars().all(in_windows_1251) {
        issues.push(EncodingIssue::CyrillicCodepage);
    }
    if text.contains(ROMANIAN_DIACRITICS) && !text.chars().all(in_iso_8859_2) {
        issues.push(EncodingIssue::RomanianDiacritics);
    }
    if text.contains('\t') || text.contains("  ") {
        issues.push(EncodingIssue::FormattingLoss);
    }

    issues
}

/// Convert `text` for display in `target_font`, or in the mapped monospace
/// font for `source_font` when no target is given.
///
/// Conversion problems become [`EncodingIssue::ConversionFailed`] entries
/// rather than errors.
pub fn convert_font_encoding(
    text: &str,
    source_font: &str,
    target_font: Option<&str>,
) -> FontConversion {
    let mut issues = BTreeSet::new();

    let target_font = target_font
        .map(str::to_owned)
        .or_else(|| monospace_font(source_font).map(str::to_owned));
    if target_font.is_none() {
        issues.insert(EncodingIssue::ConversionFailed(format!(
            "no monospace mapping for font {source_font:?}"
        )));
    }

    // U+FFFD only appears after a lossy decode upstream; the original bytes
    // are gone and cannot be re-encoded.
    let replaced = text.chars().filter(|c| *c == char::REPLACEMENT_CHARACTER).count();
    if replaced > 0 {
        issues.insert(EncodingIssue::ConversionFailed(format!(
            "{replaced} undecodable character(s) in source text"
        )));
    }

    issues.extend(check_encoding(text));
    debug!(issues = issues.len(), ?target_font, "font conversion checked");

    FontConversion {
        source_font: source_font.to_owned(),
        target_font,
        text: text.to_owned(),
        issues: issues.into_iter().collect(),
    }
}

/// `c` has a Windows-1251 encoding.
fn in_windows_1251(c: char) -> bool {
    if c.is_ascii() || ('\u{0410}'..='\u{044F}').contains(&c) {
        return true;
    }
    matches!(
        c,
        // 0x80..=0x8F
        '\u{0402}' | '\u{0403}' | '\u{201A}' | '\u{0453}' | '\u{201E}' | '\u{2026}'
            | '\u{2020}' | '\u{2021}' | '\u{20AC}' | '\u{2030}' | '\u{0409}' | '\u{2039}'
            | '\u{040A}' | '\u{040C}' | '\u{040B}' | '\u{040F}'
            // 0x90..=0x9F (0x98 unassigned)
            | '\u{0452}' | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' | '\u{2022}'
            | '\u{2013}' | '\u{2014}' | '\u{2122}' | '\u{0459}' | '\u{203A}' | '\u{045A}'
            | '\u{045C}' | '\u{045B}' | '\u{045F}'
            // 0xA0..=0xAF
            | '\u{00A0}' | '\u{040E}' | '\u{045E}' | '\u{0408}' | '\u{00A4}' | '\u{0490}'
            | '\u{00A6}' | '\u{00A7}' | '\u{0401}' | '\u{00A9}' | '\u{0404}' | '\u{00AB}'
            | '\u{00AC}' | '\u{00AD}' | '\u{00AE}' | '\u{0407}'
            // 0xB0..=0xBF
            | '\u{00B0}' | '\u{00B1}' | '\u{0406}' | '\u{0456}' | '\u{0491}' | '\u{00B5}'
            | '\u{00B6}' | '\u{00B7}' | '\u{0451}' | '\u{2116}' | '\u{0454}' | '\u{00BB}'
            | '\u{0458}' | '\u{0405}' | '\u{0455}' | '\u{0457}'
    )
}

/// `c` has an ISO-8859-2 encoding.
fn in_iso_8859_2(c: char) -> bool {
    if (c as u32) < 0xA0 {
        return true;
    }
    matches!(
        c,
        // 0xA0..=0xBF
        '\u{00A0}' | '\u{0104}' | '\u{02D8}' | '\u{0141}' | '\u{00A4}' | '\u{013D}'
            | '\u{015A}' | '\u{00A7}' | '\u{00A8}' | '\u{0160}' | '\u{015E}' | '\u{0164}'
            | '\u{0179}' | '\u{00AD}' | '\u{017D}' | '\u{017B}' | '\u{00B0}' | '\u{0105}'
            | '\u{02DB}' | '\u{0142}' | '\u{00B4}' | '\u{013E}' | '\u{015B}' | '\u{02C7}'
            | '\u{00B8}' | '\u{0161}' | '\u{015F}' | '\u{0165}' | '\u{017A}' | '\u{02DD}'
            | '\u{017E}' | '\u{017C}'
            // 0xC0..=0xDF
            | '\u{0154}' | '\u{00C1}' | '\u{00C2}' | '\u{0102}' | '\u{00C4}' | '\u{0139}'
            | '\u{0106}' | '\u{00C7}' | '\u{010C}' | '\u{00C9}' | '\u{0118}' | '\u{00CB}'
            | '\u{011A}' | '\u{00CD}' | '\u{00CE}' | '\u{010E}' | '\u{0110}' | '\u{0143}'
            | '\u{0147}' | '\u{00D3}' | '\u{00D4}' | '\u{0150}' | '\u{00D6}' | '\u{00D7}'
            | '\u{0158}' | '\u{016E}' | '\u{00DA}' | '\u{0170}' | '\u{00DC}' | '\u{00DD}'
            | '\u{0162}' | '\u{00DF}'
            // 0xE0..=0xFF
            | '\u{0155}' | '\u{00E1}' | '\u{00E2}' | '\u{0103}' | '\u{00E4}' | '\u{013A}'
            | '\u{0107}' | '\u{00E7}' | '\u{010D}' | '\u{00E9}' | '\u{0119}' | '\u{00EB}'
            | '\u{011B}' | '\u{00ED}' | '\u{00EE}' | '\u{010F}' | '\u{0111}' | '\u{0144}'
            | '\u{0148}' | '\u{00F3}' | '\u{00F4}' | '\u{0151}' | '\u{00F6}' | '\u{00F7}'
            | '\u{0159}' | '\u{016F}' | '\u{00FA}' | '\u{0171}' | '\u{00FC}' | '\u{00FD}'
            | '\u{0163}' | '\u{02D9}'
    )
}
