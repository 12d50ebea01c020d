// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

// Monetary forms in recognized receipt text: "1.234,56", "1 234,56",
// "12,34", "12.34", with an optional euro sign on either side.
static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:€\s*)?(\d{1,3}(?:[.\s]\d{3})*[.,]\d{2}|\d+[.,]\d{2})(?:\s*€)?")
        .expect("amount pattern")
});

static BANNED_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(visa|mastercard|amex|karte|card|iban|bic|konto|ref|auth|betrag|summe|gesamt|mwst|ust|tax)")
        .expect("banned-line pattern")
});

/// One monetary candidate found in recognized text, with its character
/// offset so a caller can show it in context.
#[derive(Debug, Clone, Serialize)]
pub struct AmountCandidate {
    pub raw: String,
    pub value: Decimal,
    pub index: usize,
}

/// Extract candidate amounts from already-recognized text. The core never
/// sees image bytes; a recognizer that produced nothing simply yields zero
/// candidates here.
pub fn parse_amounts(text: &str) -> Vec<AmountCandidate> {
    let mut out: Vec<AmountCandidate> = Vec::new();
    for caps in AMOUNT_RE.captures_iter(text) {
        let m = match caps.get(1) {
            Some(m) => m,
            None => continue,
        };
        let Some(value) = normalize(m.as_str()) else {
            continue;
        };
        // The same figure often appears twice in a scan (line + total
        // block); keep only the first of near-identical hits.
        let dup = out.iter().any(|u| {
            u.value == value && m.start().abs_diff(u.index) < 5
        });
        if !dup {
            out.push(AmountCandidate {
                raw: m.as_str().to_string(),
                value,
                index: m.start(),
            });
        }
    }
    out
}

/// Suggest a label line: the first line that is not an amount, not
/// card/account boilerplate, and long enough to mean something.
pub fn suggest_label(text: &str) -> Option<String> {
    for line in text.lines() {
        let line = line.trim();
        if line.len() < 3 {
            continue;
        }
        if BANNED_LINE_RE.is_match(line) {
            continue;
        }
        if AMOUNT_RE.is_match(line) {
            continue;
        }
        return Some(line.chars().take(60).collect());
    }
    None
}

fn normalize(raw: &str) -> Option<Decimal> {
    let s: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let s = if s.contains(',') {
        // Dots are thousands separators, the comma is the decimal mark.
        s.replace('.', "").replace(',', ".")
    } else {
        // Dots only: the last one is the decimal mark.
        let (head, tail) = s.rsplit_once('.')?;
        format!("{}.{}", head.replace('.', ""), tail)
    };
    s.parse::<Decimal>().ok()
}
