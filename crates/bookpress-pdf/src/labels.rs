//! Page label sequences
//!
//! Front matter is numbered i, ii, iii, …; the body restarts at 1 in
//! arabic numerals. The two styles never mix within one run.

use std::collections::BTreeMap;

/// Numbering style for one run of pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    /// i, ii, iii, iv, …
    RomanLower,
    /// 1, 2, 3, …
    Arabic,
}

impl NumberStyle {
    pub fn format(self, value: usize) -> String {
        match self {
            NumberStyle::RomanLower => roman_lower(value),
            NumberStyle::Arabic => value.to_string(),
        }
    }
}

/// Lowercase roman numeral for `value` (1-based; 0 yields an empty string).
pub fn roman_lower(value: usize) -> String {
    const TABLE: [(usize, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];

    let mut out = String::new();
    let mut rest = value;
    for (weight, glyph) in TABLE {
        while rest >= weight {
            out.push_str(glyph);
            rest -= weight;
        }
    }
    out
}

/// Build a label per page for a run of `count` pages starting at `start`.
///
/// `overrides` is keyed by index within the run; a `Some` value replaces
/// the computed label, `None` suppresses the stamp for that page. Pages
/// are always labeled in order; overrides never renumber their neighbors.
pub fn label_run(
    style: NumberStyle,
    start: usize,
    count: usize,
    overrides: &BTreeMap<usize, Option<String>>,
) -> Vec<Option<String>> {
    (0..count)
        .map(|i| match overrides.get(&i) {
            Some(replacement) => replacement.clone(),
            None => Some(style.format(start + i)),
        })
        .collect()
}
