//! Canonicalization of raw extracted contract text.
//!
//! PDF and speech-to-text output is full of typographic noise that breaks
//! line-anchored header detection. [`normalize`] applies a fixed sequence
//! of literal and regex substitutions:
//!
//! 1. Expand ligature glyphs (`ﬁ` → `fi`, `æ` → `ae`, …).
//! 2. Turn non-breaking spaces into ordinary spaces.
//! 3. Blank out whole-line page markers (`Page 3 of 12`, `Page 3`).
//! 4. Replace bullet glyphs with `"- "`.
//! 5. Collapse runs of spaces/tabs to one space.
//! 6. Cap blank-line runs at one blank line.
//! 7. Trim the result.
//!
//! Page-marker removal is line-anchored, so it runs before any newline
//! cleanup. The function is total and idempotent.
//!
//! # Example
//!
//! ```rust
//! use contract_chunker::normalize::normalize;
//!
//! let text = normalize("Page 1 of 2\n\u{2022} First\n\n\n\nEnd.");
//! assert_eq!(text, "- First\n\nEnd.");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

const LIGATURES: &[(&str, &str)] = &[
    ("\u{FB01}", "fi"),
    ("\u{FB02}", "fl"),
    ("\u{FB00}", "ff"),
    ("\u{FB03}", "ffi"),
    ("\u{FB04}", "ffl"),
    ("\u{FB05}", "ft"),
    ("\u{FB06}", "st"),
    ("\u{A732}", "AA"),
    ("\u{00C6}", "AE"),
    ("\u{A733}", "aa"),
    ("\u{00E6}", "ae"),
    ("\u{0152}", "OE"),
    ("\u{0153}", "oe"),
];

/// Whole-line `Page N of M` / `Page N`. Only intra-line whitespace is
/// matched so the line empties without joining its neighbours.
static PAGE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[^\S\n]*page[^\S\n]+\d+(?:[^\S\n]+of[^\S\n]+\d+)?[^\S\n]*$").unwrap()
});

static BULLETS: Lazy<Regex> =
    Lazy::new(|| Regex::new("[\u{2022}\u{2023}\u{25E6}\u{2043}\u{2219}]").unwrap());

static HORIZONTAL_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Normalize raw extracted text. Empty input yields an empty string.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut text = raw.to_string();
    for &(glyph, expansion) in LIGATURES {
        if text.contains(glyph) {
            text = text.replace(glyph, expansion);
        }
    }

    let text = text.replace('\u{00A0}', " ");
    let text = PAGE_MARKER.replace_all(&text, "");
    let text = BULLETS.replace_all(&text, "- ");
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    let text = BLANK_RUNS.replace_all(&text, "\n\n");

    text.trim().to_string()
}
