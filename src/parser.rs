//! Two-level structural parser: Document → Sections → Clauses.
//!
//! Detection is purely line-based. Each line is tested against a small,
//! ordered table of rules; the first rule that matches decides the
//! boundary. A header or marker always wins over appending, even in the
//! middle of a paragraph. Blank lines never open or close anything; they
//! are appended to whatever buffer is currently open.
//!
//! # Section headers (tested on the trimmed line, in order)
//!
//! | Kind | Example |
//! |------|---------|
//! | [`HeaderKind::Keyword`] | `SECTION 4. Payment`, `ARTICLE 2: Term` |
//! | [`HeaderKind::Numbered`] | `1. Definitions` |
//! | [`HeaderKind::DottedNumeric`] | `1.1 Scope`, `2.3. Fees` |
//! | [`HeaderKind::Roman`] | `IV. Warranties` |
//! | [`HeaderKind::AllCaps`] | `TERM AND TERMINATION` |
//!
//! # Clause markers (tested per section)
//!
//! | Kind | Example | Label |
//! |------|---------|-------|
//! | [`MarkerKind::Dotted`] | `1.1 The Supplier shall…` | `1.1` |
//! | [`MarkerKind::Parenthesized`] | `(a) each party…`, `2) notices…` | `(a)`, `2)` |
//!
//! Sections are kept only when their text has non-whitespace content, so
//! an empty preamble disappears. Clause texts keep their marker line, so
//! joining a section's clause texts with `\n` gives back the section text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Clause, Section, PREAMBLE_TITLE};

/// Which header rule opened a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    Keyword,
    Numbered,
    DottedNumeric,
    Roman,
    AllCaps,
}

/// Which marker rule opened a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Dotted,
    Parenthesized,
}

struct HeaderRule {
    kind: HeaderKind,
    regex: Regex,
}

/// Clause rules capture the marker in the `label` group.
struct MarkerRule {
    kind: MarkerKind,
    regex: Regex,
}

static HEADER_RULES: Lazy<Vec<HeaderRule>> = Lazy::new(|| {
    [
        (
            HeaderKind::Keyword,
            r"^(?:SECTION|ARTICLE)\s+\d+[.:]?\s+[A-Z][A-Za-z].*$",
        ),
        (HeaderKind::Numbered, r"^\d+\.\s+[A-Z].*$"),
        (HeaderKind::DottedNumeric, r"^\d+(?:\.\d+)+\.?\s+[A-Z].*$"),
        (HeaderKind::Roman, r"^[IVX]+\.\s+[A-Z].*$"),
        (HeaderKind::AllCaps, r"^[A-Z][A-Z ]{4,}$"),
    ]
    .into_iter()
    .map(|(kind, pattern)| HeaderRule {
        kind,
        regex: Regex::new(pattern).unwrap(),
    })
    .collect()
});

static MARKER_RULES: Lazy<Vec<MarkerRule>> = Lazy::new(|| {
    [
        (MarkerKind::Dotted, r"^\s*(?P<label>\d+(?:\.\d+)*)\s+[A-Z]"),
        (MarkerKind::Parenthesized, r"^\s*(?P<label>\(?[a-z0-9]+\))\s"),
    ]
    .into_iter()
    .map(|(kind, pattern)| MarkerRule {
        kind,
        regex: Regex::new(pattern).unwrap(),
    })
    .collect()
});

/// Return the first header rule matching `line`, if any.
pub fn detect_section_header(line: &str) -> Option<HeaderKind> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    HEADER_RULES
        .iter()
        .find(|rule| rule.regex.is_match(trimmed))
        .map(|rule| rule.kind)
}

/// Return the first clause marker on `line` with its label, if any.
pub fn detect_clause_marker(line: &str) -> Option<(MarkerKind, String)> {
    if line.trim().is_empty() {
        return None;
    }
    MARKER_RULES.iter().find_map(|rule| {
        rule.regex
            .captures(line)
            .map(|caps| (rule.kind, caps["label"].trim().to_string()))
    })
}

/// Section being accumulated during the forward scan.
struct OpenSection<'a> {
    title: String,
    start: usize,
    lines: Vec<&'a str>,
}

impl<'a> OpenSection<'a> {
    fn new(title: String, start: usize) -> Self {
        Self {
            title,
            start,
            lines: Vec::new(),
        }
    }

    fn close(self, end: usize) -> Option<Section> {
        let text = self.lines.join("\n");
        if text.trim().is_empty() {
            return None;
        }
        Some(Section {
            title: self.title,
            start: self.start,
            end,
            text,
            clauses: Vec::new(),
        })
    }
}

/// Split normalized text into sections. Clause lists are left empty.
///
/// Offsets count characters: every consumed line advances the cursor by
/// its length plus one for the newline. The last section ends at the
/// text length.
pub fn extract_sections(text: &str) -> Vec<Section> {
    let total = text.chars().count();
    let mut sections = Vec::new();
    let mut current = OpenSection::new(PREAMBLE_TITLE.to_string(), 0);
    let mut offset = 0usize;

    for line in text.split('\n') {
        if detect_section_header(line).is_some() {
            let next = OpenSection::new(line.trim().to_string(), offset);
            sections.extend(std::mem::replace(&mut current, next).close(offset));
        }
        current.lines.push(line);
        offset += line.chars().count() + 1;
    }
    sections.extend(current.close(offset.min(total)));

    sections
}

/// Split one section's text into clauses.
///
/// When no marker is found the whole text becomes a single unlabeled
/// clause. A whitespace-only run before the first marker is dropped.
pub fn extract_clauses(text: &str) -> Vec<Clause> {
    let mut clauses = Vec::new();
    let mut number: Option<String> = None;
    let mut lines: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if let Some((_, label)) = detect_clause_marker(line) {
            push_clause(&mut clauses, number.take(), &lines);
            lines.clear();
            number = Some(label);
        }
        lines.push(line);
    }
    push_clause(&mut clauses, number, &lines);

    if clauses.is_empty() && !text.trim().is_empty() {
        clauses.push(Clause {
            number: None,
            text: text.to_string(),
        });
    }

    clauses
}

fn push_clause(clauses: &mut Vec<Clause>, number: Option<String>, lines: &[&str]) {
    if lines.is_empty() {
        return;
    }
    let text = lines.join("\n");
    if !text.trim().is_empty() {
        clauses.push(Clause { number, text });
    }
}

/// Parse normalized text into the full Section → Clause tree.
pub fn parse_contract(text: &str) -> Vec<Section> {
    let mut sections = extract_sections(text);
    for section in &mut sections {
        section.clauses = extract_clauses(&section.text);
    }

    tracing::debug!(
        sections = sections.len(),
        clauses = sections.iter().map(|s| s.clauses.len()).sum::<usize>(),
        "parsed contract structure"
    );

    sections
}
