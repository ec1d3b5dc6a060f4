//! Single-pass flat clause splitter.
//!
//! A lighter alternative to [`crate::parser`] for call sites that only
//! need a list of labeled text blocks. Every detected heading becomes the
//! title of a new [`ClauseBlock`]; the lines that follow, up to the next
//! heading, become its body. Headings here are looser than the parser's
//! section headers (any mostly-uppercase line of 3–50 characters counts),
//! and the two rule sets are kept independent on purpose.
//!
//! When the text contains no heading at all, it is split on blank lines
//! into `Paragraph 1`, `Paragraph 2`, … blocks instead. In both modes a
//! block whose trimmed body is empty is dropped.
//!
//! ```rust
//! use contract_chunker::splitter::split_into_clauses;
//!
//! let blocks = split_into_clauses("No headers here.\n\nSecond paragraph.");
//! assert_eq!(blocks[1].title, "Paragraph 2");
//! assert_eq!(blocks[1].body, "Second paragraph.");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::ClauseBlock;

/// Title of text preceding the first heading.
pub const INTRODUCTION_TITLE: &str = "Preamble/Introduction";

struct HeadingRule {
    regex: Regex,
    needs_uppercase: bool,
}

impl HeadingRule {
    fn matches(&self, line: &str) -> bool {
        self.regex.is_match(line) && (!self.needs_uppercase || line.chars().any(char::is_uppercase))
    }
}

static HEADING_RULES: Lazy<Vec<HeadingRule>> = Lazy::new(|| {
    vec![
        // "1. Definitions", "2.1. Scope", "3.4.2 Title"
        HeadingRule {
            regex: Regex::new(r"^\d+(?:\.\d+)*\.?\s+[A-Z][A-Za-z].+").unwrap(),
            needs_uppercase: false,
        },
        // "ARTICLE 2", "DEFINITIONS"; the letter check rejects lines like "123"
        HeadingRule {
            regex: Regex::new(r"^[A-Z\d\s\W]{3,50}$").unwrap(),
            needs_uppercase: true,
        },
    ]
});

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// True when the trimmed `line` is a heading.
pub fn is_heading(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && HEADING_RULES.iter().any(|rule| rule.matches(trimmed))
}

/// Split `text` into titled blocks, or numbered paragraphs if no heading exists.
pub fn split_into_clauses(text: &str) -> Vec<ClauseBlock> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut blocks = Vec::new();
    let mut title = INTRODUCTION_TITLE.to_string();
    let mut lines: Vec<&str> = Vec::new();
    let mut headings_found = false;

    for line in text.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !lines.is_empty() {
                lines.push(line);
            }
            continue;
        }

        if is_heading(trimmed) {
            headings_found = true;
            push_block(&mut blocks, std::mem::replace(&mut title, trimmed.to_string()), &lines);
            lines.clear();
        } else {
            lines.push(line);
        }
    }
    push_block(&mut blocks, title, &lines);

    if !headings_found {
        return split_paragraphs(text);
    }

    tracing::debug!(blocks = blocks.len(), "split text on headings");
    blocks
}

fn push_block(blocks: &mut Vec<ClauseBlock>, title: String, lines: &[&str]) {
    let body = lines.join("\n");
    let body = body.trim();
    if !body.is_empty() {
        blocks.push(ClauseBlock {
            title,
            body: body.to_string(),
        });
    }
}

fn split_paragraphs(text: &str) -> Vec<ClauseBlock> {
    let blocks: Vec<ClauseBlock> = PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|para| !para.is_empty())
        .enumerate()
        .map(|(i, para)| ClauseBlock {
            title: format!("Paragraph {}", i + 1),
            body: para.to_string(),
        })
        .collect();

    tracing::debug!(blocks = blocks.len(), "no headings found, split on paragraphs");
    blocks
}
