//! Hierarchical, token-budgeted chunker.
//!
//! Turns a parsed Section → Clause tree into [`Chunk`]s at up to three
//! granularities. Every chunk's `token_count` is the tokenizer's count of
//! that chunk's exact text, and its `hash` is the SHA-256 of the text for
//! embedding staleness detection.
//!
//! # Algorithm
//!
//! 1. **Fallback check.** A tree with at most one section and at most one
//!    clause overall is treated as flat: only level 3 is produced.
//! 2. **Level 1 (clauses).** Per section, clauses are merged in order into
//!    a buffer. When merging the next clause would push the buffer past
//!    `clause_merge_tokens` and the buffer already holds text, the buffer
//!    is flushed first. A single clause is never split, so one oversized
//!    clause becomes one oversized chunk.
//! 3. **Level 2 (sections).** A section of at most `section_summary_tokens`
//!    becomes one `SECTION_SUMMARY` chunk; larger sections are cut into
//!    overlapping `SECTION_PART` windows.
//! 4. **Level 3 (fallback).** All section texts joined by newlines, cut
//!    into overlapping windows labeled `Fallback`.
//!
//! Output order is section by section, level 1 before level 2.
//!
//! # Example
//!
//! ```rust
//! use contract_chunker::chunk::{chunk_contract, ChunkBudgets};
//! use contract_chunker::models::ChunkLevel;
//! use contract_chunker::parser::parse_contract;
//! use contract_chunker::tokenizer::ByteTokenizer;
//!
//! let tree = parse_contract("1. Scope\n(a) Deliver goods.\n\n2. Fees\n(a) Pay invoices.");
//! let chunks = chunk_contract(&tree, "doc-1", &ByteTokenizer, &ChunkBudgets::default());
//! assert!(chunks.iter().any(|c| c.chunk_level == ChunkLevel::Clause));
//! assert!(chunks.iter().any(|c| c.chunk_level == ChunkLevel::Section));
//! ```

use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::config::ChunkingConfig;
use crate::models::{
    Chunk, ChunkLevel, Section, FALLBACK_SECTION, SECTION_PART, SECTION_SUMMARY,
};
use crate::tokenizer::{window_text, Tokenizer, WindowSpec};

/// Validated token budgets for the three chunk levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBudgets {
    pub clause_merge_tokens: usize,
    pub section_summary_tokens: usize,
    pub section_window: WindowSpec,
    pub fallback_window: WindowSpec,
}

impl Default for ChunkBudgets {
    fn default() -> Self {
        Self {
            clause_merge_tokens: 350,
            section_summary_tokens: 1200,
            section_window: WindowSpec::SECTION,
            fallback_window: WindowSpec::FALLBACK,
        }
    }
}

impl ChunkBudgets {
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            clause_merge_tokens: config.clause_merge_tokens,
            section_summary_tokens: config.section_summary_tokens,
            section_window: config.section_window()?,
            fallback_window: config.fallback_window()?,
        })
    }
}

/// True when the tree has no usable structure and only level 3 applies.
pub fn is_structurally_flat(sections: &[Section]) -> bool {
    let clauses: usize = sections.iter().map(|s| s.clauses.len()).sum();
    sections.len() <= 1 && clauses <= 1
}

/// Chunk a parsed contract. Empty trees yield no chunks.
pub fn chunk_contract(
    sections: &[Section],
    document_id: &str,
    tokenizer: &dyn Tokenizer,
    budgets: &ChunkBudgets,
) -> Vec<Chunk> {
    let chunks = if is_structurally_flat(sections) {
        tracing::debug!(document_id, "no usable structure, using fallback windows");
        fallback_chunks(sections, document_id, tokenizer, budgets.fallback_window)
    } else {
        let mut chunks = Vec::new();
        for section in sections {
            chunks.extend(clause_chunks(
                section,
                document_id,
                tokenizer,
                budgets.clause_merge_tokens,
            ));
            chunks.extend(section_chunks(section, document_id, tokenizer, budgets));
        }
        chunks
    };

    tracing::debug!(
        document_id,
        total = chunks.len(),
        clause_level = chunks.iter().filter(|c| c.chunk_level == ChunkLevel::Clause).count(),
        section_level = chunks.iter().filter(|c| c.chunk_level == ChunkLevel::Section).count(),
        fallback_level = chunks.iter().filter(|c| c.chunk_level == ChunkLevel::Fallback).count(),
        "chunked document"
    );

    chunks
}

/// Level 1: merge adjacent clauses of one section up to `merge_limit` tokens.
pub fn clause_chunks(
    section: &Section,
    document_id: &str,
    tokenizer: &dyn Tokenizer,
    merge_limit: usize,
) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut numbers: Vec<&str> = Vec::new();

    for clause in &section.clauses {
        let merged = if buffer.is_empty() {
            clause.text.trim().to_string()
        } else {
            format!("{}\n{}", buffer, clause.text).trim().to_string()
        };

        if !buffer.is_empty() && tokenizer.count(&merged) > merge_limit {
            chunks.push(make_chunk(
                document_id,
                &section.title,
                join_numbers(&numbers),
                ChunkLevel::Clause,
                &buffer,
                tokenizer,
            ));
            buffer = clause.text.trim().to_string();
            numbers.clear();
        } else {
            buffer = merged;
        }
        numbers.extend(clause.number.as_deref());
    }

    if !buffer.is_empty() {
        chunks.push(make_chunk(
            document_id,
            &section.title,
            join_numbers(&numbers),
            ChunkLevel::Clause,
            &buffer,
            tokenizer,
        ));
    }

    chunks
}

/// Level 2: the whole section, or overlapping windows of it.
pub fn section_chunks(
    section: &Section,
    document_id: &str,
    tokenizer: &dyn Tokenizer,
    budgets: &ChunkBudgets,
) -> Vec<Chunk> {
    if tokenizer.count(&section.text) <= budgets.section_summary_tokens {
        return vec![make_chunk(
            document_id,
            &section.title,
            Some(SECTION_SUMMARY.to_string()),
            ChunkLevel::Section,
            &section.text,
            tokenizer,
        )];
    }

    window_text(&section.text, budgets.section_window, tokenizer)
        .map(|text| {
            make_chunk(
                document_id,
                &section.title,
                Some(SECTION_PART.to_string()),
                ChunkLevel::Section,
                &text,
                tokenizer,
            )
        })
        .collect()
}

/// Level 3: fixed windows over the concatenated section texts.
pub fn fallback_chunks(
    sections: &[Section],
    document_id: &str,
    tokenizer: &dyn Tokenizer,
    window: WindowSpec,
) -> Vec<Chunk> {
    let full_text = sections
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    window_text(&full_text, window, tokenizer)
        .map(|text| {
            make_chunk(
                document_id,
                FALLBACK_SECTION,
                None,
                ChunkLevel::Fallback,
                &text,
                tokenizer,
            )
        })
        .collect()
}

fn join_numbers(numbers: &[&str]) -> Option<String> {
    if numbers.is_empty() {
        None
    } else {
        Some(numbers.join(", "))
    }
}

/// Create a single [`Chunk`] with its token count and SHA-256 content hash.
fn make_chunk(
    document_id: &str,
    section: &str,
    clause_number: Option<String>,
    level: ChunkLevel,
    text: &str,
    tokenizer: &dyn Tokenizer,
) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Chunk {
        document_id: document_id.to_string(),
        section: section.to_string(),
        clause_number,
        chunk_level: level,
        text: text.to_string(),
        token_count: tokenizer.count(text),
        contract_type: None,
        hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Clause;
    use crate::tokenizer::ByteTokenizer;

    fn section(title: &str, text: &str, clauses: &[(Option<&str>, &str)]) -> Section {
        Section {
            title: title.to_string(),
            start: 0,
            end: text.chars().count(),
            text: text.to_string(),
            clauses: clauses
                .iter()
                .map(|(number, text)| Clause {
                    number: number.map(String::from),
                    text: text.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_level1_and_level2_for_structured_tree() {
        let tree = vec![section(
            "Section 1",
            &"This is section text. ".repeat(20),
            &[(Some("1.1"), "Clause one text."), (Some("1.2"), "Clause two text.")],
        )];
        let chunks = chunk_contract(&tree, "doc1", &ByteTokenizer, &ChunkBudgets::default());
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_level, ChunkLevel::Clause);
        assert_eq!(chunks[0].clause_number.as_deref(), Some("1.1, 1.2"));
        assert_eq!(chunks[0].text, "Clause one text.\nClause two text.");
        assert_eq!(chunks[1].chunk_level, ChunkLevel::Section);
        assert_eq!(chunks[1].clause_number.as_deref(), Some(SECTION_SUMMARY));
        assert!(chunks.iter().all(|c| c.document_id == "doc1"));
    }

    #[test]
    fn test_flushes_when_merged_clauses_exceed_limit() {
        let a = "A ".repeat(200);
        let b = "B ".repeat(200);
        let tree = vec![section("Sec", "x", &[(Some("1.1"), &a), (Some("1.2"), &b)])];
        let chunks = chunk_contract(&tree, "doc-flush", &ByteTokenizer, &ChunkBudgets::default());
        let level1: Vec<_> = chunks
            .iter()
            .filter(|c| c.chunk_level == ChunkLevel::Clause)
            .collect();
        assert_eq!(level1.len(), 2);
        assert_eq!(level1[0].clause_number.as_deref(), Some("1.1"));
        assert_eq!(level1[1].clause_number.as_deref(), Some("1.2"));
        assert_eq!(level1[1].text, b.trim());
    }

    #[test]
    fn test_buffer_restarted_after_flush_is_trimmed() {
        let a = "A ".repeat(200);
        let tree = vec![section(
            "Sec",
            "x",
            &[
                (Some("1.1"), a.as_str()),
                (Some("1.2"), "\n\nB restarts the buffer.\n\n"),
                (Some("1.3"), "C follows."),
            ],
        )];
        let chunks = chunk_contract(&tree, "doc-restart", &ByteTokenizer, &ChunkBudgets::default());
        let level1: Vec<_> = chunks
            .iter()
            .filter(|c| c.chunk_level == ChunkLevel::Clause)
            .collect();
        assert_eq!(level1.len(), 2);
        assert_eq!(level1[1].text, "B restarts the buffer.\nC follows.");
        assert_eq!(level1[1].clause_number.as_deref(), Some("1.2, 1.3"));
    }

    #[test]
    fn test_oversized_single_clause_emitted_whole() {
        let huge = "word ".repeat(200);
        let tree = vec![
            section("S1", "s1", &[(Some("(a)"), &huge)]),
            section("S2", "s2", &[]),
        ];
        let chunks = chunk_contract(&tree, "doc", &ByteTokenizer, &ChunkBudgets::default());
        let level1: Vec<_> = chunks
            .iter()
            .filter(|c| c.chunk_level == ChunkLevel::Clause)
            .collect();
        assert_eq!(level1.len(), 1);
        assert!(level1[0].token_count > 350);
        assert_eq!(level1[0].text, huge.trim());
    }

    #[test]
    fn test_unnumbered_clauses_have_no_clause_number() {
        let tree = vec![section("S1", "a\nb", &[(None, "a"), (None, "b")])];
        let chunks = chunk_contract(&tree, "doc", &ByteTokenizer, &ChunkBudgets::default());
        assert_eq!(chunks[0].chunk_level, ChunkLevel::Clause);
        assert_eq!(chunks[0].clause_number, None);
    }

    #[test]
    fn test_large_section_split_into_parts() {
        let text = "This is a long section. ".repeat(100);
        let tree = vec![section(
            "BigSection",
            &text,
            &[(Some("1.1"), "short clause"), (Some("1.2"), "short clause")],
        )];
        let chunks = chunk_contract(&tree, "doc-big", &ByteTokenizer, &ChunkBudgets::default());
        let parts: Vec<_> = chunks
            .iter()
            .filter(|c| c.clause_number.as_deref() == Some(SECTION_PART))
            .collect();
        assert_eq!(parts.len(), 3);
        for part in &parts {
            assert_eq!(part.chunk_level, ChunkLevel::Section);
            assert!(part.token_count <= 1000);
        }
    }

    #[test]
    fn test_sections_without_clauses_get_only_level2() {
        let tree = vec![section("S1", "x", &[]), section("S2", "y", &[])];
        let chunks = chunk_contract(&tree, "doc", &ByteTokenizer, &ChunkBudgets::default());
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.chunk_level == ChunkLevel::Section));
    }

    #[test]
    fn test_fallback_only_level3() {
        let text = "Hello world. ".repeat(100);
        let tree = vec![section("Preamble", &text, &[])];
        assert!(is_structurally_flat(&tree));
        let chunks = chunk_contract(&tree, "doc2", &ByteTokenizer, &ChunkBudgets::default());
        // 1300 bytes, windows of 512 advancing by 384.
        assert_eq!(chunks.len(), 4);
        for c in &chunks {
            assert_eq!(c.chunk_level, ChunkLevel::Fallback);
            assert_eq!(c.section, FALLBACK_SECTION);
            assert_eq!(c.clause_number, None);
            assert!(c.token_count <= 512);
        }
    }

    #[test]
    fn test_empty_tree_yields_nothing() {
        let chunks = chunk_contract(&[], "doc", &ByteTokenizer, &ChunkBudgets::default());
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_order_is_per_section_level1_then_level2() {
        let tree = vec![
            section("S1", "1.1 A", &[(Some("1.1"), "1.1 A")]),
            section("S2", "2.1 B", &[(Some("2.1"), "2.1 B")]),
        ];
        let chunks = chunk_contract(&tree, "doc", &ByteTokenizer, &ChunkBudgets::default());
        let order: Vec<_> = chunks
            .iter()
            .map(|c| (c.section.as_str(), c.chunk_level.as_u8()))
            .collect();
        assert_eq!(order, vec![("S1", 1), ("S1", 2), ("S2", 1), ("S2", 2)]);
    }

    #[test]
    fn test_hash_is_sha256_of_text() {
        let tree = vec![section("S", "abc", &[])];
        let chunks = chunk_contract(&tree, "doc", &ByteTokenizer, &ChunkBudgets::default());
        assert_eq!(
            chunks[0].hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_budgets_from_config() {
        let config = ChunkingConfig {
            clause_merge_tokens: 10,
            ..ChunkingConfig::default()
        };
        let budgets = ChunkBudgets::from_config(&config).unwrap();
        assert_eq!(budgets.clause_merge_tokens, 10);
        assert_eq!(budgets.fallback_window, WindowSpec::FALLBACK);

        let bad = ChunkingConfig {
            section_overlap_tokens: 1000,
            ..ChunkingConfig::default()
        };
        assert!(ChunkBudgets::from_config(&bad).is_err());
    }
}
