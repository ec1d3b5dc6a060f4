//! Core data models for the contract chunking pipeline.
//!
//! The structural tree ([`Section`] → [`Clause`]) is built once per
//! document and discarded after chunking. [`Chunk`] is the only type that
//! leaves the pipeline; it carries flat, denormalized labels instead of
//! references back into the tree.

use serde::{Serialize, Serializer};

/// Title given to text that precedes the first detected header.
pub const PREAMBLE_TITLE: &str = "PREAMBLE/UNKNOWN";

/// `clause_number` of a level-2 chunk holding a whole section.
pub const SECTION_SUMMARY: &str = "SECTION_SUMMARY";

/// `clause_number` of a level-2 chunk holding one window of a long section.
pub const SECTION_PART: &str = "SECTION_PART";

/// `section` label of every level-3 chunk.
pub const FALLBACK_SECTION: &str = "Fallback";

/// A top-level structural unit of a contract.
///
/// `start`/`end` are a half-open interval of character offsets into the
/// normalized document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub clauses: Vec<Clause>,
}

/// A numbered or bulleted sub-unit of a [`Section`].
///
/// `number` is the detected marker (`"1.1"`, `"(a)"`, `"2)"`), or `None`
/// for a run of text not introduced by a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub number: Option<String>,
    pub text: String,
}

/// A labeled text block produced by the flat clause splitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClauseBlock {
    pub title: String,
    pub body: String,
}

/// Granularity of a [`Chunk`]. Serialized as its integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChunkLevel {
    /// Adjacent clauses merged up to the clause token budget.
    Clause = 1,
    /// A whole section, or one sliding window of a long section.
    Section = 2,
    /// Flat fixed-window chunk for documents without usable structure.
    Fallback = 3,
}

impl ChunkLevel {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl Serialize for ChunkLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

/// A token-counted text unit ready for embedding and indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub document_id: String,
    pub section: String,
    pub clause_number: Option<String>,
    pub chunk_level: ChunkLevel,
    pub text: String,
    pub token_count: usize,
    /// Contract category attached by the pipeline, if classified.
    pub contract_type: Option<String>,
    /// SHA-256 hex digest of `text`, for embedding staleness checks.
    pub hash: String,
}
