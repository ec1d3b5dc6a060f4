//! # Contract Chunker
//!
//! Structural parsing and token-budgeted hierarchical chunking for legal
//! and contract documents.
//!
//! Raw extracted text goes in; an ordered list of [`models::Chunk`]s
//! comes out, each labeled with its section, clause numbers, granularity
//! level, and token count, ready for embedding and indexing. Structure
//! detection is heuristic (line-level regex rules), and documents with no
//! detectable structure fall back to fixed token windows.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────┐   ┌───────────┐   ┌──────────┐
//! │ normalize │──▶│  parser  │──▶│   chunk   │──▶│  Chunks  │
//! │           │   │ Sec→Cls  │   │ L1/L2/L3  │   │ +type    │
//! └───────────┘   └──────────┘   └───────────┘   └──────────┘
//!       │
//!       └──────▶ splitter (flat title/body blocks)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contract_chunker::pipeline::Pipeline;
//!
//! let pipeline = Pipeline::with_defaults().unwrap();
//! let chunks = pipeline.process("msa.pdf", "1. Services\n1.1 Scope of work...");
//! for chunk in &chunks {
//!     println!("{} {:?} {}", chunk.section, chunk.chunk_level, chunk.token_count);
//! }
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`normalize`] | Text cleanup before structure detection |
//! | [`parser`] | Section and clause detection |
//! | [`chunk`] | Level 1/2/3 chunk generation |
//! | [`splitter`] | Flat title/body clause splitter |
//! | [`tokenizer`] | Tokenizer trait, BPE vocabulary, token windows |
//! | [`classify`] | Keyword contract-type classifier |
//! | [`config`] | TOML chunk budgets |
//! | [`pipeline`] | End-to-end per-document flow |
//! | [`export`] | JSON Lines output |
//! | [`models`] | Core data types |

pub mod chunk;
pub mod classify;
pub mod config;
pub mod export;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod splitter;
pub mod tokenizer;
