//! End-to-end document pipeline.
//!
//! Coordinates the per-document flow: normalize → parse → chunk →
//! classify. A [`Pipeline`] holds only immutable state (a shared
//! tokenizer and validated budgets), so one instance can serve many
//! documents concurrently from different threads.

use std::sync::Arc;

use anyhow::Result;

use crate::chunk::{chunk_contract, ChunkBudgets};
use crate::classify::classify_prefix;
use crate::config::ChunkingConfig;
use crate::models::Chunk;
use crate::normalize::normalize;
use crate::parser::parse_contract;
use crate::tokenizer::{BpeTokenizer, Tokenizer};

pub struct Pipeline {
    tokenizer: Arc<dyn Tokenizer>,
    budgets: ChunkBudgets,
    classifier_window_chars: usize,
}

impl Pipeline {
    /// Build a pipeline from a tokenizer and a chunking config.
    pub fn new(tokenizer: Arc<dyn Tokenizer>, config: &ChunkingConfig) -> Result<Self> {
        Ok(Self {
            tokenizer,
            budgets: ChunkBudgets::from_config(config)?,
            classifier_window_chars: config.classifier_window_chars,
        })
    }

    /// Pipeline with the `cl100k_base` tokenizer and default budgets.
    pub fn with_defaults() -> Result<Self> {
        Self::new(
            Arc::new(BpeTokenizer::cl100k()?),
            &ChunkingConfig::default(),
        )
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    pub fn budgets(&self) -> &ChunkBudgets {
        &self.budgets
    }

    /// Run one document through the full pipeline.
    ///
    /// Every returned chunk carries the document's contract type.
    pub fn process(&self, document_id: &str, raw_text: &str) -> Vec<Chunk> {
        let text = normalize(raw_text);
        let tree = parse_contract(&text);
        let mut chunks = chunk_contract(&tree, document_id, self.tokenizer(), &self.budgets);

        let contract_type = classify_prefix(&text, self.classifier_window_chars);
        for chunk in &mut chunks {
            chunk.contract_type = Some(contract_type.to_string());
        }

        tracing::debug!(
            document_id,
            raw_chars = raw_text.chars().count(),
            normalized_chars = text.chars().count(),
            sections = tree.len(),
            chunks = chunks.len(),
            contract_type,
            "processed document"
        );

        chunks
    }

    /// Process `(document_id, raw_text)` pairs in order and concatenate the chunks.
    pub fn process_batch<'a, I>(&self, documents: I) -> Vec<Chunk>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut all = Vec::new();
        let mut processed = 0usize;
        for (document_id, raw_text) in documents {
            all.extend(self.process(document_id, raw_text));
            processed += 1;
        }
        tracing::info!(documents = processed, chunks = all.len(), "batch complete");
        all
    }
}
