//! TOML configuration for chunk budgets.
//!
//! Every key is optional; a missing `[chunking]` table or missing key
//! falls back to the built-in budgets.
//!
//! ```toml
//! [chunking]
//! clause_merge_tokens = 350
//! section_summary_tokens = 1200
//! section_window_tokens = 1000
//! section_overlap_tokens = 150
//! fallback_window_tokens = 512
//! fallback_overlap_tokens = 128
//! classifier_window_chars = 5000
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::classify::CLASSIFIER_WINDOW_CHARS;
use crate::tokenizer::WindowSpec;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Merged clause buffer is flushed once adding a clause would exceed this.
    #[serde(default = "default_clause_merge_tokens")]
    pub clause_merge_tokens: usize,
    /// Sections at or under this size become a single level-2 chunk.
    #[serde(default = "default_section_summary_tokens")]
    pub section_summary_tokens: usize,
    #[serde(default = "default_section_window_tokens")]
    pub section_window_tokens: usize,
    #[serde(default = "default_section_overlap_tokens")]
    pub section_overlap_tokens: usize,
    #[serde(default = "default_fallback_window_tokens")]
    pub fallback_window_tokens: usize,
    #[serde(default = "default_fallback_overlap_tokens")]
    pub fallback_overlap_tokens: usize,
    /// Leading characters of the normalized text the classifier scores.
    #[serde(default = "default_classifier_window_chars")]
    pub classifier_window_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            clause_merge_tokens: default_clause_merge_tokens(),
            section_summary_tokens: default_section_summary_tokens(),
            section_window_tokens: default_section_window_tokens(),
            section_overlap_tokens: default_section_overlap_tokens(),
            fallback_window_tokens: default_fallback_window_tokens(),
            fallback_overlap_tokens: default_fallback_overlap_tokens(),
            classifier_window_chars: default_classifier_window_chars(),
        }
    }
}

fn default_clause_merge_tokens() -> usize {
    350
}
fn default_section_summary_tokens() -> usize {
    1200
}
fn default_section_window_tokens() -> usize {
    WindowSpec::SECTION.max_tokens()
}
fn default_section_overlap_tokens() -> usize {
    WindowSpec::SECTION.overlap()
}
fn default_fallback_window_tokens() -> usize {
    WindowSpec::FALLBACK.max_tokens()
}
fn default_fallback_overlap_tokens() -> usize {
    WindowSpec::FALLBACK.overlap()
}
fn default_classifier_window_chars() -> usize {
    CLASSIFIER_WINDOW_CHARS
}

impl ChunkingConfig {
    pub fn section_window(&self) -> Result<WindowSpec> {
        WindowSpec::new(self.section_window_tokens, self.section_overlap_tokens)
            .context("invalid chunking.section_window_tokens / section_overlap_tokens")
    }

    pub fn fallback_window(&self) -> Result<WindowSpec> {
        WindowSpec::new(self.fallback_window_tokens, self.fallback_overlap_tokens)
            .context("invalid chunking.fallback_window_tokens / fallback_overlap_tokens")
    }

    pub fn validate(&self) -> Result<()> {
        if self.clause_merge_tokens == 0 {
            anyhow::bail!("chunking.clause_merge_tokens must be > 0");
        }
        if self.section_summary_tokens == 0 {
            anyhow::bail!("chunking.section_summary_tokens must be > 0");
        }
        if self.classifier_window_chars == 0 {
            anyhow::bail!("chunking.classifier_window_chars must be > 0");
        }
        self.section_window()?;
        self.fallback_window()?;
        Ok(())
    }
}

/// Parse and validate configuration from a TOML string.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config")?;
    config.chunking.validate()?;
    Ok(config)
}

/// Read, parse, and validate a TOML configuration file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}
