//! Token counting and sliding token windows.
//!
//! Chunk budgets are expressed in tokens of a deterministic subword
//! vocabulary. The [`Tokenizer`] trait is the seam: the pipeline only
//! needs `encode`, `decode`, and `count`, and every implementation must
//! be safe to share between worker threads.
//!
//! [`BpeTokenizer`] uses the `cl100k_base` byte-pair vocabulary.
//! [`ByteTokenizer`] treats every UTF-8 byte as one token, which keeps
//! budgets trivially predictable.
//!
//! # Windows
//!
//! [`TokenWindows`] walks a token sequence in windows of at most
//! `max_tokens`, each starting `max_tokens - overlap` after the previous
//! one, stopping at the window that reaches the end. The last window may
//! be shorter. [`WindowSpec::new`] rejects `overlap >= max_tokens`, which
//! would never advance.
//!
//! A token can hold part of a multi-byte character, so a raw boundary may
//! split one. Each window end is pulled back to the nearest boundary that
//! decodes, and the next window starts at or before that end. Consecutive
//! windows therefore always touch or overlap, and joining them never
//! drops a character, whatever the overlap.
//!
//! ```rust
//! use contract_chunker::tokenizer::{ByteTokenizer, Tokenizer, WindowSpec};
//!
//! let tokens = ByteTokenizer.encode("abcdefghij");
//! let spec = WindowSpec::new(4, 1).unwrap();
//! let ranges: Vec<_> = spec.windows(tokens, &ByteTokenizer).map(|(r, _)| r).collect();
//! assert_eq!(ranges, vec![0..4, 3..7, 6..10]);
//! ```

use std::ops::Range;

use anyhow::{bail, Context, Result};
use tiktoken_rs::CoreBPE;

/// Identifier of one token in a vocabulary.
pub type TokenId = u32;

/// Deterministic subword tokenizer used for chunk budgets.
pub trait Tokenizer: Send + Sync {
    /// Encode `text` into token ids.
    fn encode(&self, text: &str) -> Vec<TokenId>;

    /// Decode a token slice back to text, or `None` if the slice starts or
    /// ends inside a multi-byte character.
    fn decode(&self, tokens: &[TokenId]) -> Option<String>;

    /// Number of tokens in `text`.
    fn count(&self, text: &str) -> usize {
        self.encode(text).len()
    }
}

/// Byte-pair tokenizer over the `cl100k_base` vocabulary.
pub struct BpeTokenizer {
    bpe: CoreBPE,
}

impl BpeTokenizer {
    /// Build the `cl100k_base` tokenizer. The vocabulary ships with the crate.
    pub fn cl100k() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base().context("Failed to load cl100k_base vocabulary")?;
        Ok(Self { bpe })
    }
}

impl std::fmt::Debug for BpeTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BpeTokenizer").finish_non_exhaustive()
    }
}

impl Tokenizer for BpeTokenizer {
    fn encode(&self, text: &str) -> Vec<TokenId> {
        self.bpe.encode_ordinary(text)
    }

    fn decode(&self, tokens: &[TokenId]) -> Option<String> {
        self.bpe.decode(tokens.to_vec()).ok()
    }
}

/// One token per UTF-8 byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteTokenizer;

impl Tokenizer for ByteTokenizer {
    fn encode(&self, text: &str) -> Vec<TokenId> {
        text.bytes().map(TokenId::from).collect()
    }

    fn decode(&self, tokens: &[TokenId]) -> Option<String> {
        let bytes = tokens
            .iter()
            .map(|&t| u8::try_from(t).ok())
            .collect::<Option<Vec<u8>>>()?;
        String::from_utf8(bytes).ok()
    }

    fn count(&self, text: &str) -> usize {
        text.len()
    }
}

/// Validated sliding-window parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    max_tokens: usize,
    overlap: usize,
}

impl WindowSpec {
    /// Window for long sections (level 2).
    pub const SECTION: WindowSpec = WindowSpec {
        max_tokens: 1000,
        overlap: 150,
    };

    /// Window for structureless documents (level 3).
    pub const FALLBACK: WindowSpec = WindowSpec {
        max_tokens: 512,
        overlap: 128,
    };

    /// Create a window spec. Requires `max_tokens > 0` and `overlap < max_tokens`.
    pub fn new(max_tokens: usize, overlap: usize) -> Result<Self> {
        if max_tokens == 0 {
            bail!("window max_tokens must be > 0");
        }
        if overlap >= max_tokens {
            bail!(
                "window overlap ({}) must be smaller than max_tokens ({})",
                overlap,
                max_tokens
            );
        }
        Ok(Self {
            max_tokens,
            overlap,
        })
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Windows over `tokens`, decoded with `tokenizer`.
    pub fn windows(self, tokens: Vec<TokenId>, tokenizer: &dyn Tokenizer) -> TokenWindows<'_> {
        TokenWindows {
            tokens,
            tokenizer,
            spec: self,
            next_start: Some(0),
        }
    }
}

/// Lazy, restartable (via `Clone`) sequence of decoded token windows.
///
/// Yields each window's token range with its text. A window holds at most
/// `max_tokens` tokens unless a single character needs more, in which case
/// it widens just enough to hold that character.
#[derive(Clone)]
pub struct TokenWindows<'a> {
    tokens: Vec<TokenId>,
    tokenizer: &'a dyn Tokenizer,
    spec: WindowSpec,
    next_start: Option<usize>,
}

impl TokenWindows<'_> {
    fn decode(&self, range: Range<usize>) -> Option<String> {
        self.tokenizer.decode(&self.tokens[range])
    }
}

impl Iterator for TokenWindows<'_> {
    type Item = (Range<usize>, String);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start.take()?;
        let len = self.tokens.len();
        if start >= len {
            return None;
        }

        // Pull the end back to a character boundary; widen only when none fits.
        let limit = (start + self.spec.max_tokens).min(len);
        let Some((end, text)) = (start + 1..=limit)
            .rev()
            .chain(limit + 1..=len)
            .find_map(|end| self.decode(start..end).map(|text| (end, text)))
        else {
            tracing::warn!(start, len, "token window does not decode, stopping");
            return None;
        };
        if end > limit {
            tracing::warn!(start, end, "widened token window to hold a whole character");
        }

        if end < len {
            // Step back into the previous window until the start decodes.
            // `end` itself always does, so no token is skipped.
            let target = end.saturating_sub(self.spec.overlap).max(start + 1);
            self.next_start = (start + 1..=target)
                .rev()
                .chain(target + 1..=end)
                .find(|&next| self.decode(next..end).is_some());
        }
        Some((start..end, text))
    }
}

/// Tokenize `text` once and decode each window lazily.
pub fn window_text<'a>(
    text: &str,
    spec: WindowSpec,
    tokenizer: &'a dyn Tokenizer,
) -> impl Iterator<Item = String> + 'a {
    spec.windows(tokenizer.encode(text), tokenizer)
        .map(|(_, text)| text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(spec: WindowSpec, text: &str) -> Vec<Range<usize>> {
        spec.windows(ByteTokenizer.encode(text), &ByteTokenizer)
            .map(|(range, _)| range)
            .collect()
    }

    #[test]
    fn test_windows_cover_sequence_with_overlap() {
        let spec = WindowSpec::new(10, 3).unwrap();
        let text = "abcdefghijklmnopqrstuvwxy";
        assert_eq!(ranges(spec, text), vec![0..10, 7..17, 14..24, 21..25]);
    }

    #[test]
    fn test_windows_exact_fit_and_short_input() {
        let spec = WindowSpec::new(10, 3).unwrap();
        assert_eq!(ranges(spec, "abcdefghij"), vec![0..10]);
        assert_eq!(ranges(spec, "abcd"), vec![0..4]);
        assert!(ranges(spec, "").is_empty());
    }

    #[test]
    fn test_windows_restartable_by_clone() {
        let tokens = ByteTokenizer.encode("abcdefghijkl");
        let windows = WindowSpec::new(5, 2).unwrap().windows(tokens, &ByteTokenizer);
        let first: Vec<_> = windows.clone().collect();
        let second: Vec<_> = windows.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_window_spec_rejects_non_advancing_overlap() {
        assert!(WindowSpec::new(0, 0).is_err());
        assert!(WindowSpec::new(10, 10).is_err());
        assert!(WindowSpec::new(10, 11).is_err());
        assert!(WindowSpec::new(10, 9).is_ok());
    }

    #[test]
    fn test_builtin_specs() {
        assert_eq!(WindowSpec::SECTION.max_tokens(), 1000);
        assert_eq!(WindowSpec::SECTION.overlap(), 150);
        assert_eq!(WindowSpec::FALLBACK.max_tokens(), 512);
        assert_eq!(WindowSpec::FALLBACK.overlap(), 128);
    }

    #[test]
    fn test_byte_tokenizer_round_trip() {
        let tok = ByteTokenizer;
        let text = "Clause 1: payment.";
        assert_eq!(tok.count(text), text.len());
        assert_eq!(tok.decode(&tok.encode(text)).as_deref(), Some(text));
    }

    #[test]
    fn test_decode_rejects_split_characters() {
        let tok = ByteTokenizer;
        // "é" is two bytes; cut through it on either edge.
        let tokens = tok.encode("aé b");
        assert_eq!(tok.decode(&tokens[2..]), None);
        assert_eq!(tok.decode(&tokens[..2]), None);
        assert_eq!(tok.decode(&tokens[3..]).as_deref(), Some(" b"));
    }

    #[test]
    fn test_window_text_keeps_split_characters_without_overlap() {
        let text = "abcé fgh";
        let spec = WindowSpec::new(4, 0).unwrap();
        let windows: Vec<String> = window_text(text, spec, &ByteTokenizer).collect();
        assert_eq!(windows, vec!["abc", "é f", "gh"]);
        assert_eq!(windows.concat(), text);
        assert!(windows.iter().all(|w| w.len() <= 4));
    }

    #[test]
    fn test_window_starts_step_back_to_character_boundary() {
        // The overlap start (byte 4) lands inside "é" (bytes 3..5).
        let spec = WindowSpec::new(5, 1).unwrap();
        assert_eq!(ranges(spec, "abcéfgh"), vec![0..5, 3..8]);
        let windows: Vec<String> = window_text("abcéfgh", spec, &ByteTokenizer).collect();
        assert_eq!(windows, vec!["abcé", "éfgh"]);
    }

    #[test]
    fn test_window_widens_for_character_longer_than_window() {
        let spec = WindowSpec::new(1, 0).unwrap();
        let windows: Vec<String> = window_text("aé", spec, &ByteTokenizer).collect();
        assert_eq!(windows, vec!["a", "é"]);
    }

    #[test]
    fn test_window_text_bounds() {
        let tok = ByteTokenizer;
        let text = "abcdefghijklmnopqrstuvwxyz";
        let spec = WindowSpec::new(10, 4).unwrap();
        let windows: Vec<String> = window_text(text, spec, &tok).collect();
        assert_eq!(windows, vec!["abcdefghij", "ghijklmnop", "mnopqrstuv", "stuvwxyz"]);
        assert!(window_text("", spec, &tok).next().is_none());
    }

    #[test]
    fn test_bpe_windows_join_without_overlap() {
        let tok = BpeTokenizer::cl100k().unwrap();
        let text = "Für Schäden haftet der Lieferant 責任 😀 nicht. ".repeat(20);
        let spec = WindowSpec::new(7, 0).unwrap();
        let windows: Vec<String> = window_text(&text, spec, &tok).collect();
        assert!(windows.len() > 1);
        assert_eq!(windows.concat(), text);
    }

    #[test]
    fn test_bpe_tokenizer_is_deterministic() {
        let tok = BpeTokenizer::cl100k().unwrap();
        let text = "The Supplier shall deliver the Goods within thirty (30) days.";
        let tokens = tok.encode(text);
        assert!(!tokens.is_empty());
        assert_eq!(tokens, tok.encode(text));
        assert_eq!(tok.count(text), tokens.len());
        assert_eq!(tok.decode(&tokens).as_deref(), Some(text));
    }
}
