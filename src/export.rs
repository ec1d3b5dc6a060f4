//! Export chunks as JSON Lines for downstream embedding and indexing.
//!
//! One JSON object per line, keyed by the flat chunk metadata. Absent
//! clause numbers and contract types are written as `null`.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::models::Chunk;

/// Write `chunks` to `writer`, one JSON object per line.
pub fn write_jsonl<W: Write>(chunks: &[Chunk], mut writer: W) -> Result<()> {
    for chunk in chunks {
        serde_json::to_writer(&mut writer, chunk).context("Failed to serialize chunk")?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `chunks` to a JSONL file, replacing any existing content.
pub fn write_jsonl_file(chunks: &[Chunk], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    write_jsonl(chunks, BufWriter::new(file))
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;

    tracing::info!(chunks = chunks.len(), path = %path.display(), "exported chunks");
    Ok(())
}
