//! Text chunking.
//!
//! This module provides the [`Chunker`] trait and [`BoundaryChunker`], a
//! bounded splitter that prefers breaking at whitespace near the size limit
//! rather than mid-word.

use crate::document::TextUnit;
use crate::error::{RagError, Result};

/// A strategy for splitting raw text into bounded, ordered units.
///
/// Output is a fully materialized `Vec` rather than a stream: the ingestion
/// fan-out needs the full unit count upfront.
pub trait Chunker: Send + Sync {
    /// Split text into ordered units.
    ///
    /// Empty or whitespace-only input yields an empty `Vec`, never an error.
    fn split(&self, text: &str) -> Vec<TextUnit>;
}

/// Splits text into units of at most `max_unit_size` characters.
///
/// The splitter walks the text greedily, accumulating up to `max_unit_size`
/// characters per unit. When the limit falls mid-word, the break is moved
/// back to the nearest whitespace within a lookback window of
/// `min(max_unit_size / 2, 64)` characters; if no whitespace occurs there,
/// the unit is hard-broken at the limit.
///
/// `overlap` re-includes the trailing `overlap` characters of unit *n* at the
/// start of unit *n+1*, preserving context across boundaries. An overlap of
/// zero produces disjoint units.
///
/// Counting is by `char`, so multi-byte text never breaks inside a code point.
#[derive(Debug, Clone)]
pub struct BoundaryChunker {
    max_unit_size: usize,
    overlap: usize,
}

impl BoundaryChunker {
    /// Create a new `BoundaryChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ChunkingError`] if `max_unit_size` is zero or
    /// `overlap >= max_unit_size`.
    pub fn new(max_unit_size: usize, overlap: usize) -> Result<Self> {
        if max_unit_size == 0 {
            return Err(RagError::ChunkingError(
                "max_unit_size must be greater than zero".to_string(),
            ));
        }
        if overlap >= max_unit_size {
            return Err(RagError::ChunkingError(format!(
                "overlap ({overlap}) must be less than max_unit_size ({max_unit_size})"
            )));
        }
        Ok(Self { max_unit_size, overlap })
    }

    fn lookback(&self) -> usize {
        (self.max_unit_size / 2).min(64).max(1)
    }
}

impl Chunker for BoundaryChunker {
    fn split(&self, text: &str) -> Vec<TextUnit> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let mut units: Vec<TextUnit> = Vec::new();
        let mut start = 0usize;

        while start < len {
            // Units never begin inside a whitespace run.
            while start < len && chars[start].is_whitespace() {
                start += 1;
            }
            if start >= len {
                break;
            }

            let hard_end = (start + self.max_unit_size).min(len);
            let end = if hard_end == len {
                len
            } else {
                // Move the break back to the whitespace nearest the limit,
                // searching no further than the lookback window.
                let window_start = hard_end - self.lookback().min(hard_end - start - 1);
                (window_start..hard_end)
                    .rev()
                    .find(|&i| chars[i].is_whitespace())
                    .unwrap_or(hard_end)
            };

            let unit_text: String = chars[start..end].iter().collect();
            let trimmed = unit_text.trim();
            if !trimmed.is_empty() {
                units.push(TextUnit {
                    text: trimmed.to_string(),
                    sequence_index: units.len(),
                });
            }

            // Step back by the overlap, but always make forward progress.
            start = end.saturating_sub(self.overlap).max(start + 1);
        }

        units
    }
}
