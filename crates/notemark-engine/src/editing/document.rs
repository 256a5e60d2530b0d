use thiserror::Error;

use crate::models::Block;
use crate::parsing::{Span, parse_spanned};

/// Errors from committing an edit to an [`EditableDocument`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommitError {
    #[error("no block at index {0}")]
    InvalidBlock(usize),
}

/// A document that remembers where each top-level block came from.
///
/// Alongside the parsed blocks it keeps, per block, the byte range of the
/// source text the block was derived from, so an editor can swap a single
/// block's source for replacement text. Ranges are recomputed by a full
/// re-parse on every commit; they are never adjusted incrementally, which
/// keeps them trivially correct at the cost of O(document) work per edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditableDocument {
    source: String,
    blocks: Vec<Block>,
    spans: Vec<Span>,
    version: u64,
}

impl EditableDocument {
    /// Parses `source` into an editable document.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let (blocks, spans) = parse_pair(&source);
        Self {
            source,
            blocks,
            spans,
            version: 0,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The source range of the block at `index`, parallel to [`blocks`].
    ///
    /// [`blocks`]: Self::blocks
    pub fn span(&self, index: usize) -> Option<Span> {
        self.spans.get(index).copied()
    }

    /// Version counter, bumped on every successful commit. Lets callers
    /// detect staleness of anything derived from an earlier parse.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the index of the block whose source range contains `offset`.
    pub fn block_at(&self, offset: usize) -> Option<usize> {
        self.spans
            .iter()
            .position(|span| span.start <= offset && offset < span.end)
    }

    /// Replaces the source range of block `index` with `new_text`, then
    /// re-parses the whole document.
    ///
    /// Every block and span is re-derived; indices held before the commit
    /// are stale afterwards.
    pub fn commit(&mut self, index: usize, new_text: &str) -> Result<(), CommitError> {
        let span = self
            .spans
            .get(index)
            .copied()
            .ok_or(CommitError::InvalidBlock(index))?;
        self.source.replace_range(span.start..span.end, new_text);
        let (blocks, spans) = parse_pair(&self.source);
        self.blocks = blocks;
        self.spans = spans;
        self.version += 1;
        Ok(())
    }
}

fn parse_pair(source: &str) -> (Vec<Block>, Vec<Span>) {
    parse_spanned(source)
        .into_iter()
        .map(|spanned| (spanned.block, spanned.span))
        .unzip()
}
