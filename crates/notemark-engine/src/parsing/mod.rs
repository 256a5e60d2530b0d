//! Source text to document tree.
//!
//! [`parse`] is the whole pipeline: the block scanner partitions lines into
//! blocks (recursing into compound bodies), text payloads go through the
//! inline resolver, table regions through the table sub-parser. The function
//! is total over all inputs and pure; identical input gives identical output.

pub mod blocks;
pub mod inline;
pub(crate) mod lines;
pub mod span;

use crate::models::Document;

pub use blocks::{MAX_BLOCK_DEPTH, SpannedBlock};
pub use inline::{MAX_INLINE_DEPTH, resolve_runs};
pub use span::Span;

/// Parses one source string into a document.
pub fn parse(source: &str) -> Document {
    Document::new(blocks::parse_blocks(source, 0))
}

/// Parses one source string, keeping the source range of every top-level
/// block. Used by the editing layer.
pub fn parse_spanned(source: &str) -> Vec<SpannedBlock> {
    blocks::scan_source(source, 0)
}
