//! Core engine for the notemark extended-markdown dialect.
//!
//! One call to [`parse`] turns a source string into a [`Document`] of block
//! nodes whose text payloads are fully resolved styled [`Run`]s. The parser
//! is total: any input string, including empty or malformed markup, parses
//! to a valid document. [`EditableDocument`] layers source-range tracking on
//! top for editors that replace one block's source at a time.

pub mod editing;
pub mod models;
pub mod parsing;

pub use editing::{CommitError, EditableDocument};
pub use models::{
    Alignment, Block, CellAlignment, Document, FontSlant, FontWeight, ListStyle, Run, RunStyle,
};
pub use parsing::{Span, SpannedBlock, parse, parse_spanned, resolve_runs};
