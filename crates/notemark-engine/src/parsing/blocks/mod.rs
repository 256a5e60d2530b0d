//! Block-level parsing: line classification, the mode state machine and the
//! table sub-parser.

pub(crate) mod classify;
pub(crate) mod scanner;
pub(crate) mod tables;

pub use scanner::{MAX_BLOCK_DEPTH, SpannedBlock};
pub(crate) use scanner::{parse_blocks, scan_source};
