//! Value types for the parsed document tree.
//!
//! `Document`, `Block` and `Run` are immutable values freshly produced per
//! parse call; no identity is carried across parses. Callers that need stable
//! identity (click-to-edit) re-derive it from source spans each pass.

pub mod block;
pub mod run;

pub use block::{Alignment, Block, CellAlignment, Document, ListStyle};
pub use run::{DEFAULT_FONT_SIZE, FontSlant, FontWeight, Run, RunStyle};
