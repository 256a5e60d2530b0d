//! Click-to-edit support: parsed blocks tied back to their source ranges.

mod document;

pub use document::{CommitError, EditableDocument};
