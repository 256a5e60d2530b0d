//! Inline style resolution.
//!
//! Splits block text into styled [`Run`](crate::models::Run)s: emphasis,
//! inline code, links, size/color markers and the rest of the span family.

mod detect;
mod resolver;

pub use detect::HIGHLIGHT_COLOR;
pub use resolver::{MAX_INLINE_DEPTH, resolve_runs};
