use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::run::Run;

/// Horizontal alignment of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Per-column alignment of a table, derived from the separator row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellAlignment {
    Left,
    Center,
    Right,
    #[default]
    None,
}

/// Marker style of a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListStyle {
    Bullet,
    /// Ordered item with its source number (`3. text` keeps the 3).
    Numbered(u64),
    /// Checkbox item and whether it is checked.
    Checkbox(bool),
}

/// One structural unit of a parsed document.
///
/// The variant set is closed: consumers match exhaustively and the parser
/// never emits anything outside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Paragraph {
        runs: Vec<Run>,
        alignment: Alignment,
    },
    Heading {
        /// 1 through 6.
        level: u8,
        runs: Vec<Run>,
    },
    CodeBlock {
        code: String,
        /// Language tag after the opening fence; empty when absent.
        language: String,
    },
    Blockquote {
        runs: Vec<Run>,
    },
    ListItem {
        /// Nesting level: leading whitespace length / 2.
        indent: usize,
        style: ListStyle,
        runs: Vec<Run>,
    },
    HorizontalRule,
    Image {
        url: String,
        alt: String,
        width: Option<u32>,
        height: Option<u32>,
    },
    /// A collapsible section: `>>>## Title` ... `<<<`. The body is a complete
    /// document in its own right.
    ToggleHeading {
        level: u8,
        title: Vec<Run>,
        content: Vec<Block>,
    },
    /// Side-by-side columns, each a complete document.
    Columns {
        columns: Vec<Vec<Block>>,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        /// One entry per header column.
        alignments: Vec<CellAlignment>,
        header_rows: BTreeSet<usize>,
        header_columns: BTreeSet<usize>,
    },
}

/// The ordered block tree produced by one parse call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
