//! Table region sub-parser.
//!
//! Turns the raw row lines accumulated for one table region into a
//! [`Block::Table`], or nothing when the region has no header/separator pair.

use std::collections::BTreeSet;

use crate::models::{Block, CellAlignment};

use super::classify;

/// Parses one table region.
///
/// `header_rows`/`header_columns` carry indices collected from `{header}`
/// markers; both default to `{0}` when no marker supplied any. Returns `None`
/// when no separator row exists at index >= 1, in which case the caller
/// drops the region.
pub(crate) fn parse_table(
    rows: &[String],
    mut header_rows: BTreeSet<usize>,
    mut header_columns: BTreeSet<usize>,
) -> Option<Block> {
    let divider = rows
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, row)| classify::is_table_separator(row))?
        .0;

    let headers = split_row(&rows[0]);
    let mut alignments: Vec<CellAlignment> = split_row(&rows[divider])
        .iter()
        .map(|cell| cell_alignment(cell))
        .collect();
    alignments.resize(headers.len(), CellAlignment::None);

    let data: Vec<Vec<String>> = rows[divider + 1..].iter().map(|row| split_row(row)).collect();

    if header_rows.is_empty() {
        header_rows.insert(0);
    }
    if header_columns.is_empty() {
        header_columns.insert(0);
    }

    Some(Block::Table {
        headers,
        rows: data,
        alignments,
        header_rows,
        header_columns,
    })
}

/// Splits one row into trimmed cells.
///
/// Drops a single leading and trailing `|` if present, then splits on `|`
/// keeping empty fields.
fn split_row(row: &str) -> Vec<String> {
    let trimmed = row.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);
    trimmed.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// Alignment from a separator cell's colons: `:--:` center, `:--` left,
/// `--:` right, `--` none.
fn cell_alignment(cell: &str) -> CellAlignment {
    let cell = cell.trim();
    let leading = cell.starts_with(':');
    let trailing = cell.ends_with(':') && cell.len() > 1;
    match (leading, trailing) {
        (true, true) => CellAlignment::Center,
        (true, false) => CellAlignment::Left,
        (false, true) => CellAlignment::Right,
        (false, false) => CellAlignment::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rows(rows: &[&str]) -> Vec<String> {
        rows.iter().map(|r| r.to_string()).collect()
    }

    fn parse(raw: &[&str]) -> Option<Block> {
        parse_table(&rows(raw), BTreeSet::new(), BTreeSet::new())
    }

    #[test]
    fn basic_table() {
        let block = parse(&["a|b", "---|---", "1|2"]).unwrap();
        let Block::Table {
            headers,
            rows,
            alignments,
            header_rows,
            header_columns,
        } = block
        else {
            panic!("expected table");
        };
        assert_eq!(headers, vec!["a", "b"]);
        assert_eq!(rows, vec![vec!["1", "2"]]);
        assert_eq!(alignments, vec![CellAlignment::None, CellAlignment::None]);
        assert_eq!(header_rows.into_iter().collect::<Vec<_>>(), vec![0]);
        assert_eq!(header_columns.into_iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn piped_and_padded_rows() {
        let block = parse(&["| a | b |", "| :--- | ---: |", "| 1 | 2 |", "only one"]).unwrap();
        let Block::Table {
            headers,
            rows,
            alignments,
            ..
        } = block
        else {
            panic!("expected table");
        };
        assert_eq!(headers, vec!["a", "b"]);
        assert_eq!(alignments, vec![CellAlignment::Left, CellAlignment::Right]);
        assert_eq!(rows, vec![vec!["1".to_string(), "2".to_string()], vec!["only one".to_string()]]);
    }

    #[test]
    fn center_alignment_from_both_colons() {
        let block = parse(&["x|y", ":-:|:--", "1|2"]).unwrap();
        let Block::Table { alignments, .. } = block else {
            panic!("expected table");
        };
        assert_eq!(alignments, vec![CellAlignment::Center, CellAlignment::Left]);
    }

    #[test]
    fn no_separator_means_no_table() {
        assert_eq!(parse(&["a|b", "1|2"]), None);
        assert_eq!(parse(&[]), None);
    }

    #[test]
    fn separator_as_first_row_does_not_count() {
        assert_eq!(parse(&["---|---"]), None);
    }

    #[test]
    fn marker_header_rows_survive() {
        let mut marked = BTreeSet::new();
        marked.insert(0);
        marked.insert(2);
        let block = parse_table(&rows(&["a|b", "---|---", "1|2"]), marked, BTreeSet::new()).unwrap();
        let Block::Table { header_rows, .. } = block else {
            panic!("expected table");
        };
        assert_eq!(header_rows.into_iter().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn empty_cells_are_kept() {
        let block = parse(&["a||c", "---|---|---", "1||3"]).unwrap();
        let Block::Table { headers, rows, .. } = block else {
            panic!("expected table");
        };
        assert_eq!(headers, vec!["a", "", "c"]);
        assert_eq!(rows, vec![vec!["1", "", "3"]]);
    }
}
