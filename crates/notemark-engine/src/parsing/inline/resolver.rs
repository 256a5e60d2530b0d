//! Recursive inline run resolution.
//!
//! The resolver starts from the whole segment as one default-styled run and
//! applies the fixed detector sequence. Every detector re-scans the original
//! segment text; its matches are spliced into the working run list in
//! reverse source order so earlier offsets stay valid. The inner text of a
//! match is resolved recursively (one depth level down, full detector
//! sequence again) and the detector's attribute is overlaid on the result,
//! which is what merges nested attributes: an inner `{size:N}` or `{color:X}`
//! wins over an outer one, and an outer size/color span never clobbers inner
//! weight or slant.

use std::ops::Range;

use crate::models::Run;

use super::detect::{SpanMatch, detector_passes};

/// Inline resolution depth cap. Past it the remaining text is returned as
/// one literal run, which bounds pathological or self-referential markup.
pub const MAX_INLINE_DEPTH: usize = 10;

/// Resolves one text segment into styled runs.
///
/// The output covers the segment exactly, in source order, with no overlaps;
/// adjacent runs with identical attributes are merged.
pub fn resolve_runs(text: &str) -> Vec<Run> {
    resolve(text, 0)
}

pub(crate) fn resolve(text: &str, depth: usize) -> Vec<Run> {
    if text.is_empty() {
        return Vec::new();
    }
    if depth >= MAX_INLINE_DEPTH {
        return vec![Run::plain(text)];
    }

    let mut pieces = vec![Piece::pristine(0..text.len(), text)];
    for find in detector_passes() {
        for m in find(text).into_iter().rev() {
            splice(text, &mut pieces, m, depth);
        }
    }
    coalesce(pieces)
}

/// A segment of the working output.
///
/// `span` is the range of the original text this piece stands for. Pristine
/// pieces are still raw source text and may be split at any byte; resolved
/// pieces are opaque and can only be replaced wholesale.
#[derive(Debug)]
struct Piece {
    span: Range<usize>,
    runs: Vec<Run>,
    pristine: bool,
}

impl Piece {
    fn pristine(span: Range<usize>, text: &str) -> Self {
        let slice = &text[span.clone()];
        Self {
            runs: vec![Run::plain(slice)],
            span,
            pristine: true,
        }
    }
}

/// Splices one detector match into the piece list.
///
/// The match region must line up with the existing pieces: edge pieces that
/// the match only partially covers have to be pristine (so they can be
/// split). Otherwise the match crosses an already-resolved region and is
/// dropped; that is also what keeps a bold pass from re-matching inside text
/// the bold-italic pass claimed.
fn splice(text: &str, pieces: &mut Vec<Piece>, m: SpanMatch, depth: usize) {
    let Some(lo) = pieces.iter().position(|p| p.span.end > m.range.start) else {
        return;
    };
    if pieces[lo].span.start >= m.range.end {
        return;
    }
    let Some(hi) = pieces.iter().rposition(|p| p.span.start < m.range.end) else {
        return;
    };

    if pieces[lo].span.start < m.range.start && !pieces[lo].pristine {
        return;
    }
    if pieces[hi].span.end > m.range.end && !pieces[hi].pristine {
        return;
    }

    let mut replacement = Vec::with_capacity(3);
    if pieces[lo].span.start < m.range.start {
        replacement.push(Piece::pristine(pieces[lo].span.start..m.range.start, text));
    }
    let runs = if m.atomic {
        vec![m.attr.overlay(Run::plain(m.inner.as_str()))]
    } else {
        resolve(&m.inner, depth + 1)
            .into_iter()
            .map(|run| m.attr.overlay(run))
            .collect()
    };
    replacement.push(Piece {
        span: m.range.clone(),
        runs,
        pristine: false,
    });
    if pieces[hi].span.end > m.range.end {
        replacement.push(Piece::pristine(m.range.end..pieces[hi].span.end, text));
    }
    pieces.splice(lo..=hi, replacement);
}

/// Flattens pieces into runs, dropping empties and merging neighbors that
/// ended up with identical attributes.
fn coalesce(pieces: Vec<Piece>) -> Vec<Run> {
    let mut out: Vec<Run> = Vec::new();
    for run in pieces.into_iter().flat_map(|p| p.runs) {
        if run.text.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.style == run.style => last.text.push_str(&run.text),
            _ => out.push(run),
        }
    }
    out
}
