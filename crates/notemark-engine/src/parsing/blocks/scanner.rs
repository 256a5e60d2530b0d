//! The line-scanning block state machine.
//!
//! One pass over the source lines, driven by an explicit [`Mode`]. Normal
//! mode recognizes single-line blocks and paragraph text; fenced code and
//! the compound regions (toggle sections, columns, tables, alignment) each
//! switch into their own mode with an accumulator buffer, and hand their
//! accumulated lines to a recursive parse or the table sub-parser when the
//! region closes. Parsing is total: unterminated regions are finalized with
//! whatever accumulated, malformed regions degrade to paragraph text or are
//! dropped.

use std::collections::BTreeSet;
use std::mem;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Alignment, Block};
use crate::parsing::inline::resolve_runs;
use crate::parsing::lines::{Line, source_lines};
use crate::parsing::span::Span;

use super::classify::{self, AlignMarker, CodeFence, ColumnsMarker, TableMarker, Toggle};
use super::tables;

/// Cap on compound-block nesting (toggle in columns in toggle, ...). At the
/// cap, open markers stop being recognized and read as paragraph text, which
/// bounds recursion on adversarial input.
pub const MAX_BLOCK_DEPTH: usize = 16;

/// One top-level block plus the source range it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedBlock {
    pub block: Block,
    pub span: Span,
}

/// Scans `source` into spanned top-level blocks.
///
/// `depth` is the compound-nesting level; external callers pass 0. Nested
/// bodies (toggle content, columns) are re-scanned one level deeper and keep
/// only their blocks, so spans always index the top-level source.
pub(crate) fn scan_source(source: &str, depth: usize) -> Vec<SpannedBlock> {
    let lines = source_lines(source);
    let mut scanner = Scanner::new(depth);
    for i in 0..lines.len() {
        scanner.step(&lines[i], lines.get(i + 1));
    }
    scanner.finish()
}

/// Scans `source` into blocks, discarding spans.
pub(crate) fn parse_blocks(source: &str, depth: usize) -> Vec<Block> {
    scan_source(source, depth)
        .into_iter()
        .map(|spanned| spanned.block)
        .collect()
}

fn parse_nested(lines: &[String], depth: usize) -> Vec<Block> {
    parse_blocks(&lines.join("\n"), depth + 1)
}

/// Scanner mode plus that mode's accumulator.
#[derive(Debug)]
enum Mode {
    Normal,
    Fence(FenceBuf),
    Toggle(ToggleBuf),
    Columns(ColumnsBuf),
    Table(TableBuf),
    Aligned(AlignBuf),
}

#[derive(Debug)]
struct FenceBuf {
    language: String,
    /// The opening delimiter line, kept verbatim for fences inside compound
    /// regions whose raw lines are re-parsed later.
    open_line: String,
    lines: Vec<String>,
    start: usize,
    last_end: usize,
    /// Mode to restore when the fence closes. `Normal` emits a code block;
    /// a compound parent gets the raw fence lines appended instead.
    ret: Box<Mode>,
}

#[derive(Debug)]
struct ToggleBuf {
    level: u8,
    title: String,
    lines: Vec<String>,
    /// Nested same-kind opens seen so far; the matching closes are body text.
    open_depth: usize,
    start: usize,
    last_end: usize,
}

#[derive(Debug)]
struct ColumnsBuf {
    columns: Vec<Vec<String>>,
    current: Vec<String>,
    open_depth: usize,
    start: usize,
    last_end: usize,
}

#[derive(Debug)]
struct TableBuf {
    rows: Vec<String>,
    header_rows: BTreeSet<usize>,
    /// `{table}` region when true; pipe-autodetected region when false. The
    /// latter has no close marker and ends at the first line without `|`.
    explicit: bool,
    open_depth: usize,
    start: usize,
    last_end: usize,
}

#[derive(Debug)]
struct AlignBuf {
    alignment: Alignment,
    text: String,
    start: usize,
    last_end: usize,
}

#[derive(Debug)]
struct ParagraphBuf {
    text: String,
    start: usize,
    last_end: usize,
}

#[derive(Debug)]
struct Scanner {
    depth: usize,
    mode: Mode,
    paragraph: Option<ParagraphBuf>,
    /// `{header}` / `{header:N}` rows seen before a table region opened.
    pending_header_rows: BTreeSet<usize>,
    out: Vec<SpannedBlock>,
}

impl Scanner {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            mode: Mode::Normal,
            paragraph: None,
            pending_header_rows: BTreeSet::new(),
            out: Vec::new(),
        }
    }

    fn step(&mut self, line: &Line<'_>, next: Option<&Line<'_>>) {
        match mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => self.step_normal(line, next),
            Mode::Fence(buf) => self.step_fence(buf, line),
            Mode::Toggle(buf) => self.step_toggle(buf, line),
            Mode::Columns(buf) => self.step_columns(buf, line),
            Mode::Table(buf) => self.step_table(buf, line, next),
            Mode::Aligned(buf) => self.step_aligned(buf, line),
        }
    }

    fn step_normal(&mut self, line: &Line<'_>, next: Option<&Line<'_>>) {
        let text = line.text;

        if let Some(language) = CodeFence::sig(text) {
            self.flush_paragraph();
            self.mode = Mode::Fence(FenceBuf {
                language: language.to_string(),
                open_line: text.to_string(),
                lines: Vec::new(),
                start: line.start,
                last_end: line.end,
                ret: Box::new(Mode::Normal),
            });
            return;
        }

        if self.depth < MAX_BLOCK_DEPTH {
            if TableMarker::opens(text) {
                self.flush_paragraph();
                self.mode = Mode::Table(TableBuf {
                    rows: Vec::new(),
                    header_rows: mem::take(&mut self.pending_header_rows),
                    explicit: true,
                    open_depth: 0,
                    start: line.start,
                    last_end: line.end,
                });
                return;
            }
            if let Some(row) = TableMarker::header(text) {
                self.pending_header_rows.insert(row);
                return;
            }
            if ColumnsMarker::opens(text) {
                self.flush_paragraph();
                self.mode = Mode::Columns(ColumnsBuf {
                    columns: Vec::new(),
                    current: Vec::new(),
                    open_depth: 0,
                    start: line.start,
                    last_end: line.end,
                });
                return;
            }
            if let Some((level, title)) = Toggle::open(text) {
                self.flush_paragraph();
                self.mode = Mode::Toggle(ToggleBuf {
                    level,
                    title: title.to_string(),
                    lines: Vec::new(),
                    open_depth: 0,
                    start: line.start,
                    last_end: line.end,
                });
                return;
            }
            if let Some((alignment, rest)) = AlignMarker::open(text) {
                self.flush_paragraph();
                // `{align:center}Hi{/align}` closes on the open line.
                if let Some(idx) = rest.find(AlignMarker::CLOSE) {
                    let runs = resolve_runs(rest[..idx].trim());
                    if !runs.is_empty() {
                        self.emit(Block::Paragraph { runs, alignment }, line_span(line));
                    }
                    return;
                }
                self.mode = Mode::Aligned(AlignBuf {
                    alignment,
                    text: rest.trim().to_string(),
                    start: line.start,
                    last_end: line.end,
                });
                return;
            }
        }

        // A pipe row only starts a table when the next line is a separator.
        if text.contains('|')
            && next.is_some_and(|n| classify::is_table_separator(n.text))
        {
            self.flush_paragraph();
            self.mode = Mode::Table(TableBuf {
                rows: vec![text.to_string()],
                header_rows: mem::take(&mut self.pending_header_rows),
                explicit: false,
                open_depth: 0,
                start: line.start,
                last_end: line.end,
            });
            return;
        }

        if let Some((level, heading_text)) = classify::heading(text) {
            self.flush_paragraph();
            self.emit(
                Block::Heading {
                    level,
                    runs: resolve_runs(heading_text),
                },
                line_span(line),
            );
            return;
        }
        if let Some(image) = classify::image(text) {
            self.flush_paragraph();
            self.emit(
                Block::Image {
                    url: image.url,
                    alt: image.alt,
                    width: image.width,
                    height: image.height,
                },
                line_span(line),
            );
            return;
        }
        if let Some(quoted) = classify::blockquote(text) {
            self.flush_paragraph();
            self.emit(
                Block::Blockquote {
                    runs: resolve_runs(quoted),
                },
                line_span(line),
            );
            return;
        }
        if let Some((indent, style, item_text)) = classify::list_item(text) {
            self.flush_paragraph();
            self.emit(
                Block::ListItem {
                    indent,
                    style,
                    runs: resolve_runs(item_text),
                },
                line_span(line),
            );
            return;
        }
        if classify::horizontal_rule(text) {
            self.flush_paragraph();
            self.emit(Block::HorizontalRule, line_span(line));
            return;
        }

        if text.trim().is_empty() {
            self.flush_paragraph();
            return;
        }

        match &mut self.paragraph {
            Some(buf) => {
                buf.text.push(' ');
                buf.text.push_str(text.trim());
                buf.last_end = line.end;
            }
            None => {
                self.paragraph = Some(ParagraphBuf {
                    text: text.trim().to_string(),
                    start: line.start,
                    last_end: line.end,
                });
            }
        }
    }

    fn step_fence(&mut self, mut buf: FenceBuf, line: &Line<'_>) {
        if CodeFence::sig(line.text).is_some() {
            match *buf.ret {
                Mode::Normal => {
                    self.emit(
                        Block::CodeBlock {
                            code: buf.lines.join("\n"),
                            language: buf.language,
                        },
                        Span {
                            start: buf.start,
                            end: line.end,
                        },
                    );
                }
                parent => {
                    let mut raw = Vec::with_capacity(buf.lines.len() + 2);
                    raw.push(buf.open_line);
                    raw.append(&mut buf.lines);
                    raw.push(line.text.to_string());
                    self.mode = restore_with_raw(parent, raw, line.end);
                }
            }
            return;
        }
        buf.lines.push(line.text.to_string());
        buf.last_end = line.end;
        self.mode = Mode::Fence(buf);
    }

    fn step_toggle(&mut self, mut buf: ToggleBuf, line: &Line<'_>) {
        let text = line.text;
        // Fences shield their contents from the region markers.
        if CodeFence::sig(text).is_some() {
            self.enter_nested_fence(Mode::Toggle(buf), line);
            return;
        }
        if Toggle::open(text).is_some() {
            buf.open_depth += 1;
        } else if Toggle::closes(text) {
            if buf.open_depth == 0 {
                self.close_toggle(buf, line.end);
                return;
            }
            buf.open_depth -= 1;
        }
        buf.lines.push(text.to_string());
        buf.last_end = line.end;
        self.mode = Mode::Toggle(buf);
    }

    fn step_columns(&mut self, mut buf: ColumnsBuf, line: &Line<'_>) {
        let text = line.text;
        if CodeFence::sig(text).is_some() {
            self.enter_nested_fence(Mode::Columns(buf), line);
            return;
        }
        if ColumnsMarker::opens(text) {
            buf.open_depth += 1;
        } else if ColumnsMarker::breaks(text) && buf.open_depth == 0 {
            buf.columns.push(mem::take(&mut buf.current));
            buf.last_end = line.end;
            self.mode = Mode::Columns(buf);
            return;
        } else if ColumnsMarker::closes(text) {
            if buf.open_depth == 0 {
                self.close_columns(buf, line.end);
                return;
            }
            buf.open_depth -= 1;
        }
        buf.current.push(text.to_string());
        buf.last_end = line.end;
        self.mode = Mode::Columns(buf);
    }

    fn step_table(&mut self, mut buf: TableBuf, line: &Line<'_>, next: Option<&Line<'_>>) {
        let text = line.text;

        if buf.explicit {
            if TableMarker::closes(text) {
                if buf.open_depth == 0 {
                    self.close_table(buf, line.end);
                    return;
                }
                buf.open_depth -= 1;
                buf.rows.push(text.to_string());
            } else if TableMarker::opens(text) {
                buf.open_depth += 1;
                buf.rows.push(text.to_string());
            } else if let Some(row) = TableMarker::header(text) {
                buf.header_rows.insert(row);
            } else if !text.trim().is_empty() {
                buf.rows.push(text.to_string());
            }
            buf.last_end = line.end;
            self.mode = Mode::Table(buf);
            return;
        }

        // An autodetected region runs as long as the rows keep their pipes;
        // the first line without one belongs to whatever comes next.
        if text.contains('|') {
            buf.rows.push(text.to_string());
            buf.last_end = line.end;
            self.mode = Mode::Table(buf);
            return;
        }
        let end = buf.last_end;
        self.close_table(buf, end);
        self.step_normal(line, next);
    }

    fn step_aligned(&mut self, mut buf: AlignBuf, line: &Line<'_>) {
        let text = line.text;
        if AlignMarker::closes(text) {
            self.close_aligned(buf, line.end);
            return;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            if !buf.text.is_empty() {
                buf.text.push(' ');
            }
            buf.text.push_str(trimmed);
        }
        buf.last_end = line.end;
        self.mode = Mode::Aligned(buf);
    }

    fn enter_nested_fence(&mut self, parent: Mode, line: &Line<'_>) {
        let language = CodeFence::sig(line.text).unwrap_or("");
        self.mode = Mode::Fence(FenceBuf {
            language: language.to_string(),
            open_line: line.text.to_string(),
            lines: Vec::new(),
            start: line.start,
            last_end: line.end,
            ret: Box::new(parent),
        });
    }

    fn close_toggle(&mut self, buf: ToggleBuf, end: usize) {
        let content = parse_nested(&buf.lines, self.depth);
        self.emit(
            Block::ToggleHeading {
                level: buf.level,
                title: resolve_runs(&buf.title),
                content,
            },
            Span {
                start: buf.start,
                end,
            },
        );
    }

    fn close_columns(&mut self, mut buf: ColumnsBuf, end: usize) {
        buf.columns.push(mem::take(&mut buf.current));
        let columns = buf
            .columns
            .iter()
            .map(|column| parse_nested(column, self.depth))
            .collect();
        self.emit(
            Block::Columns { columns },
            Span {
                start: buf.start,
                end,
            },
        );
    }

    fn close_table(&mut self, buf: TableBuf, end: usize) {
        // A region without a header/separator pair yields nothing.
        if let Some(block) = tables::parse_table(&buf.rows, buf.header_rows, BTreeSet::new()) {
            self.emit(
                block,
                Span {
                    start: buf.start,
                    end,
                },
            );
        }
    }

    fn close_aligned(&mut self, buf: AlignBuf, end: usize) {
        let runs = resolve_runs(buf.text.trim());
        if runs.is_empty() {
            return;
        }
        self.emit(
            Block::Paragraph {
                runs,
                alignment: buf.alignment,
            },
            Span {
                start: buf.start,
                end,
            },
        );
    }

    fn flush_paragraph(&mut self) {
        let Some(buf) = self.paragraph.take() else {
            return;
        };
        let (text, alignment) = extract_alignment(&buf.text);
        let runs = resolve_runs(text.trim());
        if runs.is_empty() {
            return;
        }
        self.emit(
            Block::Paragraph { runs, alignment },
            Span {
                start: buf.start,
                end: buf.last_end,
            },
        );
    }

    fn finish(mut self) -> Vec<SpannedBlock> {
        self.flush_paragraph();
        // Unterminated regions are finalized from the inside out: an open
        // fence hands its raw lines back to its parent region, which then
        // finalizes in turn.
        loop {
            match mem::replace(&mut self.mode, Mode::Normal) {
                Mode::Normal => break,
                Mode::Fence(mut buf) => match *buf.ret {
                    Mode::Normal => {
                        self.emit(
                            Block::CodeBlock {
                                code: buf.lines.join("\n"),
                                language: buf.language,
                            },
                            Span {
                                start: buf.start,
                                end: buf.last_end,
                            },
                        );
                    }
                    parent => {
                        let mut raw = Vec::with_capacity(buf.lines.len() + 1);
                        raw.push(buf.open_line);
                        raw.append(&mut buf.lines);
                        let end = buf.last_end;
                        self.mode = restore_with_raw(parent, raw, end);
                    }
                },
                Mode::Toggle(buf) => {
                    let end = buf.last_end;
                    self.close_toggle(buf, end);
                }
                Mode::Columns(buf) => {
                    let end = buf.last_end;
                    self.close_columns(buf, end);
                }
                Mode::Table(buf) => {
                    let end = buf.last_end;
                    self.close_table(buf, end);
                }
                Mode::Aligned(buf) => {
                    let end = buf.last_end;
                    self.close_aligned(buf, end);
                }
            }
        }
        self.out
    }

    fn emit(&mut self, block: Block, span: Span) {
        self.out.push(SpannedBlock { block, span });
    }
}

fn restore_with_raw(parent: Mode, raw: Vec<String>, end: usize) -> Mode {
    match parent {
        Mode::Toggle(mut buf) => {
            buf.lines.extend(raw);
            buf.last_end = end;
            Mode::Toggle(buf)
        }
        Mode::Columns(mut buf) => {
            buf.current.extend(raw);
            buf.last_end = end;
            Mode::Columns(buf)
        }
        other => other,
    }
}

fn line_span(line: &Line<'_>) -> Span {
    Span {
        start: line.start,
        end: line.end,
    }
}

/// Pulls an alignment marker pair out of accumulated paragraph text.
///
/// `{align:center}note{/align}` folded into a paragraph sets the paragraph
/// alignment; the markers themselves never render.
fn extract_alignment(text: &str) -> (String, Alignment) {
    let re = inline_align_re();
    let Some(caps) = re.captures(text) else {
        return (text.to_string(), Alignment::Left);
    };
    let alignment = match &caps[1] {
        "left" => Alignment::Left,
        "center" => Alignment::Center,
        _ => Alignment::Right,
    };
    let stripped = re.replace_all(text, "").replace(AlignMarker::CLOSE, "");
    (stripped, alignment)
}

fn inline_align_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{align:(left|center|right)\}").expect("invalid align regex")
    })
}
