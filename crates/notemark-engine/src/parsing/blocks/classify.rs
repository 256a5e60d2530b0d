//! Per-line recognizers.
//!
//! Each function inspects a single line in isolation and reports a local
//! fact; the scanner combines these with its current mode to decide what the
//! line means. Regexes are compiled once and reused.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Alignment, ListStyle};

/// Fenced code block delimiter handling.
pub(crate) struct CodeFence;

impl CodeFence {
    pub const DELIM: &'static str = "```";

    /// Returns the language tag if the line opens or closes a fence.
    ///
    /// `` ``` `` alone yields an empty tag; `` ```rust `` yields `rust`.
    pub fn sig(line: &str) -> Option<&str> {
        let t = line.trim();
        let rest = t.strip_prefix(Self::DELIM)?;
        Some(rest.trim())
    }
}

/// Toggle section markers: `>>>## Title` opens, `<<<` closes.
pub(crate) struct Toggle;

impl Toggle {
    pub const CLOSE: &'static str = "<<<";

    /// Returns `(level, title)` if the line opens a toggle section.
    pub fn open(line: &str) -> Option<(u8, &str)> {
        let caps = toggle_open_re().captures(line.trim_end())?;
        let level = caps.get(1).map(|m| m.len() as u8)?;
        let title = caps.get(2).map_or("", |m| m.as_str());
        Some((level, title))
    }

    pub fn closes(line: &str) -> bool {
        line.trim() == Self::CLOSE
    }
}

/// Column layout markers.
pub(crate) struct ColumnsMarker;

impl ColumnsMarker {
    pub const OPEN: &'static str = "{columns}";
    pub const BREAK: &'static str = "{---}";
    pub const CLOSE: &'static str = "{/columns}";

    pub fn opens(line: &str) -> bool {
        line.trim() == Self::OPEN
    }

    pub fn breaks(line: &str) -> bool {
        line.trim() == Self::BREAK
    }

    pub fn closes(line: &str) -> bool {
        line.trim() == Self::CLOSE
    }
}

/// Explicit table region markers.
pub(crate) struct TableMarker;

impl TableMarker {
    pub const OPEN: &'static str = "{table}";
    pub const CLOSE: &'static str = "{/table}";

    pub fn opens(line: &str) -> bool {
        line.trim() == Self::OPEN
    }

    pub fn closes(line: &str) -> bool {
        line.trim() == Self::CLOSE
    }

    /// `{header}` marks row 0 as a header row, `{header:N}` marks row N.
    ///
    /// Returns `Some(row_index)` when the line is a header marker.
    pub fn header(line: &str) -> Option<usize> {
        let caps = header_marker_re().captures(line.trim())?;
        match caps.get(1) {
            Some(n) => n.as_str().parse().ok(),
            None => Some(0),
        }
    }
}

/// Alignment region markers: `{align:center}` ... `{/align}`.
pub(crate) struct AlignMarker;

impl AlignMarker {
    pub const CLOSE: &'static str = "{/align}";

    /// Returns `(alignment, rest_of_line)` if the line starts with an open
    /// marker. `rest_of_line` may itself contain the close marker.
    pub fn open(line: &str) -> Option<(Alignment, &str)> {
        let caps = align_open_re().captures(line.trim_end())?;
        let alignment = match caps.get(1).map(|m| m.as_str())? {
            "left" => Alignment::Left,
            "center" => Alignment::Center,
            _ => Alignment::Right,
        };
        Some((alignment, caps.get(2).map_or("", |m| m.as_str())))
    }

    pub fn closes(line: &str) -> bool {
        line.trim() == Self::CLOSE
    }
}

/// Returns `(level, text)` for an ATX heading line (`## text`).
pub(crate) fn heading(line: &str) -> Option<(u8, &str)> {
    let caps = heading_re().captures(line.trim_end())?;
    let level = caps.get(1).map(|m| m.len() as u8)?;
    Some((level, caps.get(2).map_or("", |m| m.as_str())))
}

/// A standalone image line: `![alt](url)` or `![alt](url =WxH)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImageLine {
    pub url: String,
    pub alt: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Parses an image line. Malformed syntax (including unparseable dimensions)
/// returns `None` and the line falls through to paragraph text.
pub(crate) fn image(line: &str) -> Option<ImageLine> {
    let caps = image_re().captures(line.trim())?;
    let (width, height) = match (caps.get(3), caps.get(4)) {
        (Some(w), Some(h)) => (Some(w.as_str().parse().ok()?), Some(h.as_str().parse().ok()?)),
        _ => (None, None),
    };
    Some(ImageLine {
        url: caps.get(2).map_or("", |m| m.as_str()).to_string(),
        alt: caps.get(1).map_or("", |m| m.as_str()).to_string(),
        width,
        height,
    })
}

/// Returns the quoted text for a `>` blockquote line.
pub(crate) fn blockquote(line: &str) -> Option<&str> {
    let t = line.trim_start();
    // `>>>` opens a toggle, never a quote.
    if t.starts_with(">>>") {
        return None;
    }
    let rest = t.strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Returns `(indent, style, text)` for a list item line.
///
/// Indent is the leading-whitespace length divided by two. Checkbox syntax is
/// checked before plain bullets so `- [x] done` parses as a checkbox.
pub(crate) fn list_item(line: &str) -> Option<(usize, ListStyle, &str)> {
    if let Some(caps) = checkbox_re().captures(line) {
        let indent = caps.get(1).map_or(0, |m| m.len()) / 2;
        let checked = caps.get(2).is_some_and(|m| m.as_str() != " ");
        return Some((
            indent,
            ListStyle::Checkbox(checked),
            caps.get(3).map_or("", |m| m.as_str()),
        ));
    }
    if let Some(caps) = numbered_re().captures(line) {
        let indent = caps.get(1).map_or(0, |m| m.len()) / 2;
        let number: u64 = caps.get(2)?.as_str().parse().ok()?;
        return Some((
            indent,
            ListStyle::Numbered(number),
            caps.get(3).map_or("", |m| m.as_str()),
        ));
    }
    if let Some(caps) = bullet_re().captures(line) {
        let indent = caps.get(1).map_or(0, |m| m.len()) / 2;
        return Some((
            indent,
            ListStyle::Bullet,
            caps.get(3).map_or("", |m| m.as_str()),
        ));
    }
    None
}

/// Three or more repeated `-`, `*` or `_` with nothing else on the line.
pub(crate) fn horizontal_rule(line: &str) -> bool {
    hrule_re().is_match(line)
}

/// The pipe-table header/body divider, e.g. `| :--- | ---: |`.
pub(crate) fn is_table_separator(line: &str) -> bool {
    table_separator_re().is_match(line)
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.*)$").expect("invalid heading regex"))
}

fn toggle_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^>>>\s*(#{1,6})\s*(.*)$").expect("invalid toggle regex"))
}

fn align_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\{align:(left|center|right)\}(.*)$").expect("invalid align regex")
    })
}

fn header_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\{header(?::(\d+))?\}$").expect("invalid header regex"))
}

fn image_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^!\[([^\]]*)\]\(\s*([^)\s]+)(?:\s+=(\d+)x(\d+))?\s*\)$")
            .expect("invalid image regex")
    })
}

fn checkbox_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\s*)[-*+] \[( |x|X)\] (.*)$").expect("invalid checkbox regex")
    })
}

fn numbered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)(\d+)\. (.*)$").expect("invalid numbered-list regex"))
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)([-*+]) (.*)$").expect("invalid bullet regex"))
}

fn hrule_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(-{3,}|\*{3,}|_{3,})\s*$").expect("invalid rule regex"))
}

fn table_separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*\|?\s*(:?-+:?\s*\|)+\s*(:?-+:?\s*)?\|?\s*$")
            .expect("invalid table separator regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_fence_with_language() {
        assert_eq!(CodeFence::sig("```rust"), Some("rust"));
        assert_eq!(CodeFence::sig("```"), Some(""));
        assert_eq!(CodeFence::sig("text"), None);
    }

    #[test]
    fn detects_toggle_open() {
        assert_eq!(Toggle::open(">>>## Section"), Some((2, "Section")));
        assert_eq!(Toggle::open(">>># T"), Some((1, "T")));
        assert_eq!(Toggle::open(">>>"), None);
        assert_eq!(Toggle::open("> quote"), None);
    }

    #[test]
    fn seven_hashes_is_not_a_heading() {
        assert_eq!(heading("####### too deep"), None);
        assert_eq!(heading("### ok"), Some((3, "ok")));
    }

    #[test]
    fn heading_requires_space() {
        assert_eq!(heading("#nospace"), None);
    }

    #[test]
    fn image_with_dimensions() {
        let img = image("![cat](https://x/cat.png =320x200)").unwrap();
        assert_eq!(img.alt, "cat");
        assert_eq!(img.url, "https://x/cat.png");
        assert_eq!(img.width, Some(320));
        assert_eq!(img.height, Some(200));
    }

    #[test]
    fn image_without_dimensions() {
        let img = image("![](local.png)").unwrap();
        assert_eq!(img.alt, "");
        assert_eq!(img.width, None);
    }

    #[test]
    fn malformed_image_is_rejected() {
        assert!(image("![alt](no closing paren").is_none());
        assert!(image("![alt]()").is_none());
    }

    #[test]
    fn checkbox_before_bullet() {
        assert_eq!(
            list_item("- [x] done"),
            Some((0, ListStyle::Checkbox(true), "done"))
        );
        assert_eq!(
            list_item("  - [ ] todo"),
            Some((1, ListStyle::Checkbox(false), "todo"))
        );
    }

    #[test]
    fn numbered_keeps_source_number() {
        assert_eq!(
            list_item("3. third"),
            Some((0, ListStyle::Numbered(3), "third"))
        );
    }

    #[test]
    fn bullet_indent_is_half_whitespace() {
        assert_eq!(list_item("    * deep"), Some((2, ListStyle::Bullet, "deep")));
    }

    #[test]
    fn rules_need_three_chars() {
        assert!(horizontal_rule("---"));
        assert!(horizontal_rule("*****"));
        assert!(horizontal_rule("  ___  "));
        assert!(!horizontal_rule("--"));
        assert!(!horizontal_rule("- - -"));
    }

    #[test]
    fn separator_row_detection() {
        assert!(is_table_separator("---|---"));
        assert!(is_table_separator("| :--- | ---: |"));
        assert!(is_table_separator(":-:|:-:"));
        assert!(!is_table_separator("---"));
        assert!(!is_table_separator("a|b"));
    }

    #[test]
    fn header_markers() {
        assert_eq!(TableMarker::header("{header}"), Some(0));
        assert_eq!(TableMarker::header("{header:2}"), Some(2));
        assert_eq!(TableMarker::header("{headers}"), None);
    }

    #[test]
    fn align_open_with_inline_content() {
        let (alignment, rest) = AlignMarker::open("{align:center}Hi{/align}").unwrap();
        assert_eq!(alignment, Alignment::Center);
        assert_eq!(rest, "Hi{/align}");
    }
}
