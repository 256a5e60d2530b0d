//! Span detectors for the inline resolver.
//!
//! Each detector scans one segment of the original text for its own
//! delimiter pattern and reports the matched ranges. Detector order is fixed
//! by [`detector_passes`]; the resolver applies them one after another.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::{FontSlant, FontWeight, Run};

/// Background color stamped by `==highlight==` spans.
pub const HIGHLIGHT_COLOR: &str = "yellow";

/// The attribute one detector contributes to the runs inside its match.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SpanAttr {
    Size(f32),
    Color(String),
    BoldItalic,
    Bold,
    Italic,
    Code,
    Link(String),
    Strike,
    Highlight,
    Underline,
}

impl SpanAttr {
    /// Overlays this attribute onto a run produced by the recursive inner
    /// resolution.
    ///
    /// Value-carrying attributes (size, color, link, background) only fill
    /// fields the inner resolution left at their default, so an inner
    /// `{size:N}` beats the outer one and inner weight/slant survive an
    /// outer color/size span.
    pub fn overlay(&self, mut run: Run) -> Run {
        let style = &mut run.style;
        match self {
            SpanAttr::Size(points) => {
                if style.font_size == crate::models::DEFAULT_FONT_SIZE {
                    style.font_size = *points;
                }
            }
            SpanAttr::Color(color) => {
                if style.color.is_none() {
                    style.color = Some(color.clone());
                }
            }
            SpanAttr::BoldItalic => {
                style.weight = FontWeight::Bold;
                style.slant = FontSlant::Italic;
            }
            SpanAttr::Bold => style.weight = FontWeight::Bold,
            SpanAttr::Italic => style.slant = FontSlant::Italic,
            SpanAttr::Code => style.monospace = true,
            SpanAttr::Link(url) => {
                if style.link.is_none() {
                    style.link = Some(url.clone());
                }
            }
            SpanAttr::Strike => style.strikethrough = true,
            SpanAttr::Highlight => {
                if style.background.is_none() {
                    style.background = Some(HIGHLIGHT_COLOR.to_string());
                }
            }
            SpanAttr::Underline => style.underline = true,
        }
        run
    }
}

/// One detector hit: the full matched range in the original segment, the
/// delimited inner text, and the attribute to stamp.
#[derive(Debug, Clone)]
pub(crate) struct SpanMatch {
    pub range: Range<usize>,
    pub inner: String,
    pub attr: SpanAttr,
    /// Atomic matches become a single literal run with the attribute applied;
    /// the resolver does not recurse into them (bare autolinks).
    pub atomic: bool,
}

/// The fixed detector order. Earlier passes claim text before later ones see
/// it: size and color markers first, then the emphasis family from longest
/// delimiter to shortest, then code, links, strikethrough, highlight and
/// underline.
pub(crate) fn detector_passes() -> [fn(&str) -> Vec<SpanMatch>; 11] {
    [
        find_size,
        find_color,
        find_bold_italic,
        find_bold,
        find_italic,
        find_code,
        find_links,
        find_autolinks,
        find_strike,
        find_highlight,
        find_underline,
    ]
}

fn find_size(text: &str) -> Vec<SpanMatch> {
    size_re()
        .captures_iter(text)
        .filter_map(|caps| {
            let full = caps.get(0)?;
            let points: f32 = caps.get(1)?.as_str().parse().ok()?;
            Some(SpanMatch {
                range: full.range(),
                inner: caps.get(2).map_or("", |m| m.as_str()).to_string(),
                attr: SpanAttr::Size(points),
                atomic: false,
            })
        })
        .collect()
}

fn find_color(text: &str) -> Vec<SpanMatch> {
    color_re()
        .captures_iter(text)
        .filter_map(|caps| {
            let full = caps.get(0)?;
            Some(SpanMatch {
                range: full.range(),
                inner: caps.get(2).map_or("", |m| m.as_str()).to_string(),
                attr: SpanAttr::Color(caps.get(1)?.as_str().to_string()),
                atomic: false,
            })
        })
        .collect()
}

fn find_bold_italic(text: &str) -> Vec<SpanMatch> {
    alternation_matches(bold_italic_re(), text, SpanAttr::BoldItalic)
}

fn find_bold(text: &str) -> Vec<SpanMatch> {
    alternation_matches(bold_re(), text, SpanAttr::Bold)
}

/// Single-`*`/`_` emphasis with the doubled-delimiter tie-break: a match is
/// rejected when the byte just before or after it repeats the delimiter
/// (that text belongs to `**`/`__` spans), or when the whole inner text is
/// itself delimiter characters.
fn find_italic(text: &str) -> Vec<SpanMatch> {
    let mut out = Vec::new();
    collect_italic(text, italic_star_re(), b'*', &mut out);
    collect_italic(text, italic_underscore_re(), b'_', &mut out);
    out.sort_by_key(|m| m.range.start);
    out
}

fn collect_italic(text: &str, re: &Regex, delim: u8, out: &mut Vec<SpanMatch>) {
    let bytes = text.as_bytes();
    let mut pos = 0;
    while pos < text.len() {
        let Some(m) = re.find_at(text, pos) else {
            break;
        };
        let inner = &text[m.start() + 1..m.end() - 1];
        let doubled_before = m.start() > 0 && bytes[m.start() - 1] == delim;
        let doubled_after = m.end() < bytes.len() && bytes[m.end()] == delim;
        let only_delimiters = inner.bytes().all(|b| b == b'*' || b == b'_');
        if doubled_before || doubled_after || only_delimiters {
            // Skip just past the opening delimiter so a real match later in
            // the rejected region is still found.
            pos = m.start() + 1;
        } else {
            out.push(SpanMatch {
                range: m.range(),
                inner: inner.to_string(),
                attr: SpanAttr::Italic,
                atomic: false,
            });
            pos = m.end();
        }
    }
}

fn find_code(text: &str) -> Vec<SpanMatch> {
    code_re()
        .captures_iter(text)
        .filter_map(|caps| {
            let full = caps.get(0)?;
            Some(SpanMatch {
                range: full.range(),
                inner: caps.get(1)?.as_str().to_string(),
                attr: SpanAttr::Code,
                atomic: false,
            })
        })
        .collect()
}

fn find_links(text: &str) -> Vec<SpanMatch> {
    link_re()
        .captures_iter(text)
        .filter_map(|caps| {
            let full = caps.get(0)?;
            Some(SpanMatch {
                range: full.range(),
                inner: caps.get(1).map_or("", |m| m.as_str()).to_string(),
                attr: SpanAttr::Link(caps.get(2).map_or("", |m| m.as_str()).to_string()),
                atomic: false,
            })
        })
        .collect()
}

/// Bare `http(s)://` URLs. Trailing punctuation that reads as sentence
/// structure rather than URL is trimmed off the match.
fn find_autolinks(text: &str) -> Vec<SpanMatch> {
    url_re()
        .find_iter(text)
        .filter_map(|m| {
            let mut end = m.end();
            while let Some(last) = text[m.start()..end].chars().last() {
                if matches!(last, '.' | ',' | ':' | ';' | '!' | '?' | ')' | ']' | '}') {
                    end -= last.len_utf8();
                } else {
                    break;
                }
            }
            if end <= m.start() {
                return None;
            }
            let url = text[m.start()..end].to_string();
            Some(SpanMatch {
                range: m.start()..end,
                inner: url.clone(),
                attr: SpanAttr::Link(url),
                atomic: true,
            })
        })
        .collect()
}

fn find_strike(text: &str) -> Vec<SpanMatch> {
    simple_matches(strike_re(), text, SpanAttr::Strike)
}

fn find_highlight(text: &str) -> Vec<SpanMatch> {
    simple_matches(highlight_re(), text, SpanAttr::Highlight)
}

fn find_underline(text: &str) -> Vec<SpanMatch> {
    simple_matches(underline_re(), text, SpanAttr::Underline)
}

fn simple_matches(re: &Regex, text: &str, attr: SpanAttr) -> Vec<SpanMatch> {
    re.captures_iter(text)
        .filter_map(|caps| {
            let full = caps.get(0)?;
            Some(SpanMatch {
                range: full.range(),
                inner: caps.get(1)?.as_str().to_string(),
                attr: attr.clone(),
                atomic: false,
            })
        })
        .collect()
}

/// For patterns with two delimiter alternatives (`**`/`__`): inner text is
/// whichever capture group participated.
fn alternation_matches(re: &Regex, text: &str, attr: SpanAttr) -> Vec<SpanMatch> {
    re.captures_iter(text)
        .filter_map(|caps| {
            let full = caps.get(0)?;
            let inner = caps.get(1).or_else(|| caps.get(2))?;
            Some(SpanMatch {
                range: full.range(),
                inner: inner.as_str().to_string(),
                attr: attr.clone(),
                atomic: false,
            })
        })
        .collect()
}

fn size_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{size:(\d+)\}(.*?)\{/size\}").expect("invalid size regex"))
}

fn color_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{color:([^}]+)\}(.*?)\{/color\}").expect("invalid color regex")
    })
}

fn bold_italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\*\*\*(.+?)\*\*\*|___(.+?)___").expect("invalid bold-italic regex")
    })
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*|__(.+?)__").expect("invalid bold regex"))
}

fn italic_star_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*([^*]+)\*").expect("invalid italic regex"))
}

fn italic_underscore_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_([^_]+)_").expect("invalid italic regex"))
}

fn code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("invalid code regex"))
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").expect("invalid link regex"))
}

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://[^\s<>\[\]]+").expect("invalid URL regex"))
}

fn strike_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"~~(.+?)~~").expect("invalid strikethrough regex"))
}

fn highlight_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"==(.+?)==").expect("invalid highlight regex"))
}

fn underline_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<u>(.+?)</u>").expect("invalid underline regex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_match_extracts_points() {
        let matches = find_size("{size:24}big{/size}");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].inner, "big");
        assert_eq!(matches[0].attr, SpanAttr::Size(24.0));
    }

    #[test]
    fn non_numeric_size_is_ignored() {
        assert!(find_size("{size:huge}x{/size}").is_empty());
    }

    #[test]
    fn italic_rejects_doubled_delimiters() {
        let matches = find_italic("**bold** and *italic*");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].inner, "italic");
        assert_eq!(matches[0].range, 13..21);
    }

    #[test]
    fn italic_rejects_delimiter_only_inner() {
        assert!(find_italic("*__*").is_empty());
    }

    #[test]
    fn bold_and_bold_italic_share_text() {
        let triple = find_bold_italic("***x***");
        assert_eq!(triple.len(), 1);
        assert_eq!(triple[0].inner, "x");
        // Bold still reports a (shorter) match here; the resolver discards it
        // because the bold-italic pass already claimed the region.
        let double = find_bold("***x***");
        assert_eq!(double.len(), 1);
    }

    #[test]
    fn autolink_trims_trailing_punctuation() {
        let matches = find_autolinks("see https://example.com/a, then");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].inner, "https://example.com/a");
    }

    #[test]
    fn link_captures_text_and_target() {
        let matches = find_links("[home](https://h)");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].inner, "home");
        assert_eq!(matches[0].attr, SpanAttr::Link("https://h".to_string()));
    }
}
