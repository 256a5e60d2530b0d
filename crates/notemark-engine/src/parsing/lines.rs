/// One source line with its byte offsets.
///
/// `text` excludes the line terminator; `end` is the offset just past the
/// last content byte, so `[start, end)` never covers the newline. A trailing
/// `\r` (CRLF input) is stripped from both the text and the span.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Splits `source` into offset-preserving lines.
pub(crate) fn source_lines(source: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;

    for segment in source.split('\n') {
        let text = segment.strip_suffix('\r').unwrap_or(segment);
        lines.push(Line {
            text,
            start,
            end: start + text.len(),
        });
        start += segment.len() + 1;
    }

    // split('\n') on "a\n" yields a trailing "" which is a real (blank) final
    // line only when the source ends with a newline; keep it, the scanner
    // treats it as blank anyway.
    lines
}
