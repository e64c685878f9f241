// SPDX-License-Identifier: MIT
// Markdown-to-terminal-text conversion for bot replies.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// Markdown inline styling
#[derive(Clone, Copy, PartialEq)]
pub(crate) enum MarkdownStyle {
    Normal,
    Bold,
    InlineCode,
}

/// A span of markdown-formatted text
pub(crate) struct MarkdownSpan {
    pub start: usize,        // byte offset of content start (after opening marker)
    pub end: usize,          // byte offset of content end (before closing marker)
    pub marker_start: usize, // byte offset where marker begins
    pub marker_end: usize,   // byte offset where closing marker ends
    pub style: MarkdownStyle,
}

/// Find markdown spans in text (bold with ** and inline code with `)
pub(crate) fn find_markdown_spans(text: &str) -> Vec<MarkdownSpan> {
    let mut spans = Vec::new();
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut i = 0;

    while i < len {
        // Inline code: `code`
        if bytes[i] == b'`'
            && (i + 1 >= len || bytes[i + 1] != b'`')
            && let Some(end) = find_single_backtick_end(bytes, i + 1)
        {
            spans.push(MarkdownSpan {
                start: i + 1,
                end,
                marker_start: i,
                marker_end: end + 1,
                style: MarkdownStyle::InlineCode,
            });
            i = end + 1;
            continue;
        }

        // Bold: **text**
        if i + 1 < len
            && bytes[i] == b'*'
            && bytes[i + 1] == b'*'
            && let Some(end) = find_double_asterisk_end(bytes, i + 2)
        {
            spans.push(MarkdownSpan {
                start: i + 2,
                end,
                marker_start: i,
                marker_end: end + 2,
                style: MarkdownStyle::Bold,
            });
            i = end + 2;
            continue;
        }

        i += 1;
    }

    spans
}

fn find_single_backtick_end(bytes: &[u8], start: usize) -> Option<usize> {
    for (i, &byte) in bytes.iter().enumerate().skip(start) {
        if byte == b'`' {
            return Some(i);
        }
        if byte == b'\n' {
            // No inline code across newlines
            return None;
        }
    }
    None
}

fn find_double_asterisk_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start;
    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'*' {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Get the markdown style at a byte offset; also reports whether the byte
/// sits inside a marker (which is hidden when rendering).
pub(crate) fn get_markdown_style(
    byte_offset: usize,
    spans: &[MarkdownSpan],
) -> (MarkdownStyle, bool) {
    for span in spans {
        if (byte_offset >= span.marker_start && byte_offset < span.start)
            || (byte_offset >= span.end && byte_offset < span.marker_end)
        {
            return (span.style, true);
        }
        if byte_offset >= span.start && byte_offset < span.end {
            return (span.style, false);
        }
    }
    (MarkdownStyle::Normal, false)
}

/// Render one markdown-bearing message into styled lines. Headings are
/// bolded, list markers normalized to bullets, inline markers hidden.
pub(crate) fn render_markdown(text: &str, base: Style, code: Style) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for raw_line in text.lines() {
        let trimmed = raw_line.trim_start();

        // Headings become bold lines with the markers stripped.
        if let Some(heading) = trimmed.strip_prefix('#') {
            let heading = heading.trim_start_matches('#').trim_start();
            lines.push(Line::from(Span::styled(
                heading.to_string(),
                base.add_modifier(Modifier::BOLD),
            )));
            continue;
        }

        let (indent, content) = if let Some(rest) = trimmed.strip_prefix("- ") {
            ("• ", rest)
        } else if let Some(rest) = trimmed.strip_prefix("* ") {
            ("• ", rest)
        } else {
            ("", trimmed)
        };

        lines.push(render_inline(indent, content, base, code));
    }

    if lines.is_empty() {
        lines.push(Line::default());
    }
    lines
}

fn render_inline(prefix: &str, content: &str, base: Style, code: Style) -> Line<'static> {
    let spans_meta = find_markdown_spans(content);
    let mut spans: Vec<Span<'static>> = Vec::new();
    if !prefix.is_empty() {
        spans.push(Span::styled(prefix.to_string(), base));
    }

    let mut current_style = MarkdownStyle::Normal;
    let mut buffer = String::new();

    let flush = |buffer: &mut String, style: MarkdownStyle, spans: &mut Vec<Span<'static>>| {
        if buffer.is_empty() {
            return;
        }
        let styled = match style {
            MarkdownStyle::Normal => base,
            MarkdownStyle::Bold => base.add_modifier(Modifier::BOLD),
            MarkdownStyle::InlineCode => code,
        };
        spans.push(Span::styled(std::mem::take(buffer), styled));
    };

    for (byte_idx, ch) in content.char_indices() {
        let (style, is_marker) = get_markdown_style(byte_idx, &spans_meta);
        if is_marker {
            continue;
        }
        if style != current_style {
            flush(&mut buffer, current_style, &mut spans);
            current_style = style;
        }
        buffer.push(ch);
    }
    flush(&mut buffer, current_style, &mut spans);

    Line::from(spans)
}

/// Display width of a string with markdown markers excluded; used for
/// wrap estimates when auto-scrolling.
pub(crate) fn display_width(text: &str) -> usize {
    let spans = find_markdown_spans(text);
    let mut width = 0;
    for (byte_idx, ch) in text.char_indices() {
        let (_, is_marker) = get_markdown_style(byte_idx, &spans);
        if !is_marker {
            width += UnicodeWidthChar::width(ch).unwrap_or(0);
        }
    }
    width
}
