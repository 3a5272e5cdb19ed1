//! Minimal inline markdown for text segments.
//!
//! Assistant text uses a small subset of markdown: `**bold**`,
//! `*italic*` / `_italic_`, and `` `code` ``. Renderers split each
//! [`RenderSegment::Text`](crate::models::RenderSegment::Text) into
//! [`InlineSpan`]s with [`parse_inline`].
//!
//! Delimiter rules come from CommonMark via `pulldown-cmark`, so `2 * 3`,
//! `snake_case_name` and `\*escaped\*` stay literal. Only emphasis and code
//! spans are lifted out; everything else (list markers, headings, links,
//! leading whitespace) is copied from the source unchanged.

use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum InlineSpan {
    Text(String),
    Bold(String),
    Italic(String),
    #[serde(rename = "bold_italic")]
    BoldItalic(String),
    Code(String),
}

impl InlineSpan {
    pub fn content(&self) -> &str {
        match self {
            InlineSpan::Text(s)
            | InlineSpan::Bold(s)
            | InlineSpan::Italic(s)
            | InlineSpan::BoldItalic(s)
            | InlineSpan::Code(s) => s,
        }
    }

    fn styled(strong: bool, emphasis: bool, text: String) -> Self {
        match (strong, emphasis) {
            (false, false) => InlineSpan::Text(text),
            (true, false) => InlineSpan::Bold(text),
            (false, true) => InlineSpan::Italic(text),
            (true, true) => InlineSpan::BoldItalic(text),
        }
    }
}

/// Split `text` into literal and emphasized spans.
///
/// Adjacent spans with the same style are merged; code spans are never
/// merged.
pub fn parse_inline(text: &str) -> Vec<InlineSpan> {
    let mut writer = SpanWriter::new(text);

    for (event, range) in Parser::new_ext(text, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(Tag::Strong) => writer.open(range, Delim::Strong),
            Event::Start(Tag::Emphasis) => writer.open(range, Delim::Emphasis),
            Event::End(TagEnd::Strong) => writer.close(range, Delim::Strong),
            Event::End(TagEnd::Emphasis) => writer.close(range, Delim::Emphasis),
            Event::Text(_) => writer.text(range),
            Event::Code(code) => writer.code(range, code.into_string()),
            _ => {}
        }
    }

    writer.finish()
}

#[derive(Clone, Copy)]
enum Delim {
    Strong,
    Emphasis,
}

impl Delim {
    fn len(self) -> usize {
        match self {
            Delim::Strong => 2,
            Delim::Emphasis => 1,
        }
    }
}

/// Walks the source in order, copying everything between recognised
/// inline events verbatim.
struct SpanWriter<'a> {
    source: &'a str,
    cursor: usize,
    strong: usize,
    emphasis: usize,
    spans: Vec<InlineSpan>,
}

impl<'a> SpanWriter<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            cursor: 0,
            strong: 0,
            emphasis: 0,
            spans: Vec::new(),
        }
    }

    /// Copy `source[cursor..to]` with the current style.
    fn copy_to(&mut self, to: usize) {
        if to <= self.cursor {
            return;
        }
        if let Some(slice) = self.source.get(self.cursor..to) {
            let span = InlineSpan::styled(self.strong > 0, self.emphasis > 0, slice.to_string());
            self.push(span);
        }
        self.cursor = to;
    }

    /// Skip `source[cursor..to]` (delimiters, escape backslashes).
    fn skip_to(&mut self, to: usize) {
        self.cursor = self.cursor.max(to);
    }

    fn depth(&mut self, delim: Delim) -> &mut usize {
        match delim {
            Delim::Strong => &mut self.strong,
            Delim::Emphasis => &mut self.emphasis,
        }
    }

    fn open(&mut self, range: Range<usize>, delim: Delim) {
        self.copy_to(range.start);
        self.skip_to(range.start + delim.len());
        *self.depth(delim) += 1;
    }

    fn close(&mut self, range: Range<usize>, delim: Delim) {
        self.copy_to(range.end.saturating_sub(delim.len()));
        self.skip_to(range.end);
        let depth = self.depth(delim);
        *depth = depth.saturating_sub(1);
    }

    fn text(&mut self, range: Range<usize>) {
        // Backslash escapes start the text node after the backslash.
        let escaped = range.start > self.cursor
            && self.source[..range.start].ends_with('\\')
            && self.source[range.start..].starts_with(|c: char| c.is_ascii_punctuation());
        if escaped {
            self.copy_to(range.start - 1);
            self.skip_to(range.start);
        } else {
            self.copy_to(range.start);
        }
        self.copy_to(range.end);
    }

    fn code(&mut self, range: Range<usize>, code: String) {
        self.copy_to(range.start);
        self.spans.push(InlineSpan::Code(code));
        self.skip_to(range.end);
    }

    fn push(&mut self, span: InlineSpan) {
        if let Some(last) = self.spans.last_mut() {
            let merged = match (last, &span) {
                (InlineSpan::Text(a), InlineSpan::Text(b))
                | (InlineSpan::Bold(a), InlineSpan::Bold(b))
                | (InlineSpan::Italic(a), InlineSpan::Italic(b))
                | (InlineSpan::BoldItalic(a), InlineSpan::BoldItalic(b)) => {
                    a.push_str(b);
                    true
                }
                _ => false,
            };
            if merged {
                return;
            }
        }
        self.spans.push(span);
    }

    fn finish(mut self) -> Vec<InlineSpan> {
        self.copy_to(self.source.len());
        self.spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> InlineSpan {
        InlineSpan::Text(s.to_string())
    }

    #[test]
    fn test_plain() {
        assert_eq!(parse_inline("nothing here"), vec![text("nothing here")]);
        assert!(parse_inline("").is_empty());
    }

    #[test]
    fn test_bold_italic_code() {
        assert_eq!(
            parse_inline("a **b** *c* `d` e"),
            vec![
                text("a "),
                InlineSpan::Bold("b".into()),
                text(" "),
                InlineSpan::Italic("c".into()),
                text(" "),
                InlineSpan::Code("d".into()),
                text(" e"),
            ]
        );
    }

    #[test]
    fn test_code_not_parsed_further() {
        assert_eq!(
            parse_inline("`**x**`"),
            vec![InlineSpan::Code("**x**".into())]
        );
    }

    #[test]
    fn test_unclosed_is_literal() {
        assert_eq!(parse_inline("2 * 3 = 6"), vec![text("2 * 3 = 6")]);
        assert_eq!(parse_inline("**open"), vec![text("**open")]);
        assert_eq!(parse_inline("tick ` only"), vec![text("tick ` only")]);
    }

    #[test]
    fn test_arithmetic_stars_stay_literal() {
        assert_eq!(
            parse_inline("5 * 3 = 15 and 2 * 4 = 8"),
            vec![text("5 * 3 = 15 and 2 * 4 = 8")]
        );
    }

    #[test]
    fn test_backslash_escapes() {
        assert_eq!(parse_inline(r"\*not italic\*"), vec![text("*not italic*")]);
        assert_eq!(
            parse_inline(r"keep \_this\_ and *that*"),
            vec![
                text("keep _this_ and "),
                InlineSpan::Italic("that".into()),
            ]
        );
    }

    #[test]
    fn test_nested_emphasis() {
        assert_eq!(
            parse_inline("**bold *inner* text**"),
            vec![
                InlineSpan::Bold("bold ".into()),
                InlineSpan::BoldItalic("inner".into()),
                InlineSpan::Bold(" text".into()),
            ]
        );
    }

    #[test]
    fn test_surrounding_whitespace_kept() {
        assert_eq!(parse_inline(" Next sentence."), vec![text(" Next sentence.")]);
        assert_eq!(
            parse_inline(" then *this* "),
            vec![text(" then "), InlineSpan::Italic("this".into()), text(" ")]
        );
    }

    #[test]
    fn test_underscore_word_boundaries() {
        assert_eq!(parse_inline("snake_case_name"), vec![text("snake_case_name")]);
        assert_eq!(
            parse_inline("an _emphasized_ word"),
            vec![
                text("an "),
                InlineSpan::Italic("emphasized".into()),
                text(" word"),
            ]
        );
    }

    #[test]
    fn test_multibyte() {
        assert_eq!(
            parse_inline("**Zellkern** – ✓"),
            vec![InlineSpan::Bold("Zellkern".into()), text(" – ✓")]
        );
    }
}
