//! Segment renderers.
//!
//! Turn an [`Annotation`] into something a terminal, a web view, or another
//! program can consume. Renderers only decide how a citation marker looks;
//! segment structure always comes from the core pipeline.
//!
//! | Format | Text | Marker | Break |
//! |--------|------|--------|-------|
//! | `text` | verbatim | `[Label +N]` | `\n` |
//! | `html` | escaped, inline markdown applied | `<span class="citation">` | `<br>` |
//! | `json` | the serialized [`Annotation`] | | |

use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

use citemark_core::expand::ExpansionState;
use citemark_core::inline::{parse_inline, InlineSpan};
use citemark_core::{Annotation, CitationGroup, RenderSegment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    Text,
    Html,
    Json,
}

impl FromStr for RenderFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(RenderFormat::Text),
            "html" => Ok(RenderFormat::Html),
            "json" => Ok(RenderFormat::Json),
            other => bail!("Unknown render format: '{}'. Use text, html, or json.", other),
        }
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderFormat::Text => "text",
            RenderFormat::Html => "html",
            RenderFormat::Json => "json",
        };
        f.write_str(name)
    }
}

/// Render `annotation` in the given format.
pub fn render(
    annotation: &Annotation,
    format: RenderFormat,
    expansion: &dyn ExpansionState,
) -> Result<String> {
    match format {
        RenderFormat::Text => Ok(render_text(annotation)),
        RenderFormat::Html => Ok(render_html(annotation, expansion)),
        RenderFormat::Json => Ok(serde_json::to_string_pretty(annotation)?),
    }
}

pub fn render_text(annotation: &Annotation) -> String {
    let mut out = String::new();
    for segment in &annotation.segments {
        match segment {
            RenderSegment::Text { text } => out.push_str(text),
            RenderSegment::Citation { group } => {
                out.push('[');
                out.push_str(&group.label());
                out.push(']');
            }
            RenderSegment::Break => out.push('\n'),
        }
    }
    out
}

pub fn render_html(annotation: &Annotation, expansion: &dyn ExpansionState) -> String {
    let mut out = String::new();
    for segment in &annotation.segments {
        match segment {
            RenderSegment::Text { text } => push_inline_html(&mut out, text),
            RenderSegment::Citation { group } => push_marker_html(&mut out, group, expansion),
            RenderSegment::Break => out.push_str("<br>"),
        }
    }
    out
}

fn push_inline_html(out: &mut String, text: &str) {
    for span in parse_inline(text) {
        let (open, close) = match span {
            InlineSpan::Text(_) => ("", ""),
            InlineSpan::Bold(_) => ("<strong>", "</strong>"),
            InlineSpan::Italic(_) => ("<em>", "</em>"),
            InlineSpan::BoldItalic(_) => ("<strong><em>", "</em></strong>"),
            InlineSpan::Code(_) => ("<code>", "</code>"),
        };
        out.push_str(open);
        out.push_str(&escape_html(span.content()));
        out.push_str(close);
    }
}

fn push_marker_html(out: &mut String, group: &CitationGroup, expansion: &dyn ExpansionState) {
    let ids: Vec<&str> = group.citations.iter().map(|c| c.id.as_str()).collect();
    let indices: Vec<String> = group.indices.iter().map(|i| i.to_string()).collect();
    let title: Vec<String> = group
        .citations
        .iter()
        .map(|c| {
            let excerpt = expansion.excerpt_for(c);
            if excerpt.is_empty() {
                c.source.clone()
            } else {
                format!("{}: {}", c.source, excerpt)
            }
        })
        .collect();

    out.push_str(&format!(
        r#"<span class="citation" data-citation-ids="{}" data-indices="{}" title="{}">{}</span>"#,
        escape_html(&ids.join(" ")),
        indices.join(","),
        escape_html(&title.join(" | ")),
        escape_html(&group.label()),
    ));
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
