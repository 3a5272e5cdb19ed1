//! Core data models for the citation-annotation pipeline.
//!
//! [`Citation`] records arrive from the chat backend and are treated as
//! read-only input. [`CitationToken`] and [`CitationGroup`] are transient
//! values produced while a message is being annotated, and
//! [`RenderSegment`] is the output handed to whatever draws the message.
//!
//! All offsets are UTF-8 byte offsets into the *normalized* message text
//! (see [`crate::scan::normalize_tokens`]) and always fall on char
//! boundaries.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Relevance score assigned to synthesized fallback citations.
pub const FALLBACK_RELEVANCE: f64 = 0.5;

/// A source reference attached to an assistant message.
///
/// `source` is the human-readable document label and is never empty.
/// `preview`, `summary` and `full_text` are increasingly detailed excerpts;
/// which one is shown depends on the renderer's expansion state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Citation {
    pub id: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub preview: String,
    pub summary: String,
    #[serde(alias = "fullText")]
    pub full_text: String,
    #[serde(alias = "relevanceScore")]
    pub relevance_score: f64,
}

impl Citation {
    /// Synthesize the placeholder record used when a token references an
    /// index with no corresponding entry in the citation list.
    pub fn fallback(citation_index: usize) -> Self {
        Self {
            id: format!("fallback-{}", citation_index),
            source: format!("Source {}", citation_index),
            relevance_score: FALLBACK_RELEVANCE,
            ..Self::default()
        }
    }

    /// True when `source` has the `"Source {digits}"` shape of a fallback
    /// label rather than a real document name.
    pub fn is_fallback(&self) -> bool {
        is_fallback_source(&self.source)
    }

    /// Pick the excerpt to display for this citation.
    ///
    /// Expanded citations prefer `full_text`, then `summary`; collapsed
    /// citations (and expanded ones with no longer text) show `preview`.
    pub fn excerpt(&self, expanded: bool) -> &str {
        if expanded {
            if !self.full_text.is_empty() {
                return &self.full_text;
            }
            if !self.summary.is_empty() {
                return &self.summary;
            }
        }
        &self.preview
    }
}

/// Matches `Source 12` but not `Source`, `Source 1a`, or `My Source 1`.
pub fn is_fallback_source(source: &str) -> bool {
    match source.strip_prefix("Source ") {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// A single scanned placeholder occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationToken {
    /// 1-based index into the message's citation list.
    pub citation_index: usize,
    pub match_start: usize,
    pub match_end: usize,
}

/// One or more adjacent citation tokens rendered as a single marker.
///
/// Invariant: `citations.len() == indices.len() >= 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationGroup {
    pub citations: Vec<Citation>,
    pub indices: Vec<usize>,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl CitationGroup {
    /// Open a group seeded with a single resolved token.
    pub fn new(token: &CitationToken, citation: Citation) -> Self {
        Self {
            citations: vec![citation],
            indices: vec![token.citation_index],
            start_offset: token.match_start,
            end_offset: token.match_end,
        }
    }

    /// Append a token to the group and extend its span.
    pub fn push(&mut self, token: &CitationToken, citation: Citation) {
        self.citations.push(citation);
        self.indices.push(token.citation_index);
        self.end_offset = token.match_end;
    }

    pub fn len(&self) -> usize {
        self.citations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }

    /// Number of citations beyond the first (the `N` in `"+N"`).
    pub fn extra_count(&self) -> usize {
        self.citations.len().saturating_sub(1)
    }

    /// Badge text: the first citation's source, plus `" +N"` for groups.
    pub fn label(&self) -> String {
        let source = self
            .citations
            .first()
            .map(|c| c.source.as_str())
            .unwrap_or_default();
        match self.extra_count() {
            0 => source.to_string(),
            n => format!("{} +{}", source, n),
        }
    }
}

/// The smallest unit handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RenderSegment {
    /// Literal message text.
    Text { text: String },
    /// A grouped citation badge.
    Citation { group: CitationGroup },
    /// Paragraph break; every citation marker is followed by two.
    Break,
}

impl RenderSegment {
    pub fn text(text: impl Into<String>) -> Self {
        RenderSegment::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RenderSegment::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&CitationGroup> {
        match self {
            RenderSegment::Citation { group } => Some(group),
            _ => None,
        }
    }
}

/// Result of annotating one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Message text after `[#N]` tokens were rewritten to `[CITE:N]`.
    pub text: String,
    pub segments: Vec<RenderSegment>,
}

impl Annotation {
    /// All citation groups in display order.
    pub fn groups(&self) -> impl Iterator<Item = &CitationGroup> {
        self.segments.iter().filter_map(RenderSegment::as_group)
    }

    /// Concatenated text segments, with markers and breaks dropped.
    pub fn text_content(&self) -> String {
        self.segments
            .iter()
            .filter_map(RenderSegment::as_text)
            .collect()
    }
}

/// Reply from the chat backend's `sendMessage` endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    /// Opaque source descriptors; shape is owned by the backend.
    #[serde(default)]
    pub sources: Vec<serde_json::Value>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl ChatResponse {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).with_context(|| "Failed to parse chat response")
    }
}

/// A message to annotate: content plus its citation list.
///
/// Accepts either `content` or the backend's `response` field name, so a
/// saved [`ChatResponse`] can be fed in directly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(alias = "response")]
    pub content: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl Message {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).with_context(|| "Failed to parse message JSON")
    }
}

impl From<ChatResponse> for Message {
    fn from(resp: ChatResponse) -> Self {
        Self {
            content: resp.response,
            citations: resp.citations,
        }
    }
}
