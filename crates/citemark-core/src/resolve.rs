//! Citation resolver.
//!
//! Maps a token's 1-based index to a working copy of the matching
//! [`Citation`], or to a synthesized fallback when the message references
//! an index the backend never supplied. Resolution never fails, so later
//! stages need no null checks. A record that arrives with a blank `source`
//! is labelled like a fallback so every marker has a badge.

use crate::models::{Citation, CitationToken};

/// Resolve one token against the message's citation list.
///
/// Returns a clone; the caller's list is never touched, because the
/// source consolidator rewrites `source` on these copies.
pub fn resolve(token: &CitationToken, citations: &[Citation]) -> Citation {
    debug_assert!(
        token.citation_index >= 1,
        "scanner emitted citation index 0"
    );

    match token
        .citation_index
        .checked_sub(1)
        .and_then(|idx| citations.get(idx))
    {
        Some(citation) if citation.source.trim().is_empty() => {
            tracing::debug!(
                index = token.citation_index,
                id = %citation.id,
                "citation has no source label, using fallback label"
            );
            Citation {
                source: format!("Source {}", token.citation_index),
                ..citation.clone()
            }
        }
        Some(citation) => citation.clone(),
        None => {
            tracing::debug!(
                index = token.citation_index,
                available = citations.len(),
                "citation index out of range, using fallback"
            );
            Citation::fallback(token.citation_index)
        }
    }
}

/// Resolve every token, returning citations parallel to `tokens`.
pub fn resolve_all(tokens: &[CitationToken], citations: &[Citation]) -> Vec<Citation> {
    tokens.iter().map(|t| resolve(t, citations)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(index: usize) -> CitationToken {
        CitationToken {
            citation_index: index,
            match_start: 0,
            match_end: 0,
        }
    }

    fn citations() -> Vec<Citation> {
        vec![
            Citation {
                id: "c1".into(),
                source: "Cell Biology.pdf".into(),
                preview: "Mitosis is...".into(),
                relevance_score: 0.92,
                ..Citation::default()
            },
            Citation {
                id: "c2".into(),
                source: "Genetics Lecture 4".into(),
                relevance_score: 0.71,
                ..Citation::default()
            },
        ]
    }

    #[test]
    fn test_in_range() {
        let list = citations();
        assert_eq!(resolve(&token(1), &list), list[0]);
        assert_eq!(resolve(&token(2), &list), list[1]);
    }

    #[test]
    fn test_out_of_range_fallback() {
        let list = citations();
        let c = resolve(&token(3), &list);
        assert_eq!(c.source, "Source 3");
        assert_eq!(c.id, "fallback-3");
        assert!((c.relevance_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_list_all_fallback() {
        let resolved = resolve_all(&[token(1), token(2)], &[]);
        assert_eq!(resolved[0].source, "Source 1");
        assert_eq!(resolved[1].source, "Source 2");
    }

    #[test]
    fn test_blank_source_gets_fallback_label() {
        let list: Vec<Citation> = serde_json::from_str(r#"[{"id": "c1"}, {"id": "c2", "source": "  "}]"#).unwrap();
        let first = resolve(&token(1), &list);
        assert_eq!(first.id, "c1");
        assert_eq!(first.source, "Source 1");
        assert_eq!(resolve(&token(2), &list).source, "Source 2");
    }

    #[test]
    fn test_resolve_does_not_alias_input() {
        let list = citations();
        let mut resolved = resolve(&token(1), &list);
        resolved.source = "Rewritten".into();
        assert_eq!(list[0].source, "Cell Biology.pdf");
    }
}
