//! Adjacency grouper.
//!
//! Consecutive citations such as `[CITE:1] [CITE:2][CITE:3]` render as one
//! marker with a `+N` suffix. Two tokens belong to the same group when the
//! text between the open group's end and the next token's start is at most
//! [`GROUP_GAP_CHARS`] characters long. Three characters absorb a markdown
//! space or an empty bracket artifact, but not real sentence text.

use crate::models::{Citation, CitationGroup, CitationToken};

/// Maximum separator length, in characters, between grouped tokens.
pub const GROUP_GAP_CHARS: usize = 3;

/// Merge adjacent tokens into citation groups.
///
/// `resolved` must be parallel to `tokens` (see
/// [`crate::resolve::resolve_all`]). `text` is the normalized message the
/// token offsets refer to; it is only used to measure gaps in characters.
pub fn group(tokens: &[CitationToken], resolved: &[Citation], text: &str) -> Vec<CitationGroup> {
    debug_assert_eq!(tokens.len(), resolved.len());

    let mut groups = Vec::new();
    let mut current: Option<CitationGroup> = None;

    for (token, citation) in tokens.iter().zip(resolved) {
        let adjacent = current.as_ref().is_some_and(|open| {
            gap_chars(text, open.end_offset, token.match_start) <= GROUP_GAP_CHARS
        });

        if adjacent {
            if let Some(open) = current.as_mut() {
                open.push(token, citation.clone());
            }
        } else if let Some(done) = current.replace(CitationGroup::new(token, citation.clone())) {
            groups.push(done);
        }
    }

    if let Some(done) = current {
        groups.push(done);
    }

    groups
}

/// Character count of `text[from..to]`; zero when the range is empty.
fn gap_chars(text: &str, from: usize, to: usize) -> usize {
    if to <= from {
        return 0;
    }
    text.get(from..to)
        .map(|gap| gap.chars().count())
        .unwrap_or(to - from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve_all;
    use crate::scan::scan;

    fn groups_for(text: &str) -> Vec<CitationGroup> {
        let scanned = scan(text);
        let resolved = resolve_all(&scanned.tokens, &[]);
        group(&scanned.tokens, &resolved, &scanned.text)
    }

    #[test]
    fn test_no_tokens_no_groups() {
        assert!(groups_for("nothing cited").is_empty());
    }

    #[test]
    fn test_touching_tokens_grouped() {
        let groups = groups_for("Fact [CITE:1][CITE:2][CITE:3] end");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].indices, vec![1, 2, 3]);
        assert_eq!(groups[0].citations.len(), 3);
    }

    #[test]
    fn test_gap_of_three_is_grouped() {
        let text = "x [CITE:1]   [CITE:2]";
        let groups = groups_for(text);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].start_offset, 2);
        assert_eq!(groups[0].end_offset, text.len());
    }

    #[test]
    fn test_gap_of_four_is_not_grouped() {
        let groups = groups_for("x [CITE:1]    [CITE:2]");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].indices, vec![1]);
        assert_eq!(groups[1].indices, vec![2]);
    }

    #[test]
    fn test_gap_measured_in_chars() {
        // Three non-ASCII chars occupy more than three bytes.
        let groups = groups_for("x [CITE:1]—–—[CITE:2]");
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_mixed_formats_grouped() {
        let groups = groups_for("Result [#1], CITATION_2 and later [CITE:3].");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].indices, vec![1, 2]);
        assert_eq!(groups[1].indices, vec![3]);
    }

    #[test]
    fn test_groups_ordered_and_disjoint() {
        let groups = groups_for("[CITE:1] a long way apart [CITE:2] and again [CITE:3]");
        assert_eq!(groups.len(), 3);
        for pair in groups.windows(2) {
            assert!(pair[0].end_offset <= pair[1].start_offset);
        }
        for g in &groups {
            assert_eq!(g.citations.len(), g.indices.len());
        }
    }
}
