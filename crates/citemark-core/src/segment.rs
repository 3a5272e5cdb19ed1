//! Segment builder.
//!
//! Walks the citation groups in order with a single cursor and splits the
//! normalized text into [`RenderSegment`]s: plain text, citation markers,
//! and the two paragraph breaks that follow every marker.
//!
//! # Punctuation reflow
//!
//! A marker should not visually precede the sentence punctuation it
//! belongs to. When the character right after a group is one of
//! `. ! ? , : ;`, that character moves in front of the marker:
//!
//! ```text
//! "See [CITE:1]. Next sentence."
//!   → "See." " " [marker] ¶ ¶ " Next sentence."
//! ```
//!
//! Only one character is moved. In `"[CITE:1]?!"` the `?` moves and the
//! `!` stays in the following text.

use crate::models::{CitationGroup, RenderSegment};

/// Characters that reflow in front of a citation marker.
pub const REFLOW_PUNCTUATION: [char; 6] = ['.', '!', '?', ',', ':', ';'];

/// Split `text` around `groups` into an ordered segment list.
///
/// `groups` must be ordered by `start_offset`, non-overlapping, and
/// carry offsets into `text`. With no groups the result is exactly one
/// text segment holding all of `text`, even when `text` is empty.
pub fn build(text: &str, groups: Vec<CitationGroup>) -> Vec<RenderSegment> {
    if groups.is_empty() {
        return vec![RenderSegment::text(text)];
    }

    let mut segments = Vec::with_capacity(groups.len() * 5 + 1);
    let mut last = 0usize;

    for group in groups {
        let start = group.start_offset.max(last);
        let end = group.end_offset;
        let before = &text[last..start];

        match trailing_punctuation(text, end) {
            Some(punct) => {
                let mut lead = before.trim_end().to_string();
                lead.push(punct);
                segments.push(RenderSegment::Text { text: lead });
                segments.push(RenderSegment::text(" "));
                push_marker(&mut segments, group);
                last = end + punct.len_utf8();
            }
            None => {
                if !before.is_empty() {
                    segments.push(RenderSegment::text(before));
                }
                push_marker(&mut segments, group);
                last = end;
            }
        }
    }

    if last < text.len() {
        segments.push(RenderSegment::text(&text[last..]));
    }

    segments
}

fn push_marker(segments: &mut Vec<RenderSegment>, group: CitationGroup) {
    segments.push(RenderSegment::Citation { group });
    segments.push(RenderSegment::Break);
    segments.push(RenderSegment::Break);
}

/// The reflowable punctuation character at byte offset `at`, if any.
fn trailing_punctuation(text: &str, at: usize) -> Option<char> {
    text.get(at..)
        .and_then(|rest| rest.chars().next())
        .filter(|c| REFLOW_PUNCTUATION.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::group;
    use crate::resolve::resolve_all;
    use crate::scan::scan;

    fn segments_for(text: &str) -> Vec<RenderSegment> {
        let scanned = scan(text);
        let resolved = resolve_all(&scanned.tokens, &[]);
        let groups = group(&scanned.tokens, &resolved, &scanned.text);
        build(&scanned.text, groups)
    }

    /// Compact view: text verbatim, `@N` for a group starting at index N, `|` for a break.
    fn shape(segments: &[RenderSegment]) -> Vec<String> {
        segments
            .iter()
            .map(|s| match s {
                RenderSegment::Text { text } => text.clone(),
                RenderSegment::Citation { group } => format!("@{}", group.indices[0]),
                RenderSegment::Break => "|".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_no_groups_pass_through() {
        assert_eq!(
            build("Just an answer.", Vec::new()),
            vec![RenderSegment::text("Just an answer.")]
        );
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(build("", Vec::new()), vec![RenderSegment::text("")]);
    }

    #[test]
    fn test_punctuation_reflow() {
        let segments = segments_for("See [CITE:1]. Next sentence.");
        assert_eq!(
            shape(&segments),
            vec!["See.", " ", "@1", "|", "|", " Next sentence."]
        );
    }

    #[test]
    fn test_reflow_trims_whitespace_before_marker() {
        let segments = segments_for("Mitosis   [CITE:1], then more");
        assert_eq!(
            shape(&segments),
            vec!["Mitosis,", " ", "@1", "|", "|", " then more"]
        );
    }

    #[test]
    fn test_each_reflow_character() {
        for p in REFLOW_PUNCTUATION {
            let text = format!("Word [CITE:1]{} tail", p);
            let segments = segments_for(&text);
            assert_eq!(segments[0], RenderSegment::text(format!("Word{}", p)));
            assert_eq!(segments.last(), Some(&RenderSegment::text(" tail")));
        }
    }

    #[test]
    fn test_no_punctuation() {
        let segments = segments_for("Cells divide [CITE:1] rapidly");
        assert_eq!(
            shape(&segments),
            vec!["Cells divide ", "@1", "|", "|", " rapidly"]
        );
    }

    #[test]
    fn test_leading_token_with_punctuation() {
        let segments = segments_for("[CITE:1]. Starts here");
        assert_eq!(shape(&segments), vec![".", " ", "@1", "|", "|", " Starts here"]);
    }

    #[test]
    fn test_leading_token_without_punctuation() {
        let segments = segments_for("[CITE:1] Starts here");
        assert_eq!(shape(&segments), vec!["@1", "|", "|", " Starts here"]);
    }

    #[test]
    fn test_trailing_token_at_end_of_text() {
        let segments = segments_for("Ends with a cite [CITE:1]");
        assert_eq!(shape(&segments), vec!["Ends with a cite ", "@1", "|", "|"]);

        let segments = segments_for("Ends with a cite [CITE:1].");
        assert_eq!(shape(&segments), vec!["Ends with a cite.", " ", "@1", "|", "|"]);
    }

    #[test]
    fn test_only_first_punctuation_moves() {
        let segments = segments_for("Really [CITE:1]?! Yes.");
        assert_eq!(
            shape(&segments),
            vec!["Really?", " ", "@1", "|", "|", "! Yes."]
        );
    }

    #[test]
    fn test_back_to_back_groups_with_punctuation() {
        let segments = segments_for("A [CITE:1]. B [CITE:2].");
        assert_eq!(
            shape(&segments),
            vec!["A.", " ", "@1", "|", "|", " B.", " ", "@2", "|", "|"]
        );
    }

    #[test]
    fn test_grouped_marker_carries_all_indices() {
        let segments = segments_for("Fact [CITE:1] [CITE:2]. Done");
        let group = segments.iter().find_map(RenderSegment::as_group).unwrap();
        assert_eq!(group.indices, vec![1, 2]);
        assert_eq!(shape(&segments)[0], "Fact.");
    }
}
