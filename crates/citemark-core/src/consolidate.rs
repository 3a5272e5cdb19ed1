//! Source consolidator.
//!
//! Retrieval often cites the same document several times under slightly
//! different labels, or mixes a real label with a fallback
//! (`"Source 3"`). Within a group, the most frequent real source label wins
//! and every citation in the group is relabelled with it, so the marker
//! presents one coherent source.
//!
//! Ties go to the label encountered first in group order.

use crate::models::CitationGroup;

/// Relabel a multi-citation group with its majority real source.
///
/// Single-citation groups, and groups made up only of fallbacks, come back
/// unchanged. The group owns its citations, so relabelling never reaches
/// the caller's citation list or any other group.
pub fn consolidate(mut group: CitationGroup) -> CitationGroup {
    if group.citations.len() <= 1 {
        return group;
    }

    let Some(winner) = majority_source(&group) else {
        return group;
    };

    for citation in &mut group.citations {
        if citation.source != winner {
            citation.source.clone_from(&winner);
        }
    }

    group
}

/// Most frequent non-fallback source in the group, first-encountered on ties.
fn majority_source(group: &CitationGroup) -> Option<String> {
    // (source, count) in first-encountered order.
    let mut tally: Vec<(&str, usize)> = Vec::new();

    for citation in group.citations.iter().filter(|c| !c.is_fallback()) {
        match tally.iter_mut().find(|(s, _)| *s == citation.source) {
            Some((_, count)) => *count += 1,
            None => tally.push((&citation.source, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (source, count) in tally {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((source, count));
        }
    }

    best.map(|(source, _)| source.to_string())
}
