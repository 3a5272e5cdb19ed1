//! Citation expansion state.
//!
//! Which citations a reader has expanded is renderer state, not part of
//! annotation. Renderers hold an [`ExpansionState`] and ask it per citation
//! when choosing between `preview` and the longer excerpts (see
//! [`Citation::excerpt`]).

use std::collections::HashSet;

use crate::models::Citation;

pub trait ExpansionState {
    fn is_expanded(&self, citation_id: &str) -> bool;

    /// Excerpt to display for `citation` under this state.
    fn excerpt_for<'a>(&self, citation: &'a Citation) -> &'a str {
        citation.excerpt(self.is_expanded(&citation.id))
    }
}

/// Every citation collapsed.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollapseAll;

impl ExpansionState for CollapseAll {
    fn is_expanded(&self, _citation_id: &str) -> bool {
        false
    }
}

/// Every citation expanded.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandAll;

impl ExpansionState for ExpandAll {
    fn is_expanded(&self, _citation_id: &str) -> bool {
        true
    }
}

/// Explicit set of expanded citation ids.
#[derive(Debug, Clone, Default)]
pub struct ExpandedSet {
    ids: HashSet<String>,
}

impl ExpandedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a citation between expanded and collapsed; returns the new state.
    pub fn toggle(&mut self, citation_id: &str) -> bool {
        if self.ids.remove(citation_id) {
            false
        } else {
            self.ids.insert(citation_id.to_string());
            true
        }
    }
}

impl FromIterator<String> for ExpandedSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl ExpansionState for ExpandedSet {
    fn is_expanded(&self, citation_id: &str) -> bool {
        self.ids.contains(citation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut set = ExpandedSet::new();
        assert!(!set.is_expanded("c1"));
        assert!(set.toggle("c1"));
        assert!(set.is_expanded("c1"));
        assert!(!set.toggle("c1"));
        assert!(!set.is_expanded("c1"));
    }

    #[test]
    fn test_excerpt_for() {
        let c = Citation {
            id: "c1".into(),
            source: "Doc".into(),
            preview: "short".into(),
            full_text: "the whole passage".into(),
            ..Citation::default()
        };
        assert_eq!(CollapseAll.excerpt_for(&c), "short");
        assert_eq!(ExpandAll.excerpt_for(&c), "the whole passage");

        let set: ExpandedSet = vec!["c2".to_string()].into_iter().collect();
        assert_eq!(set.excerpt_for(&c), "short");
    }
}
