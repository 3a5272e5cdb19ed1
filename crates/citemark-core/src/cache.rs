//! Memoized annotation.
//!
//! [`annotate`] is cheap, so caching is purely an optimization for hosts
//! that re-render the same message list repeatedly. Entries are keyed by
//! the SHA-256 of the message text and its JSON-serialized citations, and
//! the oldest entry is evicted once `capacity` is reached.

use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};

use crate::models::{Annotation, Citation};
use crate::pipeline::annotate;

#[derive(Debug)]
pub struct AnnotationCache {
    capacity: usize,
    entries: HashMap<String, Annotation>,
    order: VecDeque<String>,
    hits: u64,
    misses: u64,
}

impl AnnotationCache {
    /// Create a cache holding at most `capacity` annotations (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Same result as [`annotate`], reusing a stored annotation when the
    /// `(text, citations)` pair was seen before.
    pub fn annotate(&mut self, text: &str, citations: &[Citation]) -> Annotation {
        let key = cache_key(text, citations);

        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            tracing::debug!(key = %&key[..12], "annotation cache hit");
            return hit.clone();
        }

        self.misses += 1;
        let annotation = annotate(text, citations);

        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, annotation.clone());

        annotation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

fn cache_key(text: &str, citations: &[Citation]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update([0u8]);
    // Citation only holds strings and numbers, so serialization cannot fail.
    let citations_json = serde_json::to_vec(citations).unwrap_or_default();
    hasher.update(&citations_json);
    format!("{:x}", hasher.finalize())
}
