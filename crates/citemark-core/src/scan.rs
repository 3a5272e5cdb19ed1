//! Citation placeholder scanner.
//!
//! Assistant messages carry citation placeholders in three surface forms,
//! depending on which backend generation produced them:
//!
//! | Form | Example | Origin |
//! |------|---------|--------|
//! | Legacy bracket | `[#3]` | early prompt templates |
//! | Bracket tag | `[CITE:3]` | current prompt templates |
//! | Backend-emitted | `CITATION_3` | retrieval post-processor |
//!
//! # Algorithm
//!
//! 1. Rewrite every `[#N]` into `[CITE:N]`. This changes the text length,
//!    so it happens before any offset is recorded; all offsets refer to the
//!    rewritten text.
//! 2. Find all `[CITE:N]` matches and all `CITATION_N` matches
//!    independently.
//! 3. Merge both lists and stable-sort by start offset.
//!
//! Malformed placeholders (`[CITE:]`, `[#]`) do not match and stay literal
//! text. An index of `0`, or one too large for `usize`, is also left as
//! literal text, so every token carries `citation_index >= 1`.
//!
//! # Example
//!
//! ```rust
//! use citemark_core::scan::scan;
//!
//! let scanned = scan("Cells divide [#1] via mitosis CITATION_2.");
//! assert_eq!(scanned.text, "Cells divide [CITE:1] via mitosis CITATION_2.");
//! let indices: Vec<usize> = scanned.tokens.iter().map(|t| t.citation_index).collect();
//! assert_eq!(indices, vec![1, 2]);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::CitationToken;

static LEGACY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[#([0-9]+)\]").unwrap());
static CITE_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[CITE:([0-9]+)\]").unwrap());
static BACKEND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"CITATION_([0-9]+)").unwrap());

/// Output of [`scan`]: the normalized text and the tokens found in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Scanned {
    pub text: String,
    pub tokens: Vec<CitationToken>,
}

/// Rewrite legacy `[#N]` placeholders into `[CITE:N]`.
///
/// Every other character is preserved.
pub fn normalize_tokens(text: &str) -> String {
    LEGACY_RE.replace_all(text, "[CITE:${1}]").into_owned()
}

/// Normalize `text` and return every citation token in source order.
pub fn scan(text: &str) -> Scanned {
    let normalized = normalize_tokens(text);

    let mut tokens: Vec<CitationToken> = Vec::new();
    collect_matches(&CITE_TAG_RE, &normalized, &mut tokens);
    collect_matches(&BACKEND_RE, &normalized, &mut tokens);

    tokens.sort_by_key(|t| t.match_start);

    Scanned {
        text: normalized,
        tokens,
    }
}

fn collect_matches(re: &Regex, text: &str, out: &mut Vec<CitationToken>) {
    for caps in re.captures_iter(text) {
        let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        match digits.as_str().parse::<usize>() {
            Ok(n) if n >= 1 => out.push(CitationToken {
                citation_index: n,
                match_start: whole.start(),
                match_end: whole.end(),
            }),
            _ => {
                tracing::debug!(token = whole.as_str(), "ignoring citation token with invalid index");
            }
        }
    }
}
