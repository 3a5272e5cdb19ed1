//! End-to-end annotation: scan → resolve → group → consolidate → build.
//!
//! This is the one entry point every rendering surface calls. Surfaces
//! differ only in how they draw a [`RenderSegment::Citation`], never in
//! how the segments are produced.
//!
//! # Example
//!
//! ```rust
//! use citemark_core::models::{Citation, RenderSegment};
//! use citemark_core::pipeline::annotate;
//!
//! let citations = vec![Citation {
//!     id: "c1".into(),
//!     source: "Cell Biology.pdf".into(),
//!     ..Citation::default()
//! }];
//! let annotation = annotate("Cells divide [#1].", &citations);
//!
//! assert_eq!(annotation.segments[0], RenderSegment::text("Cells divide."));
//! let group = annotation.groups().next().unwrap();
//! assert_eq!(group.label(), "Cell Biology.pdf");
//! ```

use crate::consolidate::consolidate;
use crate::group::group;
use crate::models::{Annotation, Citation, Message};
use crate::resolve::resolve_all;
use crate::scan::scan;
use crate::segment::build;

/// Annotate a raw assistant message against its citation list.
///
/// Pure and infallible: calling it twice with equal inputs yields equal
/// output, and `citations` is never modified.
pub fn annotate(text: &str, citations: &[Citation]) -> Annotation {
    let scanned = scan(text);
    let resolved = resolve_all(&scanned.tokens, citations);
    let groups = group(&scanned.tokens, &resolved, &scanned.text)
        .into_iter()
        .map(consolidate)
        .collect();
    let segments = build(&scanned.text, groups);

    Annotation {
        text: scanned.text,
        segments,
    }
}

/// Annotate a stored or freshly received message. Backend replies convert
/// with `Message::from(ChatResponse)`.
pub fn annotate_message(message: &Message) -> Annotation {
    annotate(&message.content, &message.citations)
}
