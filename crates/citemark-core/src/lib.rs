//! # citemark Core
//!
//! Shared, WASM-safe citation-annotation logic for citemark: data models,
//! token scanning, citation resolution, adjacency grouping, source
//! consolidation, and segment building.
//!
//! This crate contains no tokio, networking, filesystem I/O, or other
//! native-only dependencies, so the desktop and mobile chat surfaces can
//! link the same pipeline.
//!
//! ```text
//! raw text + citations
//!   → scan → resolve → group → consolidate → build
//!   → Vec<RenderSegment>
//! ```

pub mod cache;
pub mod consolidate;
pub mod expand;
pub mod group;
pub mod inline;
pub mod models;
pub mod pipeline;
pub mod resolve;
pub mod scan;
pub mod segment;

pub use models::{Annotation, ChatResponse, Citation, CitationGroup, Message, RenderSegment};
pub use pipeline::annotate;
