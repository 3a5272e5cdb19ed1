//! # citemark
//!
//! Citation annotation for RAG chat transcripts.
//!
//! Assistant replies from the chat backend carry citation placeholders
//! (`[#N]`, `[CITE:N]`, `CITATION_N`) and a list of citation records.
//! citemark turns them into ordered render segments: text interleaved with
//! grouped citation markers, with duplicate sources consolidated and
//! sentence punctuation moved in front of the marker. The pipeline itself
//! lives in [`citemark_core`]; this crate wraps it for the command line and
//! for HTTP clients.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────────┐   ┌──────────────┐
//! │ Chat backend │──▶│    citemark-core      │──▶│  Renderers   │
//! │ sendMessage  │   │ scan→group→build      │   │ text/html/json│
//! └──────────────┘   └──────────┬────────────┘   └──────┬───────┘
//!                               │                       │
//!                       ┌───────┴───────┐        ┌──────┴─────┐
//!                       │  HTTP (axum)  │        │ CLI        │
//!                       │  /annotate    │        │ (citemark) │
//!                       └───────────────┘        └────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`client`] | Chat backend client |
//! | [`render`] | Text, HTML, and JSON renderers |
//! | [`server`] | HTTP annotation service |
//! | [`annotate_cmd`] | `annotate` and `ask` commands |

pub mod annotate_cmd;
pub mod client;
pub mod config;
pub mod render;
pub mod server;
