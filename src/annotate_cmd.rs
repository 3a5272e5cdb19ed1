//! `citemark annotate` and `citemark ask`.
//!
//! Both commands end the same way: annotate a message, then print it with
//! the selected renderer. `annotate` reads a saved message, `ask` fetches a
//! fresh reply from the chat backend.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use citemark_core::expand::{ExpandAll, ExpandedSet, ExpansionState};
use citemark_core::pipeline::annotate_message;
use citemark_core::Message;

use crate::client::{ChatBackend, HttpChatBackend};
use crate::config::Config;
use crate::render::{render, RenderFormat};

/// Display options shared by the rendering commands.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Overrides `[render].format`.
    pub format: Option<String>,
    /// Citation ids to show expanded.
    pub expand: Vec<String>,
    /// Expand every citation (also enabled by `[render].expand_all`).
    pub expand_all: bool,
}

impl RenderOptions {
    fn resolve_format(&self, config: &Config) -> Result<RenderFormat> {
        self.format
            .as_deref()
            .unwrap_or(config.render.format.as_str())
            .parse()
    }

    fn expansion(&self, config: &Config) -> Box<dyn ExpansionState> {
        if self.expand_all || config.render.expand_all {
            Box::new(ExpandAll)
        } else {
            Box::new(self.expand.iter().cloned().collect::<ExpandedSet>())
        }
    }
}

/// Annotate a message read from `input` (or stdin when `None` or `-`).
///
/// The message is JSON with `content` (or `response`) and `citations`.
pub fn run_annotate(config: &Config, input: Option<&Path>, opts: &RenderOptions) -> Result<()> {
    let raw = read_input(input)?;
    let message = Message::from_json(&raw)?;
    let output = render_message(config, &message, opts)?;
    println!("{}", output);
    Ok(())
}

/// Send `text` to the configured backend and print the annotated reply.
pub async fn run_ask(config: &Config, text: &str, opts: &RenderOptions) -> Result<()> {
    let format = opts.resolve_format(config)?;
    let backend = HttpChatBackend::new(&config.backend)?;
    let reply = backend.send_message(text).await?;

    if reply.citations.is_empty() && !reply.sources.is_empty() {
        eprintln!(
            "Warning: backend returned {} sources but no citations",
            reply.sources.len()
        );
    }

    let message = Message::from(reply);
    let annotation = annotate_message(&message);
    let output = render(&annotation, format, opts.expansion(config).as_ref())?;
    println!("{}", output);
    Ok(())
}

/// Annotate and render one message.
pub fn render_message(config: &Config, message: &Message, opts: &RenderOptions) -> Result<String> {
    let format = opts.resolve_format(config)?;
    let annotation = annotate_message(message);
    render(&annotation, format, opts.expansion(config).as_ref())
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read message file: {}", path.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .with_context(|| "Failed to read message from stdin")?;
            Ok(buf)
        }
    }
}
