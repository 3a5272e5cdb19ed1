//! # citemark CLI
//!
//! Annotate chat replies with grouped citation markers, fetch replies from
//! the chat backend, or serve the annotation pipeline over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! citemark --config ./config/citemark.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `citemark annotate [FILE]` | Annotate a saved message (JSON) from a file or stdin |
//! | `citemark ask "<text>"` | Send a message to the backend and render the reply |
//! | `citemark serve` | Start the HTTP annotation service |
//! | `citemark completions <shell>` | Print shell completions |
//!
//! ## Examples
//!
//! ```bash
//! # Render a saved reply as HTML
//! citemark annotate reply.json --format html
//!
//! # Pipe a reply through, expanding one citation
//! cat reply.json | citemark annotate --expand c2
//!
//! # Ask the configured backend
//! citemark ask "What are the phases of mitosis?" --config ./config/citemark.toml
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use citemark::annotate_cmd::{self, RenderOptions};
use citemark::config;
use citemark::server;

/// citemark — citation annotation for RAG chat transcripts.
///
/// Commands that talk to the backend or bind a port read a TOML config
/// file; `annotate` falls back to defaults when the file is missing.
#[derive(Parser)]
#[command(
    name = "citemark",
    about = "citemark — citation annotation for RAG chat transcripts",
    version,
    long_about = "citemark scans assistant replies for citation placeholders ([#N], [CITE:N], \
    CITATION_N), groups adjacent citations, consolidates their source labels, and renders the \
    result as text, HTML, or JSON."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/citemark.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate a message and print the rendered result.
    ///
    /// Reads JSON of the form `{"content": "...", "citations": [...]}`
    /// (the backend's `response` field name is also accepted).
    Annotate {
        /// Message file; reads stdin when omitted or `-`.
        input: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Send a message to the chat backend and render the reply.
    ///
    /// Requires `[backend].url` in the config file.
    Ask {
        /// The message to send.
        text: String,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Start the HTTP annotation service on `[server].bind`.
    Serve,

    /// Print shell completions to stdout.
    Completions {
        /// Shell to generate completions for.
        shell: clap_complete::Shell,
    },
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Output format: `text`, `html`, or `json` (defaults to `[render].format`).
    #[arg(long)]
    format: Option<String>,

    /// Show the full excerpt for this citation id (repeatable).
    #[arg(long = "expand")]
    expand: Vec<String>,

    /// Show full excerpts for every citation.
    #[arg(long)]
    expand_all: bool,
}

impl From<RenderArgs> for RenderOptions {
    fn from(args: RenderArgs) -> Self {
        Self {
            format: args.format,
            expand: args.expand,
            expand_all: args.expand_all,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "citemark=info,citemark_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Commands that don't require a config file
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "citemark", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Annotate { input, render } => {
            let cfg = if cli.config.exists() {
                config::load_config(&cli.config)?
            } else {
                config::Config::default()
            };
            annotate_cmd::run_annotate(&cfg, input.as_deref(), &render.into())?;
            return Ok(());
        }
        command => {
            let cfg = config::load_config(&cli.config)?;
            match command {
                Commands::Ask { text, render } => {
                    annotate_cmd::run_ask(&cfg, &text, &render.into()).await?;
                }
                Commands::Serve => {
                    server::run_server(&cfg).await?;
                }
                Commands::Completions { .. } | Commands::Annotate { .. } => {
                    // Handled above (before config loading)
                    unreachable!()
                }
            }
        }
    }

    Ok(())
}
