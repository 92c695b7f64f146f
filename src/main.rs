//! # docvault CLI
//!
//! The `docvault` binary is the front end of the client. Every command runs
//! through the same controllers the interactive shell uses.
//!
//! ## Usage
//!
//! ```bash
//! docvault --config ./config/docvault.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docvault list` | Show all documents and stats |
//! | `docvault stats` | Show totals per file type |
//! | `docvault upload <paths...>` | Upload files (directories are expanded) |
//! | `docvault search "<query>"` | Search with scope, toggles and filters |
//! | `docvault get <id>` | Show one document with its extracted text |
//! | `docvault delete <id>` | Delete a document |
//! | `docvault health` | Check that the service answers |
//! | `docvault shell` | Interactive session with drag-and-drop upload |
//!
//! Logging goes to stderr, filtered by `DOCVAULT_LOG` (default `warn`).
//! The first Ctrl-C cancels in-flight requests, the second exits.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use docvault::api::HttpBackend;
use docvault::config;
use docvault::models::SearchType;
use docvault::progress::ProgressMode;
use docvault::render;
use docvault::search::SearchOutcome;
use docvault::session::Session;
use docvault::shell;
use docvault::upload::collect_upload_paths;

/// docvault: upload, search and read documents held by a document service.
#[derive(Parser)]
#[command(
    name = "docvault",
    about = "docvault: terminal client for a confidential-document search service",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/docvault.toml`. When the file does not exist,
    /// built-in defaults are used. `DOCVAULT_BACKEND_URL` overrides the
    /// service URL either way.
    #[arg(long, global = true, default_value = "./config/docvault.toml")]
    config: PathBuf,

    /// Upload progress output. Defaults to `human` on a terminal, `off` otherwise.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all documents, followed by corpus stats.
    List,

    /// Show document totals per file type.
    Stats,

    /// Upload files, one at a time.
    ///
    /// Directories are searched recursively for PDF, DOCX and TXT files.
    /// A failing file is reported and the remaining files are still sent.
    Upload {
        /// Files or directories to upload.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Search the corpus.
    Search {
        /// The search query string.
        query: String,

        /// Field to search: all, title, author, publisher, content, keywords.
        #[arg(long = "in")]
        scope: Option<SearchType>,

        /// Force fuzzy matching on.
        #[arg(long, conflicts_with = "exact")]
        fuzzy: bool,

        /// Force fuzzy matching off.
        #[arg(long)]
        exact: bool,

        /// Interpret AND / OR in the query.
        #[arg(long)]
        boolean: bool,

        /// Only documents of this type (PDF, DOCX, TXT).
        #[arg(long = "type")]
        file_type: Option<String>,

        /// Only documents uploaded on or after this date (YYYY-MM-DD).
        #[arg(long)]
        from: Option<String>,

        /// Only documents uploaded on or before this date (YYYY-MM-DD).
        #[arg(long)]
        to: Option<String>,
    },

    /// Show a document with its full extracted text.
    Get {
        /// Document id.
        id: String,
    },

    /// Delete a document.
    Delete {
        /// Document id.
        id: String,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Check that the service is reachable.
    Health,

    /// Start an interactive session.
    Shell,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("DOCVAULT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let cfg = config::load_or_default(&cli.config)?;
    let backend = Arc::new(
        HttpBackend::new(&cfg.backend, cfg.upload.chunk_size)
            .context("Failed to build HTTP client")?,
    );
    tracing::debug!(base_url = backend.base_url(), "using document service");

    let canceller = backend.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel_in_flight();
            eprintln!("Cancelled in-flight requests. Press Ctrl-C again to exit.");
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });

    let progress = cli.progress.unwrap_or_else(ProgressMode::default_for_tty);
    let session = Session::from_config(&cfg, backend.clone(), progress.reporter());

    match cli.command {
        Commands::List => {
            session.startup().await;
            let state = session.snapshot();
            render::print_documents(&state.documents, "");
            render::print_stats(&state.stats);
        }
        Commands::Stats => {
            session.store.refresh_stats().await;
            render::print_stats(&session.snapshot().stats);
        }
        Commands::Upload { paths } => {
            let paths = collect_upload_paths(&paths);
            if paths.is_empty() {
                println!("Nothing to upload.");
                return Ok(());
            }

            let report = session.uploads.upload_paths(&paths).await;
            render::print_alerts(&session.take_alerts());

            for doc in report.uploaded() {
                println!("uploaded {}  id: {}", doc.title, doc.id);
            }
            let failed = report.failed().count();
            println!(
                "upload: {} ok, {} failed",
                report.uploaded().count(),
                failed
            );
            if report.all_failed() {
                bail!("no files were uploaded");
            }
        }
        Commands::Search {
            query,
            scope,
            fuzzy,
            exact,
            boolean,
            file_type,
            from,
            to,
        } => {
            let search = &session.search;
            if let Some(scope) = scope {
                search.set_scope(scope);
            }
            if fuzzy {
                search.set_fuzzy(true);
            }
            if exact {
                search.set_fuzzy(false);
            }
            if boolean {
                search.set_boolean_mode(true);
            }
            if let Some(raw) = file_type {
                search.set_file_type_filter(&raw).map_err(anyhow::Error::msg)?;
            }
            if let Some(raw) = from {
                search.set_date_from(&raw).map_err(anyhow::Error::msg)?;
            }
            if let Some(raw) = to {
                search.set_date_to(&raw).map_err(anyhow::Error::msg)?;
            }

            match search.search(&query).await {
                SearchOutcome::Applied { search_time, .. } => {
                    render::print_results(&session.snapshot(), search_time);
                }
                SearchOutcome::Cleared | SearchOutcome::Superseded => {
                    println!("No results.");
                }
                SearchOutcome::Failed { .. } => {
                    render::print_alerts(&session.take_alerts());
                    bail!("search failed");
                }
            }
        }
        Commands::Get { id } => match session.viewer.open(&id).await {
            Some(doc) => render::print_viewer(&doc),
            None => {
                render::print_alerts(&session.take_alerts());
                bail!("could not load document {}", id);
            }
        },
        Commands::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete document {}?", id))? {
                println!("Delete cancelled.");
                return Ok(());
            }
            if !session.delete(&id).await {
                render::print_alerts(&session.take_alerts());
                bail!("delete failed");
            }
            println!("Deleted {}.", id);
        }
        Commands::Health => {
            let ack = backend
                .health()
                .await
                .with_context(|| format!("service at {} is not reachable", backend.base_url()))?;
            println!("ok: {}", ack.message);
        }
        Commands::Shell => {
            shell::run_shell(session).await?;
        }
    }

    Ok(())
}
