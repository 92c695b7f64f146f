//! Interactive session.
//!
//! Reads commands from stdin and drives the session controllers. Dragging
//! files onto a terminal window pastes their paths; a line made up only of
//! existing file paths is therefore treated as a drag-and-drop and routed
//! through the [`DragDropOverlay`](crate::overlay::DragDropOverlay).

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::models::SearchType;
use crate::overlay::DragSignal;
use crate::render;
use crate::search::SearchOutcome;
use crate::session::Session;
use crate::upload::collect_upload_paths;

const HELP: &str = "\
Commands:
  search <query>        search with the current scope and options
  in <scope>            all | title | author | publisher | content | keywords
  fuzzy on|off          toggle fuzzy matching
  boolean on|off        toggle boolean mode
  type <PDF|DOCX|TXT|->  file type filter (- clears)
  from <YYYY-MM-DD|->   upload date lower bound
  to <YYYY-MM-DD|->     upload date upper bound
  clear                 clear filters
  options               show scope, toggles and filters
  list                  refresh and show all documents
  stats                 refresh and show statistics
  open <id>             view a document
  close                 close the viewer
  delete <id>           delete a document (asks for confirmation)
  upload <paths...>     upload files or directories
  help                  this text
  quit                  leave
Drag files onto the terminal to upload them.";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Search(String),
    Scope(String),
    Fuzzy(bool),
    Boolean(bool),
    FileType(String),
    DateFrom(String),
    DateTo(String),
    ClearFilters,
    Options,
    List,
    Stats,
    Open(String),
    Close,
    Delete(String),
    Upload(Vec<PathBuf>),
    /// Pasted file paths.
    Dropped(Vec<PathBuf>),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Split a line like a shell would for pasted paths: whitespace separates
/// words, quotes group, backslash escapes the next character.
pub fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'') | (None, '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

fn parse_toggle(arg: &str) -> Option<bool> {
    match arg.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

pub fn parse_line(line: &str) -> ShellCommand {
    parse_line_with(line, |p| p.is_file())
}

/// Known commands take precedence; only a line that is not a command and
/// names nothing but files counts as a drop.
fn parse_line_with(line: &str, is_file: impl Fn(&Path) -> bool) -> ShellCommand {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }

    match parse_command(line) {
        ShellCommand::Unknown(unknown) => {
            let words = split_words(line);
            if !words.is_empty() && words.iter().all(|w| is_file(Path::new(w))) {
                ShellCommand::Dropped(words.into_iter().map(PathBuf::from).collect())
            } else {
                ShellCommand::Unknown(unknown)
            }
        }
        command => command,
    }
}

fn parse_command(line: &str) -> ShellCommand {
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((c, r)) => (c, r.trim()),
        None => (line, ""),
    };

    match cmd.to_ascii_lowercase().as_str() {
        "search" | "s" => ShellCommand::Search(rest.to_string()),
        "in" | "scope" => ShellCommand::Scope(rest.to_string()),
        "fuzzy" => match parse_toggle(rest) {
            Some(on) => ShellCommand::Fuzzy(on),
            None => ShellCommand::Unknown(line.to_string()),
        },
        "boolean" => match parse_toggle(rest) {
            Some(on) => ShellCommand::Boolean(on),
            None => ShellCommand::Unknown(line.to_string()),
        },
        "type" => ShellCommand::FileType(rest.to_string()),
        "from" => ShellCommand::DateFrom(rest.to_string()),
        "to" => ShellCommand::DateTo(rest.to_string()),
        "clear" => ShellCommand::ClearFilters,
        "options" | "opts" => ShellCommand::Options,
        "list" | "ls" => ShellCommand::List,
        "stats" => ShellCommand::Stats,
        "open" | "view" if !rest.is_empty() => ShellCommand::Open(rest.to_string()),
        "close" => ShellCommand::Close,
        "delete" | "rm" if !rest.is_empty() => ShellCommand::Delete(rest.to_string()),
        "upload" if !rest.is_empty() => {
            ShellCommand::Upload(split_words(rest).into_iter().map(PathBuf::from).collect())
        }
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        _ => ShellCommand::Unknown(line.to_string()),
    }
}

fn print_options(session: &Session) {
    let (scope, options) = session.search.options();
    println!("scope:    {}", scope);
    println!("fuzzy:    {}", if options.fuzzy { "on" } else { "off" });
    println!("boolean:  {}", if options.boolean_mode { "on" } else { "off" });
    let f = &options.filters;
    println!(
        "type:     {}",
        f.file_type.map(|t| t.to_string()).unwrap_or_else(|| "-".into())
    );
    println!(
        "from:     {}",
        f.date_from.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
    );
    println!(
        "to:       {}",
        f.date_to.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
    );
}

/// Run the interactive loop until `quit` or end of input.
pub async fn run_shell(session: Session) -> Result<()> {
    let (mut overlay, drops) = session.overlay();
    session.startup().await;
    let snapshot = session.snapshot();
    println!(
        "{} documents. Type 'help' for commands.",
        snapshot.stats.total_documents
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending_delete: Option<String> = None;

    while let Some(line) = lines.next_line().await? {
        if let Some(id) = pending_delete.take() {
            if matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
                if session.delete(&id).await {
                    println!("Deleted {}.", id);
                }
            } else {
                println!("Delete cancelled.");
            }
            render::print_alerts(&session.take_alerts());
            continue;
        }

        match parse_line(&line) {
            ShellCommand::Empty => {}
            ShellCommand::Quit => break,
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Search(query) => {
                let outcome = session.search.search(&query).await;
                let state = session.snapshot();
                match outcome {
                    SearchOutcome::Applied { search_time, .. } => {
                        render::print_results(&state, search_time)
                    }
                    SearchOutcome::Cleared => println!("Results cleared."),
                    SearchOutcome::Failed { .. } | SearchOutcome::Superseded => {}
                }
            }
            ShellCommand::Scope(raw) => match raw.parse::<SearchType>() {
                Ok(scope) => session.search.set_scope(scope),
                Err(e) => eprintln!("{}", e),
            },
            ShellCommand::Fuzzy(on) => session.search.set_fuzzy(on),
            ShellCommand::Boolean(on) => session.search.set_boolean_mode(on),
            ShellCommand::FileType(raw) => {
                if let Err(e) = session.search.set_file_type_filter(&raw) {
                    eprintln!("{}", e);
                }
            }
            ShellCommand::DateFrom(raw) => {
                if let Err(e) = session.search.set_date_from(&raw) {
                    eprintln!("{}", e);
                }
            }
            ShellCommand::DateTo(raw) => {
                if let Err(e) = session.search.set_date_to(&raw) {
                    eprintln!("{}", e);
                }
            }
            ShellCommand::ClearFilters => session.search.clear_filters(),
            ShellCommand::Options => print_options(&session),
            ShellCommand::List => {
                session.store.refresh_documents().await;
                render::print_documents(&session.snapshot().documents, "");
            }
            ShellCommand::Stats => {
                session.store.refresh_stats().await;
                render::print_stats(&session.snapshot().stats);
            }
            ShellCommand::Open(id) => {
                if let Some(doc) = session.viewer.open(&id).await {
                    render::print_viewer(&doc);
                }
            }
            ShellCommand::Close => {
                if session.viewer.current().is_none() {
                    println!("No document open.");
                }
                session.viewer.close();
            }
            ShellCommand::Delete(id) => {
                println!("Delete document {}? [y/N]", id);
                pending_delete = Some(id);
            }
            ShellCommand::Upload(paths) => {
                let paths = collect_upload_paths(&paths);
                let report = session.uploads.upload_paths(&paths).await;
                println!("Uploaded {} file(s).", report.uploaded().count());
            }
            ShellCommand::Dropped(paths) => {
                overlay.handle(DragSignal::Enter);
                let (files, _) = session.uploads.read_files(&paths).await;
                let count = files.len();
                overlay.handle(DragSignal::Drop(files));
                println!("Queued {} dropped file(s) for upload.", count);
            }
            ShellCommand::Unknown(line) => {
                eprintln!("Unknown command: {}. Type 'help'.", line);
            }
        }

        render::print_alerts(&session.take_alerts());
    }

    // Closing the overlay ends the drop forwarder once queued drops finish.
    drop(overlay);
    if let Ok(reports) = drops.await {
        let uploaded: usize = reports.iter().map(|r| r.uploaded().count()).sum();
        if uploaded > 0 {
            println!("Uploaded {} dropped file(s).", uploaded);
        }
    }
    render::print_alerts(&session.take_alerts());
    Ok(())
}
