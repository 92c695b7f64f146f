//! Terminal rendering of documents, results, stats and the viewer.
//!
//! Query matches are emphasised with `console` styling, which degrades to
//! plain text when stdout is not a terminal.

use console::style;
use std::fmt::Write;

use crate::format::{format_date, format_file_size, format_number};
use crate::highlight::{highlight_document, Segment};
use crate::models::{Document, FileType, Stats};
use crate::state::AppState;

pub fn render_segments(segments: &[Segment]) -> String {
    let mut out = String::new();
    for seg in segments {
        if seg.matched {
            let _ = write!(out, "{}", style(&seg.text).black().on_yellow().bold());
        } else {
            out.push_str(&seg.text);
        }
    }
    out
}

/// One document as a result card, fields highlighted with `term`.
pub fn format_document(doc: &Document, term: &str) -> String {
    let h = highlight_document(doc, term);
    let mut out = String::new();

    let _ = writeln!(out, "{}", style(render_segments(&h.title)).bold());
    if let Some(ref author) = h.author {
        let _ = writeln!(out, "    author:    {}", render_segments(author));
    }
    if let Some(ref publisher) = h.publisher {
        let _ = writeln!(out, "    publisher: {}", render_segments(publisher));
    }
    let _ = writeln!(
        out,
        "    {} | {} | {}",
        doc.file_type,
        format_file_size(doc.file_size),
        format_date(&doc.upload_date)
    );
    if !h.keywords.is_empty() {
        let keywords: Vec<String> = h.keywords.iter().map(|k| render_segments(k)).collect();
        let _ = writeln!(out, "    keywords:  {}", keywords.join(", "));
    }
    if !h.r#abstract.is_empty() {
        let _ = writeln!(
            out,
            "    abstract:  {}",
            render_segments(&h.r#abstract).replace('\n', " ").trim()
        );
    }
    let _ = writeln!(out, "    id: {}", doc.id);
    out
}

pub fn print_documents(documents: &[Document], term: &str) {
    if documents.is_empty() {
        println!("No documents.");
        return;
    }
    for (i, doc) in documents.iter().enumerate() {
        print!("{}. {}", i + 1, format_document(doc, term));
        println!();
    }
}

pub fn print_results(state: &AppState, search_time: Option<f64>) {
    if state.results.is_empty() {
        println!("No results.");
        return;
    }
    match search_time {
        Some(t) => println!(
            "{} result{} ({:.3}s)",
            format_number(state.results.len() as u64),
            if state.results.len() == 1 { "" } else { "s" },
            t
        ),
        None => println!(
            "{} result{}",
            format_number(state.results.len() as u64),
            if state.results.len() == 1 { "" } else { "s" }
        ),
    }
    println!();
    print_documents(&state.results, &state.last_query);
}

pub fn format_stats(stats: &Stats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  Documents:   {}", format_number(stats.total_documents));
    for file_type in FileType::ALL {
        let count = stats
            .file_type_distribution
            .get(&file_type)
            .copied()
            .unwrap_or(0);
        let _ = writeln!(out, "  {:<12} {}", format!("{}:", file_type), format_number(count));
    }
    if let Some(&other) = stats.file_type_distribution.get(&FileType::Unknown) {
        if other > 0 {
            let _ = writeln!(out, "  {:<12} {}", "Other:", format_number(other));
        }
    }
    out
}

pub fn print_stats(stats: &Stats) {
    println!("Document Vault: Stats");
    println!("======================");
    println!();
    print!("{}", format_stats(stats));
    println!();
}

/// Full document as shown by the viewer.
pub fn print_viewer(doc: &Document) {
    println!("--- Document ---");
    println!("id:         {}", doc.id);
    println!("title:      {}", doc.title);
    if let Some(ref author) = doc.author {
        println!("author:     {}", author);
    }
    if let Some(ref publisher) = doc.publisher {
        println!("publisher:  {}", publisher);
    }
    println!("type:       {}", doc.file_type);
    println!("size:       {}", format_file_size(doc.file_size));
    println!("uploaded:   {}", format_date(&doc.upload_date));
    if !doc.keywords.is_empty() {
        println!("keywords:   {}", doc.keywords.join(", "));
    }
    println!();

    println!("--- Content ---");
    match doc.content.as_deref() {
        Some(content) if !content.trim().is_empty() => println!("{}", content),
        _ => println!("(no extracted text)"),
    }
    println!();
}

pub fn print_alerts(alerts: &[String]) {
    for alert in alerts {
        eprintln!("{} {}", style("!").red().bold(), alert);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn doc() -> Document {
        Document {
            id: "d-42".into(),
            title: "Merger Memo".into(),
            author: Some("K. Lee".into()),
            publisher: None,
            file_type: FileType::Docx,
            file_size: 1536,
            upload_date: chrono::Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
            keywords: vec!["merger".into(), "memo".into()],
            r#abstract: "Draft terms\nfor the merger.".into(),
            content: None,
        }
    }

    #[test]
    fn document_card_plain_text() {
        console::set_colors_enabled(false);
        let card = format_document(&doc(), "merger");
        assert!(card.starts_with("Merger Memo\n"));
        assert!(card.contains("author:    K. Lee"));
        assert!(!card.contains("publisher"));
        assert!(card.contains("DOCX | 1.5 KB | Jun 1, 2024"));
        assert!(card.contains("keywords:  merger, memo"));
        assert!(card.contains("abstract:  Draft terms for the merger."));
        assert!(card.contains("id: d-42"));
    }

    #[test]
    fn stats_lists_every_file_type() {
        let mut stats = Stats {
            total_documents: 1200,
            ..Default::default()
        };
        stats.file_type_distribution.insert(FileType::Pdf, 1200);
        let text = format_stats(&stats);
        assert!(text.contains("Documents:   1,200"));
        assert!(text.contains("PDF:"));
        assert!(text.contains("DOCX:"));
        assert!(text.contains("TXT:"));
        assert!(!text.contains("Other:"));

        stats.file_type_distribution.insert(FileType::Unknown, 7);
        assert!(format_stats(&stats).contains("Other:       7"));
    }
}
