//! Query-term emphasis for displayed fields.
//!
//! [`highlight`] splits a text into matched and unmatched [`Segment`]s. The
//! term is always matched literally and case-insensitively: characters such
//! as `.`, `(` or `*` in a query only ever match themselves.
//!
//! Each displayed field is highlighted on its own with the same term, see
//! [`highlight_document`].

use regex::RegexBuilder;

use crate::models::Document;

/// A run of text that is either part of a match or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            matched: false,
        }
    }

    fn hit(text: &str) -> Self {
        Self {
            text: text.to_string(),
            matched: true,
        }
    }
}

/// Mark every case-insensitive occurrence of `term` in `text`.
///
/// Returns the text as a single unmatched segment when the term is empty,
/// and no segments at all when the text is empty. Joining the segment texts
/// always reproduces `text`.
pub fn highlight(text: &str, term: &str) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }
    let term = term.trim();
    if term.is_empty() {
        return vec![Segment::plain(text)];
    }

    let re = match RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re,
        // Only reachable for absurdly large terms (size limit).
        Err(_) => return vec![Segment::plain(text)],
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        if m.start() > last {
            segments.push(Segment::plain(&text[last..m.start()]));
        }
        segments.push(Segment::hit(m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        segments.push(Segment::plain(&text[last..]));
    }
    segments
}

/// The displayed fields of a document, each highlighted independently.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightedDocument {
    pub title: Vec<Segment>,
    pub author: Option<Vec<Segment>>,
    pub publisher: Option<Vec<Segment>>,
    pub keywords: Vec<Vec<Segment>>,
    pub r#abstract: Vec<Segment>,
}

pub fn highlight_document(doc: &Document, term: &str) -> HighlightedDocument {
    HighlightedDocument {
        title: highlight(&doc.title, term),
        author: doc.author.as_deref().map(|a| highlight(a, term)),
        publisher: doc.publisher.as_deref().map(|p| highlight(p, term)),
        keywords: doc.keywords.iter().map(|k| highlight(k, term)).collect(),
        r#abstract: highlight(&doc.r#abstract, term),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_match(segments: &[Segment]) -> bool {
        segments.iter().any(|s| s.matched)
    }

    fn joined(segments: &[Segment]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    fn matches(segments: &[Segment]) -> Vec<&str> {
        segments
            .iter()
            .filter(|s| s.matched)
            .map(|s| s.text.as_str())
            .collect()
    }

    #[test]
    fn test_preserves_original_casing() {
        let segments = highlight("Hello World", "world");
        assert_eq!(
            segments,
            vec![Segment::plain("Hello "), Segment::hit("World")]
        );
    }

    #[test]
    fn test_every_occurrence_in_order() {
        let text = "Tax forms, TAX returns and surtax";
        let segments = highlight(text, "tax");
        assert_eq!(matches(&segments), vec!["Tax", "TAX", "tax"]);
        assert_eq!(joined(&segments), text);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(highlight("", "x"), Vec::<Segment>::new());
        assert_eq!(highlight("abc", ""), vec![Segment::plain("abc")]);
        assert_eq!(highlight("abc", "   "), vec![Segment::plain("abc")]);
    }

    #[test]
    fn test_no_match_returns_text_verbatim() {
        let segments = highlight("Quarterly summary", "annual");
        assert!(!has_match(&segments));
        assert_eq!(joined(&segments), "Quarterly summary");
    }

    #[test]
    fn test_pattern_characters_are_literal() {
        let segments = highlight("a.b axb a.B", "a.b");
        assert_eq!(matches(&segments), vec!["a.b", "a.B"]);

        let segments = highlight("f(x) = (y)", "(");
        assert_eq!(matches(&segments), vec!["(", "("]);
        assert_eq!(joined(&segments), "f(x) = (y)");

        let segments = highlight("cost is $5.00*", "$5.00*");
        assert_eq!(matches(&segments), vec!["$5.00*"]);
    }

    #[test]
    fn test_non_ascii_text() {
        let segments = highlight("Über die Straße", "über");
        assert_eq!(matches(&segments), vec!["Über"]);
        assert_eq!(joined(&segments), "Über die Straße");
    }

    #[test]
    fn test_document_fields_highlighted_independently() {
        let doc = Document {
            id: "d1".into(),
            title: "Privacy Policy".into(),
            author: Some("Jo Privacy".into()),
            publisher: None,
            file_type: crate::models::FileType::Txt,
            file_size: 10,
            upload_date: chrono::Utc::now(),
            keywords: vec!["privacy".into(), "terms".into()],
            r#abstract: "No match here".into(),
            content: None,
        };
        let h = highlight_document(&doc, "privacy");
        assert_eq!(matches(&h.title), vec!["Privacy"]);
        assert_eq!(matches(h.author.as_ref().unwrap()), vec!["Privacy"]);
        assert!(h.publisher.is_none());
        assert!(has_match(&h.keywords[0]));
        assert!(!has_match(&h.keywords[1]));
        assert!(!has_match(&h.r#abstract));
    }
}
