//! Core data models exchanged with the document service.
//!
//! These types mirror the service's JSON contracts: the documents it returns
//! from listing, search and single-document fetches, the aggregate stats,
//! and the search request the client composes.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// File formats the service can ingest.
///
/// Any other label the service reports decodes as [`FileType::Unknown`] so
/// one odd record cannot fail a whole listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FileType {
    #[serde(rename = "PDF")]
    Pdf,
    #[serde(rename = "DOCX")]
    Docx,
    #[serde(rename = "TXT")]
    Txt,
    #[serde(rename = "Unknown", other)]
    Unknown,
}

impl FileType {
    pub const ALL: [FileType; 3] = [FileType::Pdf, FileType::Docx, FileType::Txt];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "PDF",
            FileType::Docx => "DOCX",
            FileType::Txt => "TXT",
            FileType::Unknown => "Unknown",
        }
    }

    /// Matches a file extension (without the dot, any case).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(FileType::Pdf),
            "docx" => Some(FileType::Docx),
            "txt" => Some(FileType::Txt),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            FileType::Pdf => "application/pdf",
            FileType::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            FileType::Txt => "text/plain",
            FileType::Unknown => "application/octet-stream",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PDF" => Ok(FileType::Pdf),
            "DOCX" => Ok(FileType::Docx),
            "TXT" => Ok(FileType::Txt),
            other => Err(format!(
                "unknown file type: '{}'. Use PDF, DOCX, or TXT.",
                other
            )),
        }
    }
}

/// A document as known to the service.
///
/// `content` is only populated by the single-document fetch; list and search
/// responses carry the summary fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub publisher: Option<String>,
    pub file_type: FileType,
    pub file_size: u64,
    #[serde(deserialize_with = "flexible_timestamp")]
    pub upload_date: DateTime<Utc>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub r#abstract: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Aggregate corpus statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_documents: u64,
    #[serde(default)]
    pub file_type_distribution: BTreeMap<FileType, u64>,
}

/// Field a query is restricted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    All,
    Title,
    Author,
    Publisher,
    Content,
    Keywords,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::All => "all",
            SearchType::Title => "title",
            SearchType::Author => "author",
            SearchType::Publisher => "publisher",
            SearchType::Content => "content",
            SearchType::Keywords => "keywords",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(SearchType::All),
            "title" => Ok(SearchType::Title),
            "author" => Ok(SearchType::Author),
            "publisher" => Ok(SearchType::Publisher),
            "content" => Ok(SearchType::Content),
            "keywords" => Ok(SearchType::Keywords),
            other => Err(format!(
                "unknown search scope: '{}'. Use all, title, author, publisher, content, or keywords.",
                other
            )),
        }
    }
}

/// Optional search filters. Unset fields are never serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.file_type.is_none() && self.date_from.is_none() && self.date_to.is_none()
    }
}

/// Session-wide search toggles and filters.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub fuzzy: bool,
    pub boolean_mode: bool,
    pub filters: SearchFilters,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fuzzy: true,
            boolean_mode: false,
            filters: SearchFilters::default(),
        }
    }
}

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub search_type: SearchType,
    pub fuzzy: bool,
    pub boolean_mode: bool,
    pub filters: SearchFilters,
}

impl SearchRequest {
    /// Compose a request from a raw query. Returns `None` when the trimmed
    /// query is empty, since such a request is never sent.
    pub fn compose(query: &str, search_type: SearchType, options: &SearchOptions) -> Option<Self> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        Some(Self {
            query: query.to_string(),
            search_type,
            fuzzy: options.fuzzy,
            boolean_mode: options.boolean_mode,
            filters: options.filters.clone(),
        })
    }
}

/// Response of `POST /search`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResponse {
    pub documents: Vec<Document>,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub search_time: Option<f64>,
}

/// Acknowledgement body returned by delete and the health endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: String,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Accepts RFC 3339 timestamps as well as naive ISO timestamps, which the
/// service emits for UTC dates without an offset.
fn flexible_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_json() -> serde_json::Value {
        json!({
            "id": "d1",
            "title": "Annual Report",
            "author": "",
            "publisher": "Acme Press",
            "file_type": "PDF",
            "file_size": 2048,
            "upload_date": "2024-03-05T10:15:30.123456",
            "keywords": ["finance", "report", "finance"],
            "abstract": "Yearly figures.",
            "content": "",
            "file_path": "/srv/uploads/x.pdf"
        })
    }

    #[test]
    fn test_document_decodes_service_shape() {
        let doc: Document = serde_json::from_value(sample_json()).unwrap();
        assert_eq!(doc.id, "d1");
        assert_eq!(doc.author, None);
        assert_eq!(doc.publisher.as_deref(), Some("Acme Press"));
        assert_eq!(doc.file_type, FileType::Pdf);
        assert_eq!(doc.keywords, vec!["finance", "report", "finance"]);
        assert_eq!(doc.upload_date.format("%Y-%m-%d").to_string(), "2024-03-05");
    }

    #[test]
    fn test_unrecognised_file_type_decodes_as_unknown() {
        let mut raw = sample_json();
        raw["file_type"] = json!("Unknown");
        let doc: Document = serde_json::from_value(raw).unwrap();
        assert_eq!(doc.file_type, FileType::Unknown);

        raw = sample_json();
        raw["file_type"] = json!("ODT");
        let doc: Document = serde_json::from_value(raw).unwrap();
        assert_eq!(doc.file_type, FileType::Unknown);

        let stats: Stats = serde_json::from_value(json!({
            "total_documents": 3,
            "file_type_distribution": {"PDF": 1, "Unknown": 2}
        }))
        .unwrap();
        assert_eq!(stats.file_type_distribution.get(&FileType::Unknown), Some(&2));
        assert_eq!(stats.file_type_distribution.get(&FileType::Pdf), Some(&1));

        // Not selectable as a filter.
        assert!("unknown".parse::<FileType>().is_err());
    }

    #[test]
    fn test_timestamp_accepts_rfc3339() {
        let ts = parse_timestamp("2024-03-05T10:15:30Z").unwrap();
        assert_eq!(ts.format("%H:%M").to_string(), "10:15");
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_sparse_filters_never_serialize_empty_values() {
        let mut options = SearchOptions::default();
        let request = SearchRequest::compose("report", SearchType::Title, &options).unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["filters"], json!({}));
        assert_eq!(body["search_type"], "title");

        options.filters.file_type = Some(FileType::Docx);
        options.filters.date_to = NaiveDate::from_ymd_opt(2024, 1, 31);
        let request = SearchRequest::compose("report", SearchType::All, &options).unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["filters"], json!({"file_type": "DOCX", "date_to": "2024-01-31"}));
        for (_, v) in body["filters"].as_object().unwrap() {
            assert_ne!(v, &json!(""));
        }
    }

    #[test]
    fn test_compose_rejects_blank_query() {
        let options = SearchOptions::default();
        assert!(SearchRequest::compose("   \t", SearchType::All, &options).is_none());
        let request = SearchRequest::compose("  tax  ", SearchType::All, &options).unwrap();
        assert_eq!(request.query, "tax");
    }

    #[test]
    fn test_stats_distribution_keys() {
        let stats: Stats = serde_json::from_value(json!({
            "total_documents": 3,
            "file_type_distribution": {"PDF": 2, "TXT": 1}
        }))
        .unwrap();
        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.file_type_distribution.get(&FileType::Pdf), Some(&2));
        assert_eq!(stats.file_type_distribution.get(&FileType::Docx), None);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("docx".parse::<FileType>().unwrap(), FileType::Docx);
        assert!("odt".parse::<FileType>().is_err());
        assert_eq!("Keywords".parse::<SearchType>().unwrap(), SearchType::Keywords);
        assert_eq!(FileType::from_extension("TXT"), Some(FileType::Txt));
    }
}
