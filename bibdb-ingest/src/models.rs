//! Data models shared by the ingestion pipeline

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// One harvested record exactly as the upstream source produced it
pub type RawRecord = Map<String, Value>;

/// Literal used when an article has no authors
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Upstream source that produced a batch of raw records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// arXiv Atom search API
    Arxiv,
    /// Scopus search API
    Scopus,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Arxiv => "arxiv",
            SourceKind::Scopus => "scopus",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arxiv" => Ok(SourceKind::Arxiv),
            "scopus" => Ok(SourceKind::Scopus),
            other => Err(format!("unknown source '{}' (expected arxiv or scopus)", other)),
        }
    }
}

/// An author as listed on one article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub name: String,
    pub affiliation: Option<String>,
}

impl AuthorRef {
    pub fn new(name: impl Into<String>, affiliation: Option<String>) -> Self {
        Self {
            name: name.into(),
            affiliation,
        }
    }
}

/// Normalized, source-agnostic representation of one article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalArticle {
    pub source: SourceKind,
    pub source_id: String,
    pub title: String,
    pub abstract_text: String,
    pub published_at: Option<String>,
    pub updated_at: Option<String>,
    pub domain_or_venue: String,
    pub doi: String,
    pub comment: String,
    pub journal_ref: String,
    pub pdf_url: Option<String>,
    pub primary_category: Option<String>,
    pub category_list: Vec<String>,
    pub author_list: Vec<AuthorRef>,
}

impl CanonicalArticle {
    pub fn author_count(&self) -> usize {
        self.author_list.len()
    }

    /// Name of the first listed author, or `"Unknown"`
    pub fn first_author(&self) -> &str {
        self.author_list
            .first()
            .map(|a| a.name.as_str())
            .unwrap_or(UNKNOWN_AUTHOR)
    }

    /// Name of the last listed author, or `"Unknown"`
    pub fn last_author(&self) -> &str {
        self.author_list
            .last()
            .map(|a| a.name.as_str())
            .unwrap_or(UNKNOWN_AUTHOR)
    }

    /// Categories in canonical `"a; b"` form
    pub fn categories_joined(&self) -> String {
        crate::extractor::join_categories(&self.category_list)
    }
}
