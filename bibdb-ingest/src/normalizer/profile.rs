//! Per-source field layouts
//!
//! Each upstream API names the same bibliographic facts differently. A
//! profile lists, for every canonical field, the raw keys to try in order.

use crate::models::SourceKind;
use bibdb_common::config::{SentinelConfig, Sentinels};

/// Raw keys to try, in order, for each canonical field
#[derive(Debug, Clone)]
pub struct FieldAliases {
    pub source_id: &'static [&'static str],
    pub title: &'static [&'static str],
    pub abstract_text: &'static [&'static str],
    pub published: &'static [&'static str],
    pub updated: &'static [&'static str],
    pub domain: &'static [&'static str],
    pub doi: &'static [&'static str],
    pub comment: &'static [&'static str],
    pub journal_ref: &'static [&'static str],
    pub pdf_url: &'static [&'static str],
    pub primary_category: &'static [&'static str],
    pub categories: &'static [&'static str],
    pub authors: &'static [&'static str],
}

const ARXIV_ALIASES: FieldAliases = FieldAliases {
    source_id: &["arxiv_id", "id"],
    title: &["title"],
    abstract_text: &["abstract", "summary"],
    published: &["published"],
    updated: &["updated"],
    domain: &["domain", "search_query"],
    doi: &["doi"],
    comment: &["comment"],
    journal_ref: &["journal_ref"],
    pdf_url: &["pdf_url"],
    primary_category: &["primary_category"],
    categories: &["categories"],
    authors: &["authors"],
};

const SCOPUS_ALIASES: FieldAliases = FieldAliases {
    source_id: &["dc:identifier", "eid"],
    title: &["dc:title"],
    abstract_text: &["dc:description", "abstract"],
    published: &["prism:coverDate"],
    updated: &[],
    domain: &["prism:publicationName"],
    doi: &["prism:doi"],
    comment: &[],
    journal_ref: &["journal_ref"],
    pdf_url: &["prism:url"],
    primary_category: &[],
    categories: &["subject-area", "authkeywords"],
    authors: &["author", "authors", "dc:creator"],
};

/// Everything the normalizer needs to know about one source
#[derive(Debug, Clone)]
pub struct SourceProfile {
    pub source: SourceKind,
    pub aliases: FieldAliases,
    /// Domain holds a search query (`all:...`) rather than a venue name
    pub domain_is_query: bool,
    pub sentinels: Sentinels,
}

impl SourceProfile {
    pub fn arxiv(sentinels: Sentinels) -> Self {
        Self {
            source: SourceKind::Arxiv,
            aliases: ARXIV_ALIASES,
            domain_is_query: true,
            sentinels,
        }
    }

    pub fn scopus(sentinels: Sentinels) -> Self {
        Self {
            source: SourceKind::Scopus,
            aliases: SCOPUS_ALIASES,
            domain_is_query: false,
            sentinels,
        }
    }

    /// Profile for `source` using the configured sentinel set
    pub fn for_source(source: SourceKind, sentinels: &SentinelConfig) -> Self {
        match source {
            SourceKind::Arxiv => Self::arxiv(sentinels.arxiv.clone()),
            SourceKind::Scopus => Self::scopus(sentinels.scopus.clone()),
        }
    }

    /// Reduce a raw identifier to the stable natural key
    ///
    /// arXiv Atom ids are abs URLs (`http://arxiv.org/abs/2401.00001v1`);
    /// Scopus identifiers carry a `SCOPUS_ID:` tag.
    pub fn canonical_source_id(&self, raw: &str) -> String {
        let raw = raw.trim();
        let id = match self.source {
            SourceKind::Arxiv => raw.split_once("/abs/").map(|(_, id)| id).unwrap_or(raw),
            SourceKind::Scopus => raw.strip_prefix("SCOPUS_ID:").unwrap_or(raw),
        };
        id.trim().to_string()
    }
}
