//! Field Normalizer
//!
//! Maps one source-specific raw record onto [`CanonicalArticle`]: picks the
//! raw key for every canonical field, cleans free text, normalizes dates and
//! the domain, and fills missing optional fields with the source's sentinels.
//! Author and category fields are handed to the extractor.

pub mod dates;
pub mod profile;
pub mod text;

pub use dates::normalize_timestamp;
pub use profile::{FieldAliases, SourceProfile};
pub use text::{clean_text, normalize_domain};

use crate::error::{IngestError, IngestResult};
use crate::extractor;
use crate::models::{CanonicalArticle, RawRecord, SourceKind};
use bibdb_common::config::SentinelConfig;
use serde_json::Value;

/// pandas / CSV artifacts that stand for a missing value
const MISSING_LITERALS: [&str; 4] = ["None", "nan", "NaN", "null"];

/// Normalizer bound to one upstream source
#[derive(Debug, Clone)]
pub struct FieldNormalizer {
    profile: SourceProfile,
}

impl FieldNormalizer {
    pub fn new(profile: SourceProfile) -> Self {
        Self { profile }
    }

    pub fn for_source(source: SourceKind, sentinels: &SentinelConfig) -> Self {
        Self::new(SourceProfile::for_source(source, sentinels))
    }

    pub fn source(&self) -> SourceKind {
        self.profile.source
    }

    pub fn profile(&self) -> &SourceProfile {
        &self.profile
    }

    /// Produce the canonical article for one raw record
    ///
    /// Fails with [`IngestError::MalformedRecord`] when `source_id` or `title`
    /// is absent or empty after cleaning.
    pub fn normalize(&self, raw: &RawRecord) -> IngestResult<CanonicalArticle> {
        let aliases = &self.profile.aliases;
        let sentinels = &self.profile.sentinels;

        let source_id = scalar(raw, aliases.source_id)
            .map(|id| self.profile.canonical_source_id(&id))
            .filter(|id| !id.is_empty())
            .ok_or(IngestError::MalformedRecord { field: "source_id" })?;

        let title = cleaned(raw, aliases.title)
            .ok_or(IngestError::MalformedRecord { field: "title" })?;

        let domain_or_venue = scalar(raw, aliases.domain)
            .map(|d| {
                if self.profile.domain_is_query {
                    normalize_domain(&d)
                } else {
                    clean_text(&d)
                }
            })
            .unwrap_or_default();

        Ok(CanonicalArticle {
            source: self.profile.source,
            source_id,
            title,
            abstract_text: cleaned(raw, aliases.abstract_text)
                .unwrap_or_else(|| sentinels.abstract_text.clone()),
            published_at: scalar(raw, aliases.published).map(|d| normalize_timestamp(&d)),
            updated_at: scalar(raw, aliases.updated).map(|d| normalize_timestamp(&d)),
            domain_or_venue,
            doi: trimmed(raw, aliases.doi).unwrap_or_else(|| sentinels.doi.clone()),
            comment: cleaned(raw, aliases.comment).unwrap_or_else(|| sentinels.comment.clone()),
            journal_ref: cleaned(raw, aliases.journal_ref)
                .unwrap_or_else(|| sentinels.journal_ref.clone()),
            pdf_url: trimmed(raw, aliases.pdf_url),
            primary_category: trimmed(raw, aliases.primary_category),
            category_list: structured(raw, aliases.categories)
                .map(extractor::extract_categories)
                .unwrap_or_default(),
            author_list: structured(raw, aliases.authors)
                .map(extractor::extract_authors)
                .unwrap_or_default(),
        })
    }
}

/// Render a scalar JSON value as text; null, arrays, objects and missing
/// literals count as absent
fn scalar_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    let t = text.trim();
    if t.is_empty() || MISSING_LITERALS.contains(&t) {
        None
    } else {
        Some(text)
    }
}

/// First alias holding a usable scalar
fn scalar(raw: &RawRecord, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|key| raw.get(*key))
        .find_map(scalar_value)
}

fn trimmed(raw: &RawRecord, aliases: &[&str]) -> Option<String> {
    scalar(raw, aliases).map(|s| s.trim().to_string())
}

fn cleaned(raw: &RawRecord, aliases: &[&str]) -> Option<String> {
    scalar(raw, aliases)
        .map(|s| clean_text(&s))
        .filter(|s| !s.is_empty())
}

/// First alias holding anything other than null or a missing scalar
fn structured<'a>(raw: &'a RawRecord, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().filter_map(|key| raw.get(*key)).find(|value| match value {
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
        other => scalar_value(other).is_some(),
    })
}
