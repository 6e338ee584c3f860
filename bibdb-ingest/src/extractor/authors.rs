//! Author list extraction
//!
//! Harvested author fields arrive in three shapes: an already-structured
//! list, a JSON-encoded string of that list, or a `;`-delimited plain-text
//! list. The shape is decided up front with a cheap check; a JSON candidate
//! that fails to decode falls back to delimited splitting. Extraction never
//! fails: unusable input yields an empty list.

use crate::models::AuthorRef;
use crate::normalizer::text::clean_text;
use serde_json::{Map, Value};
use tracing::debug;

/// Accepted shapes of a raw author field
#[derive(Debug, Clone, PartialEq)]
pub enum RawAuthorField<'a> {
    /// Sequence of `{name, affiliation}` objects or bare name strings
    StructuredList(&'a [Value]),
    /// String that looks like JSON (`[...]` or `{...}`)
    JsonString(&'a str),
    /// Plain text, authors separated by `;`
    DelimitedString(&'a str),
}

impl<'a> RawAuthorField<'a> {
    /// Classify a raw value by shape; scalars other than strings are unusable
    pub fn classify(value: &'a Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(RawAuthorField::StructuredList(items)),
            Value::Object(_) => Some(RawAuthorField::StructuredList(std::slice::from_ref(value))),
            Value::String(s) => {
                let t = s.trim_start();
                if t.starts_with('[') || t.starts_with('{') {
                    Some(RawAuthorField::JsonString(s))
                } else {
                    Some(RawAuthorField::DelimitedString(s))
                }
            }
            _ => None,
        }
    }

    /// Decode into ordered author references
    pub fn into_authors(self) -> Vec<AuthorRef> {
        match self {
            RawAuthorField::StructuredList(items) => from_structured(items),
            RawAuthorField::JsonString(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Array(items)) => from_structured(&items),
                Ok(obj @ Value::Object(_)) => from_structured(std::slice::from_ref(&obj)),
                Ok(_) | Err(_) => {
                    debug!("Author field is not a JSON list, splitting on ';'");
                    from_delimited(text)
                }
            },
            RawAuthorField::DelimitedString(text) => from_delimited(text),
        }
    }
}

/// Extract the ordered author list from any accepted raw shape
pub fn extract_authors(value: &Value) -> Vec<AuthorRef> {
    RawAuthorField::classify(value)
        .map(RawAuthorField::into_authors)
        .unwrap_or_default()
}

fn from_structured(items: &[Value]) -> Vec<AuthorRef> {
    items.iter().filter_map(author_from_value).collect()
}

fn from_delimited(text: &str) -> Vec<AuthorRef> {
    text.split(';')
        .map(|piece| clean_text(strip_trailing_parenthetical(piece)))
        .filter(|name| !name.is_empty())
        .map(|name| AuthorRef::new(name, None))
        .collect()
}

fn author_from_value(value: &Value) -> Option<AuthorRef> {
    match value {
        Value::String(s) => non_empty(clean_text(s)).map(|name| AuthorRef::new(name, None)),
        Value::Object(fields) => {
            let name = non_empty(clean_text(&object_name(fields)?))?;
            let affiliation = fields
                .get("affiliation")
                .and_then(affiliation_text)
                .and_then(|a| non_empty(clean_text(&a)));
            Some(AuthorRef::new(name, affiliation))
        }
        _ => None,
    }
}

/// Name keys used by arXiv (`name`) and Scopus (`authname`, `ce:indexed-name`,
/// `given-name` + `surname`)
fn object_name(fields: &Map<String, Value>) -> Option<String> {
    for key in ["name", "authname", "ce:indexed-name"] {
        if let Some(Value::String(s)) = fields.get(key) {
            if !s.trim().is_empty() {
                return Some(s.clone());
            }
        }
    }

    let given = fields.get("given-name").and_then(Value::as_str).unwrap_or_default();
    let surname = fields.get("surname").and_then(Value::as_str).unwrap_or_default();
    let joined = format!("{} {}", given.trim(), surname.trim());
    let joined = joined.trim();
    (!joined.is_empty()).then(|| joined.to_string())
}

fn affiliation_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(affiliation_text),
        Value::Object(fields) => ["affilname", "name", "$"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

/// Drop a trailing `(...)` group; plain-text lists never carry affiliations
fn strip_trailing_parenthetical(piece: &str) -> &str {
    let trimmed = piece.trim_end();
    if !trimmed.ends_with(')') {
        return trimmed;
    }

    let mut depth = 0usize;
    for (idx, c) in trimmed.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    return &trimmed[..idx];
                }
            }
            _ => {}
        }
    }
    // Unbalanced: leave it for clean_text
    trimmed
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}
