//! Category list extraction

use serde_json::Value;

/// Separator of the canonical joined form
pub const CATEGORY_SEPARATOR: &str = "; ";

/// Split a category string, first match wins: `|`, then `;`, else one item
pub fn split_categories(text: &str) -> Vec<String> {
    let pieces: Vec<&str> = if text.contains('|') {
        text.split('|').collect()
    } else if text.contains(';') {
        text.split(';').collect()
    } else {
        vec![text]
    };
    dedup(pieces.into_iter().map(str::trim))
}

/// Canonical `"a; b"` form of a category string
pub fn normalize_categories(text: &str) -> String {
    join_categories(&split_categories(text))
}

pub fn join_categories(items: &[String]) -> String {
    items.join(CATEGORY_SEPARATOR)
}

/// Extract category codes from a string or a pre-separated list
///
/// List items are strings or Scopus subject-area objects
/// (`{"@abbrev": "COMP", "$": "Computer Science"}`).
pub fn extract_categories(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => split_categories(s),
        Value::Array(items) => dedup(items.iter().filter_map(item_code).map(str::trim)),
        Value::Object(_) => item_code(value).map(split_categories).unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn item_code(item: &Value) -> Option<&str> {
    match item {
        Value::String(s) => Some(s.as_str()),
        Value::Object(fields) => ["@abbrev", "$", "term", "code"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .filter(|s| !s.trim().is_empty()),
        _ => None,
    }
}

/// Drop empty items and repeats, keeping first occurrence order
fn dedup<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !item.is_empty() && !out.iter().any(|seen| seen == item) {
            out.push(item.to_string());
        }
    }
    out
}
