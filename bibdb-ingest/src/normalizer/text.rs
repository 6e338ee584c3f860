//! Free-text cleaning
//!
//! `clean_text` is pure and idempotent: the allow-list excludes `&`, so a
//! cleaned string can never contain an entity that a second pass would decode.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters outside letters, digits, underscore, whitespace and `.,;:!?'"-`
static DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[^\w\s.,;:!?'"-]"#).expect("disallowed-character pattern is valid")
});

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// arXiv search-field prefixes that can lead a query-derived domain
const QUERY_PREFIXES: [&str; 8] = ["all:", "ti:", "au:", "abs:", "co:", "jr:", "cat:", "rn:"];

/// The entities decoded by `decode_entities`
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(amp|quot|gt|lt|#39);").expect("entity pattern is valid"));

/// Decode the small set of HTML entities seen in harvested metadata
///
/// One left-to-right pass: decoded output is never decoded again, so
/// `&amp;#39;` becomes `&#39;`.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| match &caps[1] {
            "amp" => "&",
            "quot" => "\"",
            "gt" => ">",
            "lt" => "<",
            _ => "'",
        })
        .into_owned()
}

/// Clean a free-text field
///
/// Decodes entities, strips characters outside the allow-list, collapses
/// whitespace runs to one space and trims.
pub fn clean_text(text: &str) -> String {
    let decoded = decode_entities(text);
    let allowed = DISALLOWED.replace_all(&decoded, "");
    WHITESPACE_RUN.replace_all(&allowed, " ").trim().to_string()
}

/// Strip a leading search-field prefix such as `all:`
pub fn strip_query_prefix(domain: &str) -> &str {
    let trimmed = domain.trim_start();
    for prefix in QUERY_PREFIXES {
        if trimmed.len() >= prefix.len()
            && trimmed.is_char_boundary(prefix.len())
            && trimmed[..prefix.len()].eq_ignore_ascii_case(prefix)
        {
            return &trimmed[prefix.len()..];
        }
    }
    trimmed
}

/// Title-case: first letter of every alphabetic run upper, the rest lower
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_alpha = true;
        } else {
            out.push(c);
            previous_alpha = false;
        }
    }
    out
}

/// Normalize a query-derived domain: `"all:machine learning"` → `"Machine Learning"`
pub fn normalize_domain(domain: &str) -> String {
    title_case(&clean_text(strip_query_prefix(domain)))
}
