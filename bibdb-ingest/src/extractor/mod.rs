//! Entity Extractor
//!
//! Turns the author and category fields of a raw record into ordered lists
//! of atomic entities. Nothing here returns an error.

pub mod authors;
pub mod categories;

pub use authors::{extract_authors, RawAuthorField};
pub use categories::{
    extract_categories, join_categories, normalize_categories, split_categories,
    CATEGORY_SEPARATOR,
};
