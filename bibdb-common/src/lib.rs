//! # bibdb Common Library
//!
//! Shared code for the bibdb crates including:
//! - Error type shared by every crate
//! - Bootstrap configuration loading and database path resolution
//! - SQLite database initialization and relational schema

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
