//! Database initialization and relational schema

pub mod init;

pub use init::*;
