//! Unit tests for configuration loading and database path resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate BIBDB_DATABASE are marked with #[serial].

use bibdb_common::config::{
    load_toml_config, parse_toml_config, resolve_database_path, CompiledDefaults, TomlConfig,
    DATABASE_ENV_VAR, DEFAULT_ABSTRACT, DEFAULT_DOI, DEFAULT_JOURNAL_REF,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(defaults.database_path.ends_with("bibdb.sqlite"));
    assert_eq!(defaults.log_level, "info");
}

#[test]
fn test_empty_toml_uses_defaults() {
    let config = parse_toml_config("").unwrap();

    assert!(config.database_path.is_none());
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.ingest.progress_interval, 100);
    assert!(config.ingest.cache_natural_keys);
    assert_eq!(config.sentinels.arxiv.abstract_text, DEFAULT_ABSTRACT);
    assert_eq!(config.sentinels.scopus.doi, DEFAULT_DOI);
    assert_eq!(config.sentinels.arxiv.journal_ref, DEFAULT_JOURNAL_REF);
}

#[test]
fn test_partial_sentinel_override() {
    let config = parse_toml_config(
        r#"
        database_path = "/data/papers.sqlite"

        [ingest]
        progress_interval = 25
        cache_natural_keys = false

        [sentinels.scopus]
        comment = "AUCUN"
        "#,
    )
    .unwrap();

    assert_eq!(config.database_path, Some(PathBuf::from("/data/papers.sqlite")));
    assert_eq!(config.ingest.progress_interval, 25);
    assert!(!config.ingest.cache_natural_keys);
    assert_eq!(config.sentinels.scopus.comment, "AUCUN");
    // Untouched fields keep their defaults
    assert_eq!(config.sentinels.scopus.doi, DEFAULT_DOI);
    assert_eq!(config.sentinels.arxiv.comment, "NONE");
}

#[test]
fn test_invalid_toml_is_config_error() {
    let result = parse_toml_config("database_path = [");
    assert!(result.is_err());
}

#[test]
fn test_explicit_missing_config_file_errors() {
    let result = load_toml_config(Some(Path::new("/nonexistent/bibdb/config.toml")));
    assert!(result.is_err());
}

#[test]
fn test_explicit_config_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

    let config = load_toml_config(Some(&path)).unwrap();
    assert_eq!(config.logging.level, "debug");
}

#[test]
#[serial]
fn test_cli_argument_has_highest_priority() {
    env::set_var(DATABASE_ENV_VAR, "/tmp/bibdb-from-env.sqlite");
    let config = TomlConfig {
        database_path: Some(PathBuf::from("/tmp/bibdb-from-toml.sqlite")),
        ..Default::default()
    };

    let path = resolve_database_path(Some(Path::new("/tmp/bibdb-from-cli.sqlite")), &config);
    assert_eq!(path, PathBuf::from("/tmp/bibdb-from-cli.sqlite"));

    env::remove_var(DATABASE_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_beats_toml() {
    env::set_var(DATABASE_ENV_VAR, "/tmp/bibdb-from-env.sqlite");
    let config = TomlConfig {
        database_path: Some(PathBuf::from("/tmp/bibdb-from-toml.sqlite")),
        ..Default::default()
    };

    let path = resolve_database_path(None, &config);
    assert_eq!(path, PathBuf::from("/tmp/bibdb-from-env.sqlite"));

    env::remove_var(DATABASE_ENV_VAR);
}

#[test]
#[serial]
fn test_toml_then_compiled_default() {
    env::remove_var(DATABASE_ENV_VAR);

    let config = TomlConfig {
        database_path: Some(PathBuf::from("/tmp/bibdb-from-toml.sqlite")),
        ..Default::default()
    };
    assert_eq!(
        resolve_database_path(None, &config),
        PathBuf::from("/tmp/bibdb-from-toml.sqlite")
    );

    let fallback = resolve_database_path(None, &TomlConfig::default());
    assert_eq!(fallback, CompiledDefaults::for_current_platform().database_path);
}
