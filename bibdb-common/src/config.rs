//! Bootstrap configuration loading and database path resolution
//!
//! Configuration is read once at startup from a TOML file and passed
//! explicitly into the store and orchestrator constructors.
//!
//! # Database Path Priority
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `BIBDB_DATABASE`
//! 3. `database_path` in the TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the database location
pub const DATABASE_ENV_VAR: &str = "BIBDB_DATABASE";

/// Default abstract text for records without one
pub const DEFAULT_ABSTRACT: &str = "No abstract available";

/// Default sentinel for a missing DOI
pub const DEFAULT_DOI: &str = "NONE";

/// Default sentinel for a missing comment
pub const DEFAULT_COMMENT: &str = "NONE";

/// Default sentinel for a missing journal reference
pub const DEFAULT_JOURNAL_REF: &str = "NONE (plural)";

/// Bootstrap configuration loaded from TOML file
///
/// Every section is optional; a missing file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file (relative or absolute)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Ingestion tuning
    #[serde(default)]
    pub ingest: IngestSettings,

    /// Per-source missing-value sentinels
    #[serde(default)]
    pub sentinels: SentinelConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Ingestion tuning knobs
#[derive(Debug, Clone, Deserialize)]
pub struct IngestSettings {
    /// Log a progress line every N records (0 disables progress lines)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Keep an in-memory natural key → surrogate id cache during a batch
    #[serde(default = "default_true")]
    pub cache_natural_keys: bool,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            progress_interval: default_progress_interval(),
            cache_natural_keys: true,
        }
    }
}

/// Sentinel values written in place of missing optional fields
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sentinels {
    #[serde(default = "default_abstract")]
    pub abstract_text: String,
    #[serde(default = "default_doi")]
    pub doi: String,
    #[serde(default = "default_comment")]
    pub comment: String,
    #[serde(default = "default_journal_ref")]
    pub journal_ref: String,
}

impl Default for Sentinels {
    fn default() -> Self {
        Self {
            abstract_text: default_abstract(),
            doi: default_doi(),
            comment: default_comment(),
            journal_ref: default_journal_ref(),
        }
    }
}

/// Sentinel sets keyed by upstream source
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentinelConfig {
    #[serde(default)]
    pub arxiv: Sentinels,
    #[serde(default)]
    pub scopus: Sentinels,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_progress_interval() -> usize {
    100
}

fn default_true() -> bool {
    true
}

fn default_abstract() -> String {
    DEFAULT_ABSTRACT.to_string()
}

fn default_doi() -> String {
    DEFAULT_DOI.to_string()
}

fn default_comment() -> String {
    DEFAULT_COMMENT.to_string()
}

fn default_journal_ref() -> String {
    DEFAULT_JOURNAL_REF.to_string()
}

/// OS-dependent compiled defaults
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub database_path: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        // ~/.local/share/bibdb on Linux, ~/Library/Application Support/bibdb on macOS,
        // %LOCALAPPDATA%\bibdb on Windows
        let data_dir = dirs::data_local_dir()
            .map(|d| d.join("bibdb"))
            .unwrap_or_else(|| PathBuf::from("./bibdb_data"));

        Self {
            database_path: data_dir.join("bibdb.sqlite"),
            log_level: default_log_level(),
        }
    }
}

/// Parse TOML configuration text
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Load the bootstrap configuration
///
/// An explicitly requested file must exist and parse. Without one, the
/// platform locations are searched and a missing file falls back to defaults
/// with a warning.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config = parse_toml_config(&content)?;
        info!("Loaded configuration from {}", path.display());
        return Ok(config);
    }

    match find_config_file() {
        Some(path) => {
            let content = std::fs::read_to_string(&path)?;
            let config = parse_toml_config(&content)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => {
            warn!("No bibdb config file found, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Locate the default configuration file for the platform
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("bibdb").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/bibdb/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolve the database file location following the priority order above
pub fn resolve_database_path(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.database_path {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    CompiledDefaults::for_current_platform().database_path
}
