//! TOML configuration file loading
//!
//! Supports `~/.config/tbm-horaires/config.toml` (or `TBM_CONFIG`) as a
//! persistent config source. All fields are optional; the file is a partial
//! overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::AliasPolicy;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct TbmConfigFile {
    #[serde(default)]
    pub store: StoreFileConfig,

    #[serde(default)]
    pub transit: TransitFileConfig,

    #[serde(default)]
    pub catalog: CatalogFileConfig,

    /// Stop used when a user has no favorite
    #[serde(default)]
    pub defaults: DefaultsFileConfig,

    #[serde(default)]
    pub resolver: ResolverFileConfig,

    #[serde(default)]
    pub server: ServerFileConfig,
}

/// Preference store configuration
#[derive(Debug, Default, Deserialize)]
pub struct StoreFileConfig {
    pub region: Option<String>,
    pub table: Option<String>,
    pub data_dir: Option<PathBuf>,
}

/// SIRI-Lite client configuration
#[derive(Debug, Default, Deserialize)]
pub struct TransitFileConfig {
    pub base_url: Option<String>,
    pub account_key: Option<String>,
    /// ISO 8601 duration, e.g. "PT90M"
    pub preview_interval: Option<String>,
    pub max_visits: Option<u32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogFileConfig {
    /// Catalog written by `tbm-horaires sync-catalog`
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DefaultsFileConfig {
    pub stop: Option<String>,
    pub line: Option<String>,
    pub direction: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResolverFileConfig {
    pub alias_policy: Option<AliasPolicy>,
    pub max_edit_distance: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    pub port: Option<u16>,
}

/// Load the TOML config file from `TBM_CONFIG` or the standard path
///
/// Returns `TbmConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> TbmConfigFile {
    let path = std::env::var("TBM_CONFIG")
        .ok()
        .map(PathBuf::from)
        .or_else(config_file_path);

    match path {
        Some(path) if path.exists() => parse_config_file(&path),
        _ => TbmConfigFile::default(),
    }
}

fn parse_config_file(path: &Path) -> TbmConfigFile {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                TbmConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            TbmConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/tbm-horaires/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("tbm-horaires").join("config.toml"))
}
