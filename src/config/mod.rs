//! Configuration management for the TBM skill

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::{Catalog, Category, ResolverConfig};
use crate::skill::DefaultStop;
use crate::store::StoreConfig;
use crate::transit::TransitConfig;
use crate::{Error, Result};

use self::file::TbmConfigFile;

/// Quarante Journaux
pub const DEFAULT_STOP_ID: &str = "bordeaux:StopPoint:BP:3727:LOC";

/// Tram C
pub const DEFAULT_LINE_ID: &str = "bordeaux:Line:61:LOC";

/// Tram C towards Villenave Pyrénées
pub const DEFAULT_DIRECTION_ID: &str = "bordeaux:Line:61:LOC-1";

pub const DEFAULT_STORE_REGION: &str = "eu-west-1";

pub const DEFAULT_STORE_TABLE: &str = "tbm_horaires_users";

pub const DEFAULT_PORT: u16 = 8080;

/// TBM skill configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Preference store
    pub store: StoreConfig,

    /// SIRI-Lite client
    pub transit: TransitConfig,

    /// Catalog file; the embedded catalog when unset
    pub catalog_path: Option<PathBuf>,

    /// Stop used when a user has no favorite
    pub defaults: DefaultStop,

    pub resolver: ResolverConfig,

    /// HTTP server
    pub server: ServerConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
}

impl Config {
    /// Load configuration (env > toml > default)
    ///
    /// # Errors
    ///
    /// Returns error if an environment value cannot be parsed
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Merge a config file with environment lookups
    ///
    /// # Errors
    ///
    /// Returns error if an environment value cannot be parsed
    pub fn from_sources<F>(fc: TbmConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let transit_defaults = TransitConfig::default();
        let resolver_defaults = ResolverConfig::default();

        // Determine data directory (~/.local/share/tbm-horaires on Linux)
        let data_dir = env("TBM_DATA_DIR")
            .map(PathBuf::from)
            .or(fc.store.data_dir)
            .unwrap_or_else(|| {
                directories::BaseDirs::new()
                    .map_or_else(|| PathBuf::from("."), |d| d.data_dir().join("tbm-horaires"))
            });

        let store = StoreConfig {
            region: env("TBM_STORE_REGION")
                .or(fc.store.region)
                .unwrap_or_else(|| DEFAULT_STORE_REGION.to_string()),
            table: env("TBM_STORE_TABLE")
                .or(fc.store.table)
                .unwrap_or_else(|| DEFAULT_STORE_TABLE.to_string()),
            data_dir,
            in_memory: false,
        };

        let transit = TransitConfig {
            base_url: env("TBM_API_BASE")
                .or(fc.transit.base_url)
                .unwrap_or(transit_defaults.base_url),
            account_key: env("TBM_API_KEY")
                .or(fc.transit.account_key)
                .unwrap_or(transit_defaults.account_key),
            preview_interval: fc
                .transit
                .preview_interval
                .unwrap_or(transit_defaults.preview_interval),
            max_visits: fc.transit.max_visits.unwrap_or(transit_defaults.max_visits),
            timeout: fc
                .transit
                .timeout_secs
                .map_or(transit_defaults.timeout, Duration::from_secs),
        };

        let defaults = DefaultStop {
            stop_id: env("TBM_DEFAULT_STOP")
                .or(fc.defaults.stop)
                .unwrap_or_else(|| DEFAULT_STOP_ID.to_string()),
            line_id: env("TBM_DEFAULT_LINE")
                .or(fc.defaults.line)
                .unwrap_or_else(|| DEFAULT_LINE_ID.to_string()),
            direction_id: env("TBM_DEFAULT_DIRECTION")
                .or(fc.defaults.direction)
                .unwrap_or_else(|| DEFAULT_DIRECTION_ID.to_string()),
        };

        let resolver = ResolverConfig {
            alias_policy: fc
                .resolver
                .alias_policy
                .unwrap_or(resolver_defaults.alias_policy),
            max_edit_distance: fc
                .resolver
                .max_edit_distance
                .unwrap_or(resolver_defaults.max_edit_distance),
        };

        let port = match env("TBM_PORT").or_else(|| env("PORT")) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("invalid port: {raw}")))?,
            None => fc.server.port.unwrap_or(DEFAULT_PORT),
        };

        Ok(Self {
            store,
            transit,
            catalog_path: env("TBM_CATALOG").map(PathBuf::from).or(fc.catalog.path),
            defaults,
            resolver,
            server: ServerConfig { port },
        })
    }

    /// Load the configured catalog, or the embedded one
    ///
    /// # Errors
    ///
    /// Returns error if the catalog file cannot be read or fails validation
    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => Catalog::load(path),
            None => Catalog::embedded(),
        }
    }

    /// Check settings against the loaded catalog
    ///
    /// # Errors
    ///
    /// Returns error if the default stop, line or direction is unknown or
    /// inconsistent, or a transit limit is zero
    pub fn validate(&self, catalog: &Catalog) -> Result<()> {
        let stop = catalog
            .get(Category::Stop, &self.defaults.stop_id)
            .ok_or_else(|| {
                Error::Config(format!("default stop not in catalog: {}", self.defaults.stop_id))
            })?;
        let line = catalog
            .get(Category::Line, &self.defaults.line_id)
            .ok_or_else(|| {
                Error::Config(format!("default line not in catalog: {}", self.defaults.line_id))
            })?;
        let direction = catalog
            .get(Category::Direction, &self.defaults.direction_id)
            .ok_or_else(|| {
                Error::Config(format!(
                    "default direction not in catalog: {}",
                    self.defaults.direction_id
                ))
            })?;

        if !stop.serves_line(&line.id) {
            return Err(Error::Config(format!(
                "default stop {} is not served by {}",
                stop.canonical_name, line.canonical_name
            )));
        }
        if !direction.serves_line(&line.id) {
            return Err(Error::Config(format!(
                "default direction {} does not belong to {}",
                direction.canonical_name, line.canonical_name
            )));
        }
        if self.transit.max_visits == 0 {
            return Err(Error::Config("transit.max_visits must be positive".to_string()));
        }
        if self.transit.timeout.is_zero() {
            return Err(Error::Config("transit.timeout_secs must be positive".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::catalog::AliasPolicy;

    fn config_with(env: &[(&str, &str)], fc: TbmConfigFile) -> Result<Config> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_sources(fc, |key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[], TbmConfigFile::default()).unwrap();
        assert_eq!(config.store.region, DEFAULT_STORE_REGION);
        assert_eq!(config.store.table, DEFAULT_STORE_TABLE);
        assert_eq!(config.transit.preview_interval, "PT90M");
        assert_eq!(config.transit.max_visits, 4);
        assert_eq!(config.transit.timeout, Duration::from_secs(20));
        assert_eq!(config.defaults.stop_id, DEFAULT_STOP_ID);
        assert_eq!(config.resolver, ResolverConfig::default());
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.catalog_path.is_none());

        let catalog = config.load_catalog().unwrap();
        config.validate(&catalog).unwrap();
    }

    #[test]
    fn test_env_overrides_file() {
        let fc: TbmConfigFile = toml::from_str(
            r#"
            [store]
            table = "from_file"
            region = "eu-west-3"

            [server]
            port = 9000

            [resolver]
            alias_policy = "prefer_alias"
            max_edit_distance = 1
            "#,
        )
        .unwrap();

        let config = config_with(
            &[("TBM_STORE_TABLE", "from_env"), ("PORT", "7000")],
            fc,
        )
        .unwrap();

        assert_eq!(config.store.table, "from_env");
        assert_eq!(config.store.region, "eu-west-3");
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.resolver.alias_policy, AliasPolicy::PreferAlias);
        assert_eq!(config.resolver.max_edit_distance, 1);
    }

    #[test]
    fn test_invalid_port() {
        assert!(config_with(&[("TBM_PORT", "eighty")], TbmConfigFile::default()).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_default() {
        let config = config_with(
            &[("TBM_DEFAULT_STOP", "bordeaux:StopPoint:BP:0000:LOC")],
            TbmConfigFile::default(),
        )
        .unwrap();
        let catalog = Catalog::embedded().unwrap();
        let err = config.validate(&catalog).unwrap_err();
        assert!(err.to_string().contains("default stop"));
    }

    #[test]
    fn test_validate_rejects_foreign_direction() {
        // Tram A direction with the tram C default line
        let config = config_with(
            &[("TBM_DEFAULT_DIRECTION", "bordeaux:Line:59:LOC-0")],
            TbmConfigFile::default(),
        )
        .unwrap();
        let catalog = Catalog::embedded().unwrap();
        assert!(config.validate(&catalog).is_err());
    }
}
