//! Server configuration

use feature_store_sdk::FeatureStoreConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// L2 backend selection. Defaults to in-memory — most local runs and tests
/// never set `FS_L2__BACKEND`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum L2Backend {
    InMemory,
    Postgres { url: String },
}

impl Default for L2Backend {
    fn default() -> Self {
        L2Backend::InMemory
    }
}

/// Server configuration: network binding plus the Feature Store's own
/// tunables, loaded the same way as the SDK's own defaults — file, then
/// environment (`FS_` prefix), then these defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    #[serde(default)]
    pub l2: L2Backend,

    #[serde(default)]
    pub feature_store: FeatureStoreConfig,

    /// Directory holding one `{TICKER}.csv` file per ticker for
    /// [`crate::raw_data::CsvRawDataProvider`]. The feature catalog itself
    /// is a fixed in-binary table (`crate::features::builtin_definitions`),
    /// not something loaded from this directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    pub log_level: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            l2: L2Backend::default(),
            feature_store: FeatureStoreConfig::default(),
            data_dir: default_data_dir(),
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `config/server.{toml,yaml,json}` (if
    /// present), then the `FS_`-prefixed environment, then these defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(config::File::with_name("config/server").required(false))
            .add_source(config::Environment::with_prefix("FS").separator("__"))
            .build();

        match cfg {
            Ok(cfg) => cfg.try_deserialize().or_else(|e| {
                tracing::warn!(error = %e, "failed to deserialize layered config, using defaults");
                Ok(Self::default())
            }),
            Err(_) => {
                tracing::info!("no config file found, using default configuration");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_local_and_in_memory() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(matches!(config.l2, L2Backend::InMemory));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn postgres_backend_carries_url() {
        let l2 = L2Backend::Postgres { url: "postgresql://localhost/fs".to_string() };
        if let L2Backend::Postgres { url } = l2 {
            assert_eq!(url, "postgresql://localhost/fs");
        } else {
            panic!("expected Postgres backend");
        }
    }

    #[test]
    fn config_clone_preserves_fields() {
        let config = ServerConfig::default();
        let cloned = config.clone();
        assert_eq!(config.host, cloned.host);
        assert_eq!(config.port, cloned.port);
    }
}
