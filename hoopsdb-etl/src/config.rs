//! Layered configuration: built-in defaults, overridden by `hoopsdb.toml` if
//! present, overridden again by `HOOPSDB_`-prefixed environment variables.
//! Same figment-based layering the reference codebase's `IngestConfig` used.

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EtlConfig {
    pub manifest_path: String,
    pub registry_path: String,
    pub saved_queries_path: String,
    pub csv_dir: String,
    pub db_pool_size: u32,
    pub run_worker_pool_size: usize,
    pub query_timeout_ms: u64,
    pub max_rows: u32,
    pub log_level: String,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            manifest_path: "docs/ingestion_manifest.yaml".to_string(),
            registry_path: "docs/metrics_registry.yaml".to_string(),
            saved_queries_path: "data/saved_queries".to_string(),
            csv_dir: "data/csv".to_string(),
            db_pool_size: 10,
            run_worker_pool_size: 4,
            query_timeout_ms: 30_000,
            max_rows: 1000,
            log_level: "info".to_string(),
        }
    }
}

impl EtlConfig {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file("hoopsdb.toml"))
            .merge(Env::prefixed("HOOPSDB_"))
    }

    pub fn load() -> figment::Result<Self> {
        Self::figment().extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_figment_with_no_overrides() {
        let cfg: EtlConfig = Figment::from(Serialized::defaults(EtlConfig::default()))
            .extract()
            .unwrap();
        assert_eq!(cfg, EtlConfig::default());
    }
}
