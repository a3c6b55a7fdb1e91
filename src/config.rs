// =============================================================================
// Service Configuration — JSON file plus environment overrides
// =============================================================================
//
// Every field carries `#[serde(default)]` so a partial (or empty) config file
// still loads. Environment variables, read after the file, win over it:
//
//   STOCK_INSIGHT_BIND_ADDR     listen address
//   STOCK_INSIGHT_DB_PATH       SQLite database file
//   STOCK_INSIGHT_CORS_ORIGINS  comma-separated allowed origins
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_database_path() -> String {
    "./backend.db".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

fn default_indicator_days() -> usize {
    60
}

fn default_predict_horizon_days() -> usize {
    3
}

fn default_predict_window_days() -> usize {
    30
}

fn default_summary_window_days() -> usize {
    60
}

fn default_list_limit() -> usize {
    100
}

fn default_price_list_limit() -> usize {
    200
}

// =============================================================================
// ServiceConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Browser origins allowed by CORS.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    // --- Query defaults ----------------------------------------------------

    /// Bars fetched for `/indicators` when `days` is omitted.
    #[serde(default = "default_indicator_days")]
    pub indicator_days: usize,

    #[serde(default = "default_predict_horizon_days")]
    pub predict_horizon_days: usize,

    /// Bars fetched for `/predict` when `window_days` is omitted.
    #[serde(default = "default_predict_window_days")]
    pub predict_window_days: usize,

    /// Bars fetched for `/stocks/:id/summary` when `window_days` is omitted.
    #[serde(default = "default_summary_window_days")]
    pub summary_window_days: usize,

    #[serde(default = "default_list_limit")]
    pub list_limit: usize,

    #[serde(default = "default_price_list_limit")]
    pub price_list_limit: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            database_path: default_database_path(),
            cors_origins: default_cors_origins(),
            indicator_days: default_indicator_days(),
            predict_horizon_days: default_predict_horizon_days(),
            predict_window_days: default_predict_window_days(),
            summary_window_days: default_summary_window_days(),
            list_limit: default_list_limit(),
            price_list_limit: default_price_list_limit(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing or malformed file is an error; the caller decides whether to
    /// fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read service config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse service config from {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            database_path = %config.database_path,
            "service config loaded"
        );

        Ok(config)
    }

    /// Apply `STOCK_INSIGHT_*` overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("STOCK_INSIGHT_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(path) = lookup("STOCK_INSIGHT_DB_PATH") {
            self.database_path = path;
        }
        if let Some(origins) = lookup("STOCK_INSIGHT_CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000");
        assert_eq!(cfg.database_path, "./backend.db");
        assert_eq!(cfg.cors_origins.len(), 2);
        assert_eq!(cfg.indicator_days, 60);
        assert_eq!(cfg.predict_horizon_days, 3);
        assert_eq!(cfg.predict_window_days, 30);
        assert_eq!(cfg.summary_window_days, 60);
        assert_eq!(cfg.list_limit, 100);
        assert_eq!(cfg.price_list_limit, 200);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: ServiceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000");
        assert_eq!(cfg.predict_window_days, 30);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "database_path": "/tmp/stocks.db", "indicator_days": 90 }"#;
        let cfg: ServiceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.database_path, "/tmp/stocks.db");
        assert_eq!(cfg.indicator_days, 90);
        assert_eq!(cfg.summary_window_days, 60);
    }

    #[test]
    fn load_missing_file_is_error() {
        assert!(ServiceConfig::load("/nonexistent/service_config.json").is_err());
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let env: HashMap<&str, &str> = [
            ("STOCK_INSIGHT_BIND_ADDR", "127.0.0.1:9000"),
            ("STOCK_INSIGHT_CORS_ORIGINS", "http://a.test, ,http://b.test"),
        ]
        .into_iter()
        .collect();

        let mut cfg = ServiceConfig::default();
        cfg.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
        assert_eq!(cfg.database_path, "./backend.db");
        assert_eq!(cfg.cors_origins, vec!["http://a.test", "http://b.test"]);
    }
}
