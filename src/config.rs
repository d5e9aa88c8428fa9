//! Application configuration
//!
//! Loaded from `config/{env}.yaml`. Sections other than logging and the
//! gateway are optional and fall back to development defaults.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use crate::codec::parse_nonzero_u128;
use crate::ledger::{InMemoryLedger, LedgerEngine, LedgerSettings, RemoteLedger};
use crate::payment::ReconcilerConfig;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL URL for correlation records; absent ⇒ in-memory store
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub reconciler: ReconcilerSection,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    /// In-process engine (state is lost on restart)
    Memory,
    /// JSON-over-HTTP engine at `url`
    Remote,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LedgerConfig {
    pub backend: LedgerBackend,
    pub url: Option<String>,
    /// Float account ID (hex)
    pub float_account_id: String,
    pub ledger: u32,
    pub account_code: u16,
    pub transfer_code: u16,
    pub request_timeout_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            backend: LedgerBackend::Memory,
            url: None,
            float_account_id: "1".to_string(),
            ledger: 1,
            account_code: 718,
            transfer_code: 1,
            request_timeout_ms: 5000,
        }
    }
}

impl LedgerConfig {
    pub fn settings(&self) -> anyhow::Result<LedgerSettings> {
        let float_account_id = parse_nonzero_u128("float_account_id", &self.float_account_id)
            .context("Invalid ledger.float_account_id")?;
        Ok(LedgerSettings {
            float_account_id,
            ledger: self.ledger,
            account_code: self.account_code,
            transfer_code: self.transfer_code,
        })
    }

    /// Engine adapter for the configured backend
    pub fn engine(&self) -> anyhow::Result<Arc<dyn LedgerEngine>> {
        match self.backend {
            LedgerBackend::Memory => Ok(Arc::new(InMemoryLedger::new())),
            LedgerBackend::Remote => {
                let Some(url) = self.url.as_deref() else {
                    bail!("ledger.url is required when ledger.backend is remote");
                };
                let timeout = Duration::from_millis(self.request_timeout_ms);
                let engine = RemoteLedger::new(url, timeout)
                    .context("Failed to build remote ledger client")?;
                Ok(Arc::new(engine))
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ReconcilerSection {
    pub enabled: bool,
    pub interval_secs: u64,
    pub stale_after_secs: u64,
    pub batch_size: u32,
}

impl Default for ReconcilerSection {
    fn default() -> Self {
        let d = ReconcilerConfig::default();
        Self {
            enabled: false,
            interval_secs: d.scan_interval.as_secs(),
            stale_after_secs: d.stale_threshold.as_secs(),
            batch_size: d.batch_size,
        }
    }
}

impl ReconcilerSection {
    pub fn worker_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            scan_interval: Duration::from_secs(self.interval_secs.max(1)),
            stale_threshold: Duration::from_secs(self.stale_after_secs),
            batch_size: self.batch_size.max(1),
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", config_path))
    }

    pub fn parse(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
log_level: info
log_dir: ./logs
log_file: float_ledger.log
use_json: false
rotation: daily
gateway:
  host: 0.0.0.0
  port: 8080
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AppConfig::parse(MINIMAL).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert!(config.postgres_url.is_none());
        assert_eq!(config.ledger.backend, LedgerBackend::Memory);
        assert!(!config.reconciler.enabled);
        assert_eq!(config.ledger.settings().unwrap(), LedgerSettings::default());
    }

    #[test]
    fn test_shipped_configs_parse() {
        let dev = AppConfig::parse(include_str!("../config/dev.yaml")).unwrap();
        assert_eq!(dev.ledger.backend, LedgerBackend::Memory);
        assert!(dev.postgres_url.is_none());

        let prod = AppConfig::parse(include_str!("../config/prod.yaml")).unwrap();
        assert_eq!(prod.ledger.backend, LedgerBackend::Remote);
        assert!(prod.reconciler.enabled);
        assert!(prod.use_json);
    }

    #[test]
    fn test_ledger_section() {
        let yaml = format!(
            "{}ledger:\n  backend: remote\n  url: http://localhost:3001\n  float_account_id: \"ff\"\n",
            MINIMAL
        );
        let config = AppConfig::parse(&yaml).unwrap();
        assert_eq!(config.ledger.backend, LedgerBackend::Remote);
        assert_eq!(config.ledger.settings().unwrap().float_account_id, 0xff);
        assert_eq!(config.ledger.account_code, 718);
        assert_eq!(config.ledger.engine().unwrap().name(), "remote");
    }

    #[test]
    fn test_remote_backend_requires_url() {
        let yaml = format!("{}ledger:\n  backend: remote\n", MINIMAL);
        let config = AppConfig::parse(&yaml).unwrap();
        assert!(config.ledger.engine().is_err());
    }

    #[test]
    fn test_invalid_float_account_is_rejected() {
        let yaml = format!("{}ledger:\n  float_account_id: \"0\"\n", MINIMAL);
        let config = AppConfig::parse(&yaml).unwrap();
        assert!(config.ledger.settings().is_err());
    }

    #[test]
    fn test_reconciler_section() {
        let yaml = format!(
            "{}reconciler:\n  enabled: true\n  interval_secs: 0\n  stale_after_secs: 30\n",
            MINIMAL
        );
        let config = AppConfig::parse(&yaml).unwrap();
        let worker = config.reconciler.worker_config();
        assert!(config.reconciler.enabled);
        assert_eq!(worker.scan_interval, Duration::from_secs(1));
        assert_eq!(worker.stale_threshold, Duration::from_secs(30));
        assert_eq!(worker.batch_size, 100);
    }
}
