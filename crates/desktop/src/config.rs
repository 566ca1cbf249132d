//! Process configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};

use shopdesk_infra::StoreConfig;
use shopdesk_observability::LogFormat;

pub const DB_PATH_VAR: &str = "SHOPDESK_DB_PATH";
pub const MAX_CONNECTIONS_VAR: &str = "SHOPDESK_DB_MAX_CONNECTIONS";
pub const BUSY_TIMEOUT_VAR: &str = "SHOPDESK_DB_BUSY_TIMEOUT_MS";
pub const LOG_FORMAT_VAR: &str = "SHOPDESK_LOG_FORMAT";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve the configuration from any variable source. Unset or empty
    /// variables take their defaults; unparsable ones are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let path = match get(DB_PATH_VAR) {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let mut store = StoreConfig::file(path);
        if let Some(raw) = get(MAX_CONNECTIONS_VAR) {
            let max: u32 = raw
                .trim()
                .parse()
                .with_context(|| {
                    format!("{MAX_CONNECTIONS_VAR} must be a positive integer, got {raw:?}")
                })?;
            if max == 0 {
                bail!("{MAX_CONNECTIONS_VAR} must be at least 1");
            }
            store = store.with_max_connections(max);
        }
        if let Some(raw) = get(BUSY_TIMEOUT_VAR) {
            let millis: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{BUSY_TIMEOUT_VAR} must be milliseconds, got {raw:?}"))?;
            store = store.with_busy_timeout(Duration::from_millis(millis));
        }

        let log_format = match get(LOG_FORMAT_VAR) {
            Some(raw) => raw
                .parse::<LogFormat>()
                .with_context(|| format!("invalid {LOG_FORMAT_VAR}"))?,
            None => LogFormat::default(),
        };

        Ok(Self { store, log_format })
    }
}

fn default_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory (tried data_dir and ~/.local/share)")?;

    Ok(base.join("shopdesk").join("shopdesk.db"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use shopdesk_infra::StoreLocation;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            (DB_PATH_VAR, "/tmp/till/ledger.db"),
            (MAX_CONNECTIONS_VAR, "8"),
            (BUSY_TIMEOUT_VAR, "250"),
            (LOG_FORMAT_VAR, "pretty"),
        ]))
        .unwrap();

        assert_eq!(
            config.store.location,
            StoreLocation::File(PathBuf::from("/tmp/till/ledger.db"))
        );
        assert_eq!(config.store.max_connections, 8);
        assert_eq!(config.store.busy_timeout, Duration::from_millis(250));
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[(DB_PATH_VAR, "ledger.db")])).unwrap();
        assert_eq!(config.store.max_connections, StoreConfig::DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.store.busy_timeout, StoreConfig::DEFAULT_BUSY_TIMEOUT);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn bad_values_are_rejected() {
        let bad = [
            (MAX_CONNECTIONS_VAR, "many"),
            (MAX_CONNECTIONS_VAR, "0"),
            (LOG_FORMAT_VAR, "xml"),
        ];
        for entry in bad {
            let vars = [(DB_PATH_VAR, "x.db"), entry];
            assert!(AppConfig::from_lookup(lookup(&vars)).is_err(), "{entry:?} accepted");
        }
    }
}
