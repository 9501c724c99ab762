//! Configuration management module

use crate::cli::args::Args;
use crate::error::{Result, SyncError};
use crate::logging::parse_level;
use crate::reconcile::ReconcileConfig;
use std::fmt;
use std::time::Duration;
use tracing::Level;

/// Connection settings for the Cattle API
#[derive(Clone)]
pub struct CattleConfig {
    pub url: String,
    pub access_key: String,
    pub secret_key: String,
    pub timeout: u64,
}

impl fmt::Debug for CattleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CattleConfig")
            .field("url", &self.url)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CattleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(SyncError::Configuration(
                "Cattle URL cannot be empty".to_string(),
            ));
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(SyncError::Configuration(format!(
                "Invalid Cattle URL: {}. Must start with http:// or https://",
                self.url
            )));
        }

        if self.access_key.is_empty() || self.secret_key.is_empty() {
            return Err(SyncError::Configuration(
                "Cattle access key and secret key are required".to_string(),
            ));
        }

        if self.timeout == 0 {
            return Err(SyncError::Configuration(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Application configuration, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub cattle: CattleConfig,
    pub reconcile: ReconcileConfig,
    pub listen_port: u16,
    pub log_level: Level,
    pub verbose: bool,
    pub refresh_interval: Duration,
    pub run_once: bool,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let log_level = if args.verbose {
            Level::DEBUG
        } else {
            parse_level(&args.log_level).ok_or_else(|| {
                SyncError::Configuration(format!("Unknown log level: {}", args.log_level))
            })?
        };

        if args.refresh_interval_hours == 0 {
            return Err(SyncError::Configuration(
                "Refresh interval must be greater than 0".to_string(),
            ));
        }

        let registry_ids = args
            .registry_ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        let host_override = args
            .host_override
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string);

        let config = Self {
            cattle: CattleConfig {
                url: args.cattle_url.trim().to_string(),
                access_key: args.cattle_access_key.clone(),
                secret_key: args.cattle_secret_key.clone(),
                timeout: args.request_timeout,
            },
            reconcile: ReconcileConfig {
                registry_ids,
                auto_create: args.auto_create,
                host_override,
            },
            listen_port: args.listen_port,
            log_level,
            verbose: args.verbose,
            refresh_interval: Duration::from_secs(args.refresh_interval_hours * 3600),
            run_once: args.once,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.cattle.validate()?;
        if self.refresh_interval.is_zero() {
            return Err(SyncError::Configuration(
                "Refresh interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Operator-facing description of the effective settings
    pub fn summary_items(&self) -> Vec<(&'static str, String)> {
        let ids = if self.reconcile.registry_ids.is_empty() {
            "(default account)".to_string()
        } else {
            self.reconcile.registry_ids.join(", ")
        };
        vec![
            ("Cattle URL", self.cattle.url.clone()),
            ("Registry ids", ids),
            ("Auto create", self.reconcile.auto_create.to_string()),
            (
                "Host override",
                self.reconcile
                    .host_override
                    .clone()
                    .unwrap_or_else(|| "(none)".to_string()),
            ),
            ("Health port", self.listen_port.to_string()),
            (
                "Refresh interval",
                format!("{}h", self.refresh_interval.as_secs() / 3600),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec![
            "ecr-credential-sync",
            "--cattle-url",
            "http://rancher:8080/v2-beta",
            "--cattle-access-key",
            "ak",
            "--cattle-secret-key",
            "sk",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_from_args_normalizes_values() {
        let config = AppConfig::from_args(&args(&[
            "--registry-ids",
            " 111111111111 ,,222222222222",
            "--host-override",
            "  ",
            "--log-level",
            "WARN",
        ]))
        .unwrap();

        assert_eq!(
            config.reconcile.registry_ids,
            vec!["111111111111".to_string(), "222222222222".to_string()]
        );
        assert!(config.reconcile.host_override.is_none());
        assert_eq!(config.log_level, Level::WARN);
        assert_eq!(config.refresh_interval, Duration::from_secs(6 * 3600));
    }

    #[test]
    fn test_verbose_forces_debug() {
        let config = AppConfig::from_args(&args(&["--verbose", "--log-level", "error"])).unwrap();
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(AppConfig::from_args(&args(&["--log-level", "chatty"])).is_err());
        assert!(AppConfig::from_args(&args(&["--refresh-interval-hours", "0"])).is_err());
        assert!(AppConfig::from_args(&args(&["--request-timeout", "0"])).is_err());

        let mut schemeless = args(&[]);
        schemeless.cattle_url = "rancher:8080".to_string();
        assert!(AppConfig::from_args(&schemeless).is_err());

        let mut keyless = args(&[]);
        keyless.cattle_secret_key = String::new();
        assert!(AppConfig::from_args(&keyless).is_err());
    }

    #[test]
    fn test_debug_redacts_secret_key() {
        let config = AppConfig::from_args(&args(&[])).unwrap();
        let rendered = format!("{:?}", config.cattle);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("\"sk\""));
    }
}
