//! Environment-only daemon configuration
//!
//! | Variable | Default |
//! |---|---|
//! | `GROUP_NAME` | required |
//! | `DNS01_LISTEN_ADDR` | `0.0.0.0:8443` |
//! | `DNS01_SECRET_STORE_TYPE` | `file` |
//! | `DNS01_SECRET_STORE_PATH` | `/var/run/secrets/dns01` |
//! | `DNS01_STRICT_ZONE_MATCH` | `false` |
//! | `DNS01_REQUEST_TIMEOUT_SECS` | `150` |
//! | `DNS01_LOG_LEVEL` | `info` |
//!
//! The request timeout drops the solver future when it fires. It must outlast
//! the slowest challenge, a CleanUp of four provider calls each bounded by
//! the provider client's own timeout, so the floor is 120 seconds.

use anyhow::{Context, Result};
use dns01_core::{HostConfig, SecretStoreConfig, SolverOptions};
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8443";
const DEFAULT_SECRET_STORE_PATH: &str = "/var/run/secrets/dns01";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 150;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

/// Provider calls made by the longest challenge operation (CleanUp)
const PROVIDER_CALLS_PER_CHALLENGE: u32 = 4;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub group_name: String,
    pub listen_addr: String,
    pub secret_store_type: String,
    pub secret_store_path: String,
    pub strict_zone_match: bool,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let group_name = lookup("GROUP_NAME").context(
            "GROUP_NAME is required. \
            Set it via: export GROUP_NAME=acme.example.com",
        )?;

        let strict_zone_match = match lookup("DNS01_STRICT_ZONE_MATCH") {
            None => false,
            Some(v) => match v.to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" | "" => false,
                _ => anyhow::bail!(
                    "DNS01_STRICT_ZONE_MATCH must be true or false. Got: {}",
                    v
                ),
            },
        };

        let request_timeout_secs = match lookup("DNS01_REQUEST_TIMEOUT_SECS") {
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
            Some(v) => v.trim().parse().with_context(|| {
                format!("DNS01_REQUEST_TIMEOUT_SECS must be a number. Got: {}", v)
            })?,
        };

        Ok(Self {
            group_name,
            listen_addr: lookup("DNS01_LISTEN_ADDR")
                .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            secret_store_type: lookup("DNS01_SECRET_STORE_TYPE")
                .unwrap_or_else(|| "file".to_string()),
            secret_store_path: lookup("DNS01_SECRET_STORE_PATH")
                .unwrap_or_else(|| DEFAULT_SECRET_STORE_PATH.to_string()),
            strict_zone_match,
            request_timeout_secs,
            log_level: lookup("DNS01_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_group_name(&self.group_name)?;

        self.socket_addr()?;

        match self.secret_store_type.as_str() {
            "file" => {
                if self.secret_store_path.is_empty() {
                    anyhow::bail!(
                        "DNS01_SECRET_STORE_PATH cannot be empty when DNS01_SECRET_STORE_TYPE=file"
                    );
                }
                let path = std::path::Path::new(&self.secret_store_path);
                if !path.is_dir() {
                    anyhow::bail!(
                        "DNS01_SECRET_STORE_PATH is not a directory: {}. \
                        Mount the credential secrets there or point the variable at them.",
                        path.display()
                    );
                }
            }
            "memory" => anyhow::bail!(
                "DNS01_SECRET_STORE_TYPE=memory cannot be filled from outside the process. \
                Use the file store and mount the credential secrets under DNS01_SECRET_STORE_PATH."
            ),
            other => anyhow::bail!(
                "DNS01_SECRET_STORE_TYPE '{}' is not supported. \
                Supported types: file",
                other
            ),
        }

        let min = min_request_timeout().as_secs();
        if !(min..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            anyhow::bail!(
                "DNS01_REQUEST_TIMEOUT_SECS must be between {} and {} seconds. Got: {}. \
                Shorter timeouts can cut a cleanup off between finding and deleting its record.",
                min,
                MAX_REQUEST_TIMEOUT_SECS,
                self.request_timeout_secs
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DNS01_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Parsed listen address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr.parse().with_context(|| {
            format!(
                "DNS01_LISTEN_ADDR must be an address like 0.0.0.0:8443. Got: {}",
                self.listen_addr
            )
        })
    }

    /// Per-request timeout enforced by the HTTP layer
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Host configuration handed to the solver
    pub fn host_config(&self) -> HostConfig {
        HostConfig::new(SecretStoreConfig::File {
            path: self.secret_store_path.clone(),
        })
    }

    /// Solver behavior switches
    pub fn solver_options(&self) -> SolverOptions {
        SolverOptions {
            strict_zone_match: self.strict_zone_match,
        }
    }
}

/// Worst case for one challenge: every provider call hits the client timeout
fn min_request_timeout() -> Duration {
    dns01_provider_alidns::DEFAULT_HTTP_TIMEOUT * PROVIDER_CALLS_PER_CHALLENGE
}

/// The API group is a DNS-style name, e.g. `acme.example.com`
fn validate_group_name(group: &str) -> Result<()> {
    if group.is_empty() {
        anyhow::bail!("GROUP_NAME cannot be empty");
    }

    if group.len() > 253 {
        anyhow::bail!("GROUP_NAME too long: {} chars (max 253)", group.len());
    }

    for label in group.split('.') {
        if label.is_empty() {
            anyhow::bail!("GROUP_NAME has empty label: '{}'", group);
        }
        if label.len() > 63 {
            anyhow::bail!("GROUP_NAME label too long: '{}'", label);
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            anyhow::bail!(
                "GROUP_NAME label contains invalid characters. Label: '{}'. \
                Valid: lowercase alphanumeric and hyphen only.",
                label
            );
        }
        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!("GROUP_NAME label cannot start or end with hyphen: '{}'", label);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_group_name_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("GROUP_NAME is required"));
    }

    #[test]
    fn test_defaults() {
        let cfg = load(&[("GROUP_NAME", "acme.example.com")]).unwrap();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8443");
        assert_eq!(cfg.secret_store_type, "file");
        assert_eq!(cfg.secret_store_path, "/var/run/secrets/dns01");
        assert!(!cfg.strict_zone_match);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(150));
        assert!(cfg.request_timeout() > min_request_timeout());
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn test_memory_store_rejected() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().display().to_string();

        let cfg = load(&[
            ("GROUP_NAME", "acme.example.com"),
            ("DNS01_SECRET_STORE_TYPE", "memory"),
            ("DNS01_SECRET_STORE_PATH", &path),
        ])
        .unwrap();

        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("DNS01_SECRET_STORE_TYPE=memory"));
    }

    #[test]
    fn test_overrides_validate() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().display().to_string();

        let cfg = load(&[
            ("GROUP_NAME", "acme.example.com"),
            ("DNS01_SECRET_STORE_PATH", &path),
            ("DNS01_STRICT_ZONE_MATCH", "true"),
            ("DNS01_LISTEN_ADDR", "127.0.0.1:9443"),
        ])
        .unwrap();

        cfg.validate().unwrap();
        assert!(cfg.solver_options().strict_zone_match);
        assert_eq!(cfg.socket_addr().unwrap().port(), 9443);
    }

    #[test]
    fn test_file_store_requires_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().display().to_string();

        let cfg = load(&[
            ("GROUP_NAME", "acme.example.com"),
            ("DNS01_SECRET_STORE_PATH", &path),
        ])
        .unwrap();
        cfg.validate().unwrap();
        assert!(matches!(
            cfg.host_config().secret_store,
            SecretStoreConfig::File { path: p } if p == path
        ));

        let cfg = load(&[
            ("GROUP_NAME", "acme.example.com"),
            ("DNS01_SECRET_STORE_PATH", "/nonexistent/dns01/secrets"),
        ])
        .unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().display().to_string();
        let base = [
            ("GROUP_NAME", "acme.example.com"),
            ("DNS01_SECRET_STORE_PATH", path.as_str()),
        ];

        for (key, value) in [
            ("DNS01_REQUEST_TIMEOUT_SECS", "0"),
            ("DNS01_REQUEST_TIMEOUT_SECS", "60"),
            ("DNS01_REQUEST_TIMEOUT_SECS", "601"),
            ("DNS01_LOG_LEVEL", "verbose"),
            ("DNS01_LISTEN_ADDR", "not-an-addr"),
            ("DNS01_SECRET_STORE_TYPE", "vault"),
            ("GROUP_NAME", "Acme_Example"),
        ] {
            let mut vars = base.to_vec();
            vars.retain(|(k, _)| *k != key);
            vars.push((key, value));
            let cfg = load(&vars).unwrap();
            assert!(cfg.validate().is_err(), "{}={} should be rejected", key, value);
        }

        assert!(load(&[("GROUP_NAME", "acme.example.com"), ("DNS01_REQUEST_TIMEOUT_SECS", "soon")]).is_err());
        assert!(load(&[("GROUP_NAME", "acme.example.com"), ("DNS01_STRICT_ZONE_MATCH", "maybe")]).is_err());
    }
}
