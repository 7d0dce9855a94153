//! Service configuration.
//!
//! Read from the process environment exactly once at startup and passed
//! into the handlers, so a missing credential variable fails the process
//! with a named error instead of surfacing mid-request.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Path to the service-account key file.
pub const ENV_KEY_FILE: &str = "SERVICE_ACCOUNT_KEY_NAME";
/// Service-account email address.
pub const ENV_EMAIL: &str = "SERVICE_ACCOUNT_EMAIL";
/// Base URL of the Earth-observation platform.
pub const ENV_PLATFORM_URL: &str = "EO_PLATFORM_URL";
/// Outbound request timeout in seconds.
pub const ENV_TIMEOUT: &str = "EO_REQUEST_TIMEOUT";

const DEFAULT_PLATFORM_URL: &str = "https://earthengine.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value {value:?} for {var}")]
    InvalidVar { var: &'static str, value: String },
}

/// Process-wide configuration for the widget service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Key file the per-request credentials are read from.
    pub service_account_key: PathBuf,
    pub service_account_email: String,
    /// Platform base URL, no trailing slash.
    pub platform_url: String,
    pub request_timeout: Duration,
}

impl ServiceConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, ConfigError> {
        let service_account_key = PathBuf::from(required(&lookup, ENV_KEY_FILE)?);
        let service_account_email = required(&lookup, ENV_EMAIL)?;

        let platform_url = lookup(ENV_PLATFORM_URL)
            .unwrap_or_else(|| DEFAULT_PLATFORM_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let request_timeout = match lookup(ENV_TIMEOUT) {
            Some(value) => {
                let secs: u64 = value.parse().map_err(|_| ConfigError::InvalidVar {
                    var: ENV_TIMEOUT,
                    value,
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            service_account_key,
            service_account_email,
            platform_url,
            request_timeout,
        })
    }
}

fn required(
    lookup: impl Fn(&'static str) -> Option<String>,
    var: &'static str,
) -> Result<String, ConfigError> {
    match lookup(var) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(var)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> = pairs
            .iter()
            .map(|(k, v)| (*k, v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn loads_with_defaults() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            (ENV_KEY_FILE, "/etc/terramap/key.json"),
            (ENV_EMAIL, "svc@project.iam.example.com"),
        ]))
        .unwrap();

        assert_eq!(
            config.service_account_key,
            PathBuf::from("/etc/terramap/key.json")
        );
        assert_eq!(config.service_account_email, "svc@project.iam.example.com");
        assert_eq!(config.platform_url, DEFAULT_PLATFORM_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn missing_key_file_is_named() {
        let err = ServiceConfig::from_lookup(lookup_from(&[(ENV_EMAIL, "svc@example.com")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ENV_KEY_FILE)));
    }

    #[test]
    fn missing_email_is_named() {
        let err = ServiceConfig::from_lookup(lookup_from(&[(ENV_KEY_FILE, "/k.json")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ENV_EMAIL)));
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let err = ServiceConfig::from_lookup(lookup_from(&[
            (ENV_KEY_FILE, ""),
            (ENV_EMAIL, "svc@example.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ENV_KEY_FILE)));
    }

    #[test]
    fn platform_url_trailing_slash_is_trimmed() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            (ENV_KEY_FILE, "/k.json"),
            (ENV_EMAIL, "svc@example.com"),
            (ENV_PLATFORM_URL, "https://eo.example.com/"),
        ]))
        .unwrap();
        assert_eq!(config.platform_url, "https://eo.example.com");
    }

    #[test]
    fn timeout_override_and_rejection() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            (ENV_KEY_FILE, "/k.json"),
            (ENV_EMAIL, "svc@example.com"),
            (ENV_TIMEOUT, "15"),
        ]))
        .unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(15));

        let err = ServiceConfig::from_lookup(lookup_from(&[
            (ENV_KEY_FILE, "/k.json"),
            (ENV_EMAIL, "svc@example.com"),
            (ENV_TIMEOUT, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { var, .. } if var == ENV_TIMEOUT));
    }
}
