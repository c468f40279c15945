//! Service Configuration Settings
//!
//! Configuration types for the movers service, loaded from environment variables.

use std::time::Duration;

use crate::domain::movers::MoverList;
use crate::infrastructure::http::DEFAULT_REQUEST_TIMEOUT;
use crate::infrastructure::source::{DEFAULT_FETCH_TIMEOUT, FetcherConfig, SourceTemplates};

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Port the movers API listens on.
    pub http_port: u16,
    /// Upper bound on handling one request, answered with 408 when exceeded.
    pub request_timeout: Duration,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            http_port: 8080,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Listener settings.
    pub server: ServerSettings,
    /// Outbound fetch settings.
    pub fetcher: FetcherConfig,
    /// Locator templates for each list.
    pub templates: SourceTemplates,
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a template lacks a date placeholder or a value
    /// is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let server = ServerSettings {
            http_port: parse_env(
                lookup,
                "MOVERS_HTTP_PORT",
                ServerSettings::default().http_port,
            ),
            request_timeout: parse_env_duration_secs(
                lookup,
                "MOVERS_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT,
            ),
        };
        if server.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "MOVERS_REQUEST_TIMEOUT_SECS",
                reason: "timeout must be at least one second".to_string(),
            });
        }

        let fetcher_defaults = FetcherConfig::default();
        let timeout =
            parse_env_duration_secs(lookup, "MOVERS_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "MOVERS_FETCH_TIMEOUT_SECS",
                reason: "timeout must be at least one second".to_string(),
            });
        }
        let fetcher = FetcherConfig {
            timeout,
            user_agent: non_empty(lookup, "MOVERS_USER_AGENT")
                .unwrap_or(fetcher_defaults.user_agent),
        };

        let template_defaults = SourceTemplates::default();
        let templates = SourceTemplates {
            gainers: non_empty(lookup, "MOVERS_GAINERS_URL_TEMPLATE")
                .unwrap_or(template_defaults.gainers),
            losers: non_empty(lookup, "MOVERS_LOSERS_URL_TEMPLATE")
                .unwrap_or(template_defaults.losers),
        };
        if let Some((list, placeholder)) = templates.missing_placeholder() {
            return Err(ConfigError::InvalidTemplate {
                key: template_key(list),
                placeholder,
            });
        }

        Ok(Self {
            server,
            fetcher,
            templates,
        })
    }
}

/// Configuration error.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A locator template is missing a date placeholder.
    #[error("{key} is missing the {placeholder} placeholder")]
    InvalidTemplate {
        /// Environment variable holding the template.
        key: &'static str,
        /// The absent placeholder.
        placeholder: &'static str,
    },
    /// A value parsed but is unusable.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// Environment variable name.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

const fn template_key(list: MoverList) -> &'static str {
    match list {
        MoverList::Gainers => "MOVERS_GAINERS_URL_TEMPLATE",
        MoverList::Losers => "MOVERS_LOSERS_URL_TEMPLATE",
    }
}

fn non_empty(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(
    lookup: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_secs(
    lookup: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Duration {
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::infrastructure::source::locator::DEFAULT_GAINERS_TEMPLATE;

    fn load(vars: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        ServiceConfig::from_lookup(&|key| vars.get(key).map(|v| (*v).to_string()))
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.server.request_timeout, Duration::from_secs(10));
        assert_eq!(config.fetcher.timeout, Duration::from_secs(5));
        assert!(config.fetcher.user_agent.starts_with("market-movers/"));
        assert_eq!(config.templates.gainers, DEFAULT_GAINERS_TEMPLATE);
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("MOVERS_HTTP_PORT", "9001"),
            ("MOVERS_REQUEST_TIMEOUT_SECS", "30"),
            ("MOVERS_FETCH_TIMEOUT_SECS", "12"),
            ("MOVERS_USER_AGENT", "movers-test"),
            (
                "MOVERS_LOSERS_URL_TEMPLATE",
                "http://mirror.local/losers/{year}/{month}/{day}",
            ),
        ])
        .unwrap();

        assert_eq!(config.server.http_port, 9001);
        assert_eq!(config.server.request_timeout, Duration::from_secs(30));
        assert_eq!(config.fetcher.timeout, Duration::from_secs(12));
        assert_eq!(config.fetcher.user_agent, "movers-test");
        assert_eq!(
            config.templates.losers,
            "http://mirror.local/losers/{year}/{month}/{day}"
        );
        assert_eq!(config.templates.gainers, DEFAULT_GAINERS_TEMPLATE);
    }

    #[test]
    fn unparsable_numbers_fall_back_to_defaults() {
        let config = load(&[
            ("MOVERS_HTTP_PORT", "eighty"),
            ("MOVERS_FETCH_TIMEOUT_SECS", "-3"),
        ])
        .unwrap();
        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.fetcher.timeout, DEFAULT_FETCH_TIMEOUT);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = load(&[("MOVERS_FETCH_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "MOVERS_FETCH_TIMEOUT_SECS",
                ..
            }
        ));
    }

    #[test]
    fn zero_request_timeout_is_rejected() {
        let err = load(&[("MOVERS_REQUEST_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "MOVERS_REQUEST_TIMEOUT_SECS",
                ..
            }
        ));
    }

    #[test]
    fn template_without_day_is_rejected() {
        let err = load(&[(
            "MOVERS_GAINERS_URL_TEMPLATE",
            "http://mirror.local/{year}{month}.html",
        )])
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidTemplate {
                key: "MOVERS_GAINERS_URL_TEMPLATE",
                placeholder: "{day}",
            }
        );
        assert_eq!(
            err.to_string(),
            "MOVERS_GAINERS_URL_TEMPLATE is missing the {day} placeholder"
        );
    }

    #[test]
    fn blank_template_uses_default() {
        let config = load(&[("MOVERS_GAINERS_URL_TEMPLATE", "   ")]).unwrap();
        assert_eq!(config.templates.gainers, DEFAULT_GAINERS_TEMPLATE);
    }
}
