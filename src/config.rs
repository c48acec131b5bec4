//! Bot configuration
//!
//! A [`Config`] carries the two credentials every Messenger bot needs (the webhook
//! validation token and the page access token) plus the listener settings used by
//! [`crate::Server`].
//!
//! Configuration is loaded in priority order:
//! 1. Environment variables (highest priority)
//! 2. A JSON configuration file
//! 3. Built-in defaults (lowest priority)
//!
//! # Example
//! ```rust,no_run
//! use messenger_bot_rs::Config;
//!
//! # fn example() -> Result<(), messenger_bot_rs::Error> {
//! let config = Config::load("config.json")?;
//! println!("Listening on {}{}", config.endpoint, config.route);
//! # Ok(()) }
//! ```
//!
//! ```json
//! {
//!   "validation_token": "my_verify_token",
//!   "page_access_token": "EAAG..."
//! }
//! ```

use std::{fs, net::SocketAddr, path::Path};

use serde::Deserialize;
use tracing::debug;

pub(crate) const DEFAULT_ENDPOINT: SocketAddr = SocketAddr::V4(std::net::SocketAddrV4::new(
    std::net::Ipv4Addr::LOCALHOST,
    3000,
));
pub(crate) const DEFAULT_ROUTE_PATH: &str = "/";
pub(crate) const DEFAULT_API_VERSION: &str = "2.6";

/// Environment variable overriding [`Config::validation_token`].
pub const ENV_VALIDATION_TOKEN: &str = "MESSENGER_VALIDATION_TOKEN";
/// Environment variable overriding [`Config::page_access_token`].
pub const ENV_PAGE_ACCESS_TOKEN: &str = "MESSENGER_PAGE_ACCESS_TOKEN";
/// Environment variable overriding [`Config::endpoint`].
pub const ENV_ENDPOINT: &str = "MESSENGER_ENDPOINT";
/// Environment variable overriding [`Config::route`].
pub const ENV_ROUTE: &str = "MESSENGER_ROUTE";
/// Environment variable overriding [`Config::api_version`].
pub const ENV_API_VERSION: &str = "MESSENGER_API_VERSION";

/// Messenger bot configuration.
#[derive(Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Config {
    /// Token echoed back during the webhook verification handshake.
    #[serde(default)]
    pub validation_token: String,

    /// Page access token used for Send API calls.
    #[serde(default)]
    pub page_access_token: String,

    /// Address the webhook server binds to.
    #[serde(default = "default_endpoint")]
    pub endpoint: SocketAddr,

    /// Route the webhook is mounted on.
    #[serde(default = "default_route")]
    pub route: String,

    /// Graph API version, without the `v` prefix.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

// Tokens stay out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("validation_token", &"<redacted>")
            .field("page_access_token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("route", &self.route)
            .field("api_version", &self.api_version)
            .finish()
    }
}

fn default_endpoint() -> SocketAddr {
    DEFAULT_ENDPOINT
}

fn default_route() -> String {
    DEFAULT_ROUTE_PATH.to_owned()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_owned()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            validation_token: String::new(),
            page_access_token: String::new(),
            endpoint: default_endpoint(),
            route: default_route(),
            api_version: default_api_version(),
        }
    }
}

/// Errors raised while loading a [`Config`].
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for a [`Config`].
    #[error("failed to parse configuration file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// An environment override holds a value of the wrong shape.
    #[error("invalid value '{value}' for environment variable {var}")]
    InvalidEnv { var: &'static str, value: String },

    /// A required setting is empty after all sources were applied.
    #[error("missing required setting '{0}'")]
    Missing(&'static str),
}

impl Config {
    /// Loads the configuration from a JSON file, applies environment overrides
    /// and validates the result.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration from environment variables only.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        debug!(path = %path.display(), "configuration file loaded");
        Ok(config)
    }

    /// Overrides fields from the `MESSENGER_*` environment variables.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Overrides fields from an arbitrary variable lookup.
    ///
    /// [`Config::apply_env`] is this function applied to the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_VALIDATION_TOKEN) {
            self.validation_token = token;
        }

        if let Some(token) = lookup(ENV_PAGE_ACCESS_TOKEN) {
            self.page_access_token = token;
        }

        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.endpoint = endpoint.parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_ENDPOINT,
                value: endpoint,
            })?;
        }

        if let Some(route) = lookup(ENV_ROUTE) {
            if !route.starts_with('/') {
                return Err(ConfigError::InvalidEnv {
                    var: ENV_ROUTE,
                    value: route,
                });
            }
            self.route = route;
        }

        if let Some(version) = lookup(ENV_API_VERSION) {
            self.api_version = version.trim_start_matches('v').to_owned();
        }

        Ok(())
    }

    /// Checks that both credentials are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validation_token.is_empty() {
            return Err(ConfigError::Missing("validation_token"));
        }
        if self.page_access_token.is_empty() {
            return Err(ConfigError::Missing("page_access_token"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn file_fields_and_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"validation_token": "verify", "page_access_token": "EAAG"}}"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.validation_token, "verify");
        assert_eq!(config.page_access_token, "EAAG");
        assert_eq!(config.endpoint, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert_eq!(config.route, "/");
        assert_eq!(config.api_version, "2.6");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::from_file("/definitely/not/here/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut config = Config {
            validation_token: "from-file".into(),
            ..Config::default()
        };

        config
            .apply_overrides(lookup(&[
                (ENV_VALIDATION_TOKEN, "from-env"),
                (ENV_PAGE_ACCESS_TOKEN, "token"),
                (ENV_ENDPOINT, "0.0.0.0:8080"),
                (ENV_ROUTE, "/webhook"),
                (ENV_API_VERSION, "v19.0"),
            ]))
            .unwrap();

        assert_eq!(config.validation_token, "from-env");
        assert_eq!(config.page_access_token, "token");
        assert_eq!(config.endpoint, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.route, "/webhook");
        assert_eq!(config.api_version, "19.0");
        config.validate().unwrap();
    }

    #[test]
    fn bad_endpoint_override_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(lookup(&[(ENV_ENDPOINT, "not-an-address")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var, .. } if var == ENV_ENDPOINT));
    }

    #[test]
    fn validation_requires_both_tokens() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("validation_token"))
        ));

        let config = Config {
            validation_token: "v".into(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("page_access_token"))
        ));
    }

    #[test]
    fn debug_redacts_tokens() {
        let config = Config {
            validation_token: "secret-verify".into(),
            page_access_token: "secret-page".into(),
            ..Config::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-verify"));
        assert!(!rendered.contains("secret-page"));
    }
}
