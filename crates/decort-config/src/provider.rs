//! Operator-facing provider configuration
//!
//! Options can come from a KDL file, from `DECORT_*` environment variables,
//! or be set directly by the embedding host. Explicit values always win over
//! the environment.

use crate::error::{ConfigError, Result};
use kdl::{KdlDocument, KdlNode};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// Name of the KDL provider block this crate reads.
pub const PROVIDER_NAME: &str = "decort";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 180;

pub const ENV_CONTROLLER_URL: &str = "DECORT_CONTROLLER_URL";
pub const ENV_OAUTH2_URL: &str = "DECORT_OAUTH2_URL";
pub const ENV_AUTHENTICATOR: &str = "DECORT_AUTHENTICATOR";
pub const ENV_USER: &str = "DECORT_USER";
pub const ENV_PASSWORD: &str = "DECORT_PASSWORD";
pub const ENV_JWT: &str = "DECORT_JWT";
pub const ENV_APP_ID: &str = "DECORT_APP_ID";
pub const ENV_APP_SECRET: &str = "DECORT_APP_SECRET";
pub const ENV_ALLOW_UNVERIFIED_SSL: &str = "DECORT_ALLOW_UNVERIFIED_SSL";
pub const ENV_REQUEST_TIMEOUT: &str = "DECORT_REQUEST_TIMEOUT";

/// Raw, unvalidated provider options.
///
/// Every field is optional here; [`ProviderConfig::validate`] decides which
/// ones the selected authenticator actually needs.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub controller_url: Option<String>,
    pub oauth2_url: Option<String>,
    pub authenticator: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub jwt: Option<String>,
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub allow_unverified_ssl: Option<bool>,
    /// Per-request timeout in seconds.
    pub request_timeout: Option<u64>,
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the `provider "decort" { ... }` block of a KDL document.
    pub fn from_kdl_str(content: &str) -> Result<Self> {
        let doc: KdlDocument = content.parse()?;

        let node = doc
            .nodes()
            .iter()
            .find(|n| {
                n.name().value() == "provider"
                    && n.entries().first().and_then(|e| e.value().as_string())
                        == Some(PROVIDER_NAME)
            })
            .ok_or(ConfigError::MissingField("provider \"decort\""))?;

        parse_provider_node(node)
    }

    /// Read and parse a KDL config file.
    pub fn from_kdl_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        tracing::debug!("Loading provider config from {}", path.as_ref().display());
        Self::from_kdl_str(&content)
    }

    /// Build a config purely from `DECORT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Fill every unset option from the environment.
    pub fn merge_env(mut self) -> Result<Self> {
        fill(&mut self.controller_url, ENV_CONTROLLER_URL);
        fill(&mut self.oauth2_url, ENV_OAUTH2_URL);
        fill(&mut self.authenticator, ENV_AUTHENTICATOR);
        fill(&mut self.user, ENV_USER);
        fill(&mut self.password, ENV_PASSWORD);
        fill(&mut self.jwt, ENV_JWT);
        fill(&mut self.app_id, ENV_APP_ID);
        fill(&mut self.app_secret, ENV_APP_SECRET);

        if self.allow_unverified_ssl.is_none()
            && let Ok(value) = std::env::var(ENV_ALLOW_UNVERIFIED_SSL)
        {
            self.allow_unverified_ssl = Some(parse_bool("allow_unverified_ssl", &value)?);
        }

        if self.request_timeout.is_none()
            && let Ok(value) = std::env::var(ENV_REQUEST_TIMEOUT)
        {
            let secs = value
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidValue {
                    field: "request_timeout",
                    reason: e.to_string(),
                })?;
            self.request_timeout = Some(secs);
        }

        Ok(self)
    }

    /// Load the discovered config file (if any), then apply the environment.
    pub fn load() -> Result<Self> {
        let config = match crate::find_config_file() {
            Ok(path) => Self::from_kdl_file(path)?,
            Err(ConfigError::ConfigFileNotFound) => {
                tracing::debug!("No provider config file found, using environment only");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.merge_env()
    }

    pub fn with_controller_url(mut self, url: impl Into<String>) -> Self {
        self.controller_url = Some(url.into());
        self
    }

    pub fn with_oauth2_url(mut self, url: impl Into<String>) -> Self {
        self.oauth2_url = Some(url.into());
        self
    }

    pub fn with_authenticator(mut self, authenticator: impl Into<String>) -> Self {
        self.authenticator = Some(authenticator.into());
        self
    }

    pub fn with_legacy_credentials(
        mut self,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_jwt(mut self, token: impl Into<String>) -> Self {
        self.jwt = Some(token.into());
        self
    }

    pub fn with_app_credentials(
        mut self,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        self.app_id = Some(app_id.into());
        self.app_secret = Some(app_secret.into());
        self
    }

    pub fn with_allow_unverified_ssl(mut self, allow: bool) -> Self {
        self.allow_unverified_ssl = Some(allow);
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout = Some(secs);
        self
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("controller_url", &self.controller_url)
            .field("oauth2_url", &self.oauth2_url)
            .field("authenticator", &self.authenticator)
            .field("user", &self.user)
            .field("password", &redacted(&self.password))
            .field("jwt", &redacted(&self.jwt))
            .field("app_id", &self.app_id)
            .field("app_secret", &redacted(&self.app_secret))
            .field("allow_unverified_ssl", &self.allow_unverified_ssl)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

pub(crate) fn redacted(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "<redacted>")
}

fn fill(slot: &mut Option<String>, var: &str) {
    if slot.is_none()
        && let Ok(value) = std::env::var(var)
        && !value.is_empty()
    {
        *slot = Some(value);
    }
}

fn parse_bool(field: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            field,
            reason: format!("expected a boolean, got \"{}\"", other),
        }),
    }
}

fn parse_provider_node(node: &KdlNode) -> Result<ProviderConfig> {
    let mut config = ProviderConfig::default();

    let Some(children) = node.children() else {
        return Ok(config);
    };

    for child in children.nodes() {
        let string_value = || {
            child
                .entries()
                .first()
                .and_then(|e| e.value().as_string())
                .map(|s| s.to_string())
        };

        match child.name().value() {
            "controller_url" | "controller-url" => config.controller_url = string_value(),
            "oauth2_url" | "oauth2-url" => config.oauth2_url = string_value(),
            "authenticator" => config.authenticator = string_value(),
            "user" => config.user = string_value(),
            "password" => config.password = string_value(),
            "jwt" => config.jwt = string_value(),
            "app_id" | "app-id" => config.app_id = string_value(),
            "app_secret" | "app-secret" => config.app_secret = string_value(),
            "allow_unverified_ssl" | "allow-unverified-ssl" => {
                let value = child.entries().first().map(|e| e.value());
                config.allow_unverified_ssl = match value {
                    Some(v) if v.as_bool().is_some() => v.as_bool(),
                    Some(v) => match v.as_string() {
                        Some(s) => Some(parse_bool("allow_unverified_ssl", s)?),
                        None => {
                            return Err(ConfigError::InvalidValue {
                                field: "allow_unverified_ssl",
                                reason: "expected a boolean".to_string(),
                            });
                        }
                    },
                    None => Some(true),
                };
            }
            "request_timeout" | "request-timeout" => {
                let secs = child
                    .entries()
                    .first()
                    .and_then(|e| e.value().as_integer())
                    .ok_or_else(|| ConfigError::InvalidValue {
                        field: "request_timeout",
                        reason: "expected an integer number of seconds".to_string(),
                    })?;
                config.request_timeout =
                    Some(u64::try_from(secs).map_err(|_| ConfigError::InvalidValue {
                        field: "request_timeout",
                        reason: format!("{} is out of range", secs),
                    })?);
            }
            other => {
                tracing::debug!("Ignoring unknown provider option: {}", other);
            }
        }
    }

    Ok(config)
}
