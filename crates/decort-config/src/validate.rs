//! Construction-time validation of provider options
//!
//! Nothing here performs I/O: a config that fails validation never reaches
//! the network.

use crate::authenticator::Authenticator;
use crate::error::{ConfigError, Result};
use crate::provider::{DEFAULT_REQUEST_TIMEOUT_SECS, ProviderConfig};
use std::fmt;
use std::time::Duration;

/// Credentials for the selected authenticator, guaranteed non-empty.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Legacy {
        user: String,
        password: String,
    },
    Jwt {
        token: String,
        oauth2_url: String,
    },
    OAuth2 {
        oauth2_url: String,
        app_id: String,
        app_secret: String,
    },
}

impl Credentials {
    pub fn authenticator(&self) -> Authenticator {
        match self {
            Credentials::Legacy { .. } => Authenticator::Legacy,
            Credentials::Jwt { .. } => Authenticator::Jwt,
            Credentials::OAuth2 { .. } => Authenticator::OAuth2,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Legacy { user, .. } => f
                .debug_struct("Legacy")
                .field("user", user)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Jwt { oauth2_url, .. } => f
                .debug_struct("Jwt")
                .field("token", &"<redacted>")
                .field("oauth2_url", oauth2_url)
                .finish(),
            Credentials::OAuth2 {
                oauth2_url, app_id, ..
            } => f
                .debug_struct("OAuth2")
                .field("oauth2_url", oauth2_url)
                .field("app_id", app_id)
                .field("app_secret", &"<redacted>")
                .finish(),
        }
    }
}

/// Provider options that passed every construction-time rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    /// Controller base URL without a trailing slash.
    pub controller_url: String,
    pub credentials: Credentials,
    pub allow_unverified_ssl: bool,
    pub request_timeout: Duration,
}

impl ValidatedConfig {
    pub fn authenticator(&self) -> Authenticator {
        self.credentials.authenticator()
    }
}

impl ProviderConfig {
    /// Check the options against the rules of the selected authenticator.
    pub fn validate(&self) -> Result<ValidatedConfig> {
        let controller_url = base_url(
            "controller_url",
            non_empty(&self.controller_url).ok_or(ConfigError::MissingField("controller_url"))?,
        )?;

        let authenticator: Authenticator = non_empty(&self.authenticator)
            .ok_or(ConfigError::MissingField("authenticator"))?
            .parse()?;

        // secrets are passed on verbatim; whitespace only counts as empty
        let require = |value: &Option<String>, field: &'static str| -> Result<String> {
            value
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
                .ok_or(ConfigError::MissingCredential {
                    field,
                    authenticator,
                })
        };

        let credentials = match authenticator {
            Authenticator::Legacy => Credentials::Legacy {
                user: require(&self.user, "user")?,
                password: require(&self.password, "password")?,
            },
            Authenticator::Jwt => Credentials::Jwt {
                token: require(&self.jwt, "jwt")?.trim().to_string(),
                oauth2_url: base_url("oauth2_url", &require(&self.oauth2_url, "oauth2_url")?)?,
            },
            Authenticator::OAuth2 => Credentials::OAuth2 {
                oauth2_url: base_url("oauth2_url", &require(&self.oauth2_url, "oauth2_url")?)?,
                app_id: require(&self.app_id, "app_id")?,
                app_secret: require(&self.app_secret, "app_secret")?,
            },
        };

        let timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if timeout == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(ValidatedConfig {
            controller_url,
            credentials,
            allow_unverified_ssl: self.allow_unverified_ssl.unwrap_or(false),
            request_timeout: Duration::from_secs(timeout),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Check that `value` is an absolute http(s) URL and drop any trailing slash.
fn base_url(field: &'static str, value: &str) -> Result<String> {
    let parsed = url::Url::parse(value.trim()).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
        });
    }
    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "URL has no host".to_string(),
        });
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "base URL must not carry a query or fragment".to_string(),
        });
    }

    Ok(value.trim().trim_end_matches('/').to_string())
}
