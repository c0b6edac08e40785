//! Authentication mode selection

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// How the provider authenticates against the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Authenticator {
    /// Username/password login; the session id travels as `authkey`.
    Legacy,
    /// Externally supplied bearer token.
    Jwt,
    /// Client-credentials grant against the OAuth2 identity provider.
    OAuth2,
}

impl Authenticator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Authenticator::Legacy => "legacy",
            Authenticator::Jwt => "jwt",
            Authenticator::OAuth2 => "oauth2",
        }
    }
}

impl fmt::Display for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Authenticator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Authenticator::Legacy),
            "jwt" => Ok(Authenticator::Jwt),
            "oauth2" => Ok(Authenticator::OAuth2),
            _ => Err(ConfigError::UnknownAuthenticator(s.to_string())),
        }
    }
}
