//! Authentication state machine
//!
//! Drives a session from configured credentials to a ready state:
//!
//! ```text
//! Undef ──▶ Configuring(mode) ──┬──▶ Ready(Legacy | Jwt | OAuth2)
//!                               └──▶ Failed
//! ```
//!
//! Everything happens once, during construction. There are no retries and
//! no refresh: a failed step aborts construction.

use crate::api::{JWT_PROBE_PATH, LEGACY_AUTHENTICATE_PATH, Method, OAUTH2_TOKEN_PATH};
use crate::error::{CloudError, Result};
use crate::params::Params;
use crate::transport::Transport;
use base64::Engine;
use decort_config::{Authenticator, Credentials};
use reqwest::header::HeaderValue;
use serde::Deserialize;
use std::fmt;

/// Requested token validity in seconds
pub const OAUTH2_TOKEN_VALIDITY: u32 = 3600;

/// Authentication material of a ready session
#[derive(Clone)]
pub(crate) enum SessionAuth {
    /// Session id sent as the `authkey` form parameter
    Legacy { sid: String },
    /// Token sent as `Authorization: bearer <token>`
    Bearer {
        mode: Authenticator,
        header: HeaderValue,
    },
}

impl SessionAuth {
    pub(crate) fn authenticator(&self) -> Authenticator {
        match self {
            SessionAuth::Legacy { .. } => Authenticator::Legacy,
            SessionAuth::Bearer { mode, .. } => *mode,
        }
    }
}

impl fmt::Debug for SessionAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionAuth::Legacy { .. } => f.write_str("Legacy { sid: <redacted> }"),
            SessionAuth::Bearer { mode, .. } => {
                write!(f, "Bearer {{ mode: {}, token: <redacted> }}", mode)
            }
        }
    }
}

/// Outcome of a successful authentication
#[derive(Debug, Clone)]
pub(crate) struct Authenticated {
    pub auth: SessionAuth,
    pub username: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthState {
    Undef,
    Configuring(Authenticator),
    Ready(Authenticator),
    Failed(Authenticator),
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::Undef => f.write_str("undef"),
            AuthState::Configuring(mode) => write!(f, "configuring({})", mode),
            AuthState::Ready(mode) => write!(f, "{}_ready", mode),
            AuthState::Failed(mode) => write!(f, "failed({})", mode),
        }
    }
}

struct Machine {
    state: AuthState,
}

impl Machine {
    fn new() -> Self {
        Self {
            state: AuthState::Undef,
        }
    }

    fn advance(&mut self, next: AuthState) {
        tracing::debug!(from = %self.state, to = %next, "auth state transition");
        self.state = next;
    }
}

/// Authenticate against the controller (and the IDP for OAuth2).
pub(crate) async fn authenticate(
    controller_url: &str,
    credentials: &Credentials,
    transport: &Transport,
) -> Result<Authenticated> {
    let mode = credentials.authenticator();
    let mut machine = Machine::new();
    machine.advance(AuthState::Configuring(mode));

    let result = match credentials {
        Credentials::Legacy { user, password } => {
            legacy_login(controller_url, user, password, transport).await
        }
        Credentials::Jwt { token, .. } => validate_jwt(controller_url, token, transport).await,
        Credentials::OAuth2 {
            oauth2_url,
            app_id,
            app_secret,
        } => oauth2_login(oauth2_url, app_id, app_secret, transport).await,
    };

    match &result {
        Ok(authenticated) => {
            machine.advance(AuthState::Ready(mode));
            tracing::info!(
                authenticator = %mode,
                username = %authenticated.username,
                "authenticated against controller"
            );
        }
        Err(e) => {
            machine.advance(AuthState::Failed(mode));
            tracing::error!(authenticator = %mode, "authentication failed: {}", e);
        }
    }

    result
}

async fn legacy_login(
    controller_url: &str,
    user: &str,
    password: &str,
    transport: &Transport,
) -> Result<Authenticated> {
    let url = format!("{}{}", controller_url, LEGACY_AUTHENTICATE_PATH);
    let form = Params::new().with("username", user).with("password", password);

    let response = transport
        .send_form(Method::Post, &url, form.encode(), None)
        .await?;

    if !response.is_ok() {
        return Err(CloudError::auth(
            Authenticator::Legacy,
            format!("HTTP {} from {}", response.status, url),
        ));
    }

    // raw body is the session id, stored untrimmed
    if response.body.is_empty() {
        return Err(CloudError::auth(
            Authenticator::Legacy,
            "controller returned an empty session id",
        ));
    }

    Ok(Authenticated {
        auth: SessionAuth::Legacy { sid: response.body },
        username: user.to_string(),
    })
}

/// Probe the controller with a supplied token.
///
/// The username is read from the token's `username` and `iss` claims, so a
/// token the controller accepts but that lacks them still fails with
/// [`CloudError::AuthFailed`].
async fn validate_jwt(
    controller_url: &str,
    token: &str,
    transport: &Transport,
) -> Result<Authenticated> {
    let header = bearer_header(Authenticator::Jwt, token)?;
    let url = format!("{}{}", controller_url, JWT_PROBE_PATH);

    let response = transport
        .send_form(Method::Post, &url, String::new(), Some(&header))
        .await?;

    if !response.is_ok() {
        return Err(CloudError::auth(
            Authenticator::Jwt,
            format!("token rejected by controller: HTTP {} from {}", response.status, url),
        ));
    }

    let username = username_from_token(token)
        .map_err(|reason| CloudError::auth(Authenticator::Jwt, reason))?;

    Ok(Authenticated {
        auth: SessionAuth::Bearer {
            mode: Authenticator::Jwt,
            header,
        },
        username,
    })
}

async fn oauth2_login(
    oauth2_url: &str,
    app_id: &str,
    app_secret: &str,
    transport: &Transport,
) -> Result<Authenticated> {
    let url = format!("{}{}", oauth2_url, OAUTH2_TOKEN_PATH);
    let form = Params::new()
        .with("grant_type", "client_credentials")
        .with("client_id", app_id)
        .with("client_secret", app_secret)
        .with("response_type", "id_token")
        .with("validity", OAUTH2_TOKEN_VALIDITY);

    let response = transport
        .send_form(Method::Post, &url, form.encode(), None)
        .await?;

    if !response.is_ok() {
        return Err(CloudError::auth(
            Authenticator::OAuth2,
            format!("HTTP {} from {}", response.status, url),
        ));
    }

    let token = response.body.trim();
    if token.is_empty() {
        return Err(CloudError::auth(
            Authenticator::OAuth2,
            "identity provider returned an empty token",
        ));
    }

    let username = username_from_token(token)
        .map_err(|reason| CloudError::auth(Authenticator::OAuth2, reason))?;
    let header = bearer_header(Authenticator::OAuth2, token)?;

    Ok(Authenticated {
        auth: SessionAuth::Bearer {
            mode: Authenticator::OAuth2,
            header,
        },
        username,
    })
}

fn bearer_header(mode: Authenticator, token: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(&format!("bearer {}", token))
        .map_err(|_| CloudError::auth(mode, "token contains characters not allowed in a header"))?;
    header.set_sensitive(true);
    Ok(header)
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    username: Option<String>,
    iss: Option<String>,
}

/// Build `"{username}@{iss}"` from a JWT's claims.
///
/// The signature is not verified; the controller does that on every call.
pub fn username_from_token(token: &str) -> std::result::Result<String, String> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) if segments.next().is_none() => payload,
        _ => return Err("token is not a JWT (expected three dot-separated segments)".to_string()),
    };

    let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| format!("failed to decode token payload: {}", e))?;

    let claims: TokenClaims = serde_json::from_slice(&decoded)
        .map_err(|e| format!("failed to parse token claims: {}", e))?;

    let username = claims
        .username
        .filter(|s| !s.is_empty())
        .ok_or("token has no \"username\" claim")?;
    let issuer = claims
        .iss
        .filter(|s| !s.is_empty())
        .ok_or("token has no \"iss\" claim")?;

    Ok(format!("{}@{}", username, issuer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(json: &str) -> String {
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json)
    }

    fn token(payload: &str) -> String {
        format!(
            "{}.{}.c2lnbmF0dXJl",
            encode(r#"{"alg":"ES384","typ":"JWT"}"#),
            encode(payload)
        )
    }

    #[test]
    fn test_username_from_token() {
        let jwt = token(r#"{"username":"alice","iss":"idp.example","exp":1700000000}"#);
        assert_eq!(username_from_token(&jwt).unwrap(), "alice@idp.example");
    }

    #[test]
    fn test_username_from_padded_payload() {
        let payload = base64::engine::general_purpose::URL_SAFE
            .encode(r#"{"username":"bob","iss":"sso"}"#);
        let jwt = format!("h.{}.s", payload);
        assert_eq!(username_from_token(&jwt).unwrap(), "bob@sso");
    }

    #[test]
    fn test_username_from_token_missing_claim() {
        let err = username_from_token(&token(r#"{"username":"alice"}"#)).unwrap_err();
        assert!(err.contains("iss"));

        let err = username_from_token(&token(r#"{"iss":"idp","username":""}"#)).unwrap_err();
        assert!(err.contains("username"));
    }

    #[test]
    fn test_username_from_token_not_a_jwt() {
        assert!(username_from_token("opaque-token").is_err());
        assert!(username_from_token("a.b.c.d").is_err());
        assert!(username_from_token("a.!!!.c").is_err());
        assert!(username_from_token(&format!("a.{}.c", encode("not json"))).is_err());
    }

    #[test]
    fn test_bearer_header() {
        let header = bearer_header(Authenticator::OAuth2, "abc.def.ghi").unwrap();
        assert_eq!(header.to_str().unwrap(), "bearer abc.def.ghi");
        assert!(header.is_sensitive());

        let err = bearer_header(Authenticator::Jwt, "bad\ntoken").unwrap_err();
        assert!(matches!(
            err,
            CloudError::AuthFailed {
                mode: Authenticator::Jwt,
                ..
            }
        ));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(AuthState::Undef.to_string(), "undef");
        assert_eq!(
            AuthState::Configuring(Authenticator::Jwt).to_string(),
            "configuring(jwt)"
        );
        assert_eq!(
            AuthState::Ready(Authenticator::OAuth2).to_string(),
            "oauth2_ready"
        );
        assert_eq!(
            AuthState::Failed(Authenticator::Legacy).to_string(),
            "failed(legacy)"
        );
    }

    #[test]
    fn test_session_auth_debug_redacts() {
        let auth = SessionAuth::Legacy {
            sid: "SID-SECRET".to_string(),
        };
        assert!(!format!("{:?}", auth).contains("SID-SECRET"));
        assert_eq!(auth.authenticator(), Authenticator::Legacy);
    }
}
