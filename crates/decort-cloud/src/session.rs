//! Controller session and API dispatcher

use crate::api::{AUTHKEY_PARAM, ApiCaller, Method};
use crate::auth::{self, SessionAuth};
use crate::error::{CloudError, Result, body_preview};
use crate::params::Params;
use crate::transport::Transport;
use async_trait::async_trait;
use decort_config::{Authenticator, ProviderConfig, ValidatedConfig};
use std::time::Duration;

/// An authenticated association with one controller.
///
/// Only a successfully authenticated session can be constructed. It is
/// immutable afterwards and shared across tasks behind an `Arc`.
#[derive(Debug)]
pub struct ControllerSession {
    controller_url: String,
    auth: SessionAuth,
    username: String,
    allow_unverified_tls: bool,
    transport: Transport,
}

impl ControllerSession {
    /// Validate `config`, then authenticate.
    ///
    /// Invalid configuration fails before any network I/O.
    pub async fn connect(config: &ProviderConfig) -> Result<Self> {
        let validated = config.validate()?;
        Self::connect_validated(validated).await
    }

    pub async fn connect_validated(config: ValidatedConfig) -> Result<Self> {
        tracing::info!(
            controller = %config.controller_url,
            authenticator = %config.authenticator(),
            "connecting to controller"
        );

        let transport = Transport::new(config.request_timeout, config.allow_unverified_ssl)?;
        let authenticated =
            auth::authenticate(&config.controller_url, &config.credentials, &transport).await?;

        Ok(Self {
            controller_url: config.controller_url,
            auth: authenticated.auth,
            username: authenticated.username,
            allow_unverified_tls: config.allow_unverified_ssl,
            transport,
        })
    }

    /// `user@issuer` for bearer modes, the login name for legacy
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn controller_url(&self) -> &str {
        &self.controller_url
    }

    pub fn authenticator(&self) -> Authenticator {
        self.auth.authenticator()
    }

    pub fn allows_unverified_tls(&self) -> bool {
        self.allow_unverified_tls
    }

    pub fn request_timeout(&self) -> Duration {
        self.transport.timeout()
    }

    /// Execute one controller call.
    ///
    /// Injects credentials (an `authkey` parameter for legacy sessions, a
    /// bearer header otherwise), sends `params` as a form body, and returns
    /// the normalized body on HTTP 200. Any other status becomes
    /// [`CloudError::UpstreamStatus`]. Exactly one round-trip, no retries.
    pub async fn call(&self, method: Method, api_path: &str, mut params: Params) -> Result<String> {
        let dropped = params.remove(AUTHKEY_PARAM);
        if dropped > 0 {
            tracing::debug!("Ignoring {} caller-supplied authkey parameter(s)", dropped);
        }

        let bearer = match &self.auth {
            SessionAuth::Legacy { sid } => {
                params.push(AUTHKEY_PARAM, sid);
                None
            }
            SessionAuth::Bearer { header, .. } => Some(header),
        };

        let url = format!("{}{}", self.controller_url, api_path);
        let response = self
            .transport
            .send_form(method, &url, params.encode(), bearer)
            .await?;

        if !response.is_ok() {
            tracing::warn!(%method, url = %url, status = response.status, "controller call failed");
            return Err(CloudError::UpstreamStatus {
                code: response.status,
                url,
                body_preview: body_preview(&response.body),
            });
        }

        Ok(crate::normalize::normalize(&response.body))
    }
}

#[async_trait]
impl ApiCaller for ControllerSession {
    fn username(&self) -> String {
        self.username.clone()
    }

    async fn call(&self, method: Method, api_path: &str, params: Params) -> Result<String> {
        ControllerSession::call(self, method, api_path, params).await
    }
}
