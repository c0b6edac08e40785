//! Provider-side slot for the controller session
//!
//! A provider host creates the handle before it knows its configuration and
//! resource modules may already hold it. Calls made before
//! [`ProviderHandle::configure`] succeeds fail with
//! [`CloudError::NotConfigured`].

use crate::api::{ApiCaller, Method};
use crate::error::{CloudError, Result};
use crate::params::Params;
use crate::session::ControllerSession;
use async_trait::async_trait;
use decort_config::{ConfigError, ProviderConfig};
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Debug, Default)]
pub struct ProviderHandle {
    session: OnceCell<Arc<ControllerSession>>,
}

impl ProviderHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect once. A handle that is already configured is left untouched.
    ///
    /// Concurrent callers are serialized: only one of them authenticates,
    /// the others wait for it and are rejected without any I/O if it
    /// succeeds.
    pub async fn configure(&self, config: &ProviderConfig) -> Result<Arc<ControllerSession>> {
        let mut connected = false;
        let session = self
            .session
            .get_or_try_init(|| {
                connected = true;
                async move { ControllerSession::connect(config).await.map(Arc::new) }
            })
            .await?;

        if !connected {
            return Err(already_configured());
        }

        Ok(session.clone())
    }

    pub fn is_configured(&self) -> bool {
        self.session.initialized()
    }

    pub fn session(&self) -> Result<&Arc<ControllerSession>> {
        self.session.get().ok_or(CloudError::NotConfigured)
    }
}

fn already_configured() -> CloudError {
    CloudError::ConfigInvalid(ConfigError::InvalidValue {
        field: "provider",
        reason: "provider is already configured".to_string(),
    })
}

#[async_trait]
impl ApiCaller for ProviderHandle {
    /// Empty until the handle is configured
    fn username(&self) -> String {
        self.session
            .get()
            .map(|s| s.username().to_string())
            .unwrap_or_default()
    }

    async fn call(&self, method: Method, api_path: &str, params: Params) -> Result<String> {
        self.session()?.call(method, api_path, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_unconfigured_call() {
        let handle = ProviderHandle::new();
        assert!(!handle.is_configured());
        assert_eq!(handle.username(), "");

        let err = handle
            .call(Method::Post, "/restmachine/cloudapi/rg/list", Params::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotConfigured);
    }

    #[tokio::test]
    async fn test_configure_invalid_stays_unconfigured() {
        let handle = ProviderHandle::new();
        let config = ProviderConfig::new()
            .with_controller_url("https://ctl.example.com")
            .with_authenticator("kerberos");

        let err = handle.configure(&config).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(!handle.is_configured());
        assert!(matches!(handle.session(), Err(CloudError::NotConfigured)));
    }
}
