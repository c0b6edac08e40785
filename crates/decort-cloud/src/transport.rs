//! HTTP transport shared by every controller call
//!
//! One reqwest client per session. It owns connection reuse, the TLS policy
//! and the per-request timeout, and never keeps a cookie jar.

use crate::api::Method;
use crate::error::Result;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderValue};
use std::time::{Duration, Instant};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const USER_AGENT: &str = concat!("decort-cloud/", env!("CARGO_PKG_VERSION"));

/// Status and fully-read body of one HTTP exchange
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Configured HTTP executor
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
    timeout: Duration,
}

impl Transport {
    pub fn new(timeout: Duration, allow_unverified_tls: bool) -> Result<Self> {
        if allow_unverified_tls {
            tracing::warn!(
                "TLS certificate verification is disabled for controller connections"
            );
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(allow_unverified_tls)
            .build()?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send a form-encoded body and read the whole response.
    ///
    /// The body is sent for GET as well; the controller expects form bodies
    /// on every call.
    pub async fn send_form(
        &self,
        method: Method,
        url: &str,
        body: String,
        bearer: Option<&HeaderValue>,
    ) -> Result<TransportResponse> {
        let mut request = self
            .client
            .request(method.into(), url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(CONTENT_LENGTH, body.len());

        if let Some(value) = bearer {
            request = request.header(AUTHORIZATION, value.clone());
        }

        let started = Instant::now();
        let response = request.body(body).send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        tracing::debug!(
            %method,
            url,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "controller request finished"
        );

        Ok(TransportResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}
