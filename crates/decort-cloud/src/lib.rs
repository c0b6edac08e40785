//! DECORT controller client
//!
//! The authenticated REST client every resource module goes through. It
//! picks an authentication mode, obtains credentials once, injects them into
//! each request, and rewrites the controller's Python-flavoured responses
//! into strict JSON.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │     resource modules (accounts, rg, k8s…)    │
//! └──────────────────────┬───────────────────────┘
//!                        │ ApiCaller::{username, call}
//! ┌──────────────────────▼───────────────────────┐
//! │  ProviderHandle ─▶ ControllerSession         │
//! │                    (dispatcher)              │
//! │   ┌──────────┐  ┌───────────┐  ┌──────────┐  │
//! │   │   auth   │─▶│ transport │─▶│normalize │  │
//! │   └──────────┘  └───────────┘  └──────────┘  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use decort_cloud::{ControllerSession, Method, Params};
//! use decort_config::ProviderConfig;
//!
//! let config = ProviderConfig::load()?;
//! let session = ControllerSession::connect(&config).await?;
//!
//! let body = session
//!     .call(Method::Post, "/restmachine/cloudapi/rg/list", Params::new())
//!     .await?;
//! ```

pub mod api;
pub mod auth;
pub mod error;
pub mod handle;
pub mod normalize;
pub mod params;
pub mod session;
pub mod transport;

// Re-exports
pub use api::{ApiCaller, Method, call_json, decode_json};
pub use auth::username_from_token;
pub use decort_config::{Authenticator, ProviderConfig, ValidatedConfig};
pub use error::{CloudError, ErrorKind, Result};
pub use handle::ProviderHandle;
pub use normalize::normalize;
pub use params::Params;
pub use session::ControllerSession;
pub use transport::{Transport, TransportResponse};
