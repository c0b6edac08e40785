//! Interface exposed to resource modules

use crate::error::Result;
use crate::params::Params;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// Legacy login endpoint (form: `username`, `password`)
pub const LEGACY_AUTHENTICATE_PATH: &str = "/restmachine/cloudapi/users/authenticate";

/// Endpoint used to probe an externally supplied bearer token
pub const JWT_PROBE_PATH: &str = "/restmachine/cloudapi/accounts/list";

/// Token endpoint, relative to the OAuth2 base URL
pub const OAUTH2_TOKEN_PATH: &str = "/v1/oauth/access_token";

/// Form parameter carrying the legacy session id
pub const AUTHKEY_PARAM: &str = "authkey";

/// HTTP verb of a controller call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    Get,
    #[default]
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// What resource modules see of a controller session.
///
/// Implemented by [`crate::ControllerSession`] and
/// [`crate::ProviderHandle`].
#[async_trait]
pub trait ApiCaller: Send + Sync {
    /// Display name of the authenticated user (`user` or `user@issuer`)
    fn username(&self) -> String;

    /// Execute one controller call and return the normalized JSON body.
    ///
    /// An empty string is a successful "no result".
    async fn call(&self, method: Method, api_path: &str, params: Params) -> Result<String>;
}

#[async_trait]
impl<T: ApiCaller + ?Sized> ApiCaller for Arc<T> {
    fn username(&self) -> String {
        (**self).username()
    }

    async fn call(&self, method: Method, api_path: &str, params: Params) -> Result<String> {
        (**self).call(method, api_path, params).await
    }
}

/// [`ApiCaller::call`] followed by [`decode_json`].
pub async fn call_json<C, T>(
    caller: &C,
    method: Method,
    api_path: &str,
    params: Params,
) -> Result<Option<T>>
where
    C: ApiCaller + ?Sized,
    T: DeserializeOwned,
{
    let body = caller.call(method, api_path, params).await?;
    decode_json(&body)
}

/// Decode a normalized body; empty bodies and a bare `""` mean "no result".
pub fn decode_json<T: DeserializeOwned>(body: &str) -> Result<Option<T>> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "\"\"" {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CloudError;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Group {
        id: u64,
        name: String,
    }

    struct Canned(&'static str);

    #[async_trait]
    impl ApiCaller for Canned {
        fn username(&self) -> String {
            "tester".to_string()
        }

        async fn call(&self, _method: Method, _api_path: &str, _params: Params) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Post.to_string(), "POST");
        assert_eq!(Method::default(), Method::Post);
        assert_eq!(reqwest::Method::from(Method::Get), reqwest::Method::GET);
    }

    #[test]
    fn test_decode_json() {
        let group: Option<Group> = decode_json(r#"{"id": 3, "name": "rg"}"#).unwrap();
        assert_eq!(
            group,
            Some(Group {
                id: 3,
                name: "rg".to_string()
            })
        );
    }

    #[test]
    fn test_decode_json_empty_is_none() {
        assert_eq!(decode_json::<Group>("").unwrap(), None);
        assert_eq!(decode_json::<Group>("  \n").unwrap(), None);
        assert_eq!(decode_json::<Group>("\"\"").unwrap(), None);
    }

    #[test]
    fn test_decode_json_error() {
        let err = decode_json::<Group>("{not json").unwrap_err();
        assert!(matches!(err, CloudError::Json(_)));
    }

    #[tokio::test]
    async fn test_call_json_through_arc() {
        let caller: Arc<dyn ApiCaller> = Arc::new(Canned(r#"[{"id": 1, "name": "a"}]"#));
        assert_eq!(caller.username(), "tester");

        let groups: Option<Vec<Group>> = call_json(
            &caller,
            Method::Post,
            "/restmachine/cloudapi/rg/list",
            Params::new(),
        )
        .await
        .unwrap();
        assert_eq!(groups.unwrap().len(), 1);
    }
}
