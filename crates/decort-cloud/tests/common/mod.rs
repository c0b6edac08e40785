#![allow(dead_code)]

use base64::Engine;
use decort_config::ProviderConfig;
use wiremock::MockServer;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, ResponseTemplate};

pub const AUTHENTICATE_PATH: &str = "/restmachine/cloudapi/users/authenticate";
pub const ACCOUNTS_LIST_PATH: &str = "/restmachine/cloudapi/accounts/list";
pub const TOKEN_PATH: &str = "/v1/oauth/access_token";

/// Unsigned JWT-shaped token carrying `payload` as its claims
pub fn jwt_with_claims(payload: &str) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    format!(
        "{}.{}.{}",
        engine.encode(r#"{"alg":"ES384","typ":"JWT"}"#),
        engine.encode(payload),
        engine.encode("not-a-real-signature")
    )
}

pub fn legacy_config(controller: &MockServer) -> ProviderConfig {
    ProviderConfig::new()
        .with_controller_url(controller.uri())
        .with_authenticator("legacy")
        .with_legacy_credentials("u", "p")
}

pub fn oauth2_config(controller: &MockServer, idp: &MockServer) -> ProviderConfig {
    ProviderConfig::new()
        .with_controller_url(controller.uri())
        .with_authenticator("oauth2")
        .with_oauth2_url(idp.uri())
        .with_app_credentials("app-1", "secret-1")
}

/// Accept `u`/`p` on the legacy login endpoint and hand out `sid`.
pub async fn mount_legacy_login(controller: &MockServer, sid: &str) {
    Mock::given(method("POST"))
        .and(path(AUTHENTICATE_PATH))
        .and(body_string("username=u&password=p"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sid))
        .expect(1)
        .mount(controller)
        .await;
}

pub async fn requests_to(server: &MockServer, api_path: &str) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == api_path)
        .collect()
}

pub fn form_pairs(request: &wiremock::Request) -> Vec<(String, String)> {
    url::form_urlencoded::parse(&request.body)
        .into_owned()
        .collect()
}

pub fn header<'a>(request: &'a wiremock::Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}
