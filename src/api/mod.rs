//! HTTP gateway to the agent backend.
//!
//! Every outbound call goes through here: the current session's bearer
//! token is attached when one exists, and all failures funnel into the
//! crate error taxonomy. There is no automatic retry and no token
//! refresh: a 401 surfaces to the caller, which clears the session and
//! routes the agent back to login.

mod sales;
mod types;
mod users;

pub use types::{
    AgentProfile, ProfileUpdate, RegisterBody, SalesByDate, SalesRecord, UserDetails,
    VerifyOtpResponse,
};

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::session::SessionManager;

pub struct ApiGateway {
    base_url: String,
    http: reqwest::Client,
    sessions: Arc<SessionManager>,
}

impl ApiGateway {
    pub fn new(config: &BackendConfig, sessions: Arc<SessionManager>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            sessions,
        })
    }

    /// Issue a request against the backend and return the parsed JSON
    /// body. Callers wanting a typed response use the endpoint wrappers;
    /// this is the raw entry point for anything else.
    pub async fn call(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request).await
    }

    /// Build a request with the session's bearer token attached when one
    /// exists. Requests made while logged out (or from a restored,
    /// unauthenticated session) simply carry no Authorization header.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Backend request");
        let mut request = self.http.request(method, url);
        if let Some(token) = self.sessions.current_session().and_then(|s| s.auth_token) {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(status, response).await);
        }

        response
            .json()
            .await
            .map_err(|e| Error::network(format!("Malformed response body: {e}")))
    }
}

/// Pull the backend's `message` field out of an error body when there is
/// one; anything else gets a generic fallback.
async fn error_from_response(status: StatusCode, response: reqwest::Response) -> Error {
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
    Error::api(status.as_u16(), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::store::CredentialStore;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use tempfile::TempDir;

    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn gateway_against(base_url: String) -> (ApiGateway, Arc<SessionManager>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(CredentialStore::open(dir.path()).await.unwrap());
        let sessions = Arc::new(SessionManager::new(store));
        sessions.hydrate().await.unwrap();

        let config = BackendConfig {
            base_url,
            timeout_secs: 5,
        };
        let gateway = ApiGateway::new(&config, sessions.clone()).unwrap();
        (gateway, sessions, dir)
    }

    fn logged_in_session() -> Session {
        Session {
            agent_id: "6638b2".to_string(),
            agent_name: "W. Perera".to_string(),
            agent_no: "NLB-4417".to_string(),
            auth_token: Some("tok-abc".to_string()),
        }
    }

    /// Echoes whether an Authorization header arrived, for header assertions.
    fn header_echo_backend() -> Router {
        Router::new().route(
            "/echo",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                Json(json!({ "authorization": auth }))
            }),
        )
    }

    #[tokio::test]
    async fn test_call_without_session_sends_no_auth_header() {
        let base = spawn_backend(header_echo_backend()).await;
        let (gateway, _sessions, _dir) = gateway_against(base).await;

        let body = gateway.call(Method::GET, "/echo", None).await.unwrap();
        assert_eq!(body["authorization"], Value::Null);
    }

    #[tokio::test]
    async fn test_call_with_session_sends_bearer_token() {
        let base = spawn_backend(header_echo_backend()).await;
        let (gateway, sessions, _dir) = gateway_against(base).await;
        sessions.set_session(logged_in_session()).await;

        let body = gateway.call(Method::GET, "/echo", None).await.unwrap();
        assert_eq!(body["authorization"], "Bearer tok-abc");
    }

    #[tokio::test]
    async fn test_restored_session_without_token_sends_no_header() {
        let base = spawn_backend(header_echo_backend()).await;
        let (gateway, sessions, _dir) = gateway_against(base).await;
        let mut session = logged_in_session();
        session.auth_token = None;
        sessions.set_session(session).await;

        let body = gateway.call(Method::GET, "/echo", None).await.unwrap();
        assert_eq!(body["authorization"], Value::Null);
    }

    #[tokio::test]
    async fn test_non_2xx_uses_backend_message() {
        let backend = Router::new().route(
            "/guarded",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"message": "Token has expired."})),
                )
            }),
        );
        let base = spawn_backend(backend).await;
        let (gateway, _sessions, _dir) = gateway_against(base).await;

        let err = gateway.call(Method::GET, "/guarded", None).await.unwrap_err();
        match err {
            Error::Api { status, ref message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Token has expired.");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert!(err.requires_relogin());
    }

    #[tokio::test]
    async fn test_non_2xx_without_message_gets_fallback() {
        let backend = Router::new().route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "not json") }),
        );
        let base = spawn_backend(backend).await;
        let (gateway, _sessions, _dir) = gateway_against(base).await;

        let err = gateway.call(Method::GET, "/broken", None).await.unwrap_err();
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Request failed with status 500");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_a_network_error() {
        let (gateway, _sessions, _dir) =
            gateway_against("http://127.0.0.1:1".to_string()).await;
        let err = gateway.call(Method::GET, "/echo", None).await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_a_network_error() {
        let backend = Router::new().route("/mangled", get(|| async { "definitely not json" }));
        let base = spawn_backend(backend).await;
        let (gateway, _sessions, _dir) = gateway_against(base).await;

        let err = gateway.call(Method::GET, "/mangled", None).await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }
}
