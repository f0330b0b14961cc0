//! Typed wrappers for the `/users` endpoints.

use reqwest::Method;

use super::types::{
    AgentProfile, MessageResponse, ProfileUpdate, RegisterBody, RequestOtpBody, UserDetails,
    VerifyOtpBody, VerifyOtpResponse,
};
use super::ApiGateway;
use crate::error::{Error, Result};

impl ApiGateway {
    /// `POST /users/request-otp`; returns the backend's confirmation
    /// message for the login screen.
    pub async fn request_otp(&self, contact_no: &str) -> Result<String> {
        let response: MessageResponse = self
            .send(
                self.request(Method::POST, "/users/request-otp")
                    .json(&RequestOtpBody { contact_no }),
            )
            .await?;
        Ok(response.message)
    }

    /// `POST /users/verify-otp`; a 2xx carries the session token.
    pub async fn verify_otp(&self, contact_no: &str, otp: &str) -> Result<VerifyOtpResponse> {
        self.send(
            self.request(Method::POST, "/users/verify-otp")
                .json(&VerifyOtpBody { contact_no, otp }),
        )
        .await
    }

    /// `GET /users/me`: identity lookup by contact number. Deliberately
    /// unauthenticated: it runs during login, before any token exists.
    pub async fn fetch_user_details(&self, contact_no: &str) -> Result<UserDetails> {
        self.send(
            self.request(Method::GET, "/users/me")
                .query(&[("contact_no", contact_no)]),
        )
        .await
    }

    /// Authorized `GET /users/profile`.
    pub async fn fetch_profile(&self) -> Result<AgentProfile> {
        self.send(self.request(Method::GET, "/users/profile")).await
    }

    /// Authorized `PUT /users/profile`. At least one field must be
    /// present; the backend rejects an empty update anyway, so it is
    /// caught here before the network.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<String> {
        if update.password.is_none() && update.address.is_none() {
            return Err(Error::validation("No updates provided"));
        }
        let response: MessageResponse = self
            .send(self.request(Method::PUT, "/users/profile").json(update))
            .await?;
        Ok(response.message)
    }

    /// `POST /users/register`: submits a new agent for admin approval.
    /// All fields are required.
    pub async fn register(&self, registration: &RegisterBody<'_>) -> Result<String> {
        let fields = [
            registration.agent_name,
            registration.nlb_dlb_no,
            registration.contact_no,
            registration.address,
            registration.password,
        ];
        if fields.iter().any(|field| field.trim().is_empty()) {
            return Err(Error::validation(
                "Missing required fields. All fields are required.",
            ));
        }
        let response: MessageResponse = self
            .send(
                self.request(Method::POST, "/users/register")
                    .json(registration),
            )
            .await?;
        Ok(response.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::session::{Session, SessionManager};
    use crate::store::CredentialStore;
    use axum::http::HeaderMap;
    use axum::routing::{get, put};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::Arc;
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

    #[tokio::test]
    async fn test_fetch_user_details_encodes_query() {
        let backend = Router::new().route(
            "/users/me",
            get(
                |axum::extract::Query(params): axum::extract::Query<
                    std::collections::HashMap<String, String>,
                >| async move {
                    assert_eq!(params["contact_no"], "+94771234567");
                    Json(json!({"agent_id": "6638b2", "name": "W. Perera", "nlb_no": "NLB-4417"}))
                },
            ),
        );
        let base = spawn_backend(backend).await;
        let (gateway, _sessions, _dir) = gateway_against(base).await;

        let details = gateway.fetch_user_details("+94771234567").await.unwrap();
        assert_eq!(details.agent_id, "6638b2");
        assert_eq!(details.agent_no(), "NLB-4417");
    }

    #[tokio::test]
    async fn test_fetch_profile_is_authorized_and_typed() {
        let backend = Router::new().route(
            "/users/profile",
            get(|headers: HeaderMap| async move {
                assert_eq!(
                    headers.get("authorization").unwrap().to_str().unwrap(),
                    "Bearer tok-abc"
                );
                Json(json!({
                    "Agent_Name": "W. Perera",
                    "NLB_DLB_No": "NLB-4417",
                    "Contact_No": "+94771234567",
                    "Address": "12 Temple Rd, Kandy"
                }))
            }),
        );
        let base = spawn_backend(backend).await;
        let (gateway, sessions, _dir) = gateway_against(base).await;
        sessions
            .set_session(Session {
                agent_id: "6638b2".to_string(),
                agent_name: "W. Perera".to_string(),
                agent_no: "NLB-4417".to_string(),
                auth_token: Some("tok-abc".to_string()),
            })
            .await;

        let profile = gateway.fetch_profile().await.unwrap();
        assert_eq!(profile.agent_name, "W. Perera");
        assert_eq!(profile.address, "12 Temple Rd, Kandy");
    }

    #[tokio::test]
    async fn test_update_profile_rejects_empty_update_without_network() {
        let (gateway, _sessions, _dir) =
            gateway_against("http://127.0.0.1:1".to_string()).await;
        let err = gateway
            .update_profile(&ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_profile_sends_present_fields() {
        let backend = Router::new().route(
            "/users/profile",
            put(|Json(body): Json<Value>| async move {
                assert_eq!(body["address"], "12 Temple Rd, Kandy");
                assert!(body.get("password").is_none());
                Json(json!({"message": "Profile updated successfully."}))
            }),
        );
        let base = spawn_backend(backend).await;
        let (gateway, _sessions, _dir) = gateway_against(base).await;

        let message = gateway
            .update_profile(&ProfileUpdate {
                password: None,
                address: Some("12 Temple Rd, Kandy".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(message, "Profile updated successfully.");
    }

    #[tokio::test]
    async fn test_register_rejects_blank_fields_without_network() {
        let (gateway, _sessions, _dir) =
            gateway_against("http://127.0.0.1:1".to_string()).await;
        let err = gateway
            .register(&RegisterBody {
                agent_name: "W. Perera",
                nlb_dlb_no: "NLB-4417",
                contact_no: "+94771234567",
                address: "  ",
                password: "hunter2hunter2",
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
