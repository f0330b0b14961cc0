//! Client library for the LankaLotto agent backend.
//!
//! Field-agent apps embed this crate for the plumbing every screen needs:
//! the OTP login flow, the process-wide session, the credential store that
//! survives restarts behind it, and the gateway that stamps authorized
//! requests with the session's bearer token.
//!
//! ```no_run
//! # async fn run() -> lottolink::Result<()> {
//! let config = lottolink::Config::load(std::path::Path::new("lottolink.toml")).unwrap();
//! let client = lottolink::AgentClient::connect(config).await?;
//!
//! let mut login = client.login();
//! login.request_otp("0771234567").await?;
//! // ...agent reads the SMS...
//! login.verify_otp("482913").await?;
//!
//! let profile = client.gateway.fetch_profile().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod store;

pub use api::ApiGateway;
pub use auth::{LoginFlow, LoginPhase};
pub use config::Config;
pub use error::{Error, Result};
pub use session::{Session, SessionManager};
pub use store::CredentialStore;

use std::sync::Arc;

/// Composition root an embedding app constructs once at startup.
pub struct AgentClient {
    pub config: Config,
    pub sessions: Arc<SessionManager>,
    pub gateway: Arc<ApiGateway>,
}

impl AgentClient {
    /// Open the credential store, hydrate any persisted identity, and wire
    /// up the gateway. A hydrated identity carries no token; authorized
    /// calls stay unauthenticated until the agent logs in again.
    pub async fn connect(config: Config) -> Result<Self> {
        let store = Arc::new(CredentialStore::open(&config.storage.data_dir).await?);
        let sessions = Arc::new(SessionManager::new(store));
        sessions.hydrate().await?;
        let gateway = Arc::new(ApiGateway::new(&config.backend, sessions.clone())?);
        Ok(Self {
            config,
            sessions,
            gateway,
        })
    }

    /// Begin an OTP login. Each call starts a fresh flow.
    pub fn login(&self) -> LoginFlow {
        LoginFlow::new(self.gateway.clone(), self.sessions.clone())
    }

    /// Drop the session and wipe the persisted identity.
    pub async fn logout(&self) -> Result<()> {
        self.sessions.clear_session().await
    }
}
