//! Process-wide session state.
//!
//! The session is the only mutable state shared across screens. Screens
//! read it; the two mutation entry points here are the only writers, so a
//! new login replaces the previous identity wholesale and no partial
//! update is ever observable.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::store::{CredentialKey, CredentialStore};

/// The authenticated identity of the current agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque identifier assigned by the backend.
    pub agent_id: String,
    pub agent_name: String,
    /// NLB/DLB number shown alongside the name.
    pub agent_no: String,
    /// Bearer credential for authorized calls. Never persisted: a session
    /// hydrated from storage carries `None` until the agent logs in again.
    pub auth_token: Option<String>,
}

impl Session {
    /// False for a session restored from storage. Authorized calls made
    /// without a token carry no Authorization header and the backend's
    /// 401 routes the agent back to login.
    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }
}

/// Lifecycle of the session cell.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionState {
    Uninitialized,
    Empty,
    Restored(Session),
    Active(Session),
    Cleared,
}

pub struct SessionManager {
    store: Arc<CredentialStore>,
    state: RwLock<SessionState>,
}

impl SessionManager {
    pub fn new(store: Arc<CredentialStore>) -> Self {
        Self {
            store,
            state: RwLock::new(SessionState::Uninitialized),
        }
    }

    /// Rebuild the agent identity from persisted credentials. All three
    /// fields must be present; anything less hydrates to an empty state.
    pub async fn hydrate(&self) -> Result<()> {
        let agent_id = self.store.get(CredentialKey::AgentId).await?;
        let agent_name = self.store.get(CredentialKey::AgentName).await?;
        let agent_no = self.store.get(CredentialKey::AgentNo).await?;

        let next = match (agent_id, agent_name, agent_no) {
            (Some(agent_id), Some(agent_name), Some(agent_no)) => {
                info!(%agent_id, "Restored agent identity from storage");
                SessionState::Restored(Session {
                    agent_id,
                    agent_name,
                    agent_no,
                    auth_token: None,
                })
            }
            _ => {
                debug!("No persisted agent identity");
                SessionState::Empty
            }
        };
        *self.state.write() = next;
        Ok(())
    }

    /// Replace the current session wholesale. The in-memory update is
    /// visible as soon as this is called; the credential writes that
    /// follow are best-effort and a failure leaves the new session in
    /// place, logged but not propagated.
    pub async fn set_session(&self, session: Session) {
        *self.state.write() = SessionState::Active(session.clone());

        for (key, value) in [
            (CredentialKey::AgentId, &session.agent_id),
            (CredentialKey::AgentName, &session.agent_name),
            (CredentialKey::AgentNo, &session.agent_no),
        ] {
            if let Err(e) = self.store.put(key, value).await {
                warn!(key = key.as_str(), error = %e, "Failed to persist credential");
            }
        }
    }

    /// Drop the session and the persisted credentials. The in-memory clear
    /// holds even when a removal fails.
    pub async fn clear_session(&self) -> Result<()> {
        *self.state.write() = SessionState::Cleared;

        for key in CredentialKey::ALL {
            self.store.remove(key).await?;
        }
        info!("Session cleared");
        Ok(())
    }

    /// Pure read; never touches storage.
    pub fn current_session(&self) -> Option<Session> {
        match &*self.state.read() {
            SessionState::Restored(session) | SessionState::Active(session) => {
                Some(session.clone())
            }
            _ => None,
        }
    }
}
