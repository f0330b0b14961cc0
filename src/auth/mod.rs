//! OTP login flow.
//!
//! Two network steps gate a session: request a one-time passcode for a
//! contact number, then trade the received code for a token. Verification
//! alone is not a login: the agent's identity record must also resolve,
//! and a failure at that point reports as a failed login with no session
//! change.

mod phone;

pub use phone::{normalize_contact_no, validate_contact_no};

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::ApiGateway;
use crate::error::{Error, Result};
use crate::session::{Session, SessionManager};

/// Seconds an agent must wait before requesting another OTP.
pub const RESEND_COOLDOWN_SECS: i64 = 300;

/// Where an in-progress login currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPhase {
    NotRequested,
    AwaitingCode,
    Verifying,
    Verified,
    Failed,
}

/// State of one login attempt. Create a fresh flow per login screen;
/// a successful verification hands the session to the [`SessionManager`]
/// and the flow is done.
pub struct LoginFlow {
    gateway: Arc<ApiGateway>,
    sessions: Arc<SessionManager>,
    phase: LoginPhase,
    contact_no: Option<String>,
    otp_requested_at: Option<DateTime<Utc>>,
    verify_in_flight: bool,
}

impl LoginFlow {
    pub fn new(gateway: Arc<ApiGateway>, sessions: Arc<SessionManager>) -> Self {
        Self {
            gateway,
            sessions,
            phase: LoginPhase::NotRequested,
            contact_no: None,
            otp_requested_at: None,
            verify_in_flight: false,
        }
    }

    pub fn phase(&self) -> LoginPhase {
        self.phase
    }

    /// The normalized number the login screen should display, set on every
    /// request-OTP attempt regardless of its outcome.
    pub fn contact_no(&self) -> Option<&str> {
        self.contact_no.as_deref()
    }

    /// Request an OTP for `raw_number`. The number is normalized and
    /// validated first; a success arms the resend cool-down and returns
    /// the backend's confirmation message verbatim.
    pub async fn request_otp(&mut self, raw_number: &str) -> Result<String> {
        let contact_no = normalize_contact_no(raw_number);
        validate_contact_no(&contact_no)?;
        self.contact_no = Some(contact_no.clone());
        self.send_otp(contact_no).await
    }

    /// Re-send the OTP to the number from the original request. Only valid
    /// while awaiting a code with the cool-down elapsed; a success resets
    /// the cool-down.
    pub async fn resend_otp(&mut self) -> Result<String> {
        if self.phase != LoginPhase::AwaitingCode {
            return Err(Error::validation("No OTP request to resend"));
        }
        if !self.can_resend() {
            return Err(Error::validation("Resend is not available yet"));
        }
        let contact_no = match &self.contact_no {
            Some(contact_no) => contact_no.clone(),
            None => return Err(Error::validation("No OTP request to resend")),
        };
        self.send_otp(contact_no).await
    }

    async fn send_otp(&mut self, contact_no: String) -> Result<String> {
        match self.gateway.request_otp(&contact_no).await {
            Ok(message) => {
                info!(%contact_no, "OTP requested");
                self.phase = LoginPhase::AwaitingCode;
                self.otp_requested_at = Some(Utc::now());
                Ok(message)
            }
            Err(e) => {
                warn!(%contact_no, error = %e, "OTP request failed");
                self.phase = LoginPhase::Failed;
                Err(auth_error(e))
            }
        }
    }

    /// True once the resend cool-down has fully elapsed.
    pub fn can_resend(&self) -> bool {
        self.can_resend_at(Utc::now())
    }

    fn can_resend_at(&self, now: DateTime<Utc>) -> bool {
        match self.otp_requested_at {
            Some(requested_at) => now - requested_at >= Duration::seconds(RESEND_COOLDOWN_SECS),
            None => false,
        }
    }

    /// Seconds left on the resend countdown, for display.
    pub fn resend_available_in(&self) -> i64 {
        self.resend_available_in_at(Utc::now())
    }

    fn resend_available_in_at(&self, now: DateTime<Utc>) -> i64 {
        match self.otp_requested_at {
            Some(requested_at) => {
                (RESEND_COOLDOWN_SECS - (now - requested_at).num_seconds()).max(0)
            }
            None => 0,
        }
    }

    /// Trade the received code for a session. The verify call and the
    /// follow-up identity fetch must both succeed; only then does the new
    /// session replace any prior one. A second call while one is
    /// outstanding is rejected rather than queued.
    pub async fn verify_otp(&mut self, code: &str) -> Result<Session> {
        if self.verify_in_flight {
            return Err(Error::validation("A verification is already in progress"));
        }
        let contact_no = match &self.contact_no {
            Some(contact_no) => contact_no.clone(),
            None => return Err(Error::validation("Request an OTP before verifying")),
        };

        self.verify_in_flight = true;
        self.phase = LoginPhase::Verifying;
        let result = self.verify_inner(&contact_no, code).await;
        self.verify_in_flight = false;

        match result {
            Ok(session) => {
                info!(agent_id = %session.agent_id, "Agent logged in");
                self.phase = LoginPhase::Verified;
                Ok(session)
            }
            Err(e) => {
                warn!(%contact_no, error = %e, "OTP verification failed");
                self.phase = LoginPhase::Failed;
                Err(auth_error(e))
            }
        }
    }

    async fn verify_inner(&self, contact_no: &str, code: &str) -> Result<Session> {
        let verified = self.gateway.verify_otp(contact_no, code).await?;
        // A valid OTP without a resolvable identity record is still a
        // failed login; the session is only created after this succeeds.
        let details = self.gateway.fetch_user_details(contact_no).await?;

        let agent_no = details.agent_no();
        let session = Session {
            agent_id: details.agent_id,
            agent_name: details.name,
            agent_no,
            auth_token: Some(verified.token),
        };
        self.sessions.set_session(session.clone()).await;
        Ok(session)
    }
}

/// Collapse request/verify failures into the single auth kind the login
/// screen renders; the backend message survives verbatim. Validation
/// errors pass through untouched.
fn auth_error(err: Error) -> Error {
    match err {
        Error::Api { message, .. } => Error::Auth(message),
        Error::Network(message) => Error::Auth(message),
        other => other,
    }
}
