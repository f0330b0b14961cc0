//! Wire schemas for the agent backend.
//!
//! The backend is loose about field naming (`name` on one endpoint,
//! `Agent_Name` on another), so each endpoint gets an explicit schema
//! here and the fallback rules live next to the fields they apply to.

use serde::{Deserialize, Serialize};

/// Body for `POST /users/request-otp`.
#[derive(Debug, Serialize)]
pub(crate) struct RequestOtpBody<'a> {
    pub contact_no: &'a str,
}

/// Responses that carry only a human-readable message.
#[derive(Debug, Deserialize)]
pub(crate) struct MessageResponse {
    pub message: String,
}

/// Body for `POST /users/verify-otp`.
#[derive(Debug, Serialize)]
pub(crate) struct VerifyOtpBody<'a> {
    pub contact_no: &'a str,
    pub otp: &'a str,
}

/// Response for a successful OTP verification.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpResponse {
    pub token: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response for `GET /users/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDetails {
    pub agent_id: String,
    pub name: String,
    #[serde(default)]
    pub nlb_no: Option<String>,
    #[serde(default)]
    pub dlb_no: Option<String>,
}

impl UserDetails {
    /// Display number for the agent: NLB first, DLB as fallback, with
    /// empty strings treated the same as absent fields.
    pub fn agent_no(&self) -> String {
        [self.nlb_no.as_deref(), self.dlb_no.as_deref()]
            .into_iter()
            .flatten()
            .find(|no| !no.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Response for the authorized `GET /users/profile`. This endpoint alone
/// uses capitalized keys.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentProfile {
    #[serde(rename = "Agent_Name")]
    pub agent_name: String,
    #[serde(rename = "NLB_DLB_No")]
    pub nlb_dlb_no: String,
    #[serde(rename = "Contact_No")]
    pub contact_no: String,
    #[serde(rename = "Address")]
    pub address: String,
}

/// Body for `POST /users/register`. All fields are required by the
/// backend; the wrapper rejects blanks before the request is sent.
#[derive(Debug, Serialize)]
pub struct RegisterBody<'a> {
    pub agent_name: &'a str,
    pub nlb_dlb_no: &'a str,
    pub contact_no: &'a str,
    pub address: &'a str,
    pub password: &'a str,
}

/// Body for the authorized `PUT /users/profile`. Absent fields are left
/// unchanged server-side and omitted from the payload.
#[derive(Debug, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// One day's sales entry as the agent records it. Also the row shape
/// returned by `GET /sales/agent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub agent_id: String,
    /// `YYYY-MM-DD`, as the app's date picker produces it.
    pub date_of_sale: String,
    pub province: String,
    pub district: String,
    pub area: String,
    pub dlb_sale: i64,
    pub nlb_sale: i64,
    pub total_sale: i64,
}

/// One bucket of the per-date aggregation behind the sales charts.
#[derive(Debug, Clone, Deserialize)]
pub struct SalesByDate {
    #[serde(rename = "_id")]
    pub date: String,
    #[serde(default)]
    pub dlb_sale: i64,
    #[serde(default)]
    pub nlb_sale: i64,
    #[serde(default)]
    pub total_sale: i64,
}
