//! REST payloads for the login and session endpoints.

use serde::{Deserialize, Serialize};

use crate::machine_key::MachineKey;

/// `Status` value of a successful login
pub const LOGIN_STATUS_SUCCESS: i32 = 1;

/// Body of `POST /login`
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Answer of `POST /login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginResult {
    pub status: i32,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub session: Option<LoginSession>,
}

impl LoginResult {
    pub fn is_success(&self) -> bool {
        self.status == LOGIN_STATUS_SUCCESS && self.session.is_some()
    }
}

/// Session part of a login answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginSession {
    #[serde(rename = "UserID")]
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(rename = "SessionID")]
    pub session_id: String,
    pub token: String,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub expires: Option<i64>,
    #[serde(default)]
    pub renew_after: Option<i64>,
}

/// Body of `POST /sessions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionRequest {
    pub machine_key: MachineKey,
    pub platform: u32,
    #[serde(rename = "DeviceID")]
    pub device_id: Option<String>,
    pub push_kit_token: Option<String>,
}

impl SessionRequest {
    /// Desktop session request: no device id, no push token.
    pub fn new(machine_key: MachineKey, platform: u32) -> Self {
        Self {
            machine_key,
            platform,
            device_id: None,
            push_kit_token: None,
        }
    }
}

/// Answer of `POST /sessions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionResult {
    #[serde(rename = "SessionID")]
    pub session_id: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionUser {
    #[serde(rename = "UserID")]
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
}
