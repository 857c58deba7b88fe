//! Credentials, session data and connection state held by the client.

use std::fmt;

use crate::machine_key::MachineKey;

/// Username/password pair used to log in.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identifiers obtained from a successful authentication.
///
/// Lives as long as the client; replaced by the next authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub session_id: String,
    pub user_id: i64,
    pub machine_key: MachineKey,
    /// Token returned by the login endpoint
    pub token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("machine_key", &self.machine_key)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Credentials handed to the notification transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportCredentials {
    pub machine_key: MachineKey,
    pub session_id: String,
    pub user_id: i64,
}

impl From<&Session> for TransportCredentials {
    fn from(session: &Session) -> Self {
        Self {
            machine_key: session.machine_key.clone(),
            session_id: session.session_id.clone(),
            user_id: session.user_id,
        }
    }
}

/// Connection lifecycle of [`crate::CurseClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Authenticating,
    Connected,
}
