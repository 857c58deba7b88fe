//! Endpoint and protocol settings for the client.

/// Login endpoint of the production service
pub const DEFAULT_LOGIN_URL: &str = "https://logins-v1.curseapp.net/login";
/// Session endpoint of the production service
pub const DEFAULT_SESSION_URL: &str = "https://sessions-v1.curseapp.net/sessions";
/// Notification WebSocket of the production service
pub const DEFAULT_NOTIFICATIONS_URL: &str = "wss://notifications-v1.curseapp.net/";
/// Client version announced in the join request
pub const CLIENT_VERSION: &str = "7.0.32";
/// Platform identifier sent on session creation (desktop client)
pub const DEFAULT_PLATFORM: u32 = 7;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// REST endpoint used to exchange username/password for a token
    pub login_url: String,
    /// REST endpoint used to create a session for a machine key
    pub session_url: String,
    /// WebSocket endpoint of the notification service
    pub notifications_url: String,
    /// Client version sent when joining the notification service
    pub client_version: String,
    /// Platform identifier sent on session creation
    pub platform: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            session_url: DEFAULT_SESSION_URL.to_string(),
            notifications_url: DEFAULT_NOTIFICATIONS_URL.to_string(),
            client_version: CLIENT_VERSION.to_string(),
            platform: DEFAULT_PLATFORM,
        }
    }
}

impl ClientConfig {
    /// Point all endpoints at a single HTTP base URL.
    ///
    /// Used to run against a local or staging deployment that serves
    /// `/login`, `/sessions` and `/notifications` from one host.
    ///
    /// ```
    /// use cursevoice_client::ClientConfig;
    ///
    /// let config = ClientConfig::with_base_url("http://127.0.0.1:8080/");
    /// assert_eq!(config.login_url, "http://127.0.0.1:8080/login");
    /// assert_eq!(config.notifications_url, "ws://127.0.0.1:8080/notifications");
    /// ```
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };

        Self {
            login_url: format!("{base}/login"),
            session_url: format!("{base}/sessions"),
            notifications_url: format!("{ws_base}/notifications"),
            ..Self::default()
        }
    }
}
