//! REST accessor for the login and session endpoints.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::{
    config::ClientConfig,
    dto::rest::{LoginRequest, LoginResult, SessionRequest, SessionResult},
    error::ClientError,
};

/// Header carrying the login token on session creation
pub const AUTHENTICATION_TOKEN_HEADER: &str = "AuthenticationToken";

/// REST API trait
///
/// `CurseClient` depends on this trait only, so tests and callers can swap the
/// HTTP implementation for their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestApi: Send + Sync {
    /// Exchange username and password for a login token.
    ///
    /// Fails with [`ClientError::AuthenticationFailed`] when the service rejects
    /// the credentials.
    async fn authenticate(&self, username: &str, password: &str)
    -> Result<LoginResult, ClientError>;

    /// Create a session for a machine key, authorized by a login token.
    async fn create_session(
        &self,
        token: &str,
        request: &SessionRequest,
    ) -> Result<SessionResult, ClientError>;
}

/// `RestApi` implementation over HTTP
pub struct HttpRestApi {
    http: reqwest::Client,
    login_url: String,
    session_url: String,
}

impl HttpRestApi {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_http_client(reqwest::Client::new(), config)
    }

    /// Use a preconfigured `reqwest::Client` (proxy, timeouts, user agent).
    pub fn with_http_client(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            login_url: config.login_url.clone(),
            session_url: config.session_url.clone(),
        }
    }
}

#[async_trait]
impl RestApi for HttpRestApi {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResult, ClientError> {
        tracing::debug!("Logging in as '{}'", username);

        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.http.post(&self.login_url).json(&request).send().await?;
        let result: LoginResult = read_json("login", response).await?;

        if !result.is_success() {
            let reason = result
                .status_message
                .clone()
                .unwrap_or_else(|| format!("login status {}", result.status));
            tracing::warn!("Login rejected for '{}': {}", username, reason);
            return Err(ClientError::AuthenticationFailed(reason));
        }

        tracing::info!("Logged in as '{}'", username);
        Ok(result)
    }

    async fn create_session(
        &self,
        token: &str,
        request: &SessionRequest,
    ) -> Result<SessionResult, ClientError> {
        let response = self
            .http
            .post(&self.session_url)
            .header(AUTHENTICATION_TOKEN_HEADER, token)
            .json(request)
            .send()
            .await?;
        let result: SessionResult = read_json("sessions", response).await?;

        tracing::debug!(
            "Session '{}' created for user {}",
            result.session_id,
            result.user.user_id
        );
        Ok(result)
    }
}

async fn read_json<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ClientError::AuthenticationFailed(format!(
            "{} rejected with HTTP {}",
            endpoint,
            status.as_u16()
        )));
    }
    if !status.is_success() {
        return Err(ClientError::UnexpectedStatus {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
