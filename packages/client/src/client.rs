//! The client facade: authentication, connection lifecycle and messaging.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{Instrument, Span};
use uuid::Uuid;

use crate::{
    config::ClientConfig,
    dto::{
        rest::{LoginResult, SessionRequest},
        websocket::{ConversationMessageRequest, Envelope},
    },
    error::ClientError,
    listener::{ClientListener, DisconnectReason},
    machine_key::MachineKey,
    rest::{HttpRestApi, RestApi},
    session::{ConnectionState, Credentials, Session, TransportCredentials},
    transport::{NotificationTransport, WebSocketTransport},
};

/// Client for the Curse notification service
///
/// Holds the credentials and the current session, drives the REST accessor
/// and the notification transport, and runs every operation inside the span
/// given at construction.
///
/// # Example
///
/// ```no_run
/// use cursevoice_client::{ClientConfig, Credentials, CurseClient};
///
/// # async fn run() -> Result<(), cursevoice_client::ClientError> {
/// let credentials = Credentials::new("alice", "hunter2");
/// let span = CurseClient::default_span(credentials.username());
/// let client = CurseClient::new(credentials, &ClientConfig::default(), span)?;
///
/// client.connect().await?;
/// client.send_text("conversation-id", "Hello!").await?;
/// client.disconnect().await;
/// # Ok(())
/// # }
/// ```
pub struct CurseClient {
    credentials: Credentials,
    platform: u32,
    api: Arc<dyn RestApi>,
    transport: Arc<dyn NotificationTransport>,
    session: Mutex<Option<Session>>,
    state: Arc<watch::Sender<ConnectionState>>,
    /// Registered on the transport to follow disconnects it reports
    state_tracker: Arc<dyn ClientListener>,
    /// Serializes connect/disconnect/reconnect
    lifecycle: Mutex<()>,
    span: Span,
}

impl CurseClient {
    /// Create a client talking HTTP and WebSocket to the endpoints in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the notification URL is not a
    /// `ws://` or `wss://` URL.
    pub fn new(
        credentials: Credentials,
        config: &ClientConfig,
        span: Span,
    ) -> Result<Self, ClientError> {
        let api = Arc::new(HttpRestApi::new(config));
        let transport = Arc::new(WebSocketTransport::from_config(config, span.clone())?);
        Ok(Self::with_collaborators(
            credentials,
            config,
            api,
            transport,
            span,
        ))
    }

    /// Create a client on top of custom collaborators.
    pub fn with_collaborators(
        credentials: Credentials,
        config: &ClientConfig,
        api: Arc<dyn RestApi>,
        transport: Arc<dyn NotificationTransport>,
        span: Span,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let state = Arc::new(state);
        Self {
            credentials,
            platform: config.platform,
            api,
            transport,
            session: Mutex::new(None),
            state_tracker: Arc::new(StateTracker {
                state: state.clone(),
            }),
            state,
            lifecycle: Mutex::new(()),
            span,
        }
    }

    /// Span used when the caller has no span of its own.
    pub fn default_span(username: &str) -> Span {
        tracing::info_span!("curse_client", user = %username)
    }

    /// Direct access to the REST accessor.
    ///
    /// Calls made through it bypass the client's session bookkeeping.
    pub fn rest_api(&self) -> Arc<dyn RestApi> {
        self.api.clone()
    }

    /// Current connection state.
    ///
    /// A socket closed by the service reads as `Disconnected`.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch state transitions, including disconnects reported by the transport.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub async fn session(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Log in, create a session with a fresh machine key and hand the session
    /// credentials to the transport.
    ///
    /// # Errors
    ///
    /// [`ClientError::AuthenticationFailed`] when the service rejects the
    /// credentials; I/O errors are propagated as they are. Nothing is retried.
    pub async fn authenticate(&self) -> Result<LoginResult, ClientError> {
        self.authenticate_inner()
            .instrument(self.span.clone())
            .await
    }

    async fn authenticate_inner(&self) -> Result<LoginResult, ClientError> {
        let username = self.credentials.username();
        tracing::info!("Authenticating as '{}'", username);

        let login = self
            .api
            .authenticate(username, self.credentials.password())
            .await?;
        let token = login
            .session
            .as_ref()
            .map(|session| session.token.clone())
            .ok_or_else(|| {
                ClientError::AuthenticationFailed("login answer carries no session".to_string())
            })?;

        let machine_key = MachineKey::generate();
        let request = SessionRequest::new(machine_key.clone(), self.platform);
        let created = self.api.create_session(&token, &request).await?;

        let session = Session {
            username: username.to_string(),
            session_id: created.session_id,
            user_id: created.user.user_id,
            machine_key,
            token,
        };
        self.transport
            .set_credentials(TransportCredentials::from(&session))
            .await;
        tracing::info!(
            "Session '{}' ready for user {}",
            session.session_id,
            session.user_id
        );
        *self.session.lock().await = Some(session);

        Ok(login)
    }

    /// Open the notification socket, authenticating first if needed.
    ///
    /// Connecting while connected does nothing.
    pub async fn connect(&self) -> Result<(), ClientError> {
        async {
            let _lifecycle = self.lifecycle.lock().await;
            self.connect_locked().await
        }
        .instrument(self.span.clone())
        .await
    }

    async fn connect_locked(&self) -> Result<(), ClientError> {
        if self.state() == ConnectionState::Connected {
            tracing::debug!("Already connected");
            return Ok(());
        }

        if !self.is_authenticated().await {
            self.state.send_replace(ConnectionState::Authenticating);
            if let Err(e) = self.authenticate_inner().await {
                tracing::warn!("Authentication failed: {}", e);
                self.state.send_replace(ConnectionState::Disconnected);
                return Err(e);
            }
        }

        self.transport
            .add_listener(self.state_tracker.clone())
            .await;
        match self.transport.connect().await {
            Ok(()) => {
                // Connected only if the service has not hung up in the meantime
                let transport = &self.transport;
                self.state.send_if_modified(|state| {
                    let next = if transport.is_connected() {
                        ConnectionState::Connected
                    } else {
                        ConnectionState::Disconnected
                    };
                    let changed = *state != next;
                    *state = next;
                    changed
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to connect: {}", e);
                self.state.send_replace(ConnectionState::Disconnected);
                Err(e)
            }
        }
    }

    /// Close the notification socket.
    pub async fn disconnect(&self) {
        async {
            let _lifecycle = self.lifecycle.lock().await;
            self.disconnect_locked().await;
        }
        .instrument(self.span.clone())
        .await
    }

    async fn disconnect_locked(&self) {
        self.transport.close().await;
        self.state.send_replace(ConnectionState::Disconnected);
    }

    /// `disconnect()` followed by `connect()`, without backoff or retries.
    pub async fn reconnect(&self) -> Result<(), ClientError> {
        async {
            let _lifecycle = self.lifecycle.lock().await;
            tracing::info!("Reconnecting");
            self.disconnect_locked().await;
            self.connect_locked().await
        }
        .instrument(self.span.clone())
        .await
    }

    /// Send a message to a conversation.
    ///
    /// `attachment_id` defaults to the all-zero id. Returns the per-message
    /// client id carried by the envelope.
    pub async fn send_message(
        &self,
        conversation_id: &str,
        message: &str,
        attachment_id: Option<Uuid>,
    ) -> Result<Uuid, ClientError> {
        async {
            let request = ConversationMessageRequest::new(conversation_id, message, attachment_id);
            let client_id = request.client_id;
            self.transport
                .send_packet(Envelope::conversation_message(request))
                .await?;
            tracing::debug!(
                "Sent message {} to conversation '{}'",
                client_id,
                conversation_id
            );
            Ok(client_id)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Send a message without attachment.
    pub async fn send_text(
        &self,
        conversation_id: &str,
        message: &str,
    ) -> Result<Uuid, ClientError> {
        self.send_message(conversation_id, message, None).await
    }

    /// Register a listener. Returns `false` if it was already registered.
    pub async fn add_listener(&self, listener: Arc<dyn ClientListener>) -> bool {
        self.transport.add_listener(listener).await
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub async fn remove_listener(&self, listener: &Arc<dyn ClientListener>) -> bool {
        self.transport.remove_listener(listener).await
    }
}

/// Moves the state to `Disconnected` when the transport reports a closed socket.
struct StateTracker {
    state: Arc<watch::Sender<ConnectionState>>,
}

impl ClientListener for StateTracker {
    fn on_disconnected(&self, reason: &DisconnectReason) {
        tracing::debug!("Transport disconnected: {}", reason);
        self.state.send_replace(ConnectionState::Disconnected);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use mockall::{Sequence, predicate::always};

    use super::*;
    use crate::{
        dto::{
            rest::{LoginSession, SessionResult, SessionUser},
            websocket::{NO_ATTACHMENT, RequestBody, type_id},
        },
        error::ErrorKind,
        rest::MockRestApi,
        transport::MockNotificationTransport,
    };

    fn login_result(token: &str) -> LoginResult {
        LoginResult {
            status: 1,
            status_message: None,
            session: Some(LoginSession {
                user_id: 42,
                username: "alice".to_string(),
                display_name: None,
                session_id: "login-session".to_string(),
                token: token.to_string(),
                email_address: None,
                expires: None,
                renew_after: None,
            }),
        }
    }

    fn session_result(session_id: &str, user_id: i64) -> SessionResult {
        SessionResult {
            session_id: session_id.to_string(),
            user: SessionUser {
                user_id,
                username: None,
            },
        }
    }

    /// REST mock that accepts any number of logins.
    fn accepting_api(session_id: &'static str, user_id: i64) -> MockRestApi {
        let mut api = MockRestApi::new();
        api.expect_authenticate()
            .returning(|_, _| Ok(login_result("token-1")));
        api.expect_create_session()
            .returning(move |_, _| Ok(session_result(session_id, user_id)));
        api
    }

    fn client(api: MockRestApi, transport: MockNotificationTransport) -> CurseClient {
        CurseClient::with_collaborators(
            Credentials::new("alice", "hunter2"),
            &ClientConfig::default(),
            Arc::new(api),
            Arc::new(transport),
            Span::none(),
        )
    }

    fn conversation_message(envelope: &Envelope) -> &ConversationMessageRequest {
        match &envelope.body {
            RequestBody::ConversationMessage(request) => request,
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_authenticate_stores_session_as_returned() {
        // テスト項目: authenticate が返されたセッション ID とユーザー ID をそのまま保持する
        // given (前提条件):
        let mut api = MockRestApi::new();
        api.expect_authenticate()
            .withf(|username, password| username == "alice" && password == "hunter2")
            .times(1)
            .returning(|_, _| Ok(login_result("token-1")));
        api.expect_create_session()
            .withf(|token, request| token == "token-1" && request.platform == 7)
            .times(1)
            .returning(|_, _| Ok(session_result("sess-42", 4242)));
        let mut transport = MockNotificationTransport::new();
        transport
            .expect_set_credentials()
            .withf(|credentials| credentials.session_id == "sess-42" && credentials.user_id == 4242)
            .times(1)
            .return_const(());
        let client = client(api, transport);

        // when (操作):
        let login = client.authenticate().await;

        // then (期待する結果):
        assert_eq!(login.unwrap(), login_result("token-1"));
        let session = client.session().await.unwrap();
        assert_eq!(session.session_id, "sess-42");
        assert_eq!(session.user_id, 4242);
        assert_eq!(session.username, "alice");
        assert_eq!(session.token, "token-1");
        assert!(client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_authenticate_uses_fresh_machine_key_for_session_and_transport() {
        // テスト項目: 認証ごとに新しいマシンキーが生成され、セッション作成と
        //             トランスポートに同じキーが渡される
        // given (前提条件):
        let sent_keys = Arc::new(StdMutex::new(Vec::new()));
        let transport_keys = Arc::new(StdMutex::new(Vec::new()));
        let mut api = MockRestApi::new();
        api.expect_authenticate()
            .returning(|_, _| Ok(login_result("token-1")));
        let sent = sent_keys.clone();
        api.expect_create_session().returning(move |_, request| {
            sent.lock().unwrap().push(request.machine_key.clone());
            Ok(session_result("sess", 1))
        });
        let mut transport = MockNotificationTransport::new();
        let received = transport_keys.clone();
        transport
            .expect_set_credentials()
            .returning(move |credentials| {
                received.lock().unwrap().push(credentials.machine_key);
            });
        let client = client(api, transport);

        // when (操作):
        client.authenticate().await.unwrap();
        client.authenticate().await.unwrap();

        // then (期待する結果):
        let sent = sent_keys.lock().unwrap().clone();
        let received = transport_keys.lock().unwrap().clone();
        assert_eq!(sent.len(), 2);
        assert_ne!(sent[0], sent[1]);
        assert_eq!(sent, received);
        assert_eq!(client.session().await.unwrap().machine_key, sent[1]);
    }

    #[tokio::test]
    async fn test_authenticate_failure_is_propagated_without_retry() {
        // テスト項目: 認証失敗はリトライされずにそのまま返り、セッションは作られない
        // given (前提条件):
        let mut api = MockRestApi::new();
        api.expect_authenticate()
            .times(1)
            .returning(|_, _| {
                Err(ClientError::AuthenticationFailed(
                    "InvalidPassword".to_string(),
                ))
            });
        api.expect_create_session().never();
        let mut transport = MockNotificationTransport::new();
        transport.expect_set_credentials().never();
        let client = client(api, transport);

        // when (操作):
        let result = client.authenticate().await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Authentication);
        assert!(client.session().await.is_none());
    }

    #[tokio::test]
    async fn test_connect_authenticates_first_when_unauthenticated() {
        // テスト項目: 未認証で connect すると認証してから接続する
        // given (前提条件):
        let mut seq = Sequence::new();
        let mut api = MockRestApi::new();
        api.expect_authenticate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(login_result("token-1")));
        api.expect_create_session()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(session_result("sess-1", 1)));
        let mut transport = MockNotificationTransport::new();
        transport
            .expect_set_credentials()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        transport
            .expect_connect()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        transport.expect_add_listener().return_const(true);
        transport.expect_is_connected().return_const(true);
        let client = client(api, transport);
        let mut states = client.subscribe_state();

        // when (操作):
        let result = client.connect().await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(client.state(), ConnectionState::Connected);
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_connect_skips_authentication_when_authenticated() {
        // テスト項目: 認証済みの場合、connect は再認証しない
        // given (前提条件):
        let mut api = MockRestApi::new();
        api.expect_authenticate()
            .times(1)
            .returning(|_, _| Ok(login_result("token-1")));
        api.expect_create_session()
            .times(1)
            .returning(|_, _| Ok(session_result("sess-1", 1)));
        let mut transport = MockNotificationTransport::new();
        transport.expect_set_credentials().return_const(());
        transport.expect_add_listener().return_const(true);
        transport.expect_connect().times(1).returning(|| Ok(()));
        transport.expect_is_connected().return_const(true);
        let client = client(api, transport);
        client.authenticate().await.unwrap();

        // when (操作):
        let result = client.connect().await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(client.state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_connect_authentication_failure_does_not_open_socket() {
        // テスト項目: connect 中の認証失敗ではソケットを開かず、状態は Disconnected に戻る
        // given (前提条件):
        let mut api = MockRestApi::new();
        api.expect_authenticate()
            .times(1)
            .returning(|_, _| Err(ClientError::AuthenticationFailed("nope".to_string())));
        let mut transport = MockNotificationTransport::new();
        transport.expect_connect().never();
        let client = client(api, transport);

        // when (操作):
        let result = client.connect().await;

        // then (期待する結果):
        assert!(result.unwrap_err().is_authentication_failure());
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_transport_failure_returns_to_disconnected() {
        // テスト項目: ソケット接続に失敗した場合は I/O エラーが返り Disconnected に戻る
        // given (前提条件):
        let api = accepting_api("sess-1", 1);
        let mut transport = MockNotificationTransport::new();
        transport.expect_set_credentials().return_const(());
        transport.expect_add_listener().return_const(true);
        transport.expect_connect().times(1).returning(|| {
            Err(ClientError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "refused",
            )))
        });
        let client = client(api, transport);

        // when (操作):
        let result = client.connect().await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Io);
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert!(client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_connect_while_connected_is_noop() {
        // テスト項目: 接続中の connect は何もしない
        // given (前提条件):
        let api = accepting_api("sess-1", 1);
        let mut transport = MockNotificationTransport::new();
        transport.expect_set_credentials().return_const(());
        transport.expect_add_listener().return_const(true);
        transport.expect_connect().times(1).returning(|| Ok(()));
        transport.expect_is_connected().return_const(true);
        let client = client(api, transport);
        client.connect().await.unwrap();

        // when (操作):
        let result = client.connect().await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_disconnect_closes_transport() {
        // テスト項目: disconnect がトランスポートを閉じ、状態を Disconnected にする
        // given (前提条件):
        let api = accepting_api("sess-1", 1);
        let mut transport = MockNotificationTransport::new();
        transport.expect_set_credentials().return_const(());
        transport.expect_add_listener().return_const(true);
        transport.expect_connect().returning(|| Ok(()));
        transport.expect_close().times(1).return_const(());
        transport.expect_is_connected().return_const(true);
        let client = client(api, transport);
        client.connect().await.unwrap();

        // when (操作):
        client.disconnect().await;

        // then (期待する結果):
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    /// Transport mock that records lifecycle calls into `log`.
    fn recording_transport(log: &Arc<StdMutex<Vec<&'static str>>>) -> MockNotificationTransport {
        let mut transport = MockNotificationTransport::new();
        transport.expect_set_credentials().return_const(());
        transport.expect_add_listener().return_const(true);
        let on_connect = log.clone();
        transport.expect_connect().returning(move || {
            on_connect.lock().unwrap().push("connect");
            Ok(())
        });
        let on_close = log.clone();
        transport.expect_close().returning(move || {
            on_close.lock().unwrap().push("close");
        });
        transport.expect_is_connected().return_const(true);
        transport
    }

    #[tokio::test]
    async fn test_reconnect_matches_disconnect_then_connect() {
        // テスト項目: reconnect は disconnect の後に connect を呼ぶのと同じ結果になる
        // given (前提条件):
        let reconnect_log = Arc::new(StdMutex::new(Vec::new()));
        let manual_log = Arc::new(StdMutex::new(Vec::new()));
        let reconnecting = client(
            accepting_api("sess-1", 1),
            recording_transport(&reconnect_log),
        );
        let manual = client(accepting_api("sess-1", 1), recording_transport(&manual_log));
        reconnecting.connect().await.unwrap();
        manual.connect().await.unwrap();

        // when (操作):
        let reconnect_result = reconnecting.reconnect().await;
        manual.disconnect().await;
        let manual_result = manual.connect().await;

        // then (期待する結果):
        assert!(reconnect_result.is_ok());
        assert!(manual_result.is_ok());
        assert_eq!(
            *reconnect_log.lock().unwrap(),
            vec!["connect", "close", "connect"]
        );
        assert_eq!(*reconnect_log.lock().unwrap(), *manual_log.lock().unwrap());
        assert_eq!(reconnecting.state(), manual.state());
        assert_eq!(
            reconnecting.session().await.unwrap().session_id,
            manual.session().await.unwrap().session_id
        );
    }

    #[tokio::test]
    async fn test_send_message_defaults_to_no_attachment() {
        // テスト項目: 添付 ID を省略すると全ゼロの ID が送られる
        // given (前提条件):
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let mut transport = MockNotificationTransport::new();
        let record = sent.clone();
        transport.expect_send_packet().times(1).returning(move |envelope| {
            record.lock().unwrap().push(envelope);
            Ok(())
        });
        let client = client(MockRestApi::new(), transport);

        // when (操作):
        let client_id = client.send_text("conv-1", "hello").await.unwrap();

        // then (期待する結果):
        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].type_id, type_id::CONVERSATION_MESSAGE_REQUEST);
        let request = conversation_message(&sent[0]);
        assert_eq!(request.attachment_id, NO_ATTACHMENT);
        assert_eq!(
            request.attachment_id.to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(request.conversation_id, "conv-1");
        assert_eq!(request.message, "hello");
        assert_eq!(request.client_id, client_id);
    }

    #[tokio::test]
    async fn test_send_message_keeps_attachment() {
        // テスト項目: 指定した添付 ID がそのまま送られ、ClientID はマシンキーと無関係に毎回変わる
        // given (前提条件):
        let attachment = Uuid::new_v4();
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let mut transport = MockNotificationTransport::new();
        let record = sent.clone();
        transport.expect_send_packet().times(2).returning(move |envelope| {
            record.lock().unwrap().push(envelope);
            Ok(())
        });
        let client = client(MockRestApi::new(), transport);

        // when (操作):
        let first = client
            .send_message("conv-1", "look", Some(attachment))
            .await
            .unwrap();
        let second = client
            .send_message("conv-1", "again", Some(attachment))
            .await
            .unwrap();

        // then (期待する結果):
        let sent = sent.lock().unwrap();
        assert_eq!(conversation_message(&sent[0]).attachment_id, attachment);
        assert_eq!(conversation_message(&sent[1]).attachment_id, attachment);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_send_message_not_connected() {
        // テスト項目: 未接続での送信はトランスポートのエラーがそのまま返る
        // given (前提条件):
        let mut transport = MockNotificationTransport::new();
        transport
            .expect_send_packet()
            .returning(|_| Err(ClientError::NotConnected));
        let client = client(MockRestApi::new(), transport);

        // when (操作):
        let result = client.send_text("conv-1", "hello").await;

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::NotConnected)));
    }

    struct NoopListener;

    impl ClientListener for NoopListener {}

    #[tokio::test]
    async fn test_listener_registration_is_delegated() {
        // テスト項目: リスナーの登録・削除がトランスポートに委譲される
        // given (前提条件):
        let mut transport = MockNotificationTransport::new();
        transport
            .expect_add_listener()
            .with(always())
            .times(1)
            .return_const(true);
        transport
            .expect_remove_listener()
            .times(1)
            .return_const(false);
        let client = client(MockRestApi::new(), transport);
        let listener: Arc<dyn ClientListener> = Arc::new(NoopListener);

        // when (操作):
        let added = client.add_listener(listener.clone()).await;
        let removed = client.remove_listener(&listener).await;

        // then (期待する結果):
        assert!(added);
        assert!(!removed);
    }

    #[tokio::test]
    async fn test_transport_disconnect_reaches_state_watch() {
        // テスト項目: トランスポートが報告した切断が状態の watch に反映される
        // given (前提条件):
        let tracker = Arc::new(StdMutex::new(None::<Arc<dyn ClientListener>>));
        let mut transport = MockNotificationTransport::new();
        transport.expect_set_credentials().return_const(());
        let registered = tracker.clone();
        transport.expect_add_listener().returning(move |listener| {
            *registered.lock().unwrap() = Some(listener);
            true
        });
        transport.expect_connect().times(1).returning(|| Ok(()));
        transport.expect_is_connected().return_const(true);
        let client = client(accepting_api("sess-1", 1), transport);
        let mut states = client.subscribe_state();
        client.connect().await.unwrap();
        assert_eq!(*states.borrow_and_update(), ConnectionState::Connected);

        // when (操作):
        let listener = tracker.lock().unwrap().clone().unwrap();
        listener.on_disconnected(&DisconnectReason::Remote);

        // then (期待する結果):
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), ConnectionState::Disconnected);
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_rest_api_bypasses_session_bookkeeping() {
        // テスト項目: rest_api 経由の呼び出しは REST アクセサに届くが、セッションは保持されない
        // given (前提条件):
        let mut api = MockRestApi::new();
        api.expect_authenticate()
            .withf(|username, password| username == "bob" && password == "pw")
            .times(1)
            .returning(|_, _| Ok(login_result("token-2")));
        let client = client(api, MockNotificationTransport::new());

        // when (操作):
        let login = client.rest_api().authenticate("bob", "pw").await.unwrap();

        // then (期待する結果):
        assert_eq!(login, login_result("token-2"));
        assert!(!client.is_authenticated().await);
    }

    #[test]
    fn test_new_rejects_invalid_notification_url() {
        // テスト項目: 通知 URL が ws/wss でない場合はクライアントを作れない
        // given (前提条件):
        let config = ClientConfig {
            notifications_url: "ftp://example.com".to_string(),
            ..ClientConfig::default()
        };

        // when (操作):
        let result = CurseClient::new(Credentials::new("alice", "pw"), &config, Span::none());

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }
}
