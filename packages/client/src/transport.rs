//! WebSocket transport for the notification service.
//!
//! ## Responsibilities
//!
//! - open the socket and send the join request for the current session
//! - write outbound envelopes as text frames
//! - run the receive loop and dispatch inbound frames to the listener registry
//!
//! Framing, TLS and ping/pong are left to `tokio-tungstenite`.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::{net::TcpStream, sync::Mutex, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};
use tracing::{Instrument, Span};

use crate::{
    config::ClientConfig,
    dto::websocket::{Envelope, JoinRequest, NotificationEvent},
    error::ClientError,
    listener::{ClientListener, DisconnectReason, ListenerRegistry},
    session::TransportCredentials,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Notification transport trait
///
/// The contract `CurseClient` relies on: hold session credentials, open and
/// close the socket, send envelopes and dispatch inbound events to listeners.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Store the session credentials used by the next `connect()`.
    async fn set_credentials(&self, credentials: TransportCredentials);

    /// Open the socket and join the notification service.
    async fn connect(&self) -> Result<(), ClientError>;

    /// Close the socket. Closing a closed transport does nothing.
    async fn close(&self);

    /// Send an envelope immediately.
    async fn send_packet(&self, envelope: Envelope) -> Result<(), ClientError>;

    /// Register a listener. Returns `false` if it was already registered.
    async fn add_listener(&self, listener: Arc<dyn ClientListener>) -> bool;

    /// Unregister a listener. Returns `false` if it was not registered.
    async fn remove_listener(&self, listener: &Arc<dyn ClientListener>) -> bool;

    fn is_connected(&self) -> bool;
}

struct Connection {
    writer: SplitSink<WsStream, Message>,
    reader: JoinHandle<()>,
}

/// `NotificationTransport` over `tokio-tungstenite`
pub struct WebSocketTransport {
    url: String,
    client_version: String,
    credentials: Mutex<Option<TransportCredentials>>,
    connection: Mutex<Option<Connection>>,
    listeners: Arc<ListenerRegistry>,
    connected: Arc<AtomicBool>,
    span: Span,
}

impl WebSocketTransport {
    /// Create a transport for `url` (`ws://` or `wss://`).
    ///
    /// The receive loop runs inside `span`.
    pub fn new(
        url: impl Into<String>,
        client_version: impl Into<String>,
        span: Span,
    ) -> Result<Self, ClientError> {
        let url = url.into();
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(ClientError::InvalidUrl(url));
        }

        Ok(Self {
            url,
            client_version: client_version.into(),
            credentials: Mutex::new(None),
            connection: Mutex::new(None),
            listeners: Arc::new(ListenerRegistry::new()),
            connected: Arc::new(AtomicBool::new(false)),
            span,
        })
    }

    pub fn from_config(config: &ClientConfig, span: Span) -> Result<Self, ClientError> {
        Self::new(
            config.notifications_url.clone(),
            config.client_version.clone(),
            span,
        )
    }
}

#[async_trait]
impl NotificationTransport for WebSocketTransport {
    async fn set_credentials(&self, credentials: TransportCredentials) {
        tracing::debug!(
            "Transport credentials set for session '{}'",
            credentials.session_id
        );
        *self.credentials.lock().await = Some(credentials);
    }

    async fn connect(&self) -> Result<(), ClientError> {
        let mut connection = self.connection.lock().await;
        if self.connected.load(Ordering::SeqCst) {
            return Err(ClientError::AlreadyConnected);
        }

        let credentials = self
            .credentials
            .lock()
            .await
            .clone()
            .ok_or(ClientError::MissingCredentials)?;

        // Left over from a connection the service closed
        if let Some(stale) = connection.take() {
            stale.reader.abort();
        }

        tracing::info!("Connecting to {}", self.url);
        let (ws_stream, _response) = connect_async(self.url.as_str()).await?;
        let (mut writer, reader) = ws_stream.split();

        let join = Envelope::join(JoinRequest::new(&credentials, &self.client_version));
        writer.send(Message::Text(join.to_json()?.into())).await?;
        tracing::debug!("Sent join request for user {}", credentials.user_id);

        self.connected.store(true, Ordering::SeqCst);
        self.listeners.notify_connected().await;

        let reader = tokio::spawn(
            receive_loop(reader, self.listeners.clone(), self.connected.clone())
                .instrument(self.span.clone()),
        );
        *connection = Some(Connection { writer, reader });

        tracing::info!("Connected to notification service");
        Ok(())
    }

    async fn close(&self) {
        let mut connection = self.connection.lock().await;
        let Some(Connection { mut writer, reader }) = connection.take() else {
            return;
        };
        reader.abort();

        if self.connected.swap(false, Ordering::SeqCst) {
            if let Err(e) = writer.close().await {
                tracing::debug!("Error while closing socket: {}", e);
            }
            tracing::info!("Disconnected from notification service");
            self.listeners
                .notify_disconnected(&DisconnectReason::Requested)
                .await;
        }
    }

    async fn send_packet(&self, envelope: Envelope) -> Result<(), ClientError> {
        let json = envelope.to_json()?;

        let mut connection = self.connection.lock().await;
        let Some(active) = connection.as_mut() else {
            return Err(ClientError::NotConnected);
        };
        if !self.connected.load(Ordering::SeqCst) {
            return Err(ClientError::NotConnected);
        }

        active.writer.send(Message::Text(json.into())).await?;
        tracing::debug!("Sent packet {}", envelope.type_id);
        Ok(())
    }

    async fn add_listener(&self, listener: Arc<dyn ClientListener>) -> bool {
        self.listeners.add(listener).await
    }

    async fn remove_listener(&self, listener: &Arc<dyn ClientListener>) -> bool {
        self.listeners.remove(listener).await
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Read frames until the socket ends, dispatching each text frame.
async fn receive_loop(
    mut reader: SplitStream<WsStream>,
    listeners: Arc<ListenerRegistry>,
    connected: Arc<AtomicBool>,
) {
    let reason = loop {
        match reader.next().await {
            Some(Ok(Message::Text(text))) => match NotificationEvent::parse(text.as_str()) {
                Ok(event) => {
                    if let Some(join) = event.join_response()
                        && !join.is_success()
                    {
                        tracing::warn!("Join rejected with status {}", join.status);
                    }
                    listeners.notify_notification(&event).await;
                }
                Err(e) => {
                    tracing::warn!("Ignoring unparseable frame: {}", e);
                }
            },
            Some(Ok(Message::Binary(data))) => {
                tracing::debug!("Ignoring {} bytes of binary data", data.len());
            }
            Some(Ok(Message::Close(_))) => {
                tracing::info!("Service closed the connection");
                break DisconnectReason::Remote;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                tracing::warn!("WebSocket read error: {}", e);
                break DisconnectReason::Error(e.to_string());
            }
            None => break DisconnectReason::Remote,
        }
    };

    if connected.swap(false, Ordering::SeqCst) {
        listeners.notify_disconnected(&reason).await;
    }
}
