//! Client library for the Curse notification service.
//!
//! Authenticates against the REST API, keeps a WebSocket open to the
//! notification service and sends conversation messages over it.
//!
//! - [`CurseClient`]: session and connection lifecycle
//! - [`RestApi`] / [`HttpRestApi`]: login and session endpoints
//! - [`NotificationTransport`] / [`WebSocketTransport`]: the notification socket
//! - [`ClientListener`]: callbacks for inbound events

pub mod cli;
pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod listener;
pub mod machine_key;
pub mod rest;
pub mod session;
pub mod transport;

pub use client::CurseClient;
pub use config::ClientConfig;
pub use dto::websocket::{NotificationEvent, NotificationKind};
pub use error::{ClientError, ErrorKind};
pub use listener::{ClientListener, DisconnectReason, ListenerRegistry};
pub use machine_key::MachineKey;
pub use rest::{HttpRestApi, RestApi};
pub use session::{ConnectionState, Credentials, Session};
pub use transport::{NotificationTransport, WebSocketTransport};
