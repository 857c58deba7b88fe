//! Envelopes exchanged over the notification socket.
//!
//! Every frame is a JSON object `{"TypeID": <i32>, "Body": {...}}`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{machine_key::MachineKey, session::TransportCredentials};

/// Type ids of the frames this client knows about.
pub mod type_id {
    pub const JOIN_REQUEST: i32 = -2_101_997_347;
    pub const JOIN_RESPONSE: i32 = -815_187_584;
    pub const CONVERSATION_MESSAGE_REQUEST: i32 = 1_260_535_191;
    pub const CONVERSATION_MESSAGE_NOTIFICATION: i32 = -635_182_161;
}

/// Attachment id sent when a message carries no attachment.
pub const NO_ATTACHMENT: Uuid = Uuid::nil();

/// `Status` of a join request announcing the user as online
pub const JOIN_STATUS_ONLINE: i32 = 1;

/// `Status` of an accepted join response
pub const JOIN_RESPONSE_SUCCESS: i32 = 1;

/// Body of the join request sent right after the socket opens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JoinRequest {
    pub cipher_algorithm: i32,
    pub cipher_strength: i32,
    pub client_version: String,
    pub public_key: Option<String>,
    pub machine_key: MachineKey,
    #[serde(rename = "UserID")]
    pub user_id: i64,
    #[serde(rename = "SessionID")]
    pub session_id: String,
    pub status: i32,
}

impl JoinRequest {
    /// Unencrypted join for the given session.
    pub fn new(credentials: &TransportCredentials, client_version: &str) -> Self {
        Self {
            cipher_algorithm: 0,
            cipher_strength: 0,
            client_version: client_version.to_string(),
            public_key: None,
            machine_key: credentials.machine_key.clone(),
            user_id: credentials.user_id,
            session_id: credentials.session_id.clone(),
            status: JOIN_STATUS_ONLINE,
        }
    }
}

/// Body of a chat message sent to a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConversationMessageRequest {
    #[serde(rename = "ConversationID")]
    pub conversation_id: String,
    pub message: String,
    #[serde(rename = "AttachmentID")]
    pub attachment_id: Uuid,
    /// Per-message identifier chosen by the sender
    #[serde(rename = "ClientID")]
    pub client_id: Uuid,
}

impl ConversationMessageRequest {
    /// Build a message with a fresh client id.
    ///
    /// `attachment_id` falls back to [`NO_ATTACHMENT`].
    pub fn new(
        conversation_id: impl Into<String>,
        message: impl Into<String>,
        attachment_id: Option<Uuid>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            message: message.into(),
            attachment_id: attachment_id.unwrap_or(NO_ATTACHMENT),
            client_id: Uuid::new_v4(),
        }
    }
}

/// Body of an outbound envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    Join(JoinRequest),
    ConversationMessage(ConversationMessageRequest),
}

/// Outbound frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    #[serde(rename = "TypeID")]
    pub type_id: i32,
    #[serde(rename = "Body")]
    pub body: RequestBody,
}

impl Envelope {
    pub fn join(request: JoinRequest) -> Self {
        Self {
            type_id: type_id::JOIN_REQUEST,
            body: RequestBody::Join(request),
        }
    }

    pub fn conversation_message(request: ConversationMessageRequest) -> Self {
        Self {
            type_id: type_id::CONVERSATION_MESSAGE_REQUEST,
            body: RequestBody::ConversationMessage(request),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Classification of an inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    JoinResponse,
    ConversationMessage,
    Other(i32),
}

/// Inbound frame, dispatched as-is to listeners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(rename = "TypeID")]
    pub type_id: i32,
    #[serde(rename = "Body", default)]
    pub body: serde_json::Value,
}

impl NotificationEvent {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn kind(&self) -> NotificationKind {
        match self.type_id {
            type_id::JOIN_RESPONSE => NotificationKind::JoinResponse,
            type_id::CONVERSATION_MESSAGE_NOTIFICATION => NotificationKind::ConversationMessage,
            other => NotificationKind::Other(other),
        }
    }

    /// Decode the body of a join response.
    pub fn join_response(&self) -> Option<JoinResponse> {
        if self.kind() != NotificationKind::JoinResponse {
            return None;
        }
        serde_json::from_value(self.body.clone()).ok()
    }

    /// Decode the body of a conversation message notification.
    pub fn conversation_message(&self) -> Option<ConversationMessageNotification> {
        if self.kind() != NotificationKind::ConversationMessage {
            return None;
        }
        serde_json::from_value(self.body.clone()).ok()
    }
}

/// Body of the join response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JoinResponse {
    pub status: i32,
    #[serde(default)]
    pub server_time: Option<String>,
}

impl JoinResponse {
    pub fn is_success(&self) -> bool {
        self.status == JOIN_RESPONSE_SUCCESS
    }
}

/// Body of a conversation message notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConversationMessageNotification {
    #[serde(rename = "ConversationID")]
    pub conversation_id: String,
    #[serde(rename = "SenderID", default)]
    pub sender_id: i64,
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub body: String,
    /// Unix timestamp (milliseconds)
    #[serde(default)]
    pub timestamp: i64,
    #[serde(rename = "ClientID", default)]
    pub client_id: Option<Uuid>,
}
