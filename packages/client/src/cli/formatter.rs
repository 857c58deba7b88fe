//! Message formatting utilities for terminal display.

use cursevoice_shared::time::timestamp_to_rfc3339;
use uuid::Uuid;

use crate::{
    dto::websocket::{ConversationMessageNotification, NotificationEvent, NotificationKind},
    listener::DisconnectReason,
};

/// Message formatter for terminal display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format any inbound notification.
    ///
    /// # Arguments
    ///
    /// * `event` - The notification to format
    /// * `current_user_id` - The user id of this session (to mark as "me")
    pub fn format_notification(event: &NotificationEvent, current_user_id: Option<i64>) -> String {
        match event.kind() {
            NotificationKind::ConversationMessage => match event.conversation_message() {
                Some(message) => Self::format_conversation_message(&message, current_user_id),
                None => Self::format_raw_event(event),
            },
            NotificationKind::JoinResponse => match event.join_response() {
                Some(response) if response.is_success() => {
                    "\n* Joined the notification service\n".to_string()
                }
                Some(response) => format!(
                    "\n! Notification service refused join (status {})\n",
                    response.status
                ),
                None => Self::format_raw_event(event),
            },
            NotificationKind::Other(_) => Self::format_raw_event(event),
        }
    }

    /// Format a conversation message
    ///
    /// # Arguments
    ///
    /// * `message` - The decoded message
    /// * `current_user_id` - The user id of this session (to mark as "me")
    ///
    /// # Returns
    ///
    /// A formatted string with sender, body and send time
    pub fn format_conversation_message(
        message: &ConversationMessageNotification,
        current_user_id: Option<i64>,
    ) -> String {
        let me_suffix = if current_user_id == Some(message.sender_id) {
            " (me)"
        } else {
            ""
        };
        format!(
            "\n\n------------------------------------------------------------\n\
             [{}] @{}{}: {}\n\
             sent at {}\n\
             ------------------------------------------------------------\n",
            message.conversation_id,
            message.sender_name,
            me_suffix,
            message.body,
            timestamp_to_rfc3339(message.timestamp)
        )
    }

    /// Format a notification this client does not know how to render
    pub fn format_raw_event(event: &NotificationEvent) -> String {
        format!("\n← Received {}: {}\n", event.type_id, event.body)
    }

    /// Format the connection banner
    pub fn format_connected(username: &str) -> String {
        format!(
            "\n============================================================\n\
             Connected as '{}'\n\
             ============================================================\n",
            username
        )
    }

    /// Format a disconnection notice
    pub fn format_disconnected(reason: &DisconnectReason) -> String {
        match reason {
            DisconnectReason::Requested => "\nDisconnected.\n".to_string(),
            DisconnectReason::Remote => "\nConnection closed by the service.\n".to_string(),
            DisconnectReason::Error(error) => format!("\nConnection lost: {}\n", error),
        }
    }

    /// Format a confirmation message after sending
    ///
    /// # Arguments
    ///
    /// * `client_id` - The per-message id of the sent envelope
    /// * `sent_at` - Unix timestamp when the message was sent (milliseconds)
    pub fn format_sent_confirmation(client_id: &Uuid, sent_at: i64) -> String {
        format!("sent {} at {}\n", client_id, timestamp_to_rfc3339(sent_at))
    }
}
