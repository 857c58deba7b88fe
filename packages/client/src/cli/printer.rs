//! Listener that renders notifications on the terminal.

use tokio::sync::mpsc;

use super::{formatter::MessageFormatter, ui::redisplay_prompt};
use crate::{
    dto::websocket::{NotificationEvent, NotificationKind},
    listener::{ClientListener, DisconnectReason},
};

/// Prints notifications to stdout
///
/// Conversation messages from other conversations are skipped when a
/// conversation filter is set. Disconnections are forwarded on `closed`.
pub struct PrintingListener {
    user_id: Option<i64>,
    conversation_id: Option<String>,
    prompt: Option<String>,
    closed: mpsc::UnboundedSender<DisconnectReason>,
}

impl PrintingListener {
    pub fn new(
        user_id: Option<i64>,
        conversation_id: Option<String>,
        prompt: Option<String>,
    ) -> (Self, mpsc::UnboundedReceiver<DisconnectReason>) {
        let (closed, closed_rx) = mpsc::unbounded_channel();
        (
            Self {
                user_id,
                conversation_id,
                prompt,
                closed,
            },
            closed_rx,
        )
    }

    /// Text to print for `event`, or `None` if it is filtered out.
    pub fn render(&self, event: &NotificationEvent) -> Option<String> {
        if let Some(wanted) = &self.conversation_id
            && event.kind() == NotificationKind::ConversationMessage
            && let Some(message) = event.conversation_message()
            && &message.conversation_id != wanted
        {
            return None;
        }
        Some(MessageFormatter::format_notification(event, self.user_id))
    }

    fn print(&self, text: &str) {
        print!("{}", text);
        if let Some(prompt) = &self.prompt {
            redisplay_prompt(prompt);
        }
    }
}

impl ClientListener for PrintingListener {
    fn on_notification(&self, event: &NotificationEvent) {
        if let Some(text) = self.render(event) {
            self.print(&text);
        }
    }

    fn on_disconnected(&self, reason: &DisconnectReason) {
        self.print(&MessageFormatter::format_disconnected(reason));
        let _ = self.closed.send(reason.clone());
    }
}
