//! Entry points for the CLI subcommands.

use std::sync::Arc;

use cursevoice_shared::time::now_millis;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{
    formatter::MessageFormatter, printer::PrintingListener, session::run_chat_session,
    ui::prompt_for,
};
use crate::{
    client::CurseClient,
    error::ClientError,
    listener::{ClientListener, DisconnectReason},
};

type Closed = mpsc::UnboundedReceiver<DisconnectReason>;

/// Outcome of a session whose connection ended with `reason`.
///
/// A requested close (or a dropped listener) ends the session normally; any
/// other reason is returned as [`ClientError::Disconnected`].
pub(super) fn connection_closed(reason: Option<DisconnectReason>) -> Result<(), ClientError> {
    match reason {
        Some(DisconnectReason::Requested) | None => Ok(()),
        Some(reason) => {
            tracing::warn!("Connection lost: {}", reason);
            Err(ClientError::Disconnected(reason))
        }
    }
}

/// Authenticate, register a printing listener and open the socket.
async fn start(
    client: &CurseClient,
    conversation_id: Option<&str>,
    prompt: Option<String>,
) -> Result<(Arc<dyn ClientListener>, Closed), ClientError> {
    let login = client.authenticate().await?;
    let user_id = client.session().await.map(|session| session.user_id);
    let (printer, closed) =
        PrintingListener::new(user_id, conversation_id.map(str::to_string), prompt);
    let printer: Arc<dyn ClientListener> = Arc::new(printer);
    client.add_listener(printer.clone()).await;

    if let Err(e) = client.connect().await {
        client.remove_listener(&printer).await;
        return Err(e);
    }

    let display_name = login
        .session
        .and_then(|session| session.display_name.or(Some(session.username)))
        .unwrap_or_default();
    print!("{}", MessageFormatter::format_connected(&display_name));
    Ok((printer, closed))
}

async fn stop(client: &CurseClient, printer: &Arc<dyn ClientListener>) {
    client.disconnect().await;
    client.remove_listener(printer).await;
}

/// Print every notification until Ctrl+C or until the service drops the connection.
pub async fn run_listen(client: &CurseClient) -> Result<(), ClientError> {
    let (printer, mut closed) = start(client, None, None).await?;
    println!("Listening for notifications. Press Ctrl+C to exit.");

    let result = tokio::select! {
        signal = tokio::signal::ctrl_c() => signal.map_err(ClientError::from),
        reason = closed.recv() => connection_closed(reason),
    };

    stop(client, &printer).await;
    result
}

/// Send a single message and disconnect.
pub async fn run_send(
    client: &CurseClient,
    conversation_id: &str,
    message: &str,
    attachment_id: Option<Uuid>,
) -> Result<(), ClientError> {
    client.connect().await?;
    let result = client
        .send_message(conversation_id, message, attachment_id)
        .await;
    client.disconnect().await;

    let client_id = result?;
    print!(
        "{}",
        MessageFormatter::format_sent_confirmation(&client_id, now_millis())
    );
    Ok(())
}

/// Interactive chat in one conversation.
pub async fn run_chat(client: &CurseClient, conversation_id: &str) -> Result<(), ClientError> {
    let prompt = prompt_for(conversation_id);
    let (printer, closed) = start(client, Some(conversation_id), Some(prompt.clone())).await?;
    println!(
        "Chatting in '{}'. Type messages and press Enter to send. Press Ctrl+C to exit.\n",
        conversation_id
    );

    let result = run_chat_session(client, conversation_id, &prompt, closed).await;

    stop(client, &printer).await;
    result
}
