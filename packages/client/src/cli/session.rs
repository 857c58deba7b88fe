//! Interactive chat session on top of a connected client.

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use cursevoice_shared::time::now_millis;

use super::{formatter::MessageFormatter, runner::connection_closed, ui::redisplay_prompt};
use crate::{client::CurseClient, error::ClientError, listener::DisconnectReason};

/// Read lines from the terminal and send each one to `conversation_id`
/// until the user exits or the connection drops.
pub async fn run_chat_session(
    client: &CurseClient,
    conversation_id: &str,
    prompt: &str,
    mut closed: mpsc::UnboundedReceiver<DisconnectReason>,
) -> Result<(), ClientError> {
    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt_for_readline = prompt.to_string();
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt_for_readline) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            line = input_rx.recv() => {
                let Some(line) = line else {
                    // Input thread ended (Ctrl+C / Ctrl+D)
                    return Ok(());
                };
                let client_id = client.send_text(conversation_id, &line).await?;
                let confirmation =
                    MessageFormatter::format_sent_confirmation(&client_id, now_millis());
                print!("\n{}", confirmation);
                redisplay_prompt(prompt);
            }
            reason = closed.recv() => return connection_closed(reason),
        }
    }
}
