//! UI utilities for the terminal client.

use std::io::Write;

/// Prompt shown while typing messages to `conversation_id`
pub fn prompt_for(conversation_id: &str) -> String {
    format!("{}> ", conversation_id)
}

/// Redisplay the prompt after printing a notification
pub fn redisplay_prompt(prompt: &str) {
    print!("{}", prompt);
    std::io::stdout().flush().ok();
}
