//! Command-line client for the Curse notification service.
//!
//! Logs in, opens the notification socket and either prints notifications,
//! sends one message, or runs an interactive chat in a conversation.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin cursevoice-client -- -u alice -p secret listen
//! cargo run --bin cursevoice-client -- -u alice send --conversation <id> --message "Hello"
//! cargo run --bin cursevoice-client -- -u alice chat --conversation <id>
//! ```

use clap::{Parser, Subcommand};
use uuid::Uuid;

use cursevoice_client::{
    ClientConfig, Credentials, CurseClient, cli,
    config::{DEFAULT_LOGIN_URL, DEFAULT_NOTIFICATIONS_URL, DEFAULT_SESSION_URL},
};
use cursevoice_shared::{logger::setup_logger, paths};

#[derive(Parser, Debug)]
#[command(name = "cursevoice-client")]
#[command(about = "Curse notification client: listen, send and chat", long_about = None)]
struct Args {
    /// Account username
    #[arg(short = 'u', long, env = "CURSE_USERNAME")]
    username: String,

    /// Account password
    #[arg(short = 'p', long, env = "CURSE_PASSWORD", hide_env_values = true)]
    password: String,

    /// Login endpoint
    #[arg(long, env = "CURSE_LOGIN_URL", default_value = DEFAULT_LOGIN_URL)]
    login_url: String,

    /// Session endpoint
    #[arg(long, env = "CURSE_SESSION_URL", default_value = DEFAULT_SESSION_URL)]
    session_url: String,

    /// Notification WebSocket URL
    #[arg(long, env = "CURSE_NOTIFICATIONS_URL", default_value = DEFAULT_NOTIFICATIONS_URL)]
    notifications_url: String,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Do not write logs to ~/curseclientlib/logs
    #[arg(long)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print notifications until Ctrl+C
    Listen,
    /// Send one message to a conversation
    Send {
        #[arg(short = 'c', long)]
        conversation: String,
        #[arg(short = 'm', long)]
        message: String,
        /// Attachment id (none by default)
        #[arg(long)]
        attachment: Option<Uuid>,
    },
    /// Interactive chat in a conversation
    Chat {
        #[arg(short = 'c', long)]
        conversation: String,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_dir = if args.no_log_file {
        None
    } else {
        match paths::user_data_dir().map(|dir| paths::ensure_log_dir(&dir)) {
            Some(Ok(dir)) => Some(dir),
            Some(Err(e)) => {
                eprintln!("Cannot create log directory: {}", e);
                None
            }
            None => None,
        }
    };

    // Initialize tracing
    if let Err(e) = setup_logger(env!("CARGO_BIN_NAME"), &args.log_level, log_dir.as_deref()) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let config = ClientConfig {
        login_url: args.login_url,
        session_url: args.session_url,
        notifications_url: args.notifications_url,
        ..ClientConfig::default()
    };
    let credentials = Credentials::new(args.username, args.password);
    let span = CurseClient::default_span(credentials.username());

    let client = match CurseClient::new(credentials, &config, span) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let result = match args.command {
        Command::Listen => cli::run_listen(&client).await,
        Command::Send {
            conversation,
            message,
            attachment,
        } => cli::run_send(&client, &conversation, &message, attachment).await,
        Command::Chat { conversation } => cli::run_chat(&client, &conversation).await,
    };

    if let Err(e) = result {
        if e.is_authentication_failure() {
            tracing::error!("Login failed: {}", e);
        } else {
            tracing::error!("Client error: {}", e);
        }
        std::process::exit(1);
    }
}
