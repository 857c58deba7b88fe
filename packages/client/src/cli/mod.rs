//! Terminal front end used by the `cursevoice-client` binary.

mod formatter;
mod printer;
mod runner;
mod session;
mod ui;

pub use formatter::MessageFormatter;
pub use printer::PrintingListener;
pub use runner::{run_chat, run_listen, run_send};
