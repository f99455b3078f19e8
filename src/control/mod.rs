//! Control socket for status bars and scripts
//!
//! Clients connect to a Unix domain socket, send one command line
//! (`pop`, `clear`, `get-list`, `exit`) and read one response line.

pub mod client;
pub mod protocol;
pub mod server;

pub use client::send_command;
pub use protocol::{Command, PopOrder, Response};
pub use server::{bind, serve, ServerOptions};

/// Default socket path for the control server
pub fn default_socket_path() -> std::path::PathBuf {
    std::env::temp_dir().join("notification-agent.sock")
}
