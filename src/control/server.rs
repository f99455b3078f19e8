//! Unix Domain Socket server for the control protocol

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;

use super::protocol::{Command, PopOrder, Response};
use crate::store::NotificationStore;

/// Longest accepted request line, newline included
pub const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Per-connection behavior of the server
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerOptions {
    /// Which notification `pop` removes
    pub pop_order: PopOrder,
    /// Drop connections that send no line within this time
    pub read_timeout: Option<Duration>,
}

/// Bind the control socket
///
/// If the first attempt fails (typically a stale socket left by a previous
/// run), whatever sits at `socket_path` is removed and binding is retried once.
pub fn bind(socket_path: &Path) -> Result<UnixListener> {
    // Ensure parent directory exists
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create socket directory")?;
    }

    match UnixListener::bind(socket_path) {
        Ok(listener) => Ok(listener),
        Err(e) => {
            tracing::warn!(
                "Failed to bind {} ({}), removing stale socket",
                socket_path.display(),
                e
            );
            if let Err(e) = std::fs::remove_file(socket_path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    return Err(e).context("Failed to remove existing socket");
                }
            }
            UnixListener::bind(socket_path)
                .with_context(|| format!("Failed to bind to socket: {}", socket_path.display()))
        }
    }
}

/// Accept connections forever, one task per connection
///
/// `shutdown` receives a message once an `exit` command has been answered.
pub async fn serve(
    listener: UnixListener,
    store: NotificationStore,
    options: ServerOptions,
    shutdown: mpsc::Sender<()>,
) -> Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                let store = store.clone();
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, store, options, shutdown).await {
                        tracing::warn!("Error handling connection: {:#}", e);
                    }
                });
            }
            Err(e) => {
                tracing::warn!("Failed to accept connection: {}", e);
            }
        }
    }
}

async fn handle_connection(
    stream: UnixStream,
    store: NotificationStore,
    options: ServerOptions,
    shutdown: mpsc::Sender<()>,
) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half.take(MAX_REQUEST_BYTES as u64));
    let mut request = Vec::new();

    // EOF before a newline leaves whatever was sent in `request`
    let read = reader.read_until(b'\n', &mut request);
    let read = match options.read_timeout {
        Some(timeout) => tokio::time::timeout(timeout, read)
            .await
            .context("Timed out waiting for command")?,
        None => read.await,
    };
    read.context("Failed to read command")?;

    let line = String::from_utf8_lossy(&request);
    let (command, response) = if request.len() >= MAX_REQUEST_BYTES && !request.ends_with(b"\n") {
        tracing::warn!("Request exceeds {} bytes, rejecting", MAX_REQUEST_BYTES);
        (None, Response::Error("Request too large".to_string()))
    } else {
        dispatch(&line, &store, options.pop_order).await
    };
    tracing::debug!("Command {:?} -> {:?}", line.trim(), response);

    write_half
        .write_all(response.to_line().as_bytes())
        .await
        .context("Failed to write response")?;
    write_half.flush().await.context("Failed to flush response")?;

    if command == Some(Command::Exit) {
        let _ = write_half.shutdown().await;
        tracing::info!("Exit requested over control socket");
        let _ = shutdown.send(()).await;
    } else {
        store.request_render().await;
    }

    Ok(())
}

/// Apply one request line to the store
pub async fn dispatch(
    line: &str,
    store: &NotificationStore,
    pop_order: PopOrder,
) -> (Option<Command>, Response) {
    let command = match line.parse::<Command>() {
        Ok(command) => command,
        Err(_) => return (None, Response::unknown_command()),
    };

    let response = match command {
        Command::Pop => {
            match pop_order {
                PopOrder::Newest => store.remove_newest().await,
                PopOrder::Oldest => store.remove_oldest().await,
            };
            Response::Ok
        }
        Command::Clear => {
            store.clear().await;
            Response::Ok
        }
        Command::GetList => Response::list(&store.snapshot().await),
        Command::Exit => Response::Ok,
    };

    (Some(command), response)
}
