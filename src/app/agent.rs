//! Task wiring for a running agent

use anyhow::{Context, Result};
use futures_util::stream::Stream;
use std::future::Future;
use tokio::io::AsyncWrite;
use tokio::net::UnixListener;
use tokio::sync::mpsc;
use zbus::Message;

use crate::control::{self, ServerOptions};
use crate::ingest;
use crate::render::{self, Renderer};
use crate::store::NotificationStore;

/// Why the agent stopped cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// `exit` arrived on the control socket
    ExitCommand,
    /// `terminate` resolved (SIGINT/SIGTERM in the binary)
    Signal,
}

/// Run the render, ingestion and control tasks until one of them ends
///
/// Returns `Ok` on `exit` or when `terminate` resolves; a failed listener
/// or server is returned as an error.
pub async fn run<S, R, W, T>(
    store: NotificationStore,
    listener: UnixListener,
    bus: S,
    options: ServerOptions,
    renderer: R,
    out: W,
    terminate: T,
) -> Result<Shutdown>
where
    S: Stream<Item = zbus::Result<Message>> + Unpin + Send + 'static,
    R: Renderer + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
    T: Future<Output = Result<()>>,
{
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

    tokio::spawn(render::run_renderer(store.subscribe(), renderer, out));
    let mut ingest_task = tokio::spawn(ingest::consume(bus, store.clone()));
    let mut server_task = tokio::spawn(control::serve(listener, store, options, shutdown_tx));

    let result = tokio::select! {
        Some(()) = shutdown_rx.recv() => {
            tracing::info!("Shutting down on exit command");
            Ok(Shutdown::ExitCommand)
        }
        signal = terminate => {
            signal.map(|()| {
                tracing::info!("Shutting down on signal");
                Shutdown::Signal
            })
        }
        res = &mut ingest_task => {
            res.context("Notification listener panicked")
                .and_then(|r| r)
                .context("Notification listener stopped")
                .map(|()| Shutdown::Signal)
        }
        res = &mut server_task => {
            res.context("Control server panicked")
                .and_then(|r| r)
                .context("Control server stopped")
                .map(|()| Shutdown::Signal)
        }
    };

    ingest_task.abort();
    server_task.abort();
    result
}
