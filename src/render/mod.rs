//! Status bar output
//!
//! The store publishes a snapshot after each mutation; the render task
//! formats the latest one and writes it to stdout as a single line.
//! Snapshots that arrive while a line is being written are coalesced.

pub mod status_bar;
pub mod theme;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;

use crate::store::{Notification, Snapshot};

pub use status_bar::StatusBarFormatter;
pub use theme::{Palette, Xrdb};

/// Turns a snapshot into one newline-terminated output line
pub trait Renderer: Send {
    fn render(&self, snapshot: &[Notification]) -> String;
}

/// Render every published snapshot until the store goes away
///
/// The current state is rendered once on start. Write failures are logged
/// and do not stop the task.
pub async fn run_renderer<R, W>(mut rx: watch::Receiver<Snapshot>, renderer: R, mut out: W)
where
    R: Renderer,
    W: AsyncWrite + Unpin,
{
    loop {
        let line = {
            let snapshot = rx.borrow_and_update();
            renderer.render(&snapshot)
        };

        if let Err(e) = write_line(&mut out, &line).await {
            tracing::warn!("Failed to write status line: {}", e);
        }

        if rx.changed().await.is_err() {
            tracing::debug!("Notification store dropped, render task exiting");
            return;
        }
    }
}

async fn write_line<W: AsyncWrite + Unpin>(out: &mut W, line: &str) -> std::io::Result<()> {
    out.write_all(line.as_bytes()).await?;
    out.flush().await
}
