//! Shared notification list
//!
//! The list is newest-first and only ever mutated under the write lock.
//! Every mutation publishes a fresh snapshot on a watch channel so the
//! render task can pick it up without holding up the writer.

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{watch, RwLock, RwLockReadGuard};

use super::notification::{IncomingNotification, Notification};

/// Point-in-time copy of the store, newest first
pub type Snapshot = Vec<Notification>;

#[derive(Debug, Default)]
struct StoreState {
    notifications: VecDeque<Notification>,
    last_stamp: Option<DateTime<Local>>,
}

impl StoreState {
    fn next_stamp(&mut self) -> DateTime<Local> {
        let now = Local::now();
        let stamp = match self.last_stamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    fn snapshot(&self) -> Snapshot {
        self.notifications.iter().cloned().collect()
    }
}

/// Handle to the process-wide notification list
///
/// Cloning is cheap; all clones share the same list.
#[derive(Debug, Clone)]
pub struct NotificationStore {
    state: Arc<RwLock<StoreState>>,
    render_tx: Arc<watch::Sender<Snapshot>>,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationStore {
    pub fn new() -> Self {
        let (render_tx, _) = watch::channel(Snapshot::new());
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            render_tx: Arc::new(render_tx),
        }
    }

    /// Receiver for the snapshots published after each mutation
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.render_tx.subscribe()
    }

    /// Stamp `incoming` and place it at index 0
    pub async fn insert_front(&self, incoming: IncomingNotification) -> Notification {
        let mut state = self.state.write().await;
        let created_at = state.next_stamp();
        let notification = Notification::stamp(incoming, created_at);
        state.notifications.push_front(notification.clone());
        self.publish(state.downgrade());
        notification
    }

    /// Remove the most recently inserted notification (index 0)
    pub async fn remove_newest(&self) -> Option<Notification> {
        let mut state = self.state.write().await;
        let removed = state.notifications.pop_front();
        self.publish(state.downgrade());
        removed
    }

    /// Remove the least recently inserted notification
    pub async fn remove_oldest(&self) -> Option<Notification> {
        let mut state = self.state.write().await;
        let removed = state.notifications.pop_back();
        self.publish(state.downgrade());
        removed
    }

    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.notifications.clear();
        self.publish(state.downgrade());
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.snapshot()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.notifications.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Publish the current state to the render task
    pub async fn request_render(&self) {
        let state = self.state.read().await;
        self.publish(state);
    }

    // Runs under a read guard: concurrent publishers all see the same state,
    // and no writer can slip in between copying and sending.
    fn publish(&self, state: RwLockReadGuard<'_, StoreState>) {
        self.render_tx.send_replace(state.snapshot());
    }
}
