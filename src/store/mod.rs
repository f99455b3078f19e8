//! Notification records and the shared store that holds them

pub mod notification;
pub mod state;

pub use notification::{IncomingNotification, Notification, Urgency};
pub use state::{NotificationStore, Snapshot};
