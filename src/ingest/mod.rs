//! Event ingestion from the desktop notification bus
//!
//! The listener eavesdrops on `org.freedesktop.Notifications.Notify` traffic
//! on the session bus and inserts each notification into the store.

pub mod decode;
pub mod listener;

pub use listener::{connect_monitor, consume};
