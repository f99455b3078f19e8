//! Positional decoding of `org.freedesktop.Notifications.Notify` payloads

use std::collections::HashMap;
use std::ops::Deref;
use zbus::zvariant::{OwnedValue, Structure, Value};
use zbus::Message;

use crate::store::{IncomingNotification, Urgency};

/// Bodies with fewer fields than this are not `Notify` calls
pub const NOTIFY_MIN_FIELDS: usize = 7;

const URGENCY_HINT: &str = "urgency";

/// Argument list of `Notify` (`susssasa{sv}i`):
/// app_name, replaces_id, app_icon, summary, body, actions, hints, expire_timeout
type NotifyArgs = (
    String,
    u32,
    String,
    String,
    String,
    Vec<String>,
    HashMap<String, OwnedValue>,
    i32,
);

/// A message that looked like a `Notify` call but did not have its shape
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unexpected Notify payload ({fields} fields): {source}")]
    Payload {
        fields: usize,
        #[source]
        source: zbus::Error,
    },
    #[error("urgency hint is not a byte: {0}")]
    Urgency(String),
}

/// Number of top-level fields in the message body
///
/// Empty or unreadable bodies count as zero.
pub fn field_count(message: &Message) -> usize {
    message
        .body()
        .deserialize::<Structure<'_>>()
        .map(|s| s.fields().len())
        .unwrap_or(0)
}

/// Decode a monitored message
///
/// Returns `Ok(None)` for traffic that is too short to be a `Notify` call
/// (method returns, errors, unrelated signals).
pub fn decode_notify(message: &Message) -> Result<Option<IncomingNotification>, DecodeError> {
    let fields = field_count(message);
    if fields < NOTIFY_MIN_FIELDS {
        return Ok(None);
    }

    let (_, _, _, summary, body, _, hints, _): NotifyArgs = message
        .body()
        .deserialize()
        .map_err(|source| DecodeError::Payload { fields, source })?;

    let urgency = match hints.get(URGENCY_HINT).map(|v| v.deref()) {
        Some(Value::U8(byte)) => Urgency::from_byte(*byte),
        Some(other) => return Err(DecodeError::Urgency(format!("{:?}", other))),
        None => Urgency::Low,
    };

    Ok(Some(IncomingNotification::new(summary, body, urgency)))
}
