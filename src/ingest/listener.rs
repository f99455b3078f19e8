//! Session bus monitor feeding the notification store

use anyhow::{Context, Result};
use futures_util::stream::{Stream, StreamExt};
use zbus::message::Type as MessageType;
use zbus::{Connection, MatchRule, Message, MessageStream};

use super::decode::decode_notify;
use crate::store::NotificationStore;

const NOTIFICATIONS_INTERFACE: &str = "org.freedesktop.Notifications";
const NOTIFICATIONS_PATH: &str = "/org/freedesktop/Notifications";
const NOTIFY_MEMBER: &str = "Notify";

/// Match rules covering every message class of `Notify`
pub fn notify_rules() -> Result<Vec<MatchRule<'static>>> {
    [
        MessageType::Signal,
        MessageType::MethodCall,
        MessageType::MethodReturn,
        MessageType::Error,
    ]
    .into_iter()
    .map(|msg_type| -> zbus::Result<MatchRule<'static>> {
        Ok(MatchRule::builder()
            .msg_type(msg_type)
            .interface(NOTIFICATIONS_INTERFACE)?
            .member(NOTIFY_MEMBER)?
            .path(NOTIFICATIONS_PATH)?
            .build())
    })
    .collect::<zbus::Result<Vec<_>>>()
    .context("Failed to build Notify match rules")
}

/// Connect to the session bus and turn the connection into a monitor
///
/// The returned stream yields every `Notify` message on the bus. After
/// `BecomeMonitor` the connection can no longer send anything.
pub async fn connect_monitor() -> Result<MessageStream> {
    let connection = Connection::session()
        .await
        .context("Failed to connect to session bus")?;

    // Subscribe before becoming a monitor so nothing is missed in between
    let stream = MessageStream::from(&connection);

    let rules = notify_rules()?;
    zbus::fdo::MonitoringProxy::new(&connection)
        .await
        .context("Failed to create monitoring proxy")?
        .become_monitor(&rules, 0)
        .await
        .context("Failed to become monitor")?;

    tracing::info!("Monitoring {}.{} on the session bus", NOTIFICATIONS_INTERFACE, NOTIFY_MEMBER);
    Ok(stream)
}

/// Consume bus messages and insert every decoded notification
///
/// Only returns on a decode contract violation or when the stream ends,
/// both of which are fatal for the agent.
pub async fn consume<S>(mut messages: S, store: NotificationStore) -> Result<()>
where
    S: Stream<Item = zbus::Result<Message>> + Unpin,
{
    while let Some(message) = messages.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Failed to receive bus message: {}", e);
                continue;
            }
        };

        match decode_notify(&message).context("Malformed Notify payload")? {
            Some(incoming) => {
                let notification = store.insert_front(incoming).await;
                tracing::debug!(
                    "Notification received: {} ({})",
                    notification.title,
                    notification.urgency
                );
            }
            None => {
                tracing::trace!("Skipping bus message with too few fields");
            }
        }
    }

    anyhow::bail!("Session bus connection closed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::collections::HashMap;
    use zbus::zvariant::Value;

    use crate::store::Urgency;

    fn notify_call(title: &str, urgency: Option<u8>) -> zbus::Result<Message> {
        let mut hints: HashMap<&str, Value<'_>> = HashMap::new();
        if let Some(u) = urgency {
            hints.insert("urgency", Value::from(u));
        }
        Message::method(NOTIFICATIONS_PATH, NOTIFY_MEMBER)?
            .interface(NOTIFICATIONS_INTERFACE)?
            .build(&(
                "app",
                0u32,
                "",
                title,
                "body",
                Vec::<String>::new(),
                hints,
                5000i32,
            ))
    }

    fn method_return() -> zbus::Result<Message> {
        Message::method(NOTIFICATIONS_PATH, NOTIFY_MEMBER)?.build(&(7u32,))
    }

    #[test]
    fn test_rules_cover_all_message_types() {
        let rules = notify_rules().unwrap();
        assert_eq!(rules.len(), 4);
        for rule in &rules {
            let text = rule.to_string();
            assert!(text.contains("member='Notify'"));
            assert!(text.contains("interface='org.freedesktop.Notifications'"));
            assert!(text.contains("path='/org/freedesktop/Notifications'"));
        }
        assert!(rules[0].to_string().contains("type='signal'"));
        assert!(rules[1].to_string().contains("type='method_call'"));
        assert!(rules[2].to_string().contains("type='method_return'"));
        assert!(rules[3].to_string().contains("type='error'"));
    }

    #[tokio::test]
    async fn test_consume_inserts_in_arrival_order() {
        let store = NotificationStore::new();
        let messages = stream::iter(vec![
            notify_call("A", Some(0)),
            method_return(),
            notify_call("B", Some(2)),
            notify_call("C", Some(1)),
        ]);

        let result = consume(messages, store.clone()).await;
        assert!(result.is_err(), "stream end is reported as an error");

        let snapshot = store.snapshot().await;
        let got: Vec<(&str, Urgency)> = snapshot
            .iter()
            .map(|n| (n.title.as_str(), n.urgency))
            .collect();
        assert_eq!(
            got,
            vec![
                ("C", Urgency::Normal),
                ("B", Urgency::High),
                ("A", Urgency::Low),
            ]
        );
    }

    #[tokio::test]
    async fn test_consume_skips_receive_errors() {
        let store = NotificationStore::new();
        let messages = stream::iter(vec![
            Err(zbus::Error::Failure("broken".into())),
            notify_call("A", None),
        ]);

        let _ = consume(messages, store.clone()).await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_consume_stops_on_contract_violation() {
        let store = NotificationStore::new();
        let bad = Message::method(NOTIFICATIONS_PATH, NOTIFY_MEMBER)
            .and_then(|b| b.build(&(1u32, 2u32, 3u32, 4u32, 5u32, 6u32, 7u32)));
        let messages = stream::iter(vec![bad, notify_call("A", None)]);

        let err = consume(messages, store.clone()).await.unwrap_err();
        assert!(err.to_string().contains("Malformed Notify payload"));
        assert!(store.is_empty().await);
    }
}
