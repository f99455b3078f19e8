use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Notification urgency as carried in the `urgency` hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Urgency {
    #[default]
    Low,
    Normal,
    High,
}

impl Urgency {
    /// Map the raw hint byte to an urgency
    ///
    /// - 0 -> Low
    /// - 1 -> Normal
    /// - 2 -> High
    /// - others -> Low
    pub fn from_byte(value: u8) -> Self {
        match value {
            1 => Urgency::Normal,
            2 => Urgency::High,
            _ => Urgency::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "Low",
            Urgency::Normal => "Normal",
            Urgency::High => "High",
        }
    }
}

impl From<u8> for Urgency {
    fn from(value: u8) -> Self {
        Self::from_byte(value)
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification that has not been stamped by the store yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingNotification {
    pub title: String,
    pub message: String,
    pub urgency: Urgency,
}

impl IncomingNotification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, urgency: Urgency) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            urgency,
        }
    }
}

/// A stored notification
///
/// Field names on the wire follow the `get-list` format:
/// `Title`, `Message`, `Urgency`, `CreatedOn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Urgency")]
    pub urgency: Urgency,
    #[serde(rename = "CreatedOn")]
    pub created_at: DateTime<Local>,
}

impl Notification {
    pub(crate) fn stamp(incoming: IncomingNotification, created_at: DateTime<Local>) -> Self {
        Self {
            title: incoming.title,
            message: incoming.message,
            urgency: incoming.urgency,
            created_at,
        }
    }

    /// `"<title>: <message>"`, the text shown in the status bar
    pub fn summary_line(&self) -> String {
        format!("{}: {}", self.title, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_urgency_from_byte() {
        assert_eq!(Urgency::from_byte(0), Urgency::Low);
        assert_eq!(Urgency::from_byte(1), Urgency::Normal);
        assert_eq!(Urgency::from_byte(2), Urgency::High);
        assert_eq!(Urgency::from_byte(3), Urgency::Low);
        assert_eq!(Urgency::from(255), Urgency::Low);
    }

    #[test]
    fn test_serialize_field_names() {
        let n = Notification::stamp(
            IncomingNotification::new("A", "B", Urgency::Normal),
            Local::now(),
        );
        let json = serde_json::to_string(&n).unwrap();
        assert!(json.contains("\"Title\":\"A\""));
        assert!(json.contains("\"Message\":\"B\""));
        assert!(json.contains("\"Urgency\":\"Normal\""));
        assert!(json.contains("\"CreatedOn\":"));
    }

    #[test]
    fn test_created_on_round_trip() {
        let created_at = Local::now();
        let n = Notification::stamp(
            IncomingNotification::new("A", "B", Urgency::Normal),
            created_at,
        );
        let json = serde_json::to_string(&vec![n]).unwrap();

        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        let stamp = parsed[0]["CreatedOn"].as_str().unwrap();
        let parsed_at = DateTime::<FixedOffset>::parse_from_rfc3339(stamp).unwrap();
        assert_eq!(parsed_at, created_at);

        let back: Vec<Notification> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[0].title, "A");
        assert_eq!(back[0].message, "B");
        assert_eq!(back[0].urgency, Urgency::Normal);
        assert_eq!(back[0].created_at, created_at);
    }
}
