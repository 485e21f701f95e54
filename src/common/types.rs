use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Sender name used by the fail-soft placeholder conversation.
pub const PLACEHOLDER_SENDER: &str = "AI";
const PLACEHOLDER_GREETING: &str = "Hello! Welcome to the Shield 2.O, What is your next move?";

/// Domain model for one chat message as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub content: String,
    pub sender: String,
    #[serde(deserialize_with = "de::timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Derived on every ingestion pass, never trusted from the wire.
    #[serde(default)]
    pub is_current_user: bool,
}

impl ChatMessage {
    /// Returns the message with `is_current_user` recomputed for `current_user`.
    pub fn for_viewer(mut self, current_user: &str) -> Self {
        self.is_current_user = self.sender == current_user;
        self
    }
}

/// Payload of a write to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    pub sender: String,
}

/// Parsed response body of a write.
#[derive(Debug, Clone, PartialEq)]
pub struct SendAck {
    pub body: serde_json::Value,
}

impl SendAck {
    pub fn new(body: serde_json::Value) -> Self {
        Self { body }
    }

    /// Typed view of the response, when the server echoes the stored message.
    pub fn message(&self) -> Option<ChatMessage> {
        serde_json::from_value(self.body.clone()).ok()
    }
}

/// The single-message conversation shown whenever a poll fails.
pub fn placeholder_conversation() -> Vec<ChatMessage> {
    vec![ChatMessage {
        id: "1".to_string(),
        content: PLACEHOLDER_GREETING.to_string(),
        sender: PLACEHOLDER_SENDER.to_string(),
        timestamp: Utc::now() - Duration::minutes(5),
        is_current_user: false,
    }]
}

mod de {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Millis(i64),
        FractionalMillis(f64),
        Text(String),
    }

    pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(id) => id,
            RawId::Number(id) => id.to_string(),
        })
    }

    pub fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parsed = match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Millis(millis) => from_millis(millis),
            RawTimestamp::FractionalMillis(millis) if millis.is_finite() => {
                from_millis(millis.trunc() as i64)
            }
            RawTimestamp::FractionalMillis(millis) => {
                return Err(serde::de::Error::custom(format!("invalid timestamp: {millis}")));
            }
            RawTimestamp::Text(text) => parse_text(&text),
        };
        parsed.ok_or_else(|| serde::de::Error::custom("timestamp is not a recognized date"))
    }

    fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(millis).single()
    }

    /// Offset-less date-times are local, bare dates are UTC midnight.
    pub(super) fn parse_text(text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
            return Some(parsed.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
            // skipped local times (DST gaps) fall back to UTC
            let local = Local.from_local_datetime(&naive).earliest();
            return Some(local.map_or_else(
                || Utc.from_utc_datetime(&naive),
                |local| local.with_timezone(&Utc),
            ));
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive))
    }
}
