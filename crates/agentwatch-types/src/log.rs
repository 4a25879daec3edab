//! Log entries delivered by the log transport.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One line of worker output, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub text: String,
    /// When the line was observed. Missing or malformed timestamps deserialize
    /// to `None` and count as the Unix epoch for idle-time purposes.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub observed_at: Option<DateTime<Utc>>,
}

impl LogEntry {
    pub fn new(text: impl Into<String>, observed_at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            observed_at: Some(observed_at),
        }
    }

    /// Observation time, falling back to the epoch when unknown.
    pub fn observed_at_or_epoch(&self) -> DateTime<Utc> {
        self.observed_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// Accepts RFC 3339 strings or epoch milliseconds; anything else becomes `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    };
    Ok(parsed)
}
