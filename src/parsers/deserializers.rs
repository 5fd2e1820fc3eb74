use chrono::{DateTime, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn timestamp_from_value<E: Error>(value: Value) -> Result<Option<DateTime<Utc>>, E> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => {
            // Assume it's a Unix timestamp in milliseconds
            let ms = n.as_i64().ok_or_else(|| E::custom("invalid timestamp"))?;
            DateTime::from_timestamp_millis(ms)
                .map(Some)
                .ok_or_else(|| E::custom("timestamp out of range"))
        }
        Value::String(s) => {
            // RFC3339 with any offset, normalized to UTC
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|e| E::custom(format!("invalid RFC3339 timestamp: {}", e)))
        }
        _ => Err(E::custom("timestamp must be a number or string")),
    }
}

/// Custom deserializer for timestamps that accepts integers (ms), RFC3339 strings
/// with any offset (normalized to UTC), and `null`
pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    timestamp_from_value(value)
}
