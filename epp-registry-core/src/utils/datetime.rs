//! Datetime serialization helpers.
//!
//! Registry timestamps are always UTC instants exchanged as RFC3339 strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Serializes `DateTime<Utc>` as an RFC3339 string.
pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339())
}

/// Deserializes `DateTime<Utc>` from an RFC3339 string.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let s = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::custom(format!("Invalid RFC3339 timestamp: {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Wrapper {
        #[serde(with = "super")]
        at: chrono::DateTime<Utc>,
    }

    #[test]
    fn rfc3339_roundtrip() {
        let w = Wrapper {
            at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().unwrap(),
        };
        let json = serde_json::to_string(&w).unwrap();
        assert!(json.contains("2024-06-01T12:00:00"));
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(w, back);
    }

    #[test]
    fn rejects_non_rfc3339() {
        let result: Result<Wrapper, _> = serde_json::from_str(r#"{"at":"June 1, 2024"}"#);
        assert!(result.is_err());
    }
}
