//! Alert wire types.
//!
//! Alerts are created server-side; the client never originates one and only
//! ever mutates the `read` flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the alert is about. Unknown wire values map to `Other` so a newer
/// server never breaks an older client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Awakening,
    Temperature,
    Humidity,
    Noise,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// A single alert as delivered by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Server-assigned, unique; the stable key for read-state mutations.
    pub id: i64,
    pub subject_id: i64,
    #[serde(default)]
    pub owner_id: i64,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    /// Opaque key/value payload; the client never interprets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stream_payload() {
        let json = r#"{"id":1,"subject_id":7,"type":"awakening","severity":"info","title":"Baby woke up","message":"Baby was awake at 03:12.","read":false,"created_at":"2024-01-01T03:12:00Z"}"#;
        let alert: AlertRecord = serde_json::from_str(json).unwrap();
        assert_eq!(alert.id, 1);
        assert_eq!(alert.subject_id, 7);
        assert_eq!(alert.owner_id, 0);
        assert_eq!(alert.kind, AlertKind::Awakening);
        assert_eq!(alert.severity, Severity::Info);
        assert!(!alert.read);
        assert!(alert.metadata.is_none());
    }

    #[test]
    fn unknown_kind_maps_to_other() {
        let json = r#"{"id":2,"subject_id":7,"owner_id":42,"type":"co2_level","severity":"warning","title":"t","message":"m","read":false,"created_at":"2024-01-01T00:00:00Z"}"#;
        let alert: AlertRecord = serde_json::from_str(json).unwrap();
        assert_eq!(alert.kind, AlertKind::Other);
    }

    #[test]
    fn malformed_severity_is_an_error() {
        let json = r#"{"id":3,"subject_id":7,"type":"noise","severity":"loud","title":"t","message":"m","read":false,"created_at":"2024-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<AlertRecord>(json).is_err());
    }
}
