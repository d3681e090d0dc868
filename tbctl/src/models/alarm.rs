//! Alarm models.

use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// Alarm severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmSeverity {
    Critical,
    Major,
    Minor,
    Warning,
    Indeterminate,
}

impl AlarmSeverity {
    /// Wire spelling of the severity.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Major => "MAJOR",
            Self::Minor => "MINOR",
            Self::Warning => "WARNING",
            Self::Indeterminate => "INDETERMINATE",
        }
    }
}

impl std::fmt::Display for AlarmSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of an alarm, active or cleared crossed with acked or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmStatus {
    ActiveUnack,
    ActiveAck,
    ClearedUnack,
    ClearedAck,
}

impl AlarmStatus {
    /// Wire spelling of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ActiveUnack => "ACTIVE_UNACK",
            Self::ActiveAck => "ACTIVE_ACK",
            Self::ClearedUnack => "CLEARED_UNACK",
            Self::ClearedAck => "CLEARED_ACK",
        }
    }

    /// Parse a status from user input, case-insensitive.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE_UNACK" => Some(Self::ActiveUnack),
            "ACTIVE_ACK" => Some(Self::ActiveAck),
            "CLEARED_UNACK" => Some(Self::ClearedUnack),
            "CLEARED_ACK" => Some(Self::ClearedAck),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlarmStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Alarm list entry enriched with the originator's display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmInfo {
    pub id: EntityId,
    /// Creation time in epoch milliseconds.
    #[serde(default)]
    pub created_time: i64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub alarm_type: String,
    pub originator: EntityId,
    pub severity: AlarmSeverity,
    pub status: AlarmStatus,
    #[serde(default)]
    pub originator_name: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(AlarmStatus::from_str("active_unack"), Some(AlarmStatus::ActiveUnack));
        assert_eq!(AlarmStatus::from_str("CLEARED_ACK"), Some(AlarmStatus::ClearedAck));
        assert_eq!(AlarmStatus::from_str("bogus"), None);
    }

    #[test]
    fn alarm_decodes_wire_enums() {
        let json = r#"{
            "id": {"entityType": "ALARM", "id": "al1"},
            "createdTime": 1700000000000,
            "name": "High Temperature",
            "type": "High Temperature",
            "originator": {"entityType": "DEVICE", "id": "d1"},
            "severity": "CRITICAL",
            "status": "ACTIVE_UNACK",
            "originatorName": "thermostat-1"
        }"#;
        let alarm: AlarmInfo = serde_json::from_str(json).unwrap();
        assert_eq!(alarm.severity, AlarmSeverity::Critical);
        assert_eq!(alarm.status, AlarmStatus::ActiveUnack);
        assert_eq!(alarm.originator_name.as_deref(), Some("thermostat-1"));
    }
}
