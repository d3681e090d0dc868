//! Device models.

use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// Device list entry with denormalised customer and profile names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub id: EntityId,
    /// Creation time in epoch milliseconds.
    #[serde(default)]
    pub created_time: i64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub device_type: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<EntityId>,
    #[serde(default)]
    pub customer_id: Option<EntityId>,
    #[serde(default)]
    pub customer_title: Option<String>,
    #[serde(default)]
    pub device_profile_name: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// Connectivity credentials for one device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCredentials {
    pub device_id: EntityId,
    /// Credential kind, e.g. `ACCESS_TOKEN` or `MQTT_BASIC`.
    pub credentials_type: String,
    /// The access token itself for token-based credentials.
    #[serde(default)]
    pub credentials_id: String,
    #[serde(default)]
    pub credentials_value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_info_decodes_type_field() {
        let json = r#"{
            "id": {"entityType": "DEVICE", "id": "d1"},
            "createdTime": 1700000000000,
            "name": "thermostat-1",
            "type": "thermostat",
            "customerTitle": "Acme",
            "active": true
        }"#;
        let device: DeviceInfo = serde_json::from_str(json).unwrap();
        assert_eq!(device.device_type, "thermostat");
        assert_eq!(device.customer_title.as_deref(), Some("Acme"));
        assert_eq!(device.active, Some(true));
        assert!(device.label.is_none());
    }
}
