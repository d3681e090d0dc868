//! Asset model.

use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// An asset registered under a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: EntityId,
    /// Creation time in epoch milliseconds.
    #[serde(default)]
    pub created_time: i64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub asset_type: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<EntityId>,
    #[serde(default)]
    pub customer_id: Option<EntityId>,
    #[serde(default)]
    pub additional_info: Option<serde_json::Value>,
}
