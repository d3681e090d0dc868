//! Platform user model.

use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// A platform user account, e.g. a tenant administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformUser {
    pub id: EntityId,
    /// Creation time in epoch milliseconds.
    #[serde(default)]
    pub created_time: i64,
    pub email: String,
    /// Role as reported by the server, e.g. `TENANT_ADMIN`.
    #[serde(default)]
    pub authority: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<EntityId>,
    #[serde(default)]
    pub customer_id: Option<EntityId>,
}
