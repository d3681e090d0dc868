//! Entity references and relations.

use serde::{Deserialize, Serialize};

/// Typed reference to a platform entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityId {
    /// Entity kind, e.g. `TENANT`, `DEVICE`, `ASSET`, `USER`.
    pub entity_type: String,
    /// Entity UUID.
    pub id: String,
}

impl EntityId {
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

/// A directed relation between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRelation {
    pub from: EntityId,
    pub to: EntityId,
    /// Relation type, e.g. `Contains` or `Manages`.
    #[serde(rename = "type")]
    pub relation_type: String,
    /// Relation group, typically `COMMON`.
    #[serde(default)]
    pub type_group: String,
}
