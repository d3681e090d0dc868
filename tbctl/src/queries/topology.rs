//! Asset topology assembled from containment relations.
//!
//! Fetches the tenant's assets and their outbound relations, then assembles a
//! containment forest: roots are assets nothing contains, children follow the
//! `Contains` relations. Rendering is the caller's concern.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::error::Error;
use crate::models::{Asset, EntityId, EntityRelation};
use crate::session::Session;

use super::assets;

/// Relation type that expresses containment.
const CONTAINS: &str = "Contains";

/// How many assets the topology considers.
const ASSET_PAGE_SIZE: u32 = 50;

/// One node of the containment forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyNode {
    pub entity: EntityId,
    /// Display name; entities outside the fetched assets fall back to a
    /// type-and-id label.
    pub name: String,
    /// Asset type, or the entity type for non-asset leaves.
    pub kind: String,
    pub children: Vec<TopologyNode>,
}

/// Fetch the tenant's assets and their relations and assemble the forest.
///
/// A failed relation lookup leaves that asset childless instead of failing
/// the whole tree.
pub async fn containment_forest(session: &Session) -> Result<Vec<TopologyNode>, Error> {
    let page = assets::list(session, 0, ASSET_PAGE_SIZE, "").await?;
    let mut relations = Vec::new();
    for asset in &page.data {
        match assets::relations_from(session, &asset.id).await {
            Ok(outbound) => relations.extend(outbound),
            Err(e) => {
                warn!(asset = %asset.name, error = %e, "relations unavailable");
            }
        }
    }
    Ok(assemble_forest(&page.data, &relations))
}

/// Assemble the containment forest from assets and their relations.
///
/// Only `Contains` relations count. Roots are assets that no relation points
/// to; a visited set guards against relation cycles.
pub fn assemble_forest(assets: &[Asset], relations: &[EntityRelation]) -> Vec<TopologyNode> {
    let contains: Vec<&EntityRelation> = relations
        .iter()
        .filter(|r| r.relation_type == CONTAINS)
        .collect();

    let by_id: HashMap<&str, &Asset> = assets.iter().map(|a| (a.id.id.as_str(), a)).collect();
    let mut children: HashMap<&str, Vec<&EntityRelation>> = HashMap::new();
    for &relation in &contains {
        children
            .entry(relation.from.id.as_str())
            .or_default()
            .push(relation);
    }
    let contained: HashSet<&str> = contains.iter().map(|r| r.to.id.as_str()).collect();

    let mut visited = HashSet::new();
    assets
        .iter()
        .filter(|a| !contained.contains(a.id.id.as_str()))
        .map(|a| build_node(&a.id, &by_id, &children, &mut visited))
        .collect()
}

fn build_node(
    entity: &EntityId,
    by_id: &HashMap<&str, &Asset>,
    children: &HashMap<&str, Vec<&EntityRelation>>,
    visited: &mut HashSet<String>,
) -> TopologyNode {
    visited.insert(entity.id.clone());
    let (name, kind) = match by_id.get(entity.id.as_str()) {
        Some(asset) => (asset.name.clone(), asset.asset_type.clone()),
        None => (short_label(entity), entity.entity_type.clone()),
    };
    let mut node = TopologyNode {
        entity: entity.clone(),
        name,
        kind,
        children: Vec::new(),
    };
    if let Some(outbound) = children.get(entity.id.as_str()) {
        for relation in outbound {
            if !visited.contains(relation.to.id.as_str()) {
                node.children
                    .push(build_node(&relation.to, by_id, children, visited));
            }
        }
    }
    node
}

/// Fallback label for entities outside the fetched asset page.
fn short_label(entity: &EntityId) -> String {
    let id = &entity.id;
    let prefix = &id[..id.len().min(8)];
    format!("{} {prefix}", entity.entity_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: &str, name: &str, kind: &str) -> Asset {
        Asset {
            id: EntityId::new("ASSET", id),
            created_time: 0,
            name: name.to_string(),
            asset_type: kind.to_string(),
            label: None,
            tenant_id: None,
            customer_id: None,
            additional_info: None,
        }
    }

    fn contains(from: &EntityId, to: &EntityId) -> EntityRelation {
        EntityRelation {
            from: from.clone(),
            to: to.clone(),
            relation_type: "Contains".to_string(),
            type_group: "COMMON".to_string(),
        }
    }

    #[test]
    fn roots_are_uncontained_assets() {
        let building = asset("a1", "Building A", "building");
        let floor = asset("a2", "Floor 1", "floor");
        let standalone = asset("a3", "Warehouse", "building");
        let relations = vec![contains(&building.id, &floor.id)];

        let forest = assemble_forest(&[building.clone(), floor, standalone], &relations);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].name, "Building A");
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].name, "Floor 1");
        assert_eq!(forest[1].name, "Warehouse");
        assert!(forest[1].children.is_empty());
    }

    #[test]
    fn non_asset_children_become_labelled_leaves() {
        let floor = asset("a1", "Floor 1", "floor");
        let device = EntityId::new("DEVICE", "d1b2c3d4e5f6");
        let relations = vec![contains(&floor.id, &device)];

        let forest = assemble_forest(&[floor], &relations);
        assert_eq!(forest[0].children.len(), 1);
        let leaf = &forest[0].children[0];
        assert_eq!(leaf.kind, "DEVICE");
        assert_eq!(leaf.name, "DEVICE d1b2c3d4");
        assert!(leaf.children.is_empty());
    }

    #[test]
    fn other_relation_types_are_ignored() {
        let a = asset("a1", "A", "zone");
        let b = asset("a2", "B", "zone");
        let mut manages = contains(&a.id, &b.id);
        manages.relation_type = "Manages".to_string();

        let forest = assemble_forest(&[a, b], &[manages]);
        assert_eq!(forest.len(), 2);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn relation_cycles_do_not_recurse_forever() {
        let root = asset("a1", "Root", "zone");
        let left = asset("a2", "Left", "zone");
        let right = asset("a3", "Right", "zone");
        let relations = vec![
            contains(&root.id, &left.id),
            contains(&left.id, &right.id),
            contains(&right.id, &left.id),
        ];

        let forest = assemble_forest(&[root, left, right], &relations);
        assert_eq!(forest.len(), 1);
        let left_node = &forest[0].children[0];
        assert_eq!(left_node.name, "Left");
        assert_eq!(left_node.children[0].name, "Right");
        // The back-edge to an already-visited node is dropped.
        assert!(left_node.children[0].children.is_empty());
    }

    #[test]
    fn empty_inputs_make_an_empty_forest() {
        assert!(assemble_forest(&[], &[]).is_empty());
    }
}
