//! Asset listing and outbound relations for the current tenant.

use crate::error::Error;
use crate::models::{Asset, EntityId, EntityRelation, PageData};
use crate::session::Session;

/// Fetch one page of the tenant's assets, newest first.
pub async fn list(
    session: &Session,
    page: u32,
    page_size: u32,
    search: &str,
) -> Result<PageData<Asset>, Error> {
    let client = session.client()?;
    client
        .get(
            "/api/tenant/assets",
            &[
                ("pageSize", page_size.to_string()),
                ("page", page.to_string()),
                ("textSearch", search.to_string()),
                ("sortProperty", "createdTime".to_string()),
                ("sortOrder", "DESC".to_string()),
            ],
        )
        .await
}

/// Fetch relations pointing away from `entity` in the common group.
pub async fn relations_from(
    session: &Session,
    entity: &EntityId,
) -> Result<Vec<EntityRelation>, Error> {
    let client = session.client()?;
    client
        .get(
            "/api/relations",
            &[
                ("fromId", entity.id.clone()),
                ("fromType", entity.entity_type.clone()),
                ("relationTypeGroup", "COMMON".to_string()),
            ],
        )
        .await
}
