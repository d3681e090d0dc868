//! Tenant listing, available to system administrators.

use crate::error::Error;
use crate::models::{PageData, Tenant};
use crate::session::Session;

/// Fetch one page of tenants, newest first.
pub async fn list(
    session: &Session,
    page: u32,
    page_size: u32,
    search: &str,
) -> Result<PageData<Tenant>, Error> {
    let client = session.client()?;
    client
        .get(
            "/api/tenants",
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
