//! Alarm listing scoped to the current identity's tenant.

use crate::error::Error;
use crate::models::{AlarmInfo, AlarmStatus, PageData};
use crate::session::Session;

/// Fetch one page of alarms for the current tenant, filtered by status.
pub async fn list(
    session: &Session,
    page: u32,
    page_size: u32,
    status: AlarmStatus,
) -> Result<PageData<AlarmInfo>, Error> {
    let identity = session.identity().ok_or(Error::NotAuthenticated)?;
    let client = session.client()?;
    client
        .get(
            &format!("/api/alarm/info/TENANT/{}", identity.tenant_id),
            &[
                ("pageSize", page_size.to_string()),
                ("page", page.to_string()),
                ("status", status.as_str().to_string()),
            ],
        )
        .await
}
