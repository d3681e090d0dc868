//! Device listing and credential lookup for the current tenant.

use crate::error::Error;
use crate::models::{DeviceCredentials, DeviceInfo, PageData};
use crate::session::Session;

/// Fetch one page of the tenant's devices, newest first, optionally filtered
/// by device type.
pub async fn list(
    session: &Session,
    page: u32,
    page_size: u32,
    search: &str,
    device_type: Option<&str>,
) -> Result<PageData<DeviceInfo>, Error> {
    let client = session.client()?;
    let mut params = vec![
        ("pageSize", page_size.to_string()),
        ("page", page.to_string()),
        ("textSearch", search.to_string()),
        ("sortProperty", "createdTime".to_string()),
        ("sortOrder", "DESC".to_string()),
    ];
    if let Some(device_type) = device_type {
        params.push(("type", device_type.to_string()));
    }
    client.get("/api/tenant/deviceInfos", &params).await
}

/// Fetch the connectivity credentials for one device.
pub async fn credentials(session: &Session, device_id: &str) -> Result<DeviceCredentials, Error> {
    let client = session.client()?;
    client
        .get(&format!("/api/device/{device_id}/credentials"), &[])
        .await
}
