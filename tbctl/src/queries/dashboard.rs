//! Dashboard aggregation: entity counts, service health, usage telemetry.
//!
//! Every sub-query degrades independently to a zero or empty value on
//! failure, so one broken endpoint never blanks the whole overview. What the
//! overview contains depends on the authority: system administrators get
//! platform-wide numbers, everyone else gets their tenant's slice.

use std::collections::HashMap;
use std::future::Future;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::auth::Authority;
use crate::error::Error;
use crate::models::{AlarmInfo, AlarmStatus, EntityId, PageData};
use crate::session::Session;

use super::{alarms, assets, devices, tenants};

/// Fixed id of the system tenant that owns platform-wide usage state.
const SYS_TENANT_ID: &str = "13814000-1dd2-11b2-8080-808080808080";

/// Telemetry key tracking cumulative transport message volume.
const TRANSPORT_MSG_KEY: &str = "transportMsgCount";

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// How many days of usage telemetry the overview looks back.
const TELEMETRY_WINDOW_DAYS: i64 = 30;

/// Health snapshot of one platform service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfoData {
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub service_type: String,
    #[serde(default)]
    pub cpu_usage: f64,
    #[serde(default)]
    pub memory_usage: f64,
    #[serde(default)]
    pub disc_usage: f64,
    #[serde(default)]
    pub cpu_count: u64,
    #[serde(default)]
    pub total_memory: u64,
    #[serde(default)]
    pub total_disc_space: u64,
}

/// Envelope returned by `/api/admin/systemInfo`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SystemInfo {
    #[serde(default)]
    system_data: Vec<SystemInfoData>,
}

/// Entity totals across the whole platform.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SystemStats {
    pub tenants: u64,
    pub devices: u64,
    pub assets: u64,
    pub users: u64,
    pub customers: u64,
    pub tenant_profiles: u64,
}

/// One point of a telemetry series, timestamped in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryPoint {
    pub ts: i64,
    pub value: i64,
}

/// Raw timeseries sample; values arrive as numbers or numeric strings.
#[derive(Debug, Deserialize)]
struct RawSample {
    ts: i64,
    value: serde_json::Value,
}

/// Usage state entity owning the platform's telemetry series.
#[derive(Debug, Deserialize)]
struct UsageState {
    id: EntityId,
}

/// What the dashboard shows for the current authority.
#[derive(Debug, Serialize, Deserialize)]
pub enum Overview {
    /// Platform-wide view for system administrators.
    SysAdmin {
        stats: SystemStats,
        system_info: Option<SystemInfoData>,
        telemetry: Vec<TelemetryPoint>,
    },
    /// Scoped view for tenant administrators and customer users.
    Tenant {
        tenants: u64,
        devices: u64,
        assets: u64,
        alarm_count: u64,
        active_alarms: Vec<AlarmInfo>,
    },
}

/// Aggregate the dashboard for the current identity.
pub async fn overview(session: &Session) -> Result<Overview, Error> {
    let identity = session.identity().ok_or(Error::NotAuthenticated)?;
    if identity.authority == Authority::SysAdmin {
        let (stats, system_info, telemetry) = tokio::join!(
            system_stats(session),
            service_health(session),
            system_telemetry(session),
        );
        Ok(Overview::SysAdmin {
            stats,
            system_info,
            telemetry,
        })
    } else {
        let (tenants, devices, assets, alarms) = tokio::join!(
            page_total(tenants::list(session, 0, 1, "")),
            page_total(devices::list(session, 0, 1, "", None)),
            page_total(assets::list(session, 0, 1, "")),
            active_alarms(session),
        );
        Ok(Overview::Tenant {
            tenants,
            devices,
            assets,
            alarm_count: alarms.total_elements,
            active_alarms: alarms.data,
        })
    }
}

/// Platform-wide entity counts, each kind degrading to zero on failure.
async fn system_stats(session: &Session) -> SystemStats {
    let (tenants, devices, assets, users, customers, tenant_profiles) = tokio::join!(
        count_entities(session, "TENANT"),
        count_entities(session, "DEVICE"),
        count_entities(session, "ASSET"),
        count_entities(session, "USER"),
        count_entities(session, "CUSTOMER"),
        count_entities(session, "TENANT_PROFILE"),
    );
    SystemStats {
        tenants,
        devices,
        assets,
        users,
        customers,
        tenant_profiles,
    }
}

/// Count entities of one kind via the query API, falling back to the list
/// endpoint's totals, then to zero.
async fn count_entities(session: &Session, entity_type: &str) -> u64 {
    match count_via_query(session, entity_type).await {
        Ok(count) => count,
        Err(e) => {
            warn!(entity_type, error = %e, "count query failed, trying list endpoint");
            count_via_list(session, entity_type).await.unwrap_or_else(|e| {
                warn!(entity_type, error = %e, "list fallback failed");
                0
            })
        }
    }
}

async fn count_via_query(session: &Session, entity_type: &str) -> Result<u64, Error> {
    let client = session.client()?;
    client
        .post(
            "/api/entitiesQuery/count",
            &json!({ "entityFilter": { "type": "entityType", "entityType": entity_type } }),
        )
        .await
}

async fn count_via_list(session: &Session, entity_type: &str) -> Result<u64, Error> {
    let endpoint = match entity_type {
        "TENANT" => "/api/tenants",
        "DEVICE" => "/api/devices",
        "ASSET" => "/api/assets",
        "USER" => "/api/users",
        "CUSTOMER" => "/api/customers",
        "TENANT_PROFILE" => "/api/tenantProfiles",
        _ => return Ok(0),
    };
    let client = session.client()?;
    let page: PageData<serde_json::Value> = client
        .get(
            endpoint,
            &[("pageSize", "1".to_string()), ("page", "0".to_string())],
        )
        .await?;
    Ok(page.total_elements)
}

/// First service entry from the platform's system info, if reachable.
async fn service_health(session: &Session) -> Option<SystemInfoData> {
    let client = match session.client() {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "system info unavailable");
            return None;
        }
    };
    match client.get::<SystemInfo>("/api/admin/systemInfo", &[]).await {
        Ok(info) => info.system_data.into_iter().next(),
        Err(e) => {
            warn!(error = %e, "system info unavailable");
            None
        }
    }
}

/// Daily transport-message deltas over the telemetry window, empty when the
/// usage state or its series cannot be resolved.
async fn system_telemetry(session: &Session) -> Vec<TelemetryPoint> {
    match fetch_transport_series(session).await {
        Ok(samples) => daily_deltas(&samples),
        Err(e) => {
            warn!(error = %e, "usage telemetry unavailable");
            Vec::new()
        }
    }
}

async fn fetch_transport_series(session: &Session) -> Result<Vec<TelemetryPoint>, Error> {
    let client = session.client()?;
    let state: UsageState = client
        .get(&format!("/api/usage/state/{SYS_TENANT_ID}"), &[])
        .await?;

    let now = Utc::now().timestamp_millis();
    let start = now - TELEMETRY_WINDOW_DAYS * DAY_MS;
    let mut series: HashMap<String, Vec<RawSample>> = client
        .get(
            &format!(
                "/api/plugins/telemetry/{}/{}/values/timeseries",
                state.id.entity_type, state.id.id
            ),
            &[
                ("keys", TRANSPORT_MSG_KEY.to_string()),
                ("startTs", start.to_string()),
                ("endTs", now.to_string()),
                ("interval", DAY_MS.to_string()),
                ("agg", "MAX".to_string()),
                ("useStrictDataTypes", "true".to_string()),
            ],
        )
        .await?;

    let samples = series.remove(TRANSPORT_MSG_KEY).unwrap_or_default();
    let mut points: Vec<TelemetryPoint> = samples
        .iter()
        .map(|s| TelemetryPoint {
            ts: s.ts,
            value: sample_value(&s.value),
        })
        .collect();
    points.sort_by_key(|p| p.ts);
    Ok(points)
}

/// Numeric value of a sample that may arrive as a number or a numeric string.
fn sample_value(value: &serde_json::Value) -> i64 {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

/// Reduce a cumulative counter series to day-over-day increases.
///
/// Counters reset when services restart, so negative deltas clamp to zero.
/// A single sample has no delta and is returned as-is.
fn daily_deltas(points: &[TelemetryPoint]) -> Vec<TelemetryPoint> {
    if points.len() < 2 {
        return points.to_vec();
    }
    points
        .windows(2)
        .map(|w| TelemetryPoint {
            ts: w[1].ts,
            value: (w[1].value - w[0].value).max(0),
        })
        .collect()
}

/// Total of the tenant count sources, degrading to zero.
async fn page_total<T>(result: impl Future<Output = Result<PageData<T>, Error>>) -> u64 {
    match result.await {
        Ok(page) => page.total_elements,
        Err(e) => {
            warn!(error = %e, "count unavailable");
            0
        }
    }
}

/// Active unacknowledged alarms, degrading to an empty page.
async fn active_alarms(session: &Session) -> PageData<AlarmInfo> {
    match alarms::list(session, 0, 10, AlarmStatus::ActiveUnack).await {
        Ok(page) => page,
        Err(e) => {
            warn!(error = %e, "alarms unavailable");
            PageData::empty()
        }
    }
}
