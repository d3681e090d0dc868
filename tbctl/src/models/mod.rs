//! Wire models for the platform REST API.

mod alarm;
mod asset;
mod device;
mod entity;
mod page;
mod tenant;
mod user;

pub use alarm::{AlarmInfo, AlarmSeverity, AlarmStatus};
pub use asset::Asset;
pub use device::{DeviceCredentials, DeviceInfo};
pub use entity::{EntityId, EntityRelation};
pub use page::PageData;
pub use tenant::Tenant;
pub use user::PlatformUser;
