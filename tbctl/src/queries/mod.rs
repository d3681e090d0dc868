//! Read-only queries over the platform REST API.
//!
//! Each function takes the session by reference and builds its request
//! parameters explicitly. Failures surface as typed errors for the caller to
//! display, except where the dashboard deliberately degrades to empty data.

mod cache;

pub mod alarms;
pub mod assets;
pub mod dashboard;
pub mod devices;
pub mod tenants;
pub mod topology;

pub use cache::QueryCache;
