//! tbctl - terminal admin console for ThingsBoard-compatible IoT platforms.
//!
//! The session module owns which environment is active and which credential
//! pair is current. The auth module performs the credential exchanges, the
//! queries are thin read-only wrappers over the platform REST API, and the
//! CLI renders all of it.

pub mod api;
pub mod auth;
pub mod cli;
pub mod error;
pub mod models;
pub mod queries;
pub mod session;
