//! HTTP client factory for the platform REST API.

mod client;

pub use client::ApiClient;
