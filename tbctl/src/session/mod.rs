//! Session state: environment registry, credentials, impersonation.

mod persist;
mod state;

pub use persist::RegistryStore;
pub use state::{Environment, Session, SessionState};
