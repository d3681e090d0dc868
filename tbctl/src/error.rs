//! Error taxonomy for session operations and platform queries.
//!
//! Every fallible operation against the platform returns one of these
//! variants. The command layer prints them and leaves the session untouched,
//! so a failed call never corrupts authentication state.

use reqwest::StatusCode;

/// Errors surfaced by session operations and platform queries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No active environment is selected.
    #[error("no active environment (add one with `env add <name> <url>`)")]
    NoActiveEnvironment,

    /// An operation that needs a credential ran without one.
    #[error("not authenticated (run `login` first)")]
    NotAuthenticated,

    /// The credential exchange was rejected or never reached the server.
    #[error("authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// A referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Network-level failure, no response was received.
    #[error("network error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server rejected the request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    /// The deployment does not offer the required endpoint.
    #[error("not supported by this server: {0}")]
    Unsupported(String),

    /// The access token claims could not be decoded.
    #[error("failed to decode access token: {0}")]
    TokenDecode(String),
}
