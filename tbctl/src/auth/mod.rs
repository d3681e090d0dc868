//! Authentication and impersonation flows.
//!
//! These are the only operations that write credentials into the session.
//! Both decode the identity out of the returned access token instead of
//! trusting a separate user-info endpoint, and both leave the session
//! untouched on failure.

mod claims;

pub use claims::{decode_identity, Authority, CredentialPair, Identity};

use reqwest::StatusCode;
use serde_json::json;
use tracing::info;

use crate::error::Error;
use crate::models::{PageData, PlatformUser};
use crate::session::Session;

/// Exchange `username` and `password` for a credential pair against the
/// active environment and store the decoded identity in the session.
///
/// Rejections and transport failures both surface as
/// [`Error::AuthenticationFailed`], carrying the server's message when it
/// sent one.
pub async fn login(
    session: &mut Session,
    username: &str,
    password: &str,
) -> Result<Identity, Error> {
    let client = session.anonymous_client()?;

    let pair: CredentialPair = client
        .post(
            "/api/auth/login",
            &json!({ "username": username, "password": password }),
        )
        .await
        .map_err(|e| match e {
            Error::Rejected { message, .. } => Error::AuthenticationFailed { message },
            Error::Transport(e) => Error::AuthenticationFailed {
                message: format!("could not reach the server: {e}"),
            },
            other => other,
        })?;

    let identity = decode_identity(&pair.token)?;
    info!(email = %identity.email, authority = %identity.authority, "logged in");
    session.apply_login(pair, identity.clone());
    Ok(identity)
}

/// Impersonate the administrator of `tenant_id`.
///
/// Looks up the tenant's first administrative user, exchanges it for a fresh
/// credential pair and swaps the session identity, keeping the current one
/// restorable. Requires an authenticated session; the server decides whether
/// the caller is allowed the exchange.
pub async fn impersonate(session: &mut Session, tenant_id: &str) -> Result<Identity, Error> {
    let client = session.client()?;

    let admins: PageData<PlatformUser> = client
        .get(
            &format!("/api/tenant/{tenant_id}/users"),
            &[
                ("pageSize", "1".to_string()),
                ("page", "0".to_string()),
            ],
        )
        .await?;
    let admin = admins.data.first().ok_or_else(|| {
        Error::NotFound(format!("no administrative user found for tenant {tenant_id}"))
    })?;

    let pair: CredentialPair = client
        .get(&format!("/api/user/{}/token", admin.id.id), &[])
        .await
        .map_err(|e| match e {
            Error::Rejected { status, .. } if status == StatusCode::NOT_FOUND => Error::Unsupported(
                "this deployment does not expose the user token exchange".to_string(),
            ),
            other => other,
        })?;

    let identity = decode_identity(&pair.token)?;
    info!(tenant = tenant_id, email = %identity.email, "impersonating tenant administrator");
    session.begin_impersonation(pair, identity.clone());
    Ok(identity)
}
