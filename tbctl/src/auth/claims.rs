//! Access-token claim decoding.
//!
//! Claims are extracted without verifying the signature: the token arrived
//! over an authenticated exchange with the server that minted it, and the
//! signing key never leaves that server. Expiry is not checked either, the
//! server rejects stale tokens itself.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::error::Error;

/// The principal's role tier, taken from the first scope of the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    /// Platform-wide administrator.
    SysAdmin,
    /// Administrator of a single tenant.
    TenantAdmin,
    /// End user scoped to a customer.
    CustomerUser,
}

impl Authority {
    /// Wire spelling used in token scopes.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SysAdmin => "SYS_ADMIN",
            Self::TenantAdmin => "TENANT_ADMIN",
            Self::CustomerUser => "CUSTOMER_USER",
        }
    }

    /// Parse a token scope into an authority.
    pub fn from_scope(scope: &str) -> Option<Self> {
        match scope {
            "SYS_ADMIN" => Some(Self::SysAdmin),
            "TENANT_ADMIN" => Some(Self::TenantAdmin),
            "CUSTOMER_USER" => Some(Self::CustomerUser),
            _ => None,
        }
    }
}

impl std::fmt::Display for Authority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Access/refresh token pair returned by credential exchanges.
///
/// Held in process memory only, never written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CredentialPair {
    /// Bearer access token.
    pub token: String,
    /// Refresh token issued alongside it.
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: String,
}

/// The authenticated principal, decoded from an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Login email, the `sub` claim.
    pub email: String,
    /// Raw scope list as issued.
    pub scopes: Vec<String>,
    pub user_id: String,
    pub tenant_id: String,
    pub customer_id: String,
    pub enabled: bool,
    pub is_public: bool,
    /// Role tier derived from the first scope.
    pub authority: Authority,
}

/// Claims carried by the platform's access tokens.
#[derive(Debug, Deserialize)]
struct AccessClaims {
    sub: String,
    #[serde(default)]
    scopes: Vec<String>,
    #[serde(rename = "userId", default)]
    user_id: String,
    #[serde(rename = "tenantId", default)]
    tenant_id: String,
    #[serde(rename = "customerId", default)]
    customer_id: String,
    #[serde(default)]
    enabled: bool,
    #[serde(rename = "isPublic", default)]
    is_public: bool,
}

/// Decode `token` into the identity it describes.
///
/// The first scope is taken as the authority. A token with no scopes or an
/// unrecognised first scope does not decode.
pub fn decode_identity(token: &str) -> Result<Identity, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.set_required_spec_claims::<&str>(&[]);

    let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| Error::TokenDecode(e.to_string()))?;
    let claims = data.claims;

    let first_scope = claims
        .scopes
        .first()
        .ok_or_else(|| Error::TokenDecode("token carries no scopes".to_string()))?;
    let authority = Authority::from_scope(first_scope)
        .ok_or_else(|| Error::TokenDecode(format!("unrecognised authority scope: {first_scope}")))?;

    Ok(Identity {
        email: claims.sub,
        scopes: claims.scopes,
        user_id: claims.user_id,
        tenant_id: claims.tenant_id,
        customer_id: claims.customer_id,
        enabled: claims.enabled,
        is_public: claims.is_public,
        authority,
    })
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    use super::*;

    fn token_with(claims: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"mock-platform-secret"),
        )
        .unwrap()
    }

    #[test]
    fn decodes_full_claim_set() {
        let token = token_with(json!({
            "sub": "tenant@thingsboard.org",
            "scopes": ["TENANT_ADMIN"],
            "userId": "u1",
            "tenantId": "t1",
            "customerId": "c1",
            "enabled": true,
            "isPublic": false,
            "exp": 4_102_444_800_u64,
        }));
        let identity = decode_identity(&token).unwrap();
        assert_eq!(identity.email, "tenant@thingsboard.org");
        assert_eq!(identity.authority, Authority::TenantAdmin);
        assert_eq!(identity.tenant_id, "t1");
        assert!(identity.enabled);
        assert!(!identity.is_public);
    }

    #[test]
    fn authority_comes_from_first_scope_only() {
        let token = token_with(json!({
            "sub": "a@b.c",
            "scopes": ["SYS_ADMIN", "TENANT_ADMIN"],
        }));
        assert_eq!(decode_identity(&token).unwrap().authority, Authority::SysAdmin);
    }

    #[test]
    fn expired_token_still_decodes() {
        let token = token_with(json!({
            "sub": "a@b.c",
            "scopes": ["CUSTOMER_USER"],
            "exp": 1_000_000_000,
        }));
        assert_eq!(decode_identity(&token).unwrap().authority, Authority::CustomerUser);
    }

    #[test]
    fn signature_is_not_checked() {
        let token = token_with(json!({"sub": "a@b.c", "scopes": ["SYS_ADMIN"]}));
        // Tamper with the signature part; claims must still decode.
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[2] = "AAAAAAAAAAAAAAAAAAAAAA";
        let tampered = parts.join(".");
        assert!(decode_identity(&tampered).is_ok());
    }

    #[test]
    fn empty_scopes_fail_to_decode() {
        let token = token_with(json!({"sub": "a@b.c", "scopes": []}));
        assert!(matches!(decode_identity(&token), Err(Error::TokenDecode(_))));
    }

    #[test]
    fn unknown_scope_fails_to_decode() {
        let token = token_with(json!({"sub": "a@b.c", "scopes": ["REFRESH_TOKEN"]}));
        assert!(matches!(decode_identity(&token), Err(Error::TokenDecode(_))));
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(decode_identity("not-a-jwt"), Err(Error::TokenDecode(_))));
    }
}
