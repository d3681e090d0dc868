//! Identity-scoped cache for query results.
//!
//! Entries are keyed by strings the features build from their parameters and
//! are valid only for the identity scope they were fetched under. Re-scoping
//! to a different authority or tenant drops everything, so data fetched as
//! one principal is never shown as another.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::auth::Identity;

/// The slice of an identity a cache entry is valid for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Scope {
    authority: String,
    tenant_id: String,
}

/// Per-process cache of query results, invalidated on identity change.
#[derive(Debug, Default)]
pub struct QueryCache {
    scope: Option<Scope>,
    entries: HashMap<String, serde_json::Value>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Align the cache with the current identity, dropping all entries when
    /// the scope changed. Called after login, impersonation, exit, logout and
    /// environment switches.
    pub fn scope_to(&mut self, identity: Option<&Identity>) {
        let scope = identity.map(|i| Scope {
            authority: i.authority.as_str().to_string(),
            tenant_id: i.tenant_id.clone(),
        });
        if scope != self.scope {
            if !self.entries.is_empty() {
                debug!(entries = self.entries.len(), "identity changed, dropping cached queries");
            }
            self.entries.clear();
            self.scope = scope;
        }
    }

    /// Cached value for `key` within the current scope.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.scope.as_ref()?;
        let value = self.entries.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Store a value for `key`. Nothing is stored while anonymous.
    pub fn put<T: Serialize>(&mut self, key: &str, value: &T) {
        if self.scope.is_none() {
            return;
        }
        if let Ok(value) = serde_json::to_value(value) {
            self.entries.insert(key.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::Authority;

    use super::*;

    fn identity(authority: Authority, tenant_id: &str) -> Identity {
        Identity {
            email: "user@tb.org".to_string(),
            scopes: vec![authority.as_str().to_string()],
            user_id: "u1".to_string(),
            tenant_id: tenant_id.to_string(),
            customer_id: "c1".to_string(),
            enabled: true,
            is_public: false,
            authority,
        }
    }

    #[test]
    fn round_trips_within_one_scope() {
        let mut cache = QueryCache::new();
        cache.scope_to(Some(&identity(Authority::SysAdmin, "t0")));
        cache.put("tenants:0", &vec!["a".to_string(), "b".to_string()]);
        assert_eq!(cache.get::<Vec<String>>("tenants:0"), Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn rescoping_to_the_same_identity_keeps_entries() {
        let mut cache = QueryCache::new();
        cache.scope_to(Some(&identity(Authority::SysAdmin, "t0")));
        cache.put("k", &1u32);
        cache.scope_to(Some(&identity(Authority::SysAdmin, "t0")));
        assert_eq!(cache.get::<u32>("k"), Some(1));
    }

    #[test]
    fn identity_change_drops_entries() {
        let mut cache = QueryCache::new();
        cache.scope_to(Some(&identity(Authority::SysAdmin, "t0")));
        cache.put("k", &1u32);

        cache.scope_to(Some(&identity(Authority::TenantAdmin, "t1")));
        assert_eq!(cache.get::<u32>("k"), None);
    }

    #[test]
    fn logout_drops_entries() {
        let mut cache = QueryCache::new();
        cache.scope_to(Some(&identity(Authority::SysAdmin, "t0")));
        cache.put("k", &1u32);

        cache.scope_to(None);
        assert_eq!(cache.get::<u32>("k"), None);
    }

    #[test]
    fn anonymous_cache_stores_nothing() {
        let mut cache = QueryCache::new();
        cache.put("k", &1u32);
        assert_eq!(cache.get::<u32>("k"), None);
    }
}
