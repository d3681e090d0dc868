//! The session aggregate and its state machine.
//!
//! One `Session` exists per process, owned by the command layer and handed by
//! reference to anything that needs it. Mutations take `&mut self` and reads
//! take `&self`, so credential changes cannot interleave and a reader always
//! sees a consistent snapshot.
//!
//! Authentication posture is derived, not stored: the session is
//! authenticated exactly when it holds a credential pair, and impersonating
//! exactly when the pre-impersonation identity is saved for restore.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::auth::{CredentialPair, Identity};
use crate::error::Error;

/// A configured server endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    /// Generated unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Server base URL, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// When this environment was last logged into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

/// Identity and credentials saved when impersonation begins.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ImpersonationSlot {
    identity: Identity,
    credentials: CredentialPair,
}

/// Authentication posture of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No credential stored.
    Anonymous,
    /// Credential stored, acting as the logged-in user.
    Authenticated,
    /// Credential stored, acting as someone else with the original saved.
    Impersonating,
}

/// Process-wide session: environment registry, current credential pair,
/// decoded identity and the impersonation save slot.
#[derive(Debug, Default)]
pub struct Session {
    environments: Vec<Environment>,
    active_env_id: Option<String>,
    credentials: Option<CredentialPair>,
    identity: Option<Identity>,
    impersonation: Option<ImpersonationSlot>,
}

impl Session {
    /// Rebuild a session from the persisted registry.
    ///
    /// An active id that no longer matches any environment falls back to the
    /// first one, so the active selection never dangles.
    pub fn from_registry(environments: Vec<Environment>, active_env_id: Option<String>) -> Self {
        let mut session = Self {
            environments,
            active_env_id,
            ..Self::default()
        };
        if let Some(id) = &session.active_env_id {
            if !session.environments.iter().any(|e| &e.id == id) {
                session.active_env_id = session.environments.first().map(|e| e.id.clone());
            }
        }
        session
    }

    /// All configured environments in insertion order.
    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    /// The active environment, if one is selected.
    pub fn active_environment(&self) -> Option<&Environment> {
        let id = self.active_env_id.as_deref()?;
        self.environments.iter().find(|e| e.id == id)
    }

    /// Add an environment and make it active. The base URL is stored without
    /// a trailing slash; reachability is not checked.
    pub fn add_environment(&mut self, name: &str, base_url: &str) -> Environment {
        let env = Environment {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            last_used: None,
        };
        self.active_env_id = Some(env.id.clone());
        self.environments.push(env.clone());
        env
    }

    /// Remove an environment by id; unknown ids are a no-op.
    ///
    /// Removing the active environment falls back to the first remaining one
    /// (or none) and clears the authentication state, since the stored
    /// credential belonged to the removed server.
    pub fn remove_environment(&mut self, id: &str) {
        let before = self.environments.len();
        self.environments.retain(|e| e.id != id);
        if self.environments.len() == before {
            return;
        }
        if self.active_env_id.as_deref() == Some(id) {
            self.active_env_id = self.environments.first().map(|e| e.id.clone());
            self.clear_auth();
        }
    }

    /// Make `id` the active environment, unconditionally clearing the
    /// authentication state so the user re-authenticates against it.
    ///
    /// Unknown ids are rejected, keeping the active id pointing at a
    /// configured environment.
    pub fn select_environment(&mut self, id: &str) -> Result<(), Error> {
        if !self.environments.iter().any(|e| e.id == id) {
            return Err(Error::NotFound(format!("environment {id} not found")));
        }
        self.active_env_id = Some(id.to_string());
        self.clear_auth();
        Ok(())
    }

    /// Whether a credential pair is stored.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// Whether an original identity is saved for restore.
    pub fn is_impersonating(&self) -> bool {
        self.impersonation.is_some()
    }

    /// Current authentication posture.
    pub fn state(&self) -> SessionState {
        match (&self.credentials, &self.impersonation) {
            (None, _) => SessionState::Anonymous,
            (Some(_), None) => SessionState::Authenticated,
            (Some(_), Some(_)) => SessionState::Impersonating,
        }
    }

    /// Current access token.
    pub fn token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.token.as_str())
    }

    /// Current identity.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Store a fresh credential pair and identity after a successful login.
    ///
    /// Any impersonation in progress is discarded, a login replaces the whole
    /// credential state. Stamps the active environment's last-used time.
    pub(crate) fn apply_login(&mut self, credentials: CredentialPair, identity: Identity) {
        self.credentials = Some(credentials);
        self.identity = Some(identity);
        self.impersonation = None;
        let now = Utc::now();
        if let Some(id) = self.active_env_id.clone() {
            if let Some(env) = self.environments.iter_mut().find(|e| e.id == id) {
                env.last_used = Some(now);
            }
        }
    }

    /// Swap in an impersonated identity, saving the current one on first
    /// entry. A further impersonation without an intervening exit must not
    /// overwrite the saved original, so the slot is written only when empty.
    pub(crate) fn begin_impersonation(&mut self, credentials: CredentialPair, identity: Identity) {
        if self.impersonation.is_none() {
            if let (Some(identity), Some(credentials)) =
                (self.identity.take(), self.credentials.take())
            {
                self.impersonation = Some(ImpersonationSlot {
                    identity,
                    credentials,
                });
            }
        }
        self.credentials = Some(credentials);
        self.identity = Some(identity);
    }

    /// Restore the identity saved before impersonation began.
    ///
    /// Calling this while not impersonating is a no-op, not an error.
    pub fn exit_impersonation(&mut self) {
        if let Some(slot) = self.impersonation.take() {
            self.identity = Some(slot.identity);
            self.credentials = Some(slot.credentials);
        }
    }

    /// Drop credentials, identity and any impersonation state. The
    /// environment registry is untouched.
    pub fn logout(&mut self) {
        self.clear_auth();
    }

    fn clear_auth(&mut self) {
        self.credentials = None;
        self.identity = None;
        self.impersonation = None;
    }

    /// Request handle for the active environment without credentials.
    pub fn anonymous_client(&self) -> Result<ApiClient, Error> {
        let env = self.active_environment().ok_or(Error::NoActiveEnvironment)?;
        ApiClient::new(&env.base_url, None)
    }

    /// Request handle for the active environment with the current token.
    pub fn client(&self) -> Result<ApiClient, Error> {
        let env = self.active_environment().ok_or(Error::NoActiveEnvironment)?;
        let token = self.token().ok_or(Error::NotAuthenticated)?;
        ApiClient::new(&env.base_url, Some(token))
    }
}
