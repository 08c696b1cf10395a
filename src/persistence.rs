//! Persistence strategies - keep the user logged in across requests.
//!
//! [`Persistence`] is the capability set any strategy must implement;
//! [`SessionPersistence`] is the session-store-backed strategy. Further
//! strategies (e.g. token-based, where clients hold a signed token instead
//! of a server-side session) are additional implementations of the same
//! trait, not subclasses.
//!
//! The session strategy writes the user record under [`KEY_USER`] and the
//! HMAC digest of its canonical serialization under [`KEY_VERIFICATION`].
//! Every `is_logged_in` read recomputes the digest over whatever the store
//! currently holds; a mismatch means the record was altered behind this
//! layer's back and the session counts as logged out.

use serde_json::Value;
use tracing::{debug, trace};

use crate::config::{ConfigError, PersistenceConfig};
use crate::record::UserRecord;
use crate::sign::{sign, verify, Secret};
use crate::store::{SessionStore, StoreError};

/// Store key holding the user record.
pub const KEY_USER: &str = "user";
/// Store key holding the verification digest.
pub const KEY_VERIFICATION: &str = "verification";

/// Error types for persistence operations.
///
/// Note what is NOT here: a tampered or missing digest is not an error, it
/// surfaces as `is_logged_in() == false`.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Capability set for remembering a logged-in user across requests.
///
/// Integrity failures and absent session data uniformly degrade to
/// `false`/`None` - callers treat both as the "please authenticate" signal.
/// Store-level failures propagate unmodified.
pub trait Persistence {
    /// Set whether external callers should re-persist user data on each
    /// refresh cycle. Policy flag consumed by collaborators; not enforced
    /// here.
    fn set_update_on_refresh(&mut self, update: bool);

    /// Whether user data should be re-persisted on each refresh cycle.
    fn update_on_refresh(&self) -> bool;

    /// Persist the user record together with its verification digest.
    fn login(&mut self, user: &UserRecord) -> Result<(), PersistenceError>;

    /// Integrity-checked presence test: `Ok(true)` only if a non-empty user
    /// record is stored AND its recomputed digest matches the stored one.
    fn is_logged_in(&self) -> Result<bool, PersistenceError>;

    /// Overwrite the stored record and digest. Replaces, never merges.
    ///
    /// Deliberately permissive: refreshing with no prior login creates a
    /// new logged-in session.
    fn refresh(&mut self, user: &UserRecord) -> Result<(), PersistenceError>;

    /// The stored user record, or `None` if absent/empty.
    ///
    /// **Does NOT verify the digest.** Call [`Persistence::is_logged_in`]
    /// first; `user()` alone can return tampered data.
    fn user(&self) -> Result<Option<UserRecord>, PersistenceError>;

    /// Destroy the store and reinitialize a fresh empty one.
    ///
    /// Returns `Ok(true)` on success; destroy/start failures propagate as
    /// store errors.
    fn logout(&mut self) -> Result<bool, PersistenceError>;
}

/// Session-store-backed persistence strategy.
///
/// Wraps a [`SessionStore`] handle and a signing [`Secret`]; computes and
/// verifies an HMAC-SHA256 digest over the serialized user record on every
/// state change and every read.
pub struct SessionPersistence<S: SessionStore> {
    store: S,
    secret: Secret,
    update_on_refresh: bool,
}

/// A stored value that counts as "no user": absent slot, null, or an empty
/// record.
fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

impl<S: SessionStore> SessionPersistence<S> {
    /// Create the strategy from a store handle and a validated config.
    ///
    /// Activates the store if it is not already active (idempotent: an
    /// already-active store is left alone). Activation failure is fatal.
    pub fn new(store: S, config: PersistenceConfig) -> Result<Self, ConfigError> {
        let mut store = store;
        if !store.is_started() {
            store.start()?;
        }
        let (secret, update_on_refresh) = config.into_parts();
        Ok(Self {
            store,
            secret,
            update_on_refresh,
        })
    }

    /// Get the wrapped store handle.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Shared write path for `login` and `refresh`: record under
    /// [`KEY_USER`], digest under [`KEY_VERIFICATION`].
    fn write_signed(&mut self, user: &UserRecord) -> Result<(), PersistenceError> {
        let payload = user.canonical_bytes()?;
        let digest = sign(&self.secret, &payload);
        self.store.set(KEY_USER, serde_json::to_value(user)?)?;
        self.store.set(KEY_VERIFICATION, Value::String(digest))?;
        Ok(())
    }
}

impl<S: SessionStore> Persistence for SessionPersistence<S> {
    fn set_update_on_refresh(&mut self, update: bool) {
        self.update_on_refresh = update;
    }

    fn update_on_refresh(&self) -> bool {
        self.update_on_refresh
    }

    fn login(&mut self, user: &UserRecord) -> Result<(), PersistenceError> {
        debug!(fields = user.len(), "persisting signed user record");
        self.write_signed(user)
    }

    fn is_logged_in(&self) -> Result<bool, PersistenceError> {
        let Some(user) = self.store.get(KEY_USER)? else {
            return Ok(false);
        };
        if is_absent(&user) {
            return Ok(false);
        }

        // Recompute over what the store actually holds, not what was
        // originally written
        let payload = serde_json::to_vec(&user)?;

        let Some(Value::String(stored_digest)) = self.store.get(KEY_VERIFICATION)? else {
            trace!("user record present but verification digest missing");
            return Ok(false);
        };

        let valid = verify(&self.secret, &payload, &stored_digest);
        if !valid {
            trace!("verification digest mismatch, treating session as logged out");
        }
        Ok(valid)
    }

    fn refresh(&mut self, user: &UserRecord) -> Result<(), PersistenceError> {
        debug!(fields = user.len(), "refreshing signed user record");
        self.write_signed(user)
    }

    fn user(&self) -> Result<Option<UserRecord>, PersistenceError> {
        match self.store.get(KEY_USER)? {
            Some(value) if !is_absent(&value) => Ok(Some(serde_json::from_value(value)?)),
            _ => Ok(None),
        }
    }

    fn logout(&mut self) -> Result<bool, PersistenceError> {
        debug!("destroying session and reinitializing store");
        self.store.destroy()?;
        self.store.start()?;
        Ok(true)
    }
}

// ============================================================
// TESTS
// ============================================================
