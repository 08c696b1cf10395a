//! Persistence configuration
//!
//! Explicit construction contract for a persistence strategy: the required
//! signing secret plus the update-on-refresh policy flag. The store handle
//! is the strategy constructor's other required argument and is passed by
//! value, so "no handle supplied" is unrepresentable.

use crate::sign::Secret;
use crate::store::StoreError;

/// Error types for persistence construction.
///
/// Fatal - construction cannot proceed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("secret key for session signing is empty")]
    EmptySecret,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration for a persistence strategy.
pub struct PersistenceConfig {
    secret: Secret,
    update_on_refresh: bool,
}

impl PersistenceConfig {
    /// Create a config with the required signing secret.
    ///
    /// Rejects an empty secret with [`ConfigError::EmptySecret`].
    /// `update_on_refresh` defaults to `true`.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        Ok(Self {
            secret: Secret::new(secret)?,
            update_on_refresh: true,
        })
    }

    /// Set whether collaborators should re-persist user data on each
    /// refresh cycle.
    #[must_use]
    pub fn with_update_on_refresh(mut self, update: bool) -> Self {
        self.update_on_refresh = update;
        self
    }

    #[must_use]
    pub fn update_on_refresh(&self) -> bool {
        self.update_on_refresh
    }

    pub(crate) fn into_parts(self) -> (Secret, bool) {
        (self.secret, self.update_on_refresh)
    }
}
