//! SessionStore trait for abstracting the external session facility.
//!
//! The persistence layer works against this contract so it can back onto
//! different session mechanisms:
//! - a cookie-bound server-side store in a host application
//! - in-memory (for testing)
//!
//! The store is an opaque key-value facility with an activation/destruction
//! lifecycle. It has no integrity logic of its own - signing and
//! verification happen one layer up, in [`crate::persistence`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

/// Error types for store operations.
///
/// Backend failures propagate unmodified through every persistence
/// operation - the persistence layer adds no retry or recovery logic.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session store has not been started")]
    NotStarted,
    #[error("session store backend error: {0}")]
    Backend(String),
}

/// Abstract session store operations.
///
/// Implementations tie the store to a client-identifying token (cookie,
/// header, ...); that binding is entirely the implementor's concern.
pub trait SessionStore {
    /// Whether the store is currently active.
    fn is_started(&self) -> bool;

    /// Activate/load the store. Must be idempotent when already active.
    fn start(&mut self) -> Result<(), StoreError>;

    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Upsert `value` under `key`.
    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Invalidate and clear all state for the current session identifier.
    fn destroy(&mut self) -> Result<(), StoreError>;
}

#[derive(Default)]
struct MemoryStoreInner {
    started: bool,
    entries: HashMap<String, Value>,
    start_count: usize,
    destroy_count: usize,
    set_count: usize,
    fail: bool,
}

/// In-memory session store.
///
/// Uses `Rc<RefCell<...>>` so clones share the same underlying state - a
/// test can hold its own handle and observe (or tamper with) what the
/// persistence layer wrote. Carries per-operation counters and a failure
/// switch for exercising lifecycle and error-propagation behavior.
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryStoreInner>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Peek at a stored value without going through the trait (for testing).
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<Value> {
        self.inner.borrow().entries.get(key).cloned()
    }

    /// Number of `start` calls received (for testing idempotence).
    #[must_use]
    pub fn start_count(&self) -> usize {
        self.inner.borrow().start_count
    }

    /// Number of `destroy` calls received.
    #[must_use]
    pub fn destroy_count(&self) -> usize {
        self.inner.borrow().destroy_count
    }

    /// Number of `set` calls received.
    #[must_use]
    pub fn set_count(&self) -> usize {
        self.inner.borrow().set_count
    }

    /// Make every subsequent operation fail (for testing error propagation).
    pub fn set_fail(&self, fail: bool) {
        self.inner.borrow_mut().fail = fail;
    }

    fn check_fail(&self) -> Result<(), StoreError> {
        if self.inner.borrow().fail {
            Err(StoreError::Backend("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl SessionStore for MemoryStore {
    fn is_started(&self) -> bool {
        self.inner.borrow().started
    }

    fn start(&mut self) -> Result<(), StoreError> {
        self.check_fail()?;
        let mut inner = self.inner.borrow_mut();
        inner.start_count += 1;
        // Idempotent: re-starting an active store keeps its entries
        inner.started = true;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.check_fail()?;
        let inner = self.inner.borrow();
        if !inner.started {
            return Err(StoreError::NotStarted);
        }
        Ok(inner.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.check_fail()?;
        let mut inner = self.inner.borrow_mut();
        if !inner.started {
            return Err(StoreError::NotStarted);
        }
        inner.set_count += 1;
        inner.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn destroy(&mut self) -> Result<(), StoreError> {
        self.check_fail()?;
        let mut inner = self.inner.borrow_mut();
        inner.destroy_count += 1;
        inner.entries.clear();
        inner.started = false;
        Ok(())
    }
}
