//! Signed session persistence - keep a user logged in across requests.
//!
//! This crate stores an authenticated user's record in an external session
//! store together with an HMAC-SHA256 digest over its canonical
//! serialization, and re-verifies that digest on every read. A record that
//! was altered behind the crate's back (or whose digest is missing) simply
//! reads as "not logged in" - tamper detection is a boolean state, not an
//! error path.
//!
//! ## Architecture
//!
//! ```text
//! Host application (request handler)
//!     ↓ login/is_logged_in/refresh/user/logout
//! Persistence strategy (SessionPersistence)
//!     ├── canonical JSON serialization of the user record
//!     └── HMAC-SHA256 sign on write, verify on read
//!     ↓ get/set/start/destroy
//! SessionStore backend (cookie-bound store, MemoryStore, ...)
//! ```
//!
//! The session store's binding to a transport (cookies etc.) and its
//! identifier lifecycle are the host's concern; this crate only requires the
//! [`SessionStore`] contract and guarantees the sign-verify-store invariant:
//! whenever a user record is present, a matching digest under the configured
//! secret is present too, else the session counts as logged out.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod persistence;
pub mod record;
pub mod sign;
pub mod store;

pub use config::{ConfigError, PersistenceConfig};
pub use persistence::{
    Persistence, PersistenceError, SessionPersistence, KEY_USER, KEY_VERIFICATION,
};
pub use record::UserRecord;
pub use sign::{sign, verify, Secret};
pub use store::{MemoryStore, SessionStore, StoreError};
