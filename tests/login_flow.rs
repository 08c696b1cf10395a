//! Integration tests simulating real host-application login workflows.
//!
//! Each "request" constructs a fresh `SessionPersistence` over the same
//! shared store, the way a request-scoped host would rebuild the strategy
//! per request while the session store survives between them.

use signed_session::{
    MemoryStore, Persistence, PersistenceConfig, SessionPersistence, UserRecord,
};

const SECRET: &str = "s3cr3t";

fn make_user(id: i64, name: &str) -> UserRecord {
    let mut user = UserRecord::new();
    user.insert("id", id);
    user.insert("name", name);
    user
}

/// One request's view of the session: a freshly constructed strategy over
/// the shared store.
fn request(store: &MemoryStore) -> SessionPersistence<MemoryStore> {
    let config = PersistenceConfig::new(SECRET).unwrap();
    SessionPersistence::new(store.clone(), config).unwrap()
}

// ============================================================
// LOGIN ACROSS REQUESTS
// ============================================================

mod login_across_requests {
    use super::*;

    #[test]
    fn login_survives_into_next_request() {
        let store = MemoryStore::new();

        // Request 1: authenticate
        let mut auth = request(&store);
        auth.login(&make_user(42, "alice")).unwrap();

        // Request 2: fresh strategy, same store
        let auth = request(&store);
        assert!(auth.is_logged_in().unwrap());
        assert_eq!(auth.user().unwrap(), Some(make_user(42, "alice")));
    }

    #[test]
    fn store_started_once_across_requests() {
        let store = MemoryStore::new();

        let _first = request(&store);
        let _second = request(&store);
        let _third = request(&store);

        // Only the first construction found an inactive store
        assert_eq!(store.start_count(), 1);
    }

    #[test]
    fn no_login_means_logged_out_everywhere() {
        let store = MemoryStore::new();

        let auth = request(&store);
        assert!(!auth.is_logged_in().unwrap());
        assert_eq!(auth.user().unwrap(), None);
    }
}

// ============================================================
// REFRESH CYCLE
// ============================================================

mod refresh_cycle {
    use super::*;

    #[test]
    fn refresh_updates_user_for_later_requests() {
        let store = MemoryStore::new();

        let mut auth = request(&store);
        auth.login(&make_user(42, "alice")).unwrap();

        // Later request re-reads the principal and re-persists it
        let mut auth = request(&store);
        let mut user = auth.user().unwrap().unwrap();
        user.insert("last_seen", 1704067200);
        if auth.update_on_refresh() {
            auth.refresh(&user).unwrap();
        }

        let auth = request(&store);
        assert!(auth.is_logged_in().unwrap());
        let user = auth.user().unwrap().unwrap();
        assert_eq!(user.get("last_seen"), Some(&serde_json::json!(1704067200)));
    }

    #[test]
    fn collaborator_honors_disabled_update_flag() {
        let store = MemoryStore::new();

        let mut auth = request(&store);
        auth.login(&make_user(42, "alice")).unwrap();
        let writes_after_login = store.set_count();

        // A well-behaved collaborator skips re-persisting when disabled
        let mut auth = request(&store);
        auth.set_update_on_refresh(false);
        if auth.update_on_refresh() {
            auth.refresh(&make_user(42, "alice")).unwrap();
        }

        assert_eq!(store.set_count(), writes_after_login);
    }
}

// ============================================================
// LOGOUT
// ============================================================

mod logout {
    use super::*;

    #[test]
    fn logout_logs_out_all_later_requests() {
        let store = MemoryStore::new();

        let mut auth = request(&store);
        auth.login(&make_user(42, "alice")).unwrap();
        assert!(auth.logout().unwrap());

        let auth = request(&store);
        assert!(!auth.is_logged_in().unwrap());
        assert_eq!(auth.user().unwrap(), None);
    }

    #[test]
    fn logout_leaves_store_usable_for_relogin() {
        let store = MemoryStore::new();

        let mut auth = request(&store);
        auth.login(&make_user(42, "alice")).unwrap();
        auth.logout().unwrap();

        // Same request can authenticate a different user right away
        auth.login(&make_user(7, "bob")).unwrap();

        let auth = request(&store);
        assert!(auth.is_logged_in().unwrap());
        assert_eq!(auth.user().unwrap(), Some(make_user(7, "bob")));
    }
}

// ============================================================
// STRATEGY POLYMORPHISM
// ============================================================

mod strategy_polymorphism {
    use super::*;

    /// A host helper written against the trait, not the concrete strategy.
    fn authenticate(auth: &mut impl Persistence, user: &UserRecord) -> bool {
        if auth.login(user).is_err() {
            return false;
        }
        auth.is_logged_in().unwrap_or(false)
    }

    #[test]
    fn host_code_can_be_generic_over_strategy() {
        let store = MemoryStore::new();
        let mut auth = request(&store);

        assert!(authenticate(&mut auth, &make_user(42, "alice")));
    }
}
