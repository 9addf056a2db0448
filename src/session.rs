//! In-memory session store
//!
//! Sessions are keyed by a random id carried in the `CASGATESESSIONID`
//! cookie. Each session holds a small attribute map; the gate reads the
//! assertion marker from it and stores gateway bookkeeping in it.
//!
//! Locks are recovered when poisoned: a panic in one request must not make
//! the session table unreadable for every other request.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE_NAME: &str = "CASGATESESSIONID";

const SESSION_ID_LEN: usize = 32;

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
struct SessionInner {
    id: String,
    attributes: RwLock<HashMap<String, Value>>,
    last_accessed: RwLock<Instant>,
}

/// Shared handle to one session. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    fn new(id: String) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id,
                attributes: RwLock::new(HashMap::new()),
                last_accessed: RwLock::new(Instant::now()),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Attribute value; JSON `null` is reported as absent
    pub fn attribute(&self, key: &str) -> Option<Value> {
        read_lock(&self.inner.attributes)
            .get(key)
            .filter(|v| !v.is_null())
            .cloned()
    }

    /// Set an attribute, returning the previous value
    pub fn set_attribute(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        write_lock(&self.inner.attributes).insert(key.into(), value)
    }

    pub fn remove_attribute(&self, key: &str) -> Option<Value> {
        write_lock(&self.inner.attributes).remove(key)
    }

    fn touch(&self) {
        *write_lock(&self.inner.last_accessed) = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        read_lock(&self.inner.last_accessed).elapsed()
    }
}

/// Process-wide session table
#[derive(Debug)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Look up a live session. Never creates one.
    ///
    /// Sessions idle for longer than the TTL are removed and reported absent.
    pub fn get(&self, id: &str) -> Option<Session> {
        let session = read_lock(&self.sessions).get(id).cloned()?;

        if session.idle_for() > self.ttl {
            write_lock(&self.sessions).remove(id);
            tracing::debug!(
                event = "session_expired",
                ttl_secs = self.ttl.as_secs(),
                "Session expired and was discarded"
            );
            return None;
        }

        session.touch();
        Some(session)
    }

    /// Create and register a new session with a fresh random id.
    ///
    /// Expired sessions are swept first; clients that never send the cookie
    /// back would otherwise stay in the table forever.
    pub fn create(&self) -> Session {
        let mut sessions = write_lock(&self.sessions);

        let before = sessions.len();
        sessions.retain(|_, session| session.idle_for() <= self.ttl);
        let expired = before - sessions.len();
        if expired > 0 {
            tracing::debug!(
                event = "sessions_expired",
                expired = expired,
                ttl_secs = self.ttl.as_secs(),
                "Discarded expired sessions"
            );
        }

        let id = loop {
            let candidate: String = std::iter::repeat_with(fastrand::alphanumeric)
                .take(SESSION_ID_LEN)
                .collect();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        let session = Session::new(id.clone());
        sessions.insert(id, session.clone());
        tracing::debug!(
            event = "session_created",
            active_sessions = sessions.len(),
            "New session created"
        );
        session
    }

    pub fn len(&self) -> usize {
        read_lock(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_and_get_session() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        let session = store.create();
        assert_eq!(session.id().len(), SESSION_ID_LEN);

        let found = store.get(session.id()).unwrap();
        assert_eq!(found.id(), session.id());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_unknown_session_does_not_create() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        assert!(store.get("missing").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_attributes_are_shared_between_handles() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        let session = store.create();
        session.set_attribute("user", json!("alice"));

        let again = store.get(session.id()).unwrap();
        assert_eq!(again.attribute("user"), Some(json!("alice")));
        assert_eq!(again.remove_attribute("user"), Some(json!("alice")));
        assert!(session.attribute("user").is_none());
    }

    #[test]
    fn test_null_attribute_reads_as_absent() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        let session = store.create();
        session.set_attribute("marker", Value::Null);
        assert!(session.attribute("marker").is_none());
    }

    #[test]
    fn test_expired_session_is_discarded() {
        let store = InMemorySessionStore::new(Duration::ZERO);
        let session = store.create();
        std::thread::sleep(Duration::from_millis(5));
        assert!(store.get(session.id()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_sweeps_expired_sessions() {
        let store = InMemorySessionStore::new(Duration::from_millis(200));
        for _ in 0..100 {
            store.create();
        }
        assert_eq!(store.len(), 100);

        std::thread::sleep(Duration::from_millis(300));
        let fresh = store.create();

        assert_eq!(store.len(), 1);
        assert!(store.get(fresh.id()).is_some());
    }

    #[test]
    fn test_create_keeps_live_sessions() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        let first = store.create();
        let second = store.create();
        assert_eq!(store.len(), 2);
        assert!(store.get(first.id()).is_some());
        assert!(store.get(second.id()).is_some());
    }

    #[test]
    fn test_poisoned_attribute_lock_is_recovered() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        let session = store.create();
        session.set_attribute("k", json!(1));

        let poisoner = session.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.inner.attributes.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert_eq!(session.attribute("k"), Some(json!(1)));
        session.set_attribute("k", json!(2));
        assert_eq!(session.attribute("k"), Some(json!(2)));
    }
}
