use crate::error::ApiError;
use crate::models::ViewState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "molar_session";

/// Opaque per-browser session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        use rand::Rng;
        let id: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        Self(id)
    }

    /// Accept a client-supplied id only if it looks like one we issued
    pub fn parse(s: &str) -> Option<Self> {
        (s.len() == 32 && s.bytes().all(|b| b.is_ascii_alphanumeric())).then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only a prefix reaches the logs
        write!(f, "{}…", &self.0[..self.0.len().min(6)])
    }
}

/// Trait for per-session view state storage
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store state under a fresh id
    async fn create(&self, state: ViewState) -> Result<SessionId, ApiError>;

    /// Fetch the state for an id, if the session exists
    async fn load(&self, id: &SessionId) -> Result<Option<ViewState>, ApiError>;

    /// Replace the state for an id
    async fn save(&self, id: &SessionId, state: ViewState) -> Result<(), ApiError>;
}

/// Sessions untouched for this long are dropped
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

struct Entry {
    state: ViewState,
    last_access: Instant,
}

impl Entry {
    fn new(state: ViewState) -> Self {
        Self {
            state,
            last_access: Instant::now(),
        }
    }
}

/// In-memory session storage with idle expiry.
///
/// Expired entries are invisible to `load` and swept whenever a session is
/// created, so the map only grows with concurrently active browsers.
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Entry>>>,
    idle_timeout: Duration,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn is_live(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.last_access) < self.idle_timeout
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, state: ViewState) -> Result<SessionId, ApiError> {
        let id = SessionId::generate();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, entry| self.is_live(entry, now));
        let expired = before - sessions.len();
        if expired > 0 {
            tracing::debug!(expired, "Dropped idle sessions");
        }

        sessions.insert(id.clone(), Entry::new(state));
        tracing::debug!(session = %id, active = sessions.len(), "Created session");
        Ok(id)
    }

    async fn load(&self, id: &SessionId) -> Result<Option<ViewState>, ApiError> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(entry) if self.is_live(entry, now) => {
                entry.last_access = now;
                Ok(Some(entry.state.clone()))
            }
            Some(_) => {
                sessions.remove(id);
                tracing::debug!(session = %id, "Session expired");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn save(&self, id: &SessionId, state: ViewState) -> Result<(), ApiError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(id.clone(), Entry::new(state));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Action, EnhanceParams, PatientRecord};

    #[test]
    fn test_generated_ids_parse() {
        let id = SessionId::generate();
        assert_eq!(SessionId::parse(id.as_str()), Some(id));
    }

    #[test]
    fn test_parse_rejects_foreign_ids() {
        assert!(SessionId::parse("").is_none());
        assert!(SessionId::parse("short").is_none());
        assert!(SessionId::parse(&"x".repeat(31)).is_none());
        assert!(SessionId::parse(&format!("{};", "a".repeat(31))).is_none());
    }

    #[test]
    fn test_display_truncates() {
        let id = SessionId::parse(&"a".repeat(32)).unwrap();
        assert_eq!(id.to_string(), "aaaaaa…");
    }

    #[tokio::test]
    async fn test_create_and_load() {
        let store = InMemorySessionStore::new();
        let id = store
            .create(ViewState::new(EnhanceParams::default(), true))
            .await
            .unwrap();

        let state = store.load(&id).await.unwrap().unwrap();
        assert!(state.credentials_present);
        assert!(state.patient.is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_state() {
        let store = InMemorySessionStore::new();
        let initial = ViewState::default();
        let id = store.create(initial.clone()).await.unwrap();

        let record = PatientRecord::default();
        let updated = initial.apply(Action::PatientSaved(record.clone()));
        store.save(&id, updated).await.unwrap();

        let state = store.load(&id).await.unwrap().unwrap();
        assert_eq!(state.patient, Some(record));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = InMemorySessionStore::new();
        let a = store.create(ViewState::default()).await.unwrap();
        let b = store.create(ViewState::default()).await.unwrap();
        assert_ne!(a, b);

        let state = ViewState::default().apply(Action::PatientSaved(PatientRecord::default()));
        store.save(&a, state).await.unwrap();

        assert!(store.load(&b).await.unwrap().unwrap().patient.is_none());
        assert_eq!(store.session_count().await, 2);
    }

    #[tokio::test]
    async fn test_idle_session_expires() {
        let store = InMemorySessionStore::with_idle_timeout(Duration::from_millis(50));
        let stale = store.create(ViewState::default()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(store.load(&stale).await.unwrap().is_none());
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_sweeps_idle_sessions() {
        let store = InMemorySessionStore::with_idle_timeout(Duration::from_millis(50));
        for _ in 0..10 {
            store.create(ViewState::default()).await.unwrap();
        }
        assert_eq!(store.session_count().await, 10);

        tokio::time::sleep(Duration::from_millis(80)).await;
        let fresh = store.create(ViewState::default()).await.unwrap();
        assert_eq!(store.session_count().await, 1);
        assert!(store.load(&fresh).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_access_keeps_session_alive() {
        let store = InMemorySessionStore::with_idle_timeout(Duration::from_millis(200));
        let id = store.create(ViewState::default()).await.unwrap();

        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(80)).await;
            assert!(store.load(&id).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = InMemorySessionStore::new();
        let id = SessionId::generate();
        assert!(store.load(&id).await.unwrap().is_none());
    }
}
