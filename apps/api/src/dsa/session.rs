use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::dsa::filter::{Filter, FilterState};
use crate::errors::AppError;
use crate::preferences::favorites::{Favorites, ToggleAction};
use crate::preferences::store::PreferenceStore;
use crate::preferences::sync::{FilterSync, SyncStatus};

/// In-memory sheet state for one user: the current selection, committed favorites,
/// and the debounce task that persists filter changes.
pub struct DsaSession {
    user_id: String,
    state: RwLock<FilterState>,
    favorites: Mutex<Favorites>,
    sync: FilterSync,
    last_access: std::sync::Mutex<Instant>,
}

/// Sessions untouched for this long are evicted, which flushes their pending filter.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const EVICTION_SWEEP: Duration = Duration::from_secs(60);

impl DsaSession {
    /// Seeds the session with one read of the stored filter and favorites.
    /// An absent stored filter leaves the default (empty) selection.
    pub async fn load(
        store: Arc<dyn PreferenceStore>,
        user_id: &str,
        quiet_period: Duration,
    ) -> Result<Self, AppError> {
        let filter = store.get_filters(user_id).await?.unwrap_or_default();
        let favorites = store.get_favorites(user_id).await?;

        info!(
            "Loaded DSA session for user {user_id} ({} favorites, filter empty: {})",
            favorites.len(),
            filter.is_empty()
        );

        Ok(Self {
            user_id: user_id.to_string(),
            state: RwLock::new(FilterState {
                filter,
                ..Default::default()
            }),
            favorites: Mutex::new(Favorites::new(favorites)),
            sync: FilterSync::spawn(store, user_id.to_string(), quiet_period),
            last_access: std::sync::Mutex::new(Instant::now()),
        })
    }

    fn touch(&self) {
        if let Ok(mut last) = self.last_access.lock() {
            *last = Instant::now();
        }
    }

    fn idle_for(&self) -> Duration {
        self.last_access
            .lock()
            .map(|last| last.elapsed())
            .unwrap_or_default()
    }

    /// Ends the session, waiting for any pending filter write.
    pub async fn close(self) {
        self.sync.close().await;
    }

    pub async fn state(&self) -> FilterState {
        self.state.read().await.clone()
    }

    /// Replaces the filter and schedules a debounced save. Unchanged filters are not re-sent.
    pub async fn set_filter(&self, filter: Filter) {
        let mut state = self.state.write().await;
        if state.filter == filter {
            return;
        }
        state.filter = filter.clone();
        self.sync.schedule(filter);
    }

    pub async fn set_search(&self, search: String) {
        self.state.write().await.search = search;
    }

    pub async fn set_favorites_only(&self, favorites_only: bool) {
        self.state.write().await.favorites_only = favorites_only;
    }

    pub async fn favorites(&self) -> HashSet<String> {
        self.favorites.lock().await.ids().clone()
    }

    pub async fn toggle_favorite(
        &self,
        store: &dyn PreferenceStore,
        item_id: &str,
    ) -> Result<ToggleAction, AppError> {
        self.favorites
            .lock()
            .await
            .toggle(store, &self.user_id, item_id)
            .await
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync.status()
    }
}

/// Lazily-populated map of live sessions, shared through `AppState`.
#[derive(Clone)]
pub struct SessionRegistry {
    store: Arc<dyn PreferenceStore>,
    quiet_period: Duration,
    sessions: Arc<Mutex<HashMap<String, Arc<DsaSession>>>>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn PreferenceStore>, quiet_period: Duration) -> Self {
        Self {
            store,
            quiet_period,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &dyn PreferenceStore {
        self.store.as_ref()
    }

    /// Returns the user's session, loading it from the store on first access.
    /// A failed load is not cached, so the next request retries.
    pub async fn get_or_load(&self, user_id: &str) -> Result<Arc<DsaSession>, AppError> {
        if let Some(session) = self.sessions.lock().await.get(user_id) {
            session.touch();
            return Ok(session.clone());
        }

        // Loaded outside the lock; if two requests race, the first insert wins.
        let loaded =
            Arc::new(DsaSession::load(self.store.clone(), user_id, self.quiet_period).await?);
        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(user_id.to_string()).or_insert(loaded);
        session.touch();
        Ok(session.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Removes sessions idle for at least `idle` that no request is holding, and
    /// flushes their pending filters. Returns how many were evicted.
    pub async fn evict_idle(&self, idle: Duration) -> usize {
        let evicted: Vec<Arc<DsaSession>> = {
            let mut sessions = self.sessions.lock().await;
            let stale: Vec<String> = sessions
                .iter()
                .filter(|(_, s)| Arc::strong_count(s) == 1 && s.idle_for() >= idle)
                .map(|(id, _)| id.clone())
                .collect();
            stale
                .iter()
                .filter_map(|id| sessions.remove(id))
                .collect()
        };

        let count = evicted.len();
        for session in evicted {
            close_session(session).await;
        }
        if count > 0 {
            debug!("Evicted {count} idle DSA sessions");
        }
        count
    }

    /// Empties the registry, flushing every pending filter. Used at shutdown.
    pub async fn drain(&self) {
        let sessions: Vec<Arc<DsaSession>> =
            self.sessions.lock().await.drain().map(|(_, s)| s).collect();
        info!("Flushing {} DSA sessions", sessions.len());
        for session in sessions {
            close_session(session).await;
        }
    }

    /// Periodically evicts sessions idle longer than `idle`.
    pub fn spawn_eviction(&self, idle: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(EVICTION_SWEEP.min(idle));
            loop {
                ticker.tick().await;
                registry.evict_idle(idle).await;
            }
        })
    }
}

/// Closes the session when this is the last handle; otherwise the remaining holder's
/// drop flushes it.
async fn close_session(session: Arc<DsaSession>) {
    if let Ok(session) = Arc::try_unwrap(session) {
        session.close().await;
    }
}
