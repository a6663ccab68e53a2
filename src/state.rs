//! Application state: the lesson catalog, in-memory gamification sessions and
//! preview settings.
//!
//! The catalog is immutable after startup. Sessions live only in process memory,
//! keyed by a v4 UUID; every mutation goes through `gamification::reduce` under
//! the write lock so concurrent requests for one session serialize.
//!
//! The session store is bounded: idle sessions are swept when a new one is
//! created, and at `max_sessions` the least recently touched one is evicted.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::{load_config_from_env, AppConfig, PreviewCfg, SessionCfg};
use crate::gamification::{reduce, Action, GamificationState, Reduced};

#[derive(Clone, Debug)]
pub struct SessionEntry {
    pub progress: GamificationState,
    last_touched: Instant,
}

impl SessionEntry {
    fn new(progress: GamificationState, now: Instant) -> Self {
        Self { progress, last_touched: now }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    pub session_limits: SessionCfg,
    pub preview: PreviewCfg,
}

/// Drop sessions untouched for longer than `ttl`. Returns how many were removed.
fn sweep_idle(sessions: &mut HashMap<String, SessionEntry>, now: Instant, ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, entry| now.saturating_duration_since(entry.last_touched) <= ttl);
    before - sessions.len()
}

/// Evict least recently touched sessions until one more fits under `max`.
fn make_room(sessions: &mut HashMap<String, SessionEntry>, max: usize) -> usize {
    let mut evicted = 0;
    while sessions.len() >= max.max(1) {
        let oldest = sessions
            .iter()
            .min_by_key(|(_, entry)| entry.last_touched)
            .map(|(id, _)| id.clone());
        match oldest {
            Some(id) => {
                sessions.remove(&id);
                evicted += 1;
            }
            None => break,
        }
    }
    evicted
}

impl AppState {
    /// Build state from env: load config (if any), then the catalog.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_config_from_env().unwrap_or_default();
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: AppConfig) -> Self {
        let catalog = Catalog::from_config(&cfg.catalog);
        info!(
            target: "nextmimo_backend",
            lessons = catalog.get_all_lessons().len(),
            synthesize_missing = catalog.synthesize_missing(),
            preview_max_bytes = cfg.preview.max_code_bytes,
            max_sessions = cfg.sessions.max_sessions,
            idle_ttl_secs = cfg.sessions.idle_ttl_secs,
            "AppState initialized"
        );
        Self {
            catalog: Arc::new(catalog),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            session_limits: cfg.sessions,
            preview: cfg.preview,
        }
    }

    fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_limits.idle_ttl_secs)
    }

    pub async fn create_session(&self) -> (String, GamificationState) {
        let id = Uuid::new_v4().to_string();
        let state = GamificationState::default();
        let now = Instant::now();

        let mut sessions = self.sessions.write().await;
        let swept = sweep_idle(&mut sessions, now, self.idle_ttl());
        let evicted = make_room(&mut sessions, self.session_limits.max_sessions);
        sessions.insert(id.clone(), SessionEntry::new(state.clone(), now));
        if swept + evicted > 0 {
            debug!(target: "gamification", swept, evicted, live = sessions.len(), "Sessions reclaimed");
        }
        info!(target: "gamification", session = %id, "Session created");
        (id, state)
    }

    /// Current progress; refreshes the session's idle timer.
    pub async fn session(&self, id: &str) -> Option<GamificationState> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_touched = Instant::now();
        Some(entry.progress.clone())
    }

    /// Reduce `action` into the stored state. `None` when the session is unknown.
    pub async fn apply(&self, id: &str, action: &Action) -> Option<Reduced> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        let reduced = reduce(entry.progress.clone(), action);
        entry.progress = reduced.state.clone();
        entry.last_touched = Instant::now();
        debug!(target: "gamification", session = %id, xp = reduced.state.xp, level = reduced.state.level, events = reduced.events.len(), "Action applied");
        Some(reduced)
    }

    pub async fn remove_session(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!(target: "gamification", session = %id, "Session removed");
        }
        removed
    }
}
