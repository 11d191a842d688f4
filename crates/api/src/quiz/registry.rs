//! Live sessions keyed by id, with idle eviction.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use quizline_core::catalog::CatalogSource;
use quizline_core::error::CoreError;
use quizline_core::results::ResultsWriter;
use quizline_core::session::Pacing;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use super::actor::SessionHandle;

struct Entry {
    handle: SessionHandle,
    last_active: Instant,
}

/// Thread-safe via interior `RwLock`; wrapped in `Arc` in the app state.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    catalog: Arc<dyn CatalogSource>,
    results: Arc<dyn ResultsWriter>,
    pacing: Pacing,
}

impl SessionRegistry {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        results: Arc<dyn ResultsWriter>,
        pacing: Pacing,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            catalog,
            results,
            pacing,
        }
    }

    /// Spawn a session in its welcome state.
    pub async fn create(&self) -> SessionHandle {
        let id = Uuid::new_v4();
        let catalog = self.catalog.load_catalog().await;
        let handle = SessionHandle::spawn(
            id,
            catalog,
            Arc::clone(&self.catalog),
            Arc::clone(&self.results),
            self.pacing,
        );
        self.sessions.write().await.insert(
            id,
            Entry {
                handle: handle.clone(),
                last_active: Instant::now(),
            },
        );
        tracing::info!(session_id = %id, "Quiz session created");
        handle
    }

    /// Look up a session and mark it active.
    pub async fn get(&self, id: Uuid) -> Result<SessionHandle, CoreError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(entry) if !entry.handle.is_closed() => {
                entry.last_active = Instant::now();
                Ok(entry.handle.clone())
            }
            _ => {
                sessions.remove(&id);
                Err(CoreError::NotFound {
                    entity: "QuizSession",
                    id: id.to_string(),
                })
            }
        }
    }

    /// Stop and forget a session. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        match self.sessions.write().await.remove(&id) {
            Some(entry) => {
                entry.handle.shutdown();
                true
            }
            None => false,
        }
    }

    /// Stop sessions untouched for longer than `idle`. Returns how many.
    pub async fn evict_idle(&self, idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            let keep = entry.last_active.elapsed() <= idle && !entry.handle.is_closed();
            if !keep {
                entry.handle.shutdown();
            }
            keep
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Stop every session. Used on server shutdown.
    pub async fn shutdown_all(&self) {
        let mut sessions = self.sessions.write().await;
        for (_, entry) in sessions.drain() {
            entry.handle.shutdown();
        }
    }
}
