use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::services::seat_setup::SeatSetupSession;

/// Открытые сессии редактора по id зала.
///
/// Одна сессия на зал, одновременное редактирование не поддерживается:
/// при повторной загрузке сессия просто заменяется.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<i64, SeatSetupSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: SeatSetupSession) {
        let screen_id = session.screen_id();
        self.sessions.write().await.insert(screen_id, session);
        info!("Seat setup session opened for screen {}", screen_id);
    }

    pub async fn get(&self, screen_id: i64) -> Option<SeatSetupSession> {
        self.sessions.read().await.get(&screen_id).cloned()
    }

    pub async fn remove(&self, screen_id: i64) -> Option<SeatSetupSession> {
        let removed = self.sessions.write().await.remove(&screen_id);
        if removed.is_some() {
            info!("Seat setup session closed for screen {}", screen_id);
        }
        removed
    }

    /// Применяет синхронное действие к сессии под блокировкой записи.
    /// `None`, если сессия не открыта.
    pub async fn with_session_mut<T>(
        &self,
        screen_id: i64,
        action: impl FnOnce(&mut SeatSetupSession) -> T,
    ) -> Option<T> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(&screen_id).map(action)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
