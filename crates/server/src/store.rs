use chrono::{DateTime, Duration, Utc};
use idscan_core::{FieldUpdate, MergePolicy, Session, SessionId, Stage};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Unknown or expired session: {0}")]
    UnknownSession(SessionId),
}

/// In-memory capture sessions keyed by id, with idle expiry.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
    ttl: Duration,
    policy: MergePolicy,
}

impl SessionStore {
    pub fn new(ttl: Duration, policy: MergePolicy) -> Self {
        Self { sessions: Arc::new(Mutex::new(HashMap::new())), ttl, policy }
    }

    /// Merge a stage's output. Without an id a new session is opened; an unknown id is
    /// only accepted by a stage that starts a fresh document.
    pub async fn submit(
        &self,
        id: Option<SessionId>,
        stage: Stage,
        update: &FieldUpdate,
    ) -> Result<Session, StoreError> {
        self.submit_at(id, stage, update, Utc::now()).await
    }

    pub async fn submit_at(
        &self,
        id: Option<SessionId>,
        stage: Stage,
        update: &FieldUpdate,
        now: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let mut sessions = self.sessions.lock().await;
        if let Some(id) = id {
            if sessions.get(&id).is_some_and(|s| s.is_expired(self.ttl, now)) {
                sessions.remove(&id);
            }
        }

        let id = match id {
            Some(id) if sessions.contains_key(&id) => id,
            Some(id) if stage.resets_session() => {
                sessions.insert(id, Session::new(id, now));
                id
            }
            Some(id) => return Err(StoreError::UnknownSession(id)),
            None => {
                let id = SessionId::new();
                sessions.insert(id, Session::new(id, now));
                id
            }
        };

        let session = sessions.get_mut(&id).ok_or(StoreError::UnknownSession(id))?;
        session.apply(stage, update, self.policy, now);
        Ok(session.clone())
    }

    /// Whether `id` names a live session.
    pub async fn contains(&self, id: SessionId) -> bool {
        self.get(id).await.is_some()
    }

    pub async fn get(&self, id: SessionId) -> Option<Session> {
        self.get_at(id, Utc::now()).await
    }

    pub async fn get_at(&self, id: SessionId, now: DateTime<Utc>) -> Option<Session> {
        let mut sessions = self.sessions.lock().await;
        if sessions.get(&id)?.is_expired(self.ttl, now) {
            sessions.remove(&id);
            return None;
        }
        sessions.get(&id).cloned()
    }

    /// Drop a session. Returns false when it did not exist.
    pub async fn remove(&self, id: SessionId) -> bool {
        self.sessions.lock().await.remove(&id).is_some()
    }

    /// Drop every expired session; returns how many went.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(self.ttl, now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
