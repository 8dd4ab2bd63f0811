use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::scoring::{ScoreSummary, ScoredTable};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One upload and its scored table, isolated from every other session.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub source_name: Option<String>,
    pub table: Arc<ScoredTable>,
}

impl SessionRecord {
    pub fn summary_view(&self) -> SessionSummaryView {
        SessionSummaryView {
            session_id: self.id.clone(),
            created_at: self.created_at,
            source_name: self.source_name.clone(),
            has_coordinates: self.table.has_coordinates(),
            summary: self.table.summary(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummaryView {
    pub session_id: SessionId,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    pub has_coordinates: bool,
    pub summary: ScoreSummary,
}

/// Storage abstraction so the analysis service can be exercised in isolation.
pub trait SessionStore: Send + Sync {
    fn insert(&self, record: SessionRecord) -> Result<(), StoreError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError>;
    fn remove(&self, id: &SessionId) -> Result<bool, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session already exists")]
    Conflict,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Default)]
struct Sessions {
    records: HashMap<SessionId, SessionRecord>,
    order: VecDeque<SessionId>,
}

/// Bounded in-memory store; the oldest session is evicted once full.
pub struct InMemorySessionStore {
    capacity: usize,
    sessions: Mutex<Sessions>,
}

impl InMemorySessionStore {
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            sessions: Mutex::new(Sessions::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .map(|sessions| sessions.records.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Sessions>, StoreError> {
        self.sessions
            .lock()
            .map_err(|_| StoreError::Unavailable("session store lock poisoned".to_string()))
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, record: SessionRecord) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        if guard.records.contains_key(&record.id) {
            return Err(StoreError::Conflict);
        }

        while guard.records.len() >= self.capacity {
            let Some(oldest) = guard.order.pop_front() else {
                break;
            };
            guard.records.remove(&oldest);
            tracing::debug!(session_id = %oldest, "evicted oldest session");
        }

        guard.order.push_back(record.id.clone());
        guard.records.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.records.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<bool, StoreError> {
        let mut guard = self.lock()?;
        let removed = guard.records.remove(id).is_some();
        if removed {
            guard.order.retain(|existing| existing != id);
        }
        Ok(removed)
    }
}
