use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::{EventEntity, NewEvent};
use crate::store::{EventStore, EventTransaction};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Default, Clone)]
struct MemoryState {
    next_id: i64,
    events: BTreeMap<i64, EventEntity>,
}

/// Process-local store. Transactions are serialized by a single lock and
/// work on a staged copy that replaces the shared state on commit.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.events.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Copy of everything currently committed.
    pub async fn snapshot(&self) -> Vec<EventEntity> {
        self.state.lock().await.events.values().cloned().collect()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn begin(&self) -> AppResult<Box<dyn EventTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTransaction {
            guard,
            staged: Some(staged),
        }))
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    staged: Option<MemoryState>,
}

impl MemoryTransaction {
    fn staged(&mut self) -> AppResult<&mut MemoryState> {
        self.staged
            .as_mut()
            .ok_or_else(|| AppError::InternalServerError("transaction already committed".into()))
    }
}

#[async_trait]
impl EventTransaction for MemoryTransaction {
    async fn find_all(&mut self) -> AppResult<Vec<EventEntity>> {
        Ok(self.staged()?.events.values().cloned().collect())
    }

    async fn find_by_id(&mut self, id: i64) -> AppResult<Option<EventEntity>> {
        Ok(self.staged()?.events.get(&id).cloned())
    }

    async fn insert(&mut self, event: NewEvent) -> AppResult<EventEntity> {
        let state = self.staged()?;
        state.next_id += 1;
        let now = Utc::now();
        let entity = EventEntity {
            id: state.next_id,
            title: event.title,
            description: event.description,
            start_instant: event.start_instant,
            end_instant: event.end_instant,
            location: event.location,
            created_at: now,
            updated_at: now,
        };
        state.events.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn save(&mut self, event: &EventEntity) -> AppResult<EventEntity> {
        let state = self.staged()?;
        let stored = state
            .events
            .get_mut(&event.id)
            .ok_or(AppError::NotFound(event.id))?;

        stored.title = event.title.clone();
        stored.description = event.description.clone();
        stored.start_instant = event.start_instant;
        stored.end_instant = event.end_instant;
        stored.location = event.location.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&mut self, id: i64) -> AppResult<()> {
        self.staged()?.events.remove(&id);
        Ok(())
    }

    async fn commit(&mut self) -> AppResult<()> {
        let staged = self
            .staged
            .take()
            .ok_or_else(|| AppError::InternalServerError("transaction already committed".into()))?;
        *self.guard = staged;
        Ok(())
    }
}
