//! Event persistence.
//!
//! Every service operation runs inside one [`EventTransaction`]. Dropping a
//! transaction without calling [`EventTransaction::commit`] discards its
//! changes.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::{EventEntity, NewEvent};
use crate::utils::AppResult;

pub use memory::InMemoryEventStore;
pub use postgres::PgEventStore;

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn EventTransaction>>;
}

#[async_trait]
pub trait EventTransaction: Send {
    /// All events in insertion order.
    async fn find_all(&mut self) -> AppResult<Vec<EventEntity>>;

    async fn find_by_id(&mut self, id: i64) -> AppResult<Option<EventEntity>>;

    /// Assigns `id`, `created_at` and `updated_at`.
    async fn insert(&mut self, event: NewEvent) -> AppResult<EventEntity>;

    /// Persists the editable fields of an existing event and refreshes
    /// `updated_at`.
    async fn save(&mut self, event: &EventEntity) -> AppResult<EventEntity>;

    async fn delete(&mut self, id: i64) -> AppResult<()>;

    async fn commit(&mut self) -> AppResult<()>;
}
