use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnection, PgPoolOptions};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use crate::models::{EventEntity, NewEvent};
use crate::store::{EventStore, EventTransaction};
use crate::utils::{AppError, AppResult};

const EVENT_COLUMNS: &str =
    "id, title, description, start_instant, end_instant, location, created_at, updated_at";

#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!().run(&self.pool).await?;
        info!("Migrations completed");
        Ok(())
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn begin(&self) -> AppResult<Box<dyn EventTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgEventTransaction { tx: Some(tx) }))
    }
}

struct PgEventTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgEventTransaction {
    fn conn(&mut self) -> AppResult<&mut PgConnection> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| AppError::InternalServerError("transaction already committed".into()))
    }
}

#[async_trait]
impl EventTransaction for PgEventTransaction {
    async fn find_all(&mut self) -> AppResult<Vec<EventEntity>> {
        let rows = sqlx::query_as::<_, EventEntity>(&format!(
            "SELECT {EVENT_COLUMNS} FROM event ORDER BY id"
        ))
        .fetch_all(self.conn()?)
        .await?;

        Ok(rows)
    }

    async fn find_by_id(&mut self, id: i64) -> AppResult<Option<EventEntity>> {
        // Row lock keeps a concurrent delete from slipping between read and write
        let row = sqlx::query_as::<_, EventEntity>(&format!(
            "SELECT {EVENT_COLUMNS} FROM event WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(self.conn()?)
        .await?;

        Ok(row)
    }

    async fn insert(&mut self, event: NewEvent) -> AppResult<EventEntity> {
        let row = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            INSERT INTO event (title, description, start_instant, end_instant, location)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_instant)
        .bind(event.end_instant)
        .bind(&event.location)
        .fetch_one(self.conn()?)
        .await?;

        Ok(row)
    }

    async fn save(&mut self, event: &EventEntity) -> AppResult<EventEntity> {
        let row = sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            UPDATE event
            SET title = $2,
                description = $3,
                start_instant = $4,
                end_instant = $5,
                location = $6,
                updated_at = now()
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_instant)
        .bind(event.end_instant)
        .bind(&event.location)
        .fetch_optional(self.conn()?)
        .await?;

        row.ok_or(AppError::NotFound(event.id))
    }

    async fn delete(&mut self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM event WHERE id = $1")
            .bind(id)
            .execute(self.conn()?)
            .await?;

        Ok(())
    }

    async fn commit(&mut self) -> AppResult<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| AppError::InternalServerError("transaction already committed".into()))?;
        tx.commit().await?;
        Ok(())
    }
}
