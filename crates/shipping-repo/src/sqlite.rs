use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use shipping_types::domain::event::{Event, EventQuery, NewEvent, SortOrder};
use shipping_types::domain::platform::PlatformScope;
use shipping_types::ports::event_store::{EventStore, EventStoreError};
use shipping_types::ports::StoreError;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

/// Event log backed by SQLite. Idempotency is enforced by the
/// `UNIQUE (platform_id, env, object_id, type)` constraint.
pub struct SqliteEventStore {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct DbEvent {
    id: String,
    event_type: String,
    object_id: String,
    emitter_id: String,
    metadata_json: String,
    created_date: String,
}

fn db_err(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

impl DbEvent {
    fn into_event(self) -> Result<Event, StoreError> {
        let metadata = serde_json::from_str(&self.metadata_json).map_err(db_err)?;
        let created_date = DateTime::parse_from_rfc3339(&self.created_date)
            .map_err(db_err)?
            .with_timezone(&Utc);
        let id = Uuid::parse_str(&self.id).map_err(db_err)?;
        Ok(Event {
            id,
            event_type: self.event_type,
            object_id: self.object_id,
            emitter_id: self.emitter_id,
            metadata,
            created_date,
        })
    }
}

impl SqliteEventStore {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let ddl = include_str!("../migrations/0001_create_events.sql");
        sqlx::query(ddl).execute(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn query(
        &self,
        scope: &PlatformScope,
        query: &EventQuery,
    ) -> Result<Vec<Event>, StoreError> {
        let sql = match query.order {
            SortOrder::Asc => {
                "SELECT id, type AS event_type, object_id, emitter_id, metadata_json, created_date
                 FROM events WHERE platform_id = ? AND env = ? AND object_id = ? AND type = ?
                 ORDER BY created_date ASC LIMIT ?"
            }
            SortOrder::Desc => {
                "SELECT id, type AS event_type, object_id, emitter_id, metadata_json, created_date
                 FROM events WHERE platform_id = ? AND env = ? AND object_id = ? AND type = ?
                 ORDER BY created_date DESC LIMIT ?"
            }
        };
        let rows: Vec<DbEvent> = sqlx::query_as(sql)
            .bind(&scope.platform_id)
            .bind(scope.env.as_str())
            .bind(&query.object_id)
            .bind(&query.event_type)
            .bind(query.limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter()
            .map(|r| r.into_event())
            .collect::<Result<Vec<_>, _>>()
    }

    async fn create(
        &self,
        scope: &PlatformScope,
        event: NewEvent,
    ) -> Result<Event, EventStoreError> {
        let metadata_json = serde_json::to_string(&event.metadata).map_err(db_err)?;
        let stored = event.into_event();
        let res = sqlx::query(
            "INSERT INTO events (id, platform_id, env, type, object_id, emitter_id, metadata_json, created_date)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (platform_id, env, object_id, type) DO NOTHING",
        )
        .bind(stored.id.to_string())
        .bind(&scope.platform_id)
        .bind(scope.env.as_str())
        .bind(&stored.event_type)
        .bind(&stored.object_id)
        .bind(&stored.emitter_id)
        .bind(metadata_json)
        // fixed-width timestamps keep lexicographic order == chronological order
        .bind(stored.created_date.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(EventStoreError::Conflict {
                object_id: stored.object_id,
                event_type: stored.event_type,
            });
        }
        Ok(stored)
    }
}
