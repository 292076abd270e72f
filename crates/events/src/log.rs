//! Where persisted notifications live.
//!
//! [`PgNotificationLog`] writes to the `notifications` table;
//! [`InMemoryNotificationLog`] keeps them in a `Vec` for tests and
//! database-less runs.

use async_trait::async_trait;
use chrono::Utc;
use helios_core::error::CoreError;
use helios_core::types::DbId;
use helios_db::models::notification::{CreateNotification, Notification};
use helios_db::repositories::NotificationRepo;
use helios_db::DbPool;
use tokio::sync::RwLock;

use crate::bus::PlatformEvent;

/// Append-only record of delivered notifications.
#[async_trait]
pub trait NotificationLog: Send + Sync {
    /// Store one event, returning the notification id.
    async fn record(&self, event: &PlatformEvent) -> Result<DbId, CoreError>;

    /// Notifications newest first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Notification>, CoreError>;
}

fn to_create(event: &PlatformEvent) -> CreateNotification {
    CreateNotification {
        event_type: event.event_type.clone(),
        source_entity_type: event.source_entity_type.clone(),
        source_entity_id: event.source_entity_id,
        title: event.title.clone(),
        content: event.content.clone(),
    }
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

pub struct PgNotificationLog {
    pool: DbPool,
}

impl PgNotificationLog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationLog for PgNotificationLog {
    async fn record(&self, event: &PlatformEvent) -> Result<DbId, CoreError> {
        NotificationRepo::create(&self.pool, &to_create(event))
            .await
            .map_err(|e| CoreError::Internal(format!("Database error: {e}")))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Notification>, CoreError> {
        NotificationRepo::list(&self.pool, limit, offset)
            .await
            .map_err(|e| CoreError::Internal(format!("Database error: {e}")))
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryNotificationLog {
    entries: RwLock<Vec<Notification>>,
}

impl InMemoryNotificationLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationLog for InMemoryNotificationLog {
    async fn record(&self, event: &PlatformEvent) -> Result<DbId, CoreError> {
        let input = to_create(event);
        let mut entries = self.entries.write().await;
        let id = entries.len() as DbId + 1;
        entries.push(Notification {
            id,
            event_type: input.event_type,
            source_entity_type: input.source_entity_type,
            source_entity_id: input.source_entity_id,
            title: input.title,
            content: input.content,
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Notification>, CoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .rev()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}
