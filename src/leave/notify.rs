use async_trait::async_trait;
use chrono::Utc;
use sqlx::MySqlPool;

use crate::error::LeaveError;
use crate::model::notification::Notification;

/// Delivery of user-facing notifications. Callers treat failures as
/// non-fatal: the state change they describe has already been committed.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), LeaveError>;
}

/// Writes notifications into the `notifications` table (the in-app inbox).
#[derive(Clone)]
pub struct SqlNotificationSink {
    pool: MySqlPool,
}

impl SqlNotificationSink {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSink for SqlNotificationSink {
    async fn notify(&self, n: Notification) -> Result<(), LeaveError> {
        sqlx::query(
            r#"
            INSERT INTO notifications
                (tenant_id, user_id, title, message, kind, is_read, related_entity_id, created_at)
            VALUES (?, ?, ?, ?, ?, FALSE, ?, ?)
            "#,
        )
        .bind(n.tenant_id)
        .bind(n.user_id)
        .bind(&n.title)
        .bind(&n.message)
        .bind(n.kind)
        .bind(n.related_entity_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Sends and logs on failure.
pub async fn deliver<N: NotificationSink + ?Sized>(sink: &N, notification: Notification) {
    let user_id = notification.user_id;
    let title = notification.title.clone();
    if let Err(e) = sink.notify(notification).await {
        tracing::warn!(error = %e, user_id, %title, "Failed to deliver notification");
    }
}
