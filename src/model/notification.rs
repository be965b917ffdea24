use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::mysql_text_enum;
use super::tenant::TenantId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

mysql_text_enum!(NotificationKind);

/// Message to deliver to a user's inbox.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub tenant_id: TenantId,
    pub user_id: u64,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub related_entity_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct StoredNotification {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub is_read: bool,
    pub related_entity_id: Option<u64>,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}
