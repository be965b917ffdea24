use crate::auth::auth::AuthUser;
use crate::error::LeaveError;
use crate::model::notification::StoredNotification;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::debug;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
pub struct NotificationQuery {
    /// Only unread notifications
    pub unread: Option<bool>,
    /// Maximum rows returned (default 50)
    pub limit: Option<u32>,
}

/// The caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notifications", body = [StoredNotification]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn list_notifications(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<NotificationQuery>,
) -> actix_web::Result<impl Responder> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let unread_only = if query.unread.unwrap_or(false) {
        " AND is_read = FALSE"
    } else {
        ""
    };

    let sql = format!(
        "SELECT id, user_id, title, message, kind, is_read, related_entity_id, created_at \
         FROM notifications WHERE tenant_id = ? AND user_id = ?{unread_only} \
         ORDER BY created_at DESC, id DESC LIMIT ?"
    );
    let rows = sqlx::query_as::<_, StoredNotification>(&sql)
        .bind(auth.tenant)
        .bind(auth.employee_id)
        .bind(limit)
        .fetch_all(pool.get_ref())
        .await
        .map_err(LeaveError::from)?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Mark one notification as read
#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    params(("id" = u64, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Marked as read"),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn mark_read(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let exists = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE tenant_id = ? AND user_id = ? AND id = ?",
    )
    .bind(auth.tenant)
    .bind(auth.employee_id)
    .bind(id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(LeaveError::from)?;
    if exists == 0 {
        return Err(LeaveError::not_found("Notification").into());
    }

    sqlx::query("UPDATE notifications SET is_read = TRUE WHERE tenant_id = ? AND id = ?")
        .bind(auth.tenant)
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(LeaveError::from)?;

    Ok(HttpResponse::NoContent().finish())
}

/// Mark all of the caller's notifications as read
#[utoipa::path(
    put,
    path = "/api/notifications/read-all",
    responses((status = 204, description = "All marked as read")),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn mark_all_read(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = TRUE \
         WHERE tenant_id = ? AND user_id = ? AND is_read = FALSE",
    )
    .bind(auth.tenant)
    .bind(auth.employee_id)
    .execute(pool.get_ref())
    .await
    .map_err(LeaveError::from)?;

    debug!(user_id = auth.employee_id, updated = result.rows_affected(), "Notifications read");
    Ok(HttpResponse::NoContent().finish())
}
