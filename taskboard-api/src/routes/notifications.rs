/// Notification endpoints
///
/// # Endpoints
///
/// - `GET /v1/notifications` - The caller's feed, filtered, with the unread count
/// - `POST /v1/notifications/read-all` - Mark the whole feed read
/// - `POST /v1/notifications/:id/read` - Mark one notification read
/// - `DELETE /v1/notifications/:id` - Delete one notification
///
/// Another user's notification answers 404, the same as a missing one.

use crate::{
    app::AppState,
    error::{found, items, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::notification::Notification,
    views::{filter_notifications, unread_count, NotificationQuery},
};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    /// Notifications passing the query, newest first
    pub notifications: Vec<Notification>,

    /// Unread notifications in the whole feed, before filtering
    pub unread_count: usize,
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

/// The caller's notifications
///
/// # Endpoint
///
/// ```text
/// GET /v1/notifications?search=deadline&type=task&tab=unread
/// Authorization: Bearer <token>
/// ```
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<Json<NotificationsResponse>> {
    let all = items(state.access.get_notifications(&auth).await)?;

    Ok(Json(NotificationsResponse {
        notifications: filter_notifications(&all, &query),
        unread_count: unread_count(&all),
    }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Notification>> {
    let notification = found(
        state.access.mark_notification_read(&auth, id).await,
        "Notification",
    )?;

    Ok(Json(notification))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<MarkAllReadResponse>> {
    let updated = found(
        state.access.mark_all_notifications_read(&auth).await,
        "Notification",
    )?;

    Ok(Json(MarkAllReadResponse { updated }))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    found(
        state.access.delete_notification(&auth, id).await,
        "Notification",
    )?;

    Ok(StatusCode::NO_CONTENT)
}
