//! Notification feed

use tracing::{debug, warn};
use uuid::Uuid;

use super::{settle, settle_list, AccessError, AccessLayer};
use crate::auth::middleware::AuthContext;
use crate::models::notification::{CreateNotification, Notification};
use crate::outcome::Outcome;

impl AccessLayer {
    /// The caller's notifications, newest first
    pub async fn get_notifications(&self, caller: &AuthContext) -> Outcome<Vec<Notification>> {
        let result: Result<Vec<Notification>, AccessError> = self
            .store
            .list_notifications(caller.user_id)
            .await
            .map_err(Into::into);

        settle_list("get_notifications", caller, result)
    }

    /// Marks one of the caller's notifications read; `Empty` if it isn't theirs
    pub async fn mark_notification_read(
        &self,
        caller: &AuthContext,
        notification_id: Uuid,
    ) -> Outcome<Notification> {
        let result: Result<Option<Notification>, AccessError> = self
            .store
            .mark_notification_read(caller.user_id, notification_id)
            .await
            .map_err(Into::into);

        settle("mark_notification_read", caller, result)
    }

    /// Marks all of the caller's notifications read and returns how many changed
    pub async fn mark_all_notifications_read(&self, caller: &AuthContext) -> Outcome<u64> {
        let result: Result<Option<u64>, AccessError> = self
            .store
            .mark_all_notifications_read(caller.user_id)
            .await
            .map(Some)
            .map_err(Into::into);

        settle("mark_all_notifications_read", caller, result)
    }

    /// Deletes one of the caller's notifications; `Empty` if it isn't theirs
    pub async fn delete_notification(
        &self,
        caller: &AuthContext,
        notification_id: Uuid,
    ) -> Outcome<Notification> {
        let result: Result<Option<Notification>, AccessError> = self
            .store
            .delete_notification(caller.user_id, notification_id)
            .await
            .map_err(Into::into);

        settle("delete_notification", caller, result)
    }

    /// Writes a notification; a failure is logged and does not fail the caller
    pub(super) async fn notify(&self, data: CreateNotification) {
        let user_id = data.user_id;
        let kind = data.kind.as_str();

        match self.store.create_notification(data).await {
            Ok(notification) => {
                debug!(notification_id = %notification.id, %user_id, kind, "Notification created")
            }
            Err(e) => warn!(%user_id, kind, error = %e, "Failed to create notification"),
        }
    }
}
