//! Notification feed filtering and local read/delete transitions

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::filter::contains_ci;
use super::state::ViewState;
use crate::access::AccessLayer;
use crate::auth::middleware::AuthContext;
use crate::models::notification::{Notification, NotificationKind};

/// Tabs of the notification feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationTab {
    #[default]
    All,
    Unread,
}

/// Feed filter; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationQuery {
    /// Matched against title and message
    #[serde(default)]
    pub search: Option<String>,

    #[serde(default, rename = "type")]
    pub kind: Option<NotificationKind>,

    #[serde(default)]
    pub tab: NotificationTab,
}

impl NotificationQuery {
    pub fn matches(&self, notification: &Notification) -> bool {
        let search_ok = self.search.as_deref().map_or(true, |needle| {
            contains_ci(&notification.title, needle) || contains_ci(&notification.message, needle)
        });

        let tab_ok = match self.tab {
            NotificationTab::All => true,
            NotificationTab::Unread => !notification.read,
        };

        search_ok && tab_ok && self.kind.map_or(true, |k| notification.kind == k)
    }
}

/// Notifications passing `query`, in their original order
pub fn filter_notifications(
    notifications: &[Notification],
    query: &NotificationQuery,
) -> Vec<Notification> {
    notifications
        .iter()
        .filter(|n| query.matches(n))
        .cloned()
        .collect()
}

pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}

pub type NotificationListState = ViewState<Notification>;

impl NotificationListState {
    /// Re-fetches the caller's feed
    pub async fn reload(&mut self, access: &AccessLayer, caller: &AuthContext) -> bool {
        self.load(|| access.get_notifications(caller)).await
    }

    /// Marks a loaded notification read; false if it isn't loaded
    pub fn mark_read(&mut self, id: Uuid) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }

    /// Marks every loaded notification read; returns how many were unread
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for notification in self.items.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            changed += 1;
        }
        changed
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Notification> {
        let position = self.items.iter().position(|n| n.id == id)?;
        Some(self.items.remove(position))
    }

    pub fn unread_count(&self) -> usize {
        unread_count(&self.items)
    }
}
