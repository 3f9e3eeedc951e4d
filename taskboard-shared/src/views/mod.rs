//! View composition over access-layer results
//!
//! - `filter`: pure search, status, priority and tab predicates
//! - `stats`: task counters
//! - `notifications`: feed filters and read/delete transitions
//! - `state`: list state with loading and error tracking

pub mod filter;
pub mod notifications;
pub mod state;
pub mod stats;

pub use filter::{filter_projects, filter_tasks, filter_team, is_overdue, TaskQuery, TaskTab};
pub use notifications::{
    filter_notifications, unread_count, NotificationListState, NotificationQuery, NotificationTab,
};
pub use state::{ProjectListState, TaskListState, ViewState};
pub use stats::TaskStats;
