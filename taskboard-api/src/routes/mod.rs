/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Sign-up, sign-in, sessions and the caller's profile
/// - `projects`: Projects and their members
/// - `tasks`: Project tasks and the caller's task list
/// - `notifications`: The caller's notification feed
/// - `team`: Team directory

pub mod auth;
pub mod health;
pub mod notifications;
pub mod projects;
pub mod tasks;
pub mod team;
