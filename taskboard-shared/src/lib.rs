//! # Taskboard Shared Library
//!
//! Domain types, persistence and business logic used by the Taskboard API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `db`: Connection pool and migrations
//! - `store`: Storage trait with Postgres and in-memory backends
//! - `auth`: Password hashing, JWTs, request auth and role checks
//! - `identity`: Sign-up, sign-in and sessions
//! - `access`: Membership-scoped project, task and team operations
//! - `views`: Filtering, stats and list state
//! - `error`, `outcome`: Store errors and the tagged access result

pub mod access;
pub mod auth;
pub mod db;
pub mod error;
pub mod identity;
pub mod models;
pub mod outcome;
pub mod store;
pub mod views;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
