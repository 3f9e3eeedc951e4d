//! List view state: items, loading flag and last error
//!
//! A load is two steps, [`ViewState::begin_load`] then [`ViewState::finish`],
//! so a caller can hold the state between them (e.g. behind a lock while the
//! fetch runs elsewhere). A second `begin_load` before `finish` is refused.

use std::future::Future;

use crate::access::AccessLayer;
use crate::auth::middleware::AuthContext;
use crate::models::project::ProjectDetails;
use crate::models::task::Task;
use crate::outcome::Outcome;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    pub items: Vec<T>,
    pub loading: bool,

    /// Message of the most recent failed load, cleared by the next success
    pub error: Option<String>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

impl<T> ViewState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a load as started; returns false if one is already running
    pub fn begin_load(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    /// Applies the outcome of a load
    ///
    /// `Ok` replaces the items, `Empty` clears them, `Failed` keeps the
    /// previous items and records the error.
    pub fn finish(&mut self, outcome: Outcome<Vec<T>>) {
        self.loading = false;
        match outcome {
            Outcome::Ok(items) => {
                self.items = items;
                self.error = None;
            }
            Outcome::Empty => {
                self.items.clear();
                self.error = None;
            }
            Outcome::Failed(err) => self.error = Some(err.to_string()),
        }
    }

    /// Runs `fetch` between `begin_load` and `finish`
    ///
    /// Returns false without calling `fetch` if a load is already running.
    pub async fn load<F, Fut>(&mut self, fetch: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome<Vec<T>>>,
    {
        if !self.begin_load() {
            return false;
        }
        let outcome = fetch().await;
        self.finish(outcome);
        true
    }
}

pub type ProjectListState = ViewState<ProjectDetails>;

pub type TaskListState = ViewState<Task>;

impl ProjectListState {
    /// Re-fetches the caller's projects
    pub async fn reload(&mut self, access: &AccessLayer, caller: &AuthContext) -> bool {
        self.load(|| access.get_projects(caller)).await
    }
}

impl TaskListState {
    /// Re-fetches the tasks assigned to the caller
    pub async fn reload(&mut self, access: &AccessLayer, caller: &AuthContext) -> bool {
        self.load(|| access.get_my_tasks(caller)).await
    }
}
