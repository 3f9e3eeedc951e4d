//! Pure filter predicates for task, project and team lists
//!
//! Nothing here reads a clock: callers pass `today` explicitly so the same
//! inputs always select the same rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::project::ProjectDetails;
use crate::models::task::{Task, TaskPriority, TaskStatus};
use crate::models::team_member::TeamMember;

/// Tabs of the task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskTab {
    #[default]
    All,
    DueToday,
    InProgress,
    Overdue,
}

/// Task list filter; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskQuery {
    #[serde(default)]
    pub search: Option<String>,

    #[serde(default)]
    pub status: Option<TaskStatus>,

    #[serde(default)]
    pub priority: Option<TaskPriority>,

    #[serde(default)]
    pub tab: TaskTab,
}

impl TaskQuery {
    /// Whether a single task passes every predicate of the query
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        let search_ok = match self.search.as_deref() {
            Some(needle) => {
                contains_ci(&task.name, needle) || contains_ci(&task.description, needle)
            }
            None => true,
        };

        search_ok
            && self.status.map_or(true, |s| task.status == s)
            && self.priority.map_or(true, |p| task.priority == p)
            && tab_matches(self.tab, task, today)
    }
}

/// A task is overdue when its due date has passed and it is not done
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    task.due_date < today && !task.status.is_done()
}

fn tab_matches(tab: TaskTab, task: &Task, today: NaiveDate) -> bool {
    match tab {
        TaskTab::All => true,
        TaskTab::DueToday => task.due_date == today,
        TaskTab::InProgress => task.status == TaskStatus::InProgress,
        TaskTab::Overdue => is_overdue(task, today),
    }
}

/// Case-insensitive substring match; a blank needle matches everything
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Tasks passing `query`, in their original order
pub fn filter_tasks(tasks: &[Task], query: &TaskQuery, today: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| query.matches(t, today))
        .cloned()
        .collect()
}

/// Projects whose name or description contains `search`
pub fn filter_projects(projects: &[ProjectDetails], search: &str) -> Vec<ProjectDetails> {
    projects
        .iter()
        .filter(|p| contains_ci(&p.project.name, search) || contains_ci(&p.project.description, search))
        .cloned()
        .collect()
}

/// Team members whose full name or role label contains `search`
pub fn filter_team(members: &[TeamMember], search: &str) -> Vec<TeamMember> {
    members
        .iter()
        .filter(|m| contains_ci(&m.user.full_name(), search) || contains_ci(&m.user.role, search))
        .cloned()
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use crate::models::task::{Task, TaskPriority, TaskStatus};

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn task(name: &str, status: TaskStatus, priority: TaskPriority, due: NaiveDate) -> Task {
        Task {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            status,
            priority,
            assignee_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            due_date: due,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
