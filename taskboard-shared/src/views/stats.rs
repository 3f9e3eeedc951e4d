//! Task counters for the my-tasks header and analytics page

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::filter::is_overdue;
use crate::models::task::{Task, TaskPriority, TaskStatus};

/// Counts over a task list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub overdue: usize,

    /// Keyed by wire name, every status present (zero when unused)
    pub by_status: BTreeMap<String, usize>,

    /// Keyed by wire name, every priority present (zero when unused)
    pub by_priority: BTreeMap<String, usize>,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task], today: NaiveDate) -> Self {
        let mut by_status: BTreeMap<String, usize> = TaskStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        let mut by_priority: BTreeMap<String, usize> = TaskPriority::ALL
            .iter()
            .map(|p| (p.as_str().to_string(), 0))
            .collect();

        let mut stats = TaskStats {
            total: tasks.len(),
            ..Default::default()
        };

        for task in tasks {
            *by_status.entry(task.status.as_str().to_string()).or_default() += 1;
            *by_priority.entry(task.priority.as_str().to_string()).or_default() += 1;

            match task.status {
                TaskStatus::Done => stats.completed += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                _ => {}
            }
            if is_overdue(task, today) {
                stats.overdue += 1;
            }
        }

        stats.by_status = by_status;
        stats.by_priority = by_priority;
        stats
    }

    /// Completed share as a rounded percentage
    pub fn completion_rate(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed * 100 + self.total / 2) / self.total) as u8
    }
}
