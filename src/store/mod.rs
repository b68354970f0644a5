//! Task storage with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `sqlite`: SQLite database (default)
//!
//! Every write goes through parameter binding; no SQL is ever built by
//! string interpolation.

mod memory;
mod sqlite;

pub use memory::InMemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// The three legal statuses, in display order.
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(()),
        }
    }
}

/// A persisted task row.
///
/// `title` and `description` hold the sanitized (escaped) form produced by
/// validation; they are emitted into markup verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    /// RFC3339, set once at creation.
    pub created_at: String,
    /// RFC3339, refreshed on every successful update.
    pub updated_at: String,
}

impl Task {
    /// Whether this task should be flagged overdue in the list view: due
    /// strictly before `today` and not yet completed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => due < today && self.status != TaskStatus::Completed,
            None => false,
        }
    }
}

/// The validated, sanitized field set handed to the store on create/update.
#[derive(Debug, Clone)]
pub struct TaskData {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
}

/// Per-status task counts for the list view and the stats endpoint.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TaskStats {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
}

/// Get current timestamp as RFC3339 string.
pub fn now_string() -> String {
    Utc::now().to_rfc3339()
}

/// Task store trait - implemented by all storage backends.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// List all tasks, newest first.
    async fn list(&self) -> Result<Vec<Task>, String>;

    /// Get a single task by id.
    async fn get(&self, id: i64) -> Result<Option<Task>, String>;

    /// Create a task; the store assigns the id and both timestamps.
    async fn create(&self, data: &TaskData) -> Result<Task, String>;

    /// Replace title/description/status/due_date of an existing task and
    /// refresh `updated_at`. Returns `false` when the id is unknown.
    async fn update(&self, id: i64, data: &TaskData) -> Result<bool, String>;

    /// Hard-delete a task. Returns `false` when the id is unknown.
    async fn delete(&self, id: i64) -> Result<bool, String>;

    /// Counts grouped by status.
    async fn stats(&self) -> Result<TaskStats, String>;
}

/// Task store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStoreType {
    Memory,
    #[default]
    Sqlite,
}

impl TaskStoreType {
    /// Parse from environment variable value.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" => Self::Memory,
            "sqlite" | "db" => Self::Sqlite,
            _ => Self::default(),
        }
    }
}

/// Create a task store based on type and configuration.
pub async fn create_task_store(
    store_type: TaskStoreType,
    database_path: PathBuf,
) -> Result<Box<dyn TaskStore>, String> {
    match store_type {
        TaskStoreType::Memory => Ok(Box::new(InMemoryTaskStore::new())),
        TaskStoreType::Sqlite => {
            let store = SqliteTaskStore::new(database_path).await?;
            Ok(Box::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(status));
        }
        assert!("archived".parse::<TaskStatus>().is_err());
        assert!("Pending".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn store_type_parses_env_values() {
        assert_eq!(TaskStoreType::parse("memory"), TaskStoreType::Memory);
        assert_eq!(TaskStoreType::parse("SQLITE"), TaskStoreType::Sqlite);
        assert_eq!(TaskStoreType::parse("db"), TaskStoreType::Sqlite);
        assert_eq!(TaskStoreType::parse("bogus"), TaskStoreType::Sqlite);
    }

    #[test]
    fn overdue_requires_past_date_and_open_status() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let mut task = Task {
            id: 1,
            title: "t".to_string(),
            description: String::new(),
            status: TaskStatus::Pending,
            due_date: NaiveDate::from_ymd_opt(2026, 8, 5),
            created_at: now_string(),
            updated_at: now_string(),
        };
        assert!(task.is_overdue(today));

        task.status = TaskStatus::Completed;
        assert!(!task.is_overdue(today));

        task.status = TaskStatus::InProgress;
        task.due_date = NaiveDate::from_ymd_opt(2026, 8, 6);
        assert!(!task.is_overdue(today));

        task.due_date = None;
        assert!(!task.is_overdue(today));
    }
}
