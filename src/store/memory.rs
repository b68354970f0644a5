//! In-memory task store (non-persistent).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{now_string, Task, TaskData, TaskStats, TaskStatus, TaskStore};

#[derive(Clone)]
pub struct InMemoryTaskStore {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    tasks: HashMap<i64, Task>,
    // Monotonic; never reset, so deleted ids are never reused.
    next_id: i64,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                tasks: HashMap::new(),
                next_id: 1,
            })),
        }
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn list(&self) -> Result<Vec<Task>, String> {
        let inner = self.inner.read().await;
        let mut tasks: Vec<Task> = inner.tasks.values().cloned().collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tasks)
    }

    async fn get(&self, id: i64) -> Result<Option<Task>, String> {
        Ok(self.inner.read().await.tasks.get(&id).cloned())
    }

    async fn create(&self, data: &TaskData) -> Result<Task, String> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let now = now_string();
        let task = Task {
            id,
            title: data.title.clone(),
            description: data.description.clone(),
            status: data.status,
            due_date: data.due_date,
            created_at: now.clone(),
            updated_at: now,
        };
        inner.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn update(&self, id: i64, data: &TaskData) -> Result<bool, String> {
        let mut inner = self.inner.write().await;
        match inner.tasks.get_mut(&id) {
            Some(task) => {
                task.title = data.title.clone();
                task.description = data.description.clone();
                task.status = data.status;
                task.due_date = data.due_date;
                task.updated_at = now_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, String> {
        Ok(self.inner.write().await.tasks.remove(&id).is_some())
    }

    async fn stats(&self) -> Result<TaskStats, String> {
        let inner = self.inner.read().await;
        let mut stats = TaskStats::default();
        for task in inner.tasks.values() {
            stats.total += 1;
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => stats.completed += 1,
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_data(title: &str, status: TaskStatus) -> TaskData {
        TaskData {
            title: title.to_string(),
            description: String::new(),
            status,
            due_date: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids_and_equal_timestamps() {
        let store = InMemoryTaskStore::new();
        let a = store
            .create(&sample_data("First", TaskStatus::Pending))
            .await
            .unwrap();
        let b = store
            .create(&sample_data("Second", TaskStatus::Pending))
            .await
            .unwrap();

        assert!(b.id > a.id);
        assert_eq!(a.created_at, a.updated_at);
    }

    #[tokio::test]
    async fn ids_are_never_reused_after_delete() {
        let store = InMemoryTaskStore::new();
        let a = store
            .create(&sample_data("First", TaskStatus::Pending))
            .await
            .unwrap();
        assert!(store.delete(a.id).await.unwrap());

        let b = store
            .create(&sample_data("Second", TaskStatus::Pending))
            .await
            .unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_id() {
        let store = InMemoryTaskStore::new();
        assert!(store.get(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_replaces_fields_but_keeps_id_and_created_at() {
        let store = InMemoryTaskStore::new();
        let task = store
            .create(&sample_data("Original", TaskStatus::Pending))
            .await
            .unwrap();

        let updated_data = TaskData {
            title: "Replaced".to_string(),
            description: "now with text".to_string(),
            status: TaskStatus::Completed,
            due_date: NaiveDate::from_ymd_opt(2030, 1, 1),
        };
        assert!(store.update(task.id, &updated_data).await.unwrap());

        let updated = store.get(task.id).await.unwrap().unwrap();
        assert_eq!(updated.id, task.id);
        assert_eq!(updated.created_at, task.created_at);
        assert_eq!(updated.title, "Replaced");
        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.due_date, NaiveDate::from_ymd_opt(2030, 1, 1));
    }

    #[tokio::test]
    async fn update_and_delete_report_unknown_ids() {
        let store = InMemoryTaskStore::new();
        assert!(!store
            .update(7, &sample_data("x", TaskStatus::Pending))
            .await
            .unwrap());
        assert!(!store.delete(7).await.unwrap());
    }

    #[tokio::test]
    async fn stats_counts_by_status() {
        let store = InMemoryTaskStore::new();
        store
            .create(&sample_data("a", TaskStatus::Pending))
            .await
            .unwrap();
        store
            .create(&sample_data("b", TaskStatus::Pending))
            .await
            .unwrap();
        store
            .create(&sample_data("c", TaskStatus::InProgress))
            .await
            .unwrap();
        store
            .create(&sample_data("d", TaskStatus::Completed))
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.completed, 1);
    }
}
