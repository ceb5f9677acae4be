//! In-memory task store guarded by a single `RwLock`.
//!
//! Intentionally the simplest concurrency model available: no database,
//! no sharding, one lock for the whole map. Fine for a toy service; would
//! need replacing before this ever saw concurrent write contention at
//! scale.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use crate::error::TaskError;
use crate::ids;
use crate::model::Task;

#[derive(Default)]
pub struct TaskStore {
    tasks: RwLock<HashMap<String, Task>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, title: &str) -> Task {
        let now = Utc::now();
        let task = Task {
            id: ids::new_id(),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        };

        let mut tasks = self.tasks.write().unwrap();
        tasks.insert(task.id.clone(), task.clone());
        task
    }

    pub fn list(&self) -> Vec<Task> {
        let tasks = self.tasks.read().unwrap();
        tasks.values().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Result<Task, TaskError> {
        let tasks = self.tasks.read().unwrap();
        tasks.get(id).cloned().ok_or(TaskError::NotFound)
    }

    /// Applies `title` and/or `completed` to the task at `id`. Setting
    /// `completed = Some(true)` sets `completed_at` only if it wasn't
    /// already set (idempotent re-completion); `Some(false)` clears it.
    pub fn update(
        &self,
        id: &str,
        title: Option<&str>,
        completed: Option<bool>,
    ) -> Result<Task, TaskError> {
        let mut tasks = self.tasks.write().unwrap();
        let task = tasks.get_mut(id).ok_or(TaskError::NotFound)?;

        if let Some(title) = title {
            task.title = title.to_string();
        }

        if let Some(completed) = completed {
            if completed {
                if task.completed_at.is_none() {
                    task.completed_at = Some(Utc::now());
                }
            } else {
                task.completed_at = None;
            }
        }

        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    pub fn delete(&self, id: &str) -> Result<(), TaskError> {
        let mut tasks = self.tasks.write().unwrap();
        tasks.remove(id).map(|_| ()).ok_or(TaskError::NotFound)
    }
}
