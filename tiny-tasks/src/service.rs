//! Thin orchestration layer between the HTTP handlers and [`TaskStore`]:
//! validates input, then delegates.

use crate::error::TaskError;
use crate::model::Task;
use crate::store::TaskStore;
use crate::validation::validate_title;

pub struct TaskService {
    store: TaskStore,
}

impl TaskService {
    pub fn new(store: TaskStore) -> Self {
        Self { store }
    }

    pub fn create(&self, title: &str) -> Result<Task, TaskError> {
        let valid = validate_title(title)?;
        Ok(self.store.create(&valid))
    }

    pub fn list(&self) -> Vec<Task> {
        self.store.list()
    }

    pub fn get(&self, id: &str) -> Result<Task, TaskError> {
        self.store.get(id)
    }

    pub fn complete(&self, id: &str) -> Result<Task, TaskError> {
        self.store.update(id, None, Some(true))
    }

    pub fn undo(&self, id: &str) -> Result<Task, TaskError> {
        self.store.update(id, None, Some(false))
    }

    pub fn patch(
        &self,
        id: &str,
        title: Option<&str>,
        completed: Option<bool>,
    ) -> Result<Task, TaskError> {
        if title.is_none() && completed.is_none() {
            return Err(TaskError::NoFieldsToPatch);
        }

        let valid_title = title.map(validate_title).transpose()?;
        self.store.update(id, valid_title.as_deref(), completed)
    }

    pub fn delete(&self, id: &str) -> Result<(), TaskError> {
        self.store.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TaskService {
        TaskService::new(TaskStore::new())
    }

    #[test]
    fn create_rejects_short_titles() {
        let svc = service();
        assert!(matches!(svc.create("hi"), Err(TaskError::InvalidTitle)));
    }

    #[test]
    fn patch_with_no_fields_is_an_error() {
        let svc = service();
        let task = svc.create("buy milk").unwrap();
        assert!(matches!(
            svc.patch(&task.id, None, None),
            Err(TaskError::NoFieldsToPatch)
        ));
    }

    #[test]
    fn patch_validates_a_new_title() {
        let svc = service();
        let task = svc.create("buy milk").unwrap();
        assert!(matches!(
            svc.patch(&task.id, Some("a"), None),
            Err(TaskError::InvalidTitle)
        ));
    }

    #[test]
    fn complete_then_undo_round_trips() {
        let svc = service();
        let task = svc.create("buy milk").unwrap();

        let completed = svc.complete(&task.id).unwrap();
        assert!(completed.completed_at.is_some());

        let undone = svc.undo(&task.id).unwrap();
        assert!(undone.completed_at.is_none());
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let svc = service();
        let task = svc.create("buy milk").unwrap();
        svc.delete(&task.id).unwrap();
        assert!(matches!(svc.get(&task.id), Err(TaskError::NotFound)));
    }
}
