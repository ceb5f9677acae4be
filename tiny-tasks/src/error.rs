//! Typed errors for the task service and its in-memory store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task not found")]
    NotFound,
    #[error("title must be at least 3 characters")]
    InvalidTitle,
    #[error("provide at least one field: title or completed")]
    NoFieldsToPatch,
}
