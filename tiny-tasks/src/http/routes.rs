use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::TaskError;
use crate::query::ListFilters;
use crate::service::TaskService;

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn task_error_response(err: TaskError) -> Response {
    match err {
        TaskError::NotFound => error_response(StatusCode::NOT_FOUND, "task not found"),
        TaskError::InvalidTitle | TaskError::NoFieldsToPatch => {
            error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
    }
}

pub async fn healthz() -> Response {
    Json(json!({ "status": "ok", "time": Utc::now().to_rfc3339() })).into_response()
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    title: String,
}

pub async fn create_task(
    State(service): State<Arc<TaskService>>,
    Json(req): Json<CreateTaskRequest>,
) -> Response {
    match service.create(&req.title) {
        Ok(task) => (StatusCode::CREATED, Json(task)).into_response(),
        Err(e) => task_error_response(e),
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ListTasksResponse {
    count: usize,
    items: Vec<crate::model::Task>,
}

pub async fn list_tasks(
    State(service): State<Arc<TaskService>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let filters = match ListFilters::parse(&params) {
        Ok(f) => f,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, msg),
    };

    let tasks = filters.apply(service.list());
    Json(ListTasksResponse {
        count: tasks.len(),
        items: tasks,
    })
    .into_response()
}

pub async fn get_task(State(service): State<Arc<TaskService>>, Path(id): Path<String>) -> Response {
    match service.get(&id) {
        Ok(task) => Json(task).into_response(),
        Err(e) => task_error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct PatchTaskRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    completed: Option<bool>,
}

pub async fn patch_task(
    State(service): State<Arc<TaskService>>,
    Path(id): Path<String>,
    Json(req): Json<PatchTaskRequest>,
) -> Response {
    match service.patch(&id, req.title.as_deref(), req.completed) {
        Ok(task) => Json(task).into_response(),
        Err(e) => task_error_response(e),
    }
}

pub async fn delete_task(
    State(service): State<Arc<TaskService>>,
    Path(id): Path<String>,
) -> Response {
    match service.delete(&id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => task_error_response(e),
    }
}
