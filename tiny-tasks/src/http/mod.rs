//! HTTP surface: health check plus task CRUD.

mod middleware;
mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::service::TaskService;

pub fn build_router(service: Arc<TaskService>) -> Router {
    Router::new()
        .route("/healthz", get(routes::healthz))
        .route("/tasks", post(routes::create_task).get(routes::list_tasks))
        .route(
            "/tasks/{id}",
            get(routes::get_task)
                .patch(routes::patch_task)
                .delete(routes::delete_task),
        )
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(middleware::request_id))
        .layer(axum::middleware::from_fn(middleware::log_request))
        .with_state(service)
}
