pub mod health;
pub mod reports;
pub mod tasks;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /tasks                          list, submit (JSON)
/// /tasks/{id}                     get
/// /tasks/leaf-analysis            submit (multipart form, 303)
/// /tasks/shop-search              submit (url-encoded form, 303)
/// /tasks/doctor-search            submit (url-encoded form, 303)
///
/// /reports                        list
///
/// /agent/status                   get
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/tasks", tasks::router())
        .nest("/reports", reports::router())
        .route("/agent/status", get(handlers::tasks::agent_status))
}
