//! Route definitions for the `/tasks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{forms, tasks};
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /                  -> list_tasks
/// POST   /                  -> submit_task
/// GET    /{id}              -> get_task
/// POST   /leaf-analysis     -> submit_leaf_analysis
/// POST   /shop-search       -> submit_shop_search
/// POST   /doctor-search     -> submit_doctor_search
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list_tasks).post(tasks::submit_task))
        .route("/{id}", get(tasks::get_task))
        .route("/leaf-analysis", post(forms::submit_leaf_analysis))
        .route("/shop-search", post(forms::submit_shop_search))
        .route("/doctor-search", post(forms::submit_doctor_search))
}
