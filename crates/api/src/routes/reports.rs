//! Route definitions for the `/reports` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::reports;
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// ```text
/// GET    /                  -> list_reports
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(reports::list_reports))
}
