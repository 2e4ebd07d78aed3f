//! Handlers for the `/reports` resource.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use croplens_core::extract::extract_json;
use croplens_core::task::Report;

use crate::error::AppResult;
use crate::middleware::owner::Owner;
use crate::response::DataResponse;
use crate::state::AppState;

/// A report plus any JSON recovered from its content.
#[derive(Debug, Serialize)]
pub struct ReportView {
    #[serde(flatten)]
    pub report: Report,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured: Option<serde_json::Value>,
}

impl From<Report> for ReportView {
    fn from(report: Report) -> Self {
        let structured = extract_json(&report.content);
        Self { report, structured }
    }
}

/// GET /api/v1/reports
///
/// The caller's reports, most recently completed first. Unknown users
/// simply get an empty list.
pub async fn list_reports(
    owner: Owner,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let reports: Vec<ReportView> = state
        .registry
        .list_reports(&owner.0)
        .await
        .into_iter()
        .map(ReportView::from)
        .collect();

    Ok(Json(DataResponse { data: reports }))
}
