//! Handlers for the `/tasks` resource and agent status.
//!
//! Every endpoint acts on behalf of the [`Owner`] header. Submission
//! returns immediately; the model pipeline runs in a background worker
//! and callers poll the task until its status is `done`.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use croplens_core::error::CoreError;
use croplens_core::task::{Task, TaskKind, TaskPayload, AGENT_IDLE};

use crate::error::AppResult;
use crate::middleware::owner::Owner;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Path of a task's status view, used for `Location` and redirects.
pub fn task_location(task_id: &str) -> String {
    format!("/api/v1/tasks/{task_id}")
}

/// Fetch a task by ID and verify the caller owns it.
///
/// Returns `NotFound` if the task does not exist, `Forbidden` if it
/// belongs to someone else.
async fn find_and_authorize(state: &AppState, task_id: &str, owner: &Owner) -> AppResult<Task> {
    let task = state.registry.get_status(task_id).await?;

    if task.owner != owner.0 {
        return Err(CoreError::Forbidden("Cannot view another user's task".into()).into());
    }

    Ok(task)
}

/// Validate and submit, shared by the JSON and form endpoints.
pub(crate) async fn submit(
    state: &AppState,
    owner: &Owner,
    kind: TaskKind,
    payload: TaskPayload,
) -> AppResult<Task> {
    payload.validate()?;
    Ok(state.dispatcher.submit(&owner.0, kind, payload).await)
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// Request body for `POST /api/v1/tasks`.
#[derive(Debug, Deserialize)]
pub struct SubmitTask {
    pub kind: TaskKind,
    pub payload: TaskPayload,
}

/// POST /api/v1/tasks
///
/// Submit a background task with a fully formed payload. Returns 202
/// with the running task and a `Location` header pointing at its status.
pub async fn submit_task(
    owner: Owner,
    State(state): State<AppState>,
    Json(input): Json<SubmitTask>,
) -> AppResult<impl IntoResponse> {
    let task = submit(&state, &owner, input.kind, input.payload).await?;
    let location = task_location(&task.id);

    Ok((
        StatusCode::ACCEPTED,
        [(header::LOCATION, location)],
        Json(DataResponse { data: task }),
    ))
}

// ---------------------------------------------------------------------------
// List / Get
// ---------------------------------------------------------------------------

/// GET /api/v1/tasks
///
/// The caller's tasks, most recently submitted first.
pub async fn list_tasks(
    owner: Owner,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let tasks = state.registry.list_tasks(&owner.0).await;
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/tasks/{id}
///
/// Snapshot of one task. 404 if the id was never issued, which lets a
/// client tell "never existed" apart from "still running".
pub async fn get_task(
    owner: Owner,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let task = find_and_authorize(&state, &task_id, &owner).await?;
    Ok(Json(DataResponse { data: task }))
}

// ---------------------------------------------------------------------------
// Agent status
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct AgentStatusResponse {
    pub status: String,
    pub idle: bool,
}

/// GET /api/v1/agent/status
pub async fn agent_status(
    owner: Owner,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let status = state.registry.agent_status(&owner.0).await;
    let idle = status == AGENT_IDLE;
    Ok(Json(DataResponse {
        data: AgentStatusResponse { status, idle },
    }))
}
