//! Web-form submission endpoints.
//!
//! These build the prompt from form fields, submit the task and answer
//! with `303 See Other` to the task's status view, so a browser form
//! never blocks on the model pipeline.

use axum::extract::{Form, Multipart, State};
use axum::response::Redirect;
use serde::Deserialize;

use croplens_core::prompts::{doctor_search_prompt, shop_search_prompt, LEAF_DESCRIPTION_PROMPT};
use croplens_core::task::{TaskKind, TaskPayload};
use croplens_gateway::image::encode_jpeg_data_uri;

use crate::error::{AppError, AppResult};
use crate::handlers::tasks::{submit, task_location};
use crate::middleware::owner::Owner;
use crate::state::AppState;

/// Shown when the leaf form arrives without a file.
pub const MSG_UPLOAD_REQUIRED: &str = "Please upload an image first.";

// ---------------------------------------------------------------------------
// Leaf analysis (multipart)
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks/leaf-analysis
///
/// Multipart fields: `image` (required, png/jpeg/webp) and `location`
/// (optional). The image is re-encoded to JPEG on a blocking thread.
pub async fn submit_leaf_analysis(
    owner: Owner,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Redirect> {
    let mut image: Option<Vec<u8>> = None;
    let mut location: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !bytes.is_empty() {
                    image = Some(bytes.to_vec());
                }
            }
            "location" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                location = Some(text.trim().to_string()).filter(|l| !l.is_empty());
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    let image = image.ok_or_else(|| AppError::BadRequest(MSG_UPLOAD_REQUIRED.into()))?;

    let data_uri = tokio::task::spawn_blocking(move || encode_jpeg_data_uri(&image))
        .await
        .map_err(|e| AppError::InternalError(format!("Image encoding task failed: {e}")))??;

    let payload = TaskPayload {
        prompt: LEAF_DESCRIPTION_PROMPT.to_string(),
        image: Some(data_uri),
        location,
    };

    let task = submit(&state, &owner, TaskKind::LeafAnalysis, payload).await?;
    Ok(Redirect::to(&task_location(&task.id)))
}

// ---------------------------------------------------------------------------
// Shop search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ShopSearchForm {
    pub crop: String,
    #[serde(default)]
    pub requirement: String,
}

/// POST /api/v1/tasks/shop-search
pub async fn submit_shop_search(
    owner: Owner,
    State(state): State<AppState>,
    Form(form): Form<ShopSearchForm>,
) -> AppResult<Redirect> {
    if form.crop.trim().is_empty() {
        return Err(AppError::BadRequest("Crop name is required".into()));
    }

    let prompt = shop_search_prompt(form.crop.trim(), form.requirement.trim());
    let task = submit(&state, &owner, TaskKind::ShopSearch, TaskPayload::text(prompt)).await?;
    Ok(Redirect::to(&task_location(&task.id)))
}

// ---------------------------------------------------------------------------
// Doctor search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DoctorSearchForm {
    pub location: String,
    #[serde(default)]
    pub crop: Option<String>,
}

/// POST /api/v1/tasks/doctor-search
pub async fn submit_doctor_search(
    owner: Owner,
    State(state): State<AppState>,
    Form(form): Form<DoctorSearchForm>,
) -> AppResult<Redirect> {
    if form.location.trim().is_empty() {
        return Err(AppError::BadRequest("Location is required".into()));
    }

    let prompt = doctor_search_prompt(form.location.trim(), form.crop.as_deref());
    let payload = TaskPayload {
        location: Some(form.location.trim().to_string()),
        ..TaskPayload::text(prompt)
    };
    let task = submit(&state, &owner, TaskKind::DoctorSearch, payload).await?;
    Ok(Redirect::to(&task_location(&task.id)))
}
