//! Caller identity extractor for Axum handlers.
//!
//! Login and session persistence live outside this service; the fronting
//! layer forwards the authenticated username in the `x-user-id` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

/// Header carrying the authenticated username.
pub const OWNER_HEADER: &str = "x-user-id";

/// Maximum accepted username length.
const MAX_OWNER_LEN: usize = 64;

/// The user on whose behalf a request is made.
///
/// ```ignore
/// async fn my_handler(owner: Owner) -> AppResult<Json<()>> {
///     tracing::info!(owner = %owner.0, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(pub String);

impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Unauthorized(format!("Missing {OWNER_HEADER} header")))?;

        // Owners are embedded in task ids, which appear in URL paths.
        let url_safe = raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
        if raw.len() > MAX_OWNER_LEN || !url_safe {
            return Err(AppError::Unauthorized(format!(
                "Invalid {OWNER_HEADER} header"
            )));
        }

        Ok(Owner(raw.to_string()))
    }
}
