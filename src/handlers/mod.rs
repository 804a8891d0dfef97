// Two security tiers:
// Public (no auth) → Protected (JWT auth, owner-scoped)
pub mod protected;
pub mod public;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use uuid::Uuid;

use crate::database::parse_id;
use crate::error::ApiError;

/// Unwrap a JSON body, reporting unparseable input with the API error shape.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// Parse the `:id` path segment.
pub(crate) fn path_id(raw: &str) -> Result<Uuid, ApiError> {
    Ok(parse_id("id", raw)?)
}
