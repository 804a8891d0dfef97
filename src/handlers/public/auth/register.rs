use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{Map, Value};

use crate::auth::Registration;
use crate::database::models::User;
use crate::middleware::{ApiResult, Created};
use crate::state::SharedState;

/// POST /users - create an account
///
/// The body is taken as raw JSON so type errors can be reported per field
/// with a 422 instead of a generic deserialization failure. A missing or
/// unparseable body is treated as `{}` and fails on the first required field.
pub async fn register_post(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Created<User>> {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!("Registration body rejected: {}", rejection.body_text());
            Value::Object(Map::new())
        }
    };
    let registration = Registration::from_json(&body)?;
    let user = state.credentials.register(registration).await?;
    Ok(Created::at(format!("/users/{}", user.id), user))
}
