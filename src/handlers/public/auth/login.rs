use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::ClaimUser;
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::middleware::ApiResult;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub auth_token: String,
}

/// POST /login - exchange credentials for a bearer token
pub async fn login_post(
    State(state): State<SharedState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let request = json_body(payload)?;

    let (username, password) = match (request.username, request.password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => (username, password),
        _ => return Err(ApiError::bad_request("Missing credentials")),
    };

    let user = state.credentials.verify(&username, &password).await?;
    let auth_token = state.tokens.issue(ClaimUser::from(&user))?;

    tracing::info!("User '{}' logged in", user.username);
    Ok(Json(TokenResponse { auth_token }))
}
