use axum::{extract::State, Extension, Json};

use crate::auth::ClaimUser;
use crate::handlers::public::auth::login::TokenResponse;
use crate::middleware::{ApiResult, AuthUser};
use crate::state::SharedState;

/// POST /refresh - trade a still-valid token for a fresh one
pub async fn refresh_post(
    State(state): State<SharedState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<TokenResponse>> {
    let auth_token = state.tokens.issue(ClaimUser::from(&user))?;
    tracing::debug!("Refreshed token for '{}'", user.username);
    Ok(Json(TokenResponse { auth_token }))
}
