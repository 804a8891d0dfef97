use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::database::models::{Tag, TagPayload};
use crate::handlers::{json_body, path_id};
use crate::middleware::{ApiResult, AuthUser, Created};
use crate::state::SharedState;

/// GET /tags
pub async fn list(State(state): State<SharedState>, Extension(user): Extension<AuthUser>) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(state.repos.tags.list(user.id).await?))
}

/// GET /tags/:id
pub async fn get(
    State(state): State<SharedState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Tag>> {
    let id = path_id(&id)?;
    Ok(Json(state.repos.tags.get(user.id, id).await?))
}

/// POST /tags
pub async fn create(
    State(state): State<SharedState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<TagPayload>, JsonRejection>,
) -> ApiResult<Created<Tag>> {
    let name = json_body(payload)?.into_name()?;
    let tag = state.repos.tags.create(user.id, name).await?;
    Ok(Created::at(format!("/tags/{}", tag.id), tag))
}

/// PUT /tags/:id
pub async fn update(
    State(state): State<SharedState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<TagPayload>, JsonRejection>,
) -> ApiResult<Json<Tag>> {
    let id = path_id(&id)?;
    let name = json_body(payload)?.into_name()?;
    Ok(Json(state.repos.tags.update(user.id, id, name).await?))
}

/// DELETE /tags/:id - the tag is pulled from every note that carried it
pub async fn delete(
    State(state): State<SharedState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = path_id(&id)?;
    let report = state.repos.tags.delete(user.id, id).await?;
    tracing::info!("Deleted tag {}, removed from {} notes", id, report.notes_updated);
    Ok(StatusCode::NO_CONTENT)
}
