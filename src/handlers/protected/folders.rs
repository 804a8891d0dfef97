use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::database::models::{Folder, FolderPayload};
use crate::handlers::{json_body, path_id};
use crate::middleware::{ApiResult, AuthUser, Created};
use crate::state::SharedState;

/// GET /folders
pub async fn list(State(state): State<SharedState>, Extension(user): Extension<AuthUser>) -> ApiResult<Json<Vec<Folder>>> {
    Ok(Json(state.repos.folders.list(user.id).await?))
}

/// GET /folders/:id
pub async fn get(
    State(state): State<SharedState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Folder>> {
    let id = path_id(&id)?;
    Ok(Json(state.repos.folders.get(user.id, id).await?))
}

/// POST /folders
pub async fn create(
    State(state): State<SharedState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<FolderPayload>, JsonRejection>,
) -> ApiResult<Created<Folder>> {
    let name = json_body(payload)?.into_name()?;
    let folder = state.repos.folders.create(user.id, name).await?;
    Ok(Created::at(format!("/folders/{}", folder.id), folder))
}

/// PUT /folders/:id
pub async fn update(
    State(state): State<SharedState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<FolderPayload>, JsonRejection>,
) -> ApiResult<Json<Folder>> {
    let id = path_id(&id)?;
    let name = json_body(payload)?.into_name()?;
    Ok(Json(state.repos.folders.update(user.id, id, name).await?))
}

/// DELETE /folders/:id - notes in the folder are kept, their folder is cleared
pub async fn delete(
    State(state): State<SharedState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = path_id(&id)?;
    let report = state.repos.folders.delete(user.id, id).await?;
    tracing::info!("Deleted folder {} ({} notes updated)", id, report.notes_updated);
    Ok(StatusCode::NO_CONTENT)
}
