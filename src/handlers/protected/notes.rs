use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::{Note, NoteFilter, NotePayload, Tag};
use crate::handlers::{json_body, path_id};
use crate::middleware::{ApiResult, AuthUser, Created};
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteQuery {
    pub search_term: Option<String>,
    pub folder_id: Option<String>,
    pub tag_id: Option<String>,
}

/// A note with its tag references replaced by the tags themselves.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub title: String,
    pub content: Option<String>,
    pub tags: Vec<Tag>,
    pub created: DateTime<Utc>,
}

impl NoteView {
    fn new(note: Note, tags_by_id: &HashMap<Uuid, Tag>) -> Self {
        let tags = note
            .tag_ids
            .iter()
            .filter_map(|id| tags_by_id.get(id).cloned())
            .collect();

        Self {
            id: note.id,
            user_id: note.user_id,
            folder_id: note.folder_id,
            title: note.title,
            content: note.content,
            tags,
            created: note.created_at,
        }
    }
}

/// Look up every tag the notes reference in one query.
async fn populate(state: &SharedState, owner: Uuid, notes: Vec<Note>) -> ApiResult<Vec<NoteView>> {
    let mut ids: Vec<Uuid> = notes.iter().flat_map(|n| n.tag_ids.iter().copied()).collect();
    ids.sort_unstable();
    ids.dedup();

    let tags_by_id: HashMap<Uuid, Tag> = if ids.is_empty() {
        HashMap::new()
    } else {
        state
            .repos
            .tags
            .find_many(owner, &ids)
            .await?
            .into_iter()
            .map(|tag| (tag.id, tag))
            .collect()
    };

    Ok(notes.into_iter().map(|note| NoteView::new(note, &tags_by_id)).collect())
}

async fn populate_one(state: &SharedState, owner: Uuid, note: Note) -> ApiResult<NoteView> {
    let mut views = populate(state, owner, vec![note]).await?;
    views
        .pop()
        .ok_or_else(|| crate::error::ApiError::internal_server_error("Failed to format response"))
}

/// GET /notes?searchTerm=&folderId=&tagId=
pub async fn list(
    State(state): State<SharedState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<NoteQuery>,
) -> ApiResult<Json<Vec<NoteView>>> {
    let filter = NoteFilter::from_query(query.search_term, query.folder_id, query.tag_id)?;
    let notes = state.repos.notes.list(user.id, &filter).await?;
    Ok(Json(populate(&state, user.id, notes).await?))
}

/// GET /notes/:id
pub async fn get(
    State(state): State<SharedState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<NoteView>> {
    let id = path_id(&id)?;
    let note = state.repos.notes.get(user.id, id).await?;
    Ok(Json(populate_one(&state, user.id, note).await?))
}

/// POST /notes
pub async fn create(
    State(state): State<SharedState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NotePayload>, JsonRejection>,
) -> ApiResult<Created<NoteView>> {
    let draft = json_body(payload)?.into_draft()?;
    let note = state.repos.notes.create(user.id, draft).await?;
    let location = format!("/notes/{}", note.id);
    Ok(Created::at(location, populate_one(&state, user.id, note).await?))
}

/// PUT /notes/:id - full replacement; absent optional fields are cleared
pub async fn update(
    State(state): State<SharedState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<NotePayload>, JsonRejection>,
) -> ApiResult<Json<NoteView>> {
    let id = path_id(&id)?;
    let draft = json_body(payload)?.into_draft()?;
    let note = state.repos.notes.update(user.id, id, draft).await?;
    Ok(Json(populate_one(&state, user.id, note).await?))
}

/// DELETE /notes/:id
pub async fn delete(
    State(state): State<SharedState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = path_id(&id)?;
    state.repos.notes.delete(user.id, id).await?;
    tracing::info!("Deleted note {}", id);
    Ok(StatusCode::NO_CONTENT)
}
