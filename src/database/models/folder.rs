use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::required_text;
use crate::database::repository::RepositoryError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
}

/// Request body for `POST /folders` and `PUT /folders/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct FolderPayload {
    pub name: Option<String>,
}

impl FolderPayload {
    pub fn into_name(self) -> Result<String, RepositoryError> {
        required_text("name", self.name)
    }
}
