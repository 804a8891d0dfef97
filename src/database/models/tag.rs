use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::required_text;
use crate::database::repository::RepositoryError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
}

/// Request body for `POST /tags` and `PUT /tags/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct TagPayload {
    pub name: Option<String>,
}

impl TagPayload {
    pub fn into_name(self) -> Result<String, RepositoryError> {
        required_text("name", self.name)
    }
}
