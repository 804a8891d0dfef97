use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::required_text;
use crate::database::repository::{parse_id, RepositoryError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub title: String,
    pub content: Option<String>,
    #[serde(rename = "tags")]
    pub tag_ids: Vec<Uuid>,
    #[serde(rename = "created")]
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /notes` and `PUT /notes/:id`.
///
/// Ids arrive as strings so malformed values can be reported as a client error
/// instead of a JSON rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePayload {
    pub title: Option<String>,
    pub content: Option<String>,
    pub folder_id: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// A validated note write. References are well formed but not yet checked
/// against the owner's folders and tags; the repository does that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: Option<String>,
    pub folder_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
}

impl NotePayload {
    pub fn into_draft(self) -> Result<NoteDraft, RepositoryError> {
        let title = required_text("title", self.title)?;

        let folder_id = match self.folder_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_id("folderId", raw)?),
        };

        let mut tag_ids: Vec<Uuid> = Vec::new();
        for raw in self.tags.unwrap_or_default() {
            let id = parse_id("tags", &raw).map_err(|_| RepositoryError::invalid_tags())?;
            if !tag_ids.contains(&id) {
                tag_ids.push(id);
            }
        }

        Ok(NoteDraft {
            title,
            content: self.content,
            folder_id,
            tag_ids,
        })
    }
}

/// Optional `GET /notes` filters. All present filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub search_term: Option<String>,
    pub folder_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
}

impl NoteFilter {
    pub fn from_query(
        search_term: Option<String>,
        folder_id: Option<String>,
        tag_id: Option<String>,
    ) -> Result<Self, RepositoryError> {
        let search_term = search_term
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let folder_id = folder_id
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_id("folderId", raw.trim()))
            .transpose()?;
        let tag_id = tag_id
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_id("tagId", raw.trim()))
            .transpose()?;

        Ok(Self { search_term, folder_id, tag_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_required() {
        let err = NotePayload::default().into_draft().unwrap_err();
        assert_eq!(err.to_string(), "Missing `title` in request body");
    }

    #[test]
    fn blank_folder_id_means_no_folder() {
        let draft = NotePayload {
            title: Some("Groceries".into()),
            folder_id: Some("".into()),
            ..Default::default()
        }
        .into_draft()
        .unwrap();
        assert_eq!(draft.folder_id, None);
        assert!(draft.tag_ids.is_empty());
    }

    #[test]
    fn malformed_folder_id_is_rejected() {
        let err = NotePayload {
            title: Some("Groceries".into()),
            folder_id: Some("not-an-id".into()),
            ..Default::default()
        }
        .into_draft()
        .unwrap_err();
        assert!(matches!(err, RepositoryError::MalformedId("folderId")));
    }

    #[test]
    fn malformed_tag_is_rejected() {
        let err = NotePayload {
            title: Some("Groceries".into()),
            tags: Some(vec![Uuid::now_v7().to_string(), "nope".into()]),
            ..Default::default()
        }
        .into_draft()
        .unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
    }

    #[test]
    fn duplicate_tags_collapse() {
        let tag = Uuid::now_v7();
        let draft = NotePayload {
            title: Some("Groceries".into()),
            tags: Some(vec![tag.to_string(), tag.to_string()]),
            ..Default::default()
        }
        .into_draft()
        .unwrap();
        assert_eq!(draft.tag_ids, vec![tag]);
    }

    #[test]
    fn filter_ignores_empty_values() {
        let filter = NoteFilter::from_query(Some("  ".into()), Some("".into()), None).unwrap();
        assert_eq!(filter, NoteFilter::default());
    }

    #[test]
    fn filter_rejects_malformed_tag_id() {
        let err = NoteFilter::from_query(None, None, Some("xyz".into())).unwrap_err();
        assert!(matches!(err, RepositoryError::MalformedId("tagId")));
    }

    #[test]
    fn serializes_with_api_field_names() {
        let note = Note {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            folder_id: None,
            title: "t".into(),
            content: None,
            tag_ids: vec![],
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&note).unwrap();
        assert!(value.get("created").is_some());
        assert!(value.get("tags").is_some());
        assert!(value.get("folderId").is_some());
    }
}
