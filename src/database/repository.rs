use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Folder, NewUser, Note, NoteDraft, NoteFilter, Tag, UserRecord};

/// Errors surfaced by every repository, independent of the storage backend.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// An externally supplied id is not a well-formed identifier.
    #[error("The `{0}` is not valid")]
    MalformedId(&'static str),

    #[error("{0}")]
    Validation(String),

    /// Absent, or owned by someone else. The two cases are never distinguished.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("The {0} name already exists")]
    DuplicateName(&'static str),

    #[error("That username is taken")]
    DuplicateUsername,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl RepositoryError {
    pub fn invalid_folder() -> Self {
        RepositoryError::Validation("The `folderId` is not valid".to_string())
    }

    pub fn invalid_tags() -> Self {
        RepositoryError::Validation("The `tags` array contains an invalid id".to_string())
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Database(DatabaseError::Sqlx(err))
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Parse an externally supplied identifier.
pub fn parse_id(field: &'static str, raw: &str) -> RepositoryResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| RepositoryError::MalformedId(field))
}

/// Outcome of a delete that cleaned up note references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub notes_updated: u64,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `DuplicateUsername` when the username is taken.
    async fn insert(&self, user: NewUser) -> RepositoryResult<UserRecord>;

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<UserRecord>>;
}

#[async_trait]
pub trait FolderRepository: Send + Sync {
    /// All folders of `owner`, sorted by name.
    async fn list(&self, owner: Uuid) -> RepositoryResult<Vec<Folder>>;

    async fn get(&self, owner: Uuid, id: Uuid) -> RepositoryResult<Folder>;

    async fn create(&self, owner: Uuid, name: String) -> RepositoryResult<Folder>;

    async fn update(&self, owner: Uuid, id: Uuid, name: String) -> RepositoryResult<Folder>;

    /// Deletes the folder and clears `folder_id` on the owner's notes that referenced it.
    async fn delete(&self, owner: Uuid, id: Uuid) -> RepositoryResult<CascadeReport>;
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    /// All tags of `owner`, sorted by name.
    async fn list(&self, owner: Uuid) -> RepositoryResult<Vec<Tag>>;

    /// The subset of `ids` that exist and belong to `owner`, sorted by name.
    async fn find_many(&self, owner: Uuid, ids: &[Uuid]) -> RepositoryResult<Vec<Tag>>;

    async fn get(&self, owner: Uuid, id: Uuid) -> RepositoryResult<Tag>;

    async fn create(&self, owner: Uuid, name: String) -> RepositoryResult<Tag>;

    async fn update(&self, owner: Uuid, id: Uuid, name: String) -> RepositoryResult<Tag>;

    /// Deletes the tag and pulls its id from the owner's notes.
    async fn delete(&self, owner: Uuid, id: Uuid) -> RepositoryResult<CascadeReport>;
}

#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Notes of `owner` matching every filter present. Ranked by relevance when
    /// searching, otherwise ordered by creation time.
    async fn list(&self, owner: Uuid, filter: &NoteFilter) -> RepositoryResult<Vec<Note>>;

    async fn get(&self, owner: Uuid, id: Uuid) -> RepositoryResult<Note>;

    /// Fails with a validation error when the folder or a tag is not owned by `owner`.
    async fn create(&self, owner: Uuid, draft: NoteDraft) -> RepositoryResult<Note>;

    async fn update(&self, owner: Uuid, id: Uuid, draft: NoteDraft) -> RepositoryResult<Note>;

    async fn delete(&self, owner: Uuid, id: Uuid) -> RepositoryResult<()>;
}
