pub mod folder;
pub mod note;
pub mod tag;
pub mod user;

pub use folder::{Folder, FolderPayload};
pub use note::{Note, NoteDraft, NoteFilter, NotePayload};
pub use tag::{Tag, TagPayload};
pub use user::{NewUser, User, UserRecord};

use crate::database::repository::RepositoryError;

/// Require a non-blank `name`-style field, returning it trimmed.
pub(crate) fn required_text(field: &'static str, value: Option<String>) -> Result<String, RepositoryError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RepositoryError::Validation(format!("Missing `{}` in request body", field))),
    }
}
