//! PostgreSQL implementations of the repository traits.

mod cascade;
mod folders;
mod notes;
mod tags;
mod users;

pub use folders::PgFolderRepository;
pub use notes::PgNoteRepository;
pub use tags::PgTagRepository;
pub use users::PgUserRepository;

/// SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}
