pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
mod search;

use sqlx::PgPool;
use std::sync::Arc;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use repository::{
    parse_id, CascadeReport, FolderRepository, NoteRepository, RepositoryError, RepositoryResult, TagRepository,
    UserRepository,
};

use postgres::{PgFolderRepository, PgNoteRepository, PgTagRepository, PgUserRepository};

#[derive(Clone)]
enum Backend {
    Postgres(PgPool),
    Memory,
}

/// The four repositories the handlers work against, all on one backend.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub folders: Arc<dyn FolderRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub notes: Arc<dyn NoteRepository>,
    backend: Backend,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            folders: Arc::new(PgFolderRepository::new(pool.clone())),
            tags: Arc::new(PgTagRepository::new(pool.clone())),
            notes: Arc::new(PgNoteRepository::new(pool.clone())),
            backend: Backend::Postgres(pool),
        }
    }

    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            folders: store.clone(),
            tags: store.clone(),
            notes: store,
            backend: Backend::Memory,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Postgres(_) => "postgres",
            Backend::Memory => "memory",
        }
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        match &self.backend {
            Backend::Postgres(pool) => DatabaseManager::health_check(pool).await,
            Backend::Memory => Ok(()),
        }
    }
}
