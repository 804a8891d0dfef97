use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{cascade, is_unique_violation};
use crate::database::models::Folder;
use crate::database::repository::{CascadeReport, FolderRepository, RepositoryError, RepositoryResult};

pub struct PgFolderRepository {
    pool: PgPool,
}

impl PgFolderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(err: sqlx::Error) -> RepositoryError {
    if is_unique_violation(&err) {
        RepositoryError::DuplicateName("folder")
    } else {
        err.into()
    }
}

#[async_trait]
impl FolderRepository for PgFolderRepository {
    async fn list(&self, owner: Uuid) -> RepositoryResult<Vec<Folder>> {
        let folders = sqlx::query_as::<_, Folder>(
            "SELECT id, name, user_id FROM folders WHERE user_id = $1 ORDER BY name, id",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(folders)
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> RepositoryResult<Folder> {
        sqlx::query_as::<_, Folder>("SELECT id, name, user_id FROM folders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound("Folder"))
    }

    async fn create(&self, owner: Uuid, name: String) -> RepositoryResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (id, user_id, name) VALUES ($1, $2, $3) RETURNING id, name, user_id",
        )
        .bind(Uuid::now_v7())
        .bind(owner)
        .bind(&name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn update(&self, owner: Uuid, id: Uuid, name: String) -> RepositoryResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = $3 WHERE id = $1 AND user_id = $2 RETURNING id, name, user_id",
        )
        .bind(id)
        .bind(owner)
        .bind(&name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(RepositoryError::NotFound("Folder"))
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> RepositoryResult<CascadeReport> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM folders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Err(RepositoryError::NotFound("Folder"));
        }

        let notes_updated = cascade::clear_folder(&mut *tx, owner, id).await?;
        tx.commit().await?;

        Ok(CascadeReport { notes_updated })
    }
}
