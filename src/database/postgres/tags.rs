use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{cascade, is_unique_violation};
use crate::database::models::Tag;
use crate::database::repository::{CascadeReport, TagRepository, RepositoryError, RepositoryResult};

pub struct PgTagRepository {
    pool: PgPool,
}

impl PgTagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(err: sqlx::Error) -> RepositoryError {
    if is_unique_violation(&err) {
        RepositoryError::DuplicateName("tag")
    } else {
        err.into()
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn list(&self, owner: Uuid) -> RepositoryResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, name, user_id FROM tags WHERE user_id = $1 ORDER BY name, id",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn find_many(&self, owner: Uuid, ids: &[Uuid]) -> RepositoryResult<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, name, user_id FROM tags WHERE user_id = $1 AND id = ANY($2) ORDER BY name, id",
        )
        .bind(owner)
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> RepositoryResult<Tag> {
        sqlx::query_as::<_, Tag>("SELECT id, name, user_id FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound("Tag"))
    }

    async fn create(&self, owner: Uuid, name: String) -> RepositoryResult<Tag> {
        sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (id, user_id, name) VALUES ($1, $2, $3) RETURNING id, name, user_id",
        )
        .bind(Uuid::now_v7())
        .bind(owner)
        .bind(&name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn update(&self, owner: Uuid, id: Uuid, name: String) -> RepositoryResult<Tag> {
        sqlx::query_as::<_, Tag>(
            "UPDATE tags SET name = $3 WHERE id = $1 AND user_id = $2 RETURNING id, name, user_id",
        )
        .bind(id)
        .bind(owner)
        .bind(&name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(RepositoryError::NotFound("Tag"))
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> RepositoryResult<CascadeReport> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Err(RepositoryError::NotFound("Tag"));
        }

        let notes_updated = cascade::pull_tag(&mut *tx, owner, id).await?;
        tx.commit().await?;

        Ok(CascadeReport { notes_updated })
    }
}
