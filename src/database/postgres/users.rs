use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::is_unique_violation;
use crate::database::models::{NewUser, UserRecord};
use crate::database::repository::{RepositoryError, RepositoryResult, UserRepository};

const USER_COLUMNS: &str = "id, username, password_hash, fullname, created_at";

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: NewUser) -> RepositoryResult<UserRecord> {
        let sql = format!(
            "INSERT INTO users (id, username, password_hash, fullname) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(Uuid::now_v7())
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.fullname)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    RepositoryError::DuplicateUsername
                } else {
                    e.into()
                }
            })
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<UserRecord>> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
