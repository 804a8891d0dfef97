use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::models::{Note, NoteDraft, NoteFilter};
use crate::database::repository::{NoteRepository, RepositoryError, RepositoryResult};

const NOTE_COLUMNS: &str = "id, user_id, folder_id, title, content, tag_ids, created_at";

pub struct PgNoteRepository {
    pool: PgPool,
}

impl PgNoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Confirm the draft's folder and tags belong to `owner`.
///
/// The rows are locked `FOR SHARE` so a concurrent delete cannot remove them
/// before the note write commits.
async fn check_references(conn: &mut PgConnection, owner: Uuid, draft: &NoteDraft) -> RepositoryResult<()> {
    if let Some(folder_id) = draft.folder_id {
        let found: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM folders WHERE id = $1 AND user_id = $2 FOR SHARE")
                .bind(folder_id)
                .bind(owner)
                .fetch_optional(&mut *conn)
                .await?;
        if found.is_none() {
            return Err(RepositoryError::invalid_folder());
        }
    }

    if !draft.tag_ids.is_empty() {
        let found: Vec<(Uuid,)> =
            sqlx::query_as("SELECT id FROM tags WHERE user_id = $1 AND id = ANY($2) FOR SHARE")
                .bind(owner)
                .bind(draft.tag_ids.clone())
                .fetch_all(&mut *conn)
                .await?;
        if found.len() != draft.tag_ids.len() {
            return Err(RepositoryError::invalid_tags());
        }
    }

    Ok(())
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn list(&self, owner: Uuid, filter: &NoteFilter) -> RepositoryResult<Vec<Note>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!("SELECT {} FROM notes WHERE user_id = ", NOTE_COLUMNS));
        qb.push_bind(owner);

        if let Some(folder_id) = filter.folder_id {
            qb.push(" AND folder_id = ").push_bind(folder_id);
        }
        if let Some(tag_id) = filter.tag_id {
            qb.push(" AND ").push_bind(tag_id).push(" = ANY(tag_ids)");
        }

        match &filter.search_term {
            Some(term) => {
                qb.push(" AND search @@ websearch_to_tsquery('english', ")
                    .push_bind(term.clone())
                    .push(")");
                qb.push(" ORDER BY ts_rank(search, websearch_to_tsquery('english', ")
                    .push_bind(term.clone())
                    .push(")) DESC, created_at, id");
            }
            None => {
                qb.push(" ORDER BY created_at, id");
            }
        }

        let notes = qb.build_query_as::<Note>().fetch_all(&self.pool).await?;
        Ok(notes)
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> RepositoryResult<Note> {
        let sql = format!("SELECT {} FROM notes WHERE id = $1 AND user_id = $2", NOTE_COLUMNS);
        sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound("Note"))
    }

    async fn create(&self, owner: Uuid, draft: NoteDraft) -> RepositoryResult<Note> {
        let mut tx = self.pool.begin().await?;
        check_references(&mut *tx, owner, &draft).await?;

        let sql = format!(
            "INSERT INTO notes (id, user_id, folder_id, title, content, tag_ids) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            NOTE_COLUMNS
        );
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(Uuid::now_v7())
            .bind(owner)
            .bind(draft.folder_id)
            .bind(&draft.title)
            .bind(&draft.content)
            .bind(draft.tag_ids.clone())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(note)
    }

    async fn update(&self, owner: Uuid, id: Uuid, draft: NoteDraft) -> RepositoryResult<Note> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM notes WHERE id = $1 AND user_id = $2 FOR UPDATE")
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            return Err(RepositoryError::NotFound("Note"));
        }

        check_references(&mut *tx, owner, &draft).await?;

        let sql = format!(
            "UPDATE notes SET title = $3, content = $4, folder_id = $5, tag_ids = $6 \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            NOTE_COLUMNS
        );
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .bind(owner)
            .bind(&draft.title)
            .bind(&draft.content)
            .bind(draft.folder_id)
            .bind(draft.tag_ids.clone())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound("Note"))?;

        tx.commit().await?;
        Ok(note)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> RepositoryResult<()> {
        let deleted = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("Note"));
        }
        Ok(())
    }
}
