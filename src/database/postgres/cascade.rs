//! Reference cleanup run inside the transaction of a folder or tag delete.

use sqlx::PgConnection;
use uuid::Uuid;

/// Clear `folder_id` on every note of `owner` that points at `folder_id`.
pub(super) async fn clear_folder(
    conn: &mut PgConnection,
    owner: Uuid,
    folder_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE notes SET folder_id = NULL WHERE user_id = $1 AND folder_id = $2")
        .bind(owner)
        .bind(folder_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Remove `tag_id` from the tag set of every note of `owner` carrying it.
pub(super) async fn pull_tag(
    conn: &mut PgConnection,
    owner: Uuid,
    tag_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE notes SET tag_ids = array_remove(tag_ids, $2) WHERE user_id = $1 AND $2 = ANY(tag_ids)",
    )
    .bind(owner)
    .bind(tag_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}
