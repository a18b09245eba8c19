use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::access::PermissionLevel;

#[derive(Debug, Clone, FromRow)]
pub struct CollaborationRow {
    pub id: Uuid,
    pub animal_id: Uuid,
    pub animal_name: String,
    pub user_id: Uuid,
    pub user_email: String,
    pub permission: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const SELECT_COLLABORATION: &str = r#"
    SELECT c.id, c.animal_id, a.name AS animal_name,
           c.user_id, u.email AS user_email,
           c.permission, c.is_active, c.created_at, c.updated_at
    FROM collaborations c
    JOIN animals a ON a.id = c.animal_id
    JOIN users u ON u.id = c.user_id
"#;

pub async fn list_for_animal(
    db: &PgPool,
    animal_id: Uuid,
) -> anyhow::Result<Vec<CollaborationRow>> {
    let sql = format!(
        "{SELECT_COLLABORATION} \
         WHERE c.animal_id = $1 AND c.is_active \
         ORDER BY c.created_at DESC"
    );
    let rows = sqlx::query_as::<_, CollaborationRow>(&sql)
        .bind(animal_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<CollaborationRow>> {
    let sql = format!("{SELECT_COLLABORATION} WHERE c.id = $1");
    let row = sqlx::query_as::<_, CollaborationRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn has_active(db: &PgPool, animal_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM collaborations \
         WHERE animal_id = $1 AND user_id = $2 AND is_active)",
    )
    .bind(animal_id)
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

pub async fn create(
    db: &PgPool,
    animal_id: Uuid,
    user_id: Uuid,
    permission: PermissionLevel,
) -> anyhow::Result<CollaborationRow> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO collaborations (animal_id, user_id, permission)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(animal_id)
    .bind(user_id)
    .bind(permission.as_db())
    .fetch_one(db)
    .await?;

    let row = find(db, id).await?;
    row.ok_or_else(|| anyhow::anyhow!("collaboration vanished after insert"))
}

pub async fn update_permission(
    db: &PgPool,
    id: Uuid,
    permission: PermissionLevel,
) -> anyhow::Result<Option<CollaborationRow>> {
    let updated: Option<Uuid> = sqlx::query_scalar(
        "UPDATE collaborations SET permission = $2, updated_at = now() \
         WHERE id = $1 AND is_active RETURNING id",
    )
    .bind(id)
    .bind(permission.as_db())
    .fetch_optional(db)
    .await?;

    match updated {
        Some(id) => find(db, id).await,
        None => Ok(None),
    }
}

pub async fn soft_delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        "UPDATE collaborations SET is_active = FALSE, updated_at = now() \
         WHERE id = $1 AND is_active",
    )
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
