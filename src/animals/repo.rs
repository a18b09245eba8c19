use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::access::filter;

/// Animal joined with its species and owner email for responses.
#[derive(Debug, Clone, FromRow)]
pub struct AnimalRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner_email: String,
    pub species_id: Uuid,
    pub species_name: String,
    pub name: String,
    pub date_of_birth: Option<Date>,
    pub weight_kg: Option<Decimal>,
    pub note: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const SELECT_ANIMAL: &str = r#"
    SELECT a.id, a.owner_id, u.email AS owner_email,
           a.species_id, t.name AS species_name,
           a.name, a.date_of_birth, a.weight_kg, a.note,
           a.is_active, a.created_at, a.updated_at
    FROM animals a
    JOIN users u ON u.id = a.owner_id
    JOIN animal_types t ON t.id = a.species_id
"#;

/// Animals the user owns or collaborates on, active first, newest first.
/// `active = None` includes soft-deleted rows (explicit include-inactive).
pub async fn list_accessible(
    db: &PgPool,
    user_id: Uuid,
    active: Option<bool>,
    species_id: Option<Uuid>,
    search: Option<&str>,
) -> anyhow::Result<Vec<AnimalRow>> {
    let sql = format!(
        "{SELECT_ANIMAL} \
         WHERE {} \
           AND ($2::boolean IS NULL OR a.is_active = $2) \
           AND ($3::uuid IS NULL OR a.species_id = $3) \
           AND ($4::text IS NULL OR a.name ILIKE '%' || $4 || '%') \
         ORDER BY a.is_active DESC, a.created_at DESC",
        filter::accessible_animals("a", 1)
    );
    let rows = sqlx::query_as::<_, AnimalRow>(&sql)
        .bind(user_id)
        .bind(active)
        .bind(species_id)
        .bind(search)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Fetch by id with no access or is_active filtering; the access layer
/// decides visibility.
pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<AnimalRow>> {
    let sql = format!("{SELECT_ANIMAL} WHERE a.id = $1");
    let row = sqlx::query_as::<_, AnimalRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn create(
    db: &PgPool,
    owner_id: Uuid,
    species_id: Uuid,
    name: &str,
    date_of_birth: Option<Date>,
    weight_kg: Option<Decimal>,
    note: &str,
) -> anyhow::Result<AnimalRow> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO animals (owner_id, species_id, name, date_of_birth, weight_kg, note)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(owner_id)
    .bind(species_id)
    .bind(name)
    .bind(date_of_birth)
    .bind(weight_kg)
    .bind(note)
    .fetch_one(db)
    .await?;

    let row = find(db, id).await?;
    row.ok_or_else(|| anyhow::anyhow!("animal vanished after insert"))
}

/// The nullable columns take a double `Option`: the outer layer decides
/// whether the column is touched, the inner value may clear it.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    species_id: Option<Uuid>,
    name: Option<&str>,
    date_of_birth: Option<Option<Date>>,
    weight_kg: Option<Option<Decimal>>,
    note: Option<&str>,
) -> anyhow::Result<Option<AnimalRow>> {
    let updated: Option<Uuid> = sqlx::query_scalar(
        r#"
        UPDATE animals
        SET species_id = COALESCE($2, species_id),
            name = COALESCE($3, name),
            date_of_birth = CASE WHEN $4 THEN $5 ELSE date_of_birth END,
            weight_kg = CASE WHEN $6 THEN $7 ELSE weight_kg END,
            note = COALESCE($8, note),
            updated_at = now()
        WHERE id = $1
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(species_id)
    .bind(name)
    .bind(date_of_birth.is_some())
    .bind(date_of_birth.flatten())
    .bind(weight_kg.is_some())
    .bind(weight_kg.flatten())
    .bind(note)
    .fetch_optional(db)
    .await?;

    match updated {
        Some(id) => find(db, id).await,
        None => Ok(None),
    }
}

pub async fn soft_delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        "UPDATE animals SET is_active = FALSE, updated_at = now() WHERE id = $1 AND is_active",
    )
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Restore a soft-deleted animal (flip the flag back, no data loss).
pub async fn restore(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        "UPDATE animals SET is_active = TRUE, updated_at = now() WHERE id = $1 AND NOT is_active",
    )
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
