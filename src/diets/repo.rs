use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::access::filter;

#[derive(Debug, Clone, FromRow)]
pub struct DietRow {
    pub id: Uuid,
    pub animal_id: Uuid,
    pub animal_name: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub total_daily_mass: Decimal,
    pub description: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub ingredients_count: i64,
}

const SELECT_DIET: &str = r#"
    SELECT d.id, d.animal_id, a.name AS animal_name,
           d.start_date, d.end_date, d.total_daily_mass, d.description,
           d.is_active, d.created_at, d.updated_at,
           (SELECT count(*) FROM ingredients i
             WHERE i.diet_id = d.id AND i.is_active) AS ingredients_count
    FROM diets d
    JOIN animals a ON a.id = d.animal_id
"#;

/// Diets of accessible animals, active first, newest start date first.
pub async fn list_accessible(
    db: &PgPool,
    user_id: Uuid,
    animal_id: Option<Uuid>,
    active: Option<bool>,
    start_date_gte: Option<Date>,
    end_date_lte: Option<Date>,
) -> anyhow::Result<Vec<DietRow>> {
    let sql = format!(
        "{SELECT_DIET} \
         WHERE {} \
           AND ($2::uuid IS NULL OR d.animal_id = $2) \
           AND ($3::boolean IS NULL OR d.is_active = $3) \
           AND ($4::date IS NULL OR d.start_date >= $4) \
           AND ($5::date IS NULL OR d.end_date <= $5) \
         ORDER BY d.is_active DESC, d.start_date DESC",
        filter::accessible_diets("d", 1)
    );
    let rows = sqlx::query_as::<_, DietRow>(&sql)
        .bind(user_id)
        .bind(animal_id)
        .bind(active)
        .bind(start_date_gte)
        .bind(end_date_lte)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<DietRow>> {
    let sql = format!("{SELECT_DIET} WHERE d.id = $1");
    let row = sqlx::query_as::<_, DietRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn create(
    db: &PgPool,
    animal_id: Uuid,
    start_date: Date,
    end_date: Option<Date>,
    description: &str,
) -> anyhow::Result<DietRow> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO diets (animal_id, start_date, end_date, description)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(animal_id)
    .bind(start_date)
    .bind(end_date)
    .bind(description)
    .fetch_one(db)
    .await?;

    let row = find(db, id).await?;
    row.ok_or_else(|| anyhow::anyhow!("diet vanished after insert"))
}

/// `end_date` is applied only when the outer `Option` is set, so callers can
/// clear the column with `Some(None)`.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    start_date: Option<Date>,
    end_date: Option<Option<Date>>,
    description: Option<&str>,
) -> anyhow::Result<Option<DietRow>> {
    let updated: Option<Uuid> = sqlx::query_scalar(
        r#"
        UPDATE diets
        SET start_date = COALESCE($2, start_date),
            end_date = CASE WHEN $3 THEN $4 ELSE end_date END,
            description = COALESCE($5, description),
            updated_at = now()
        WHERE id = $1
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(start_date)
    .bind(end_date.is_some())
    .bind(end_date.flatten())
    .bind(description)
    .fetch_optional(db)
    .await?;

    match updated {
        Some(id) => find(db, id).await,
        None => Ok(None),
    }
}

pub async fn soft_delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        "UPDATE diets SET is_active = FALSE, updated_at = now() WHERE id = $1 AND is_active",
    )
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
