use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::access::filter;

#[derive(Debug, Clone, FromRow)]
pub struct AnimalWithoutDietRow {
    pub id: Uuid,
    pub name: String,
    pub species: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ExpiringDietRow {
    pub id: Uuid,
    pub animal_id: Uuid,
    pub animal_name: String,
    pub end_date: Date,
}

#[derive(Debug, Clone, FromRow)]
pub struct StaleListRow {
    pub id: Uuid,
    pub title: String,
    pub created_at: OffsetDateTime,
}

/// Active animals the user owns or collaborates on.
pub async fn animals_count(db: &PgPool, user_id: Uuid) -> anyhow::Result<i64> {
    let sql = format!(
        "SELECT count(*) FROM animals a WHERE a.is_active AND {}",
        filter::accessible_animals("a", 1)
    );
    let count: i64 = sqlx::query_scalar(&sql).bind(user_id).fetch_one(db).await?;
    Ok(count)
}

/// Accessible diets whose date range covers `today`.
pub async fn active_diets_count(db: &PgPool, user_id: Uuid, today: Date) -> anyhow::Result<i64> {
    let sql = format!(
        "SELECT count(*) FROM diets d \
         WHERE d.is_active AND {} \
           AND d.start_date <= $2 \
           AND (d.end_date IS NULL OR d.end_date >= $2)",
        filter::accessible_diets("d", 1)
    );
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(user_id)
        .bind(today)
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// Accessible diets ending within the inclusive window `[today, until]`.
pub async fn expiring_diets(
    db: &PgPool,
    user_id: Uuid,
    today: Date,
    until: Date,
) -> anyhow::Result<Vec<ExpiringDietRow>> {
    let sql = format!(
        "SELECT d.id, d.animal_id, a.name AS animal_name, d.end_date \
         FROM diets d \
         JOIN animals a ON a.id = d.animal_id \
         WHERE d.is_active AND {} \
           AND d.end_date IS NOT NULL \
           AND d.end_date >= $2 AND d.end_date <= $3 \
         ORDER BY d.end_date",
        filter::accessible_diets("d", 1)
    );
    let rows = sqlx::query_as::<_, ExpiringDietRow>(&sql)
        .bind(user_id)
        .bind(today)
        .bind(until)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

fn open_lists_sql() -> String {
    format!(
        "SELECT count(*) FROM shopping_lists sl \
         WHERE sl.is_active AND NOT sl.is_completed AND {}",
        filter::accessible_shopping_lists("sl", 1)
    )
}

/// Open lists visible to the user: created by them, or fed by a diet they
/// can access.
pub async fn active_lists_count(db: &PgPool, user_id: Uuid) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar(&open_lists_sql())
        .bind(user_id)
        .fetch_one(db)
        .await?;
    Ok(count)
}

fn completed_lists_sql() -> String {
    format!(
        "SELECT count(*) FROM shopping_lists sl \
         WHERE sl.is_active AND sl.is_completed \
           AND sl.updated_at >= $2::date AND {}",
        filter::accessible_shopping_lists("sl", 1)
    )
}

/// Visible lists completed since the start of the current calendar month.
pub async fn completed_lists_count(
    db: &PgPool,
    user_id: Uuid,
    month_start: Date,
) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar(&completed_lists_sql())
        .bind(user_id)
        .bind(month_start)
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// Active accessible animals with no diet covering `today`.
pub async fn animals_without_diet(
    db: &PgPool,
    user_id: Uuid,
    today: Date,
) -> anyhow::Result<Vec<AnimalWithoutDietRow>> {
    let sql = format!(
        "SELECT a.id, a.name, t.name AS species \
         FROM animals a \
         JOIN animal_types t ON t.id = a.species_id \
         WHERE a.is_active AND {} \
           AND NOT EXISTS (\
               SELECT 1 FROM diets d \
               WHERE d.animal_id = a.id AND d.is_active \
                 AND d.start_date <= $2 \
                 AND (d.end_date IS NULL OR d.end_date >= $2)) \
         ORDER BY a.name",
        filter::accessible_animals("a", 1)
    );
    let rows = sqlx::query_as::<_, AnimalWithoutDietRow>(&sql)
        .bind(user_id)
        .bind(today)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

fn stale_lists_sql() -> String {
    format!(
        "SELECT sl.id, sl.title, sl.created_at FROM shopping_lists sl \
         WHERE sl.is_active AND NOT sl.is_completed \
           AND sl.created_at::date <= $2 AND {} \
         ORDER BY sl.created_at",
        filter::accessible_shopping_lists("sl", 1)
    )
}

/// Visible open lists created on or before `cutoff`.
pub async fn stale_lists(
    db: &PgPool,
    user_id: Uuid,
    cutoff: Date,
) -> anyhow::Result<Vec<StaleListRow>> {
    let rows = sqlx::query_as::<_, StaleListRow>(&stale_lists_sql())
        .bind(user_id)
        .bind(cutoff)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The list queries must not be creator-only: a diet collaborator sees
    // lists their animals' diets feed into.
    #[test]
    fn list_queries_cover_shared_diet_access() {
        for sql in [open_lists_sql(), completed_lists_sql(), stale_lists_sql()] {
            assert!(sql.contains("sl.created_by = $1"), "{sql}");
            assert!(sql.contains("shopping_list_diets"), "{sql}");
        }
    }
}
