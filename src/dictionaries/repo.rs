use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Species dictionary entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnimalType {
    pub id: Uuid,
    pub name: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Measurement unit with a multiplier into the base unit (grams).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Unit {
    pub id: Uuid,
    pub name: String,
    pub symbol: String,
    pub conversion_factor: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IngredientCategory {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
}

impl AnimalType {
    pub async fn list(db: &PgPool, search: Option<&str>) -> anyhow::Result<Vec<AnimalType>> {
        let rows = sqlx::query_as::<_, AnimalType>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM animal_types
            WHERE $1::text IS NULL OR name ILIKE '%' || $1 || '%'
            ORDER BY name
            "#,
        )
        .bind(search)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<AnimalType>> {
        let row = sqlx::query_as::<_, AnimalType>(
            "SELECT id, name, created_at, updated_at FROM animal_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }
}

impl Unit {
    pub async fn list(db: &PgPool, search: Option<&str>) -> anyhow::Result<Vec<Unit>> {
        let rows = sqlx::query_as::<_, Unit>(
            r#"
            SELECT id, name, symbol, conversion_factor
            FROM units
            WHERE $1::text IS NULL
               OR name ILIKE '%' || $1 || '%'
               OR symbol ILIKE '%' || $1 || '%'
            ORDER BY name
            "#,
        )
        .bind(search)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Unit>> {
        let row = sqlx::query_as::<_, Unit>(
            "SELECT id, name, symbol, conversion_factor FROM units WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }
}

impl IngredientCategory {
    pub async fn list(db: &PgPool, search: Option<&str>) -> anyhow::Result<Vec<IngredientCategory>> {
        let rows = sqlx::query_as::<_, IngredientCategory>(
            r#"
            SELECT id, code, name, description
            FROM ingredient_categories
            WHERE $1::text IS NULL
               OR name ILIKE '%' || $1 || '%'
               OR code ILIKE '%' || $1 || '%'
            ORDER BY name
            "#,
        )
        .bind(search)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<IngredientCategory>> {
        let row = sqlx::query_as::<_, IngredientCategory>(
            "SELECT id, code, name, description FROM ingredient_categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }
}
