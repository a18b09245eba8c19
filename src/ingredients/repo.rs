use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct IngredientRow {
    pub id: Uuid,
    pub diet_id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub category_code: Option<String>,
    pub category_name: Option<String>,
    pub cooking_method: String,
    pub unit_id: Uuid,
    pub unit_name: String,
    pub unit_symbol: String,
    pub conversion_factor: Decimal,
    pub amount: Decimal,
    pub amount_in_base_unit: Decimal,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const SELECT_INGREDIENT: &str = r#"
    SELECT i.id, i.diet_id, i.name,
           i.category_id, c.code AS category_code, c.name AS category_name,
           i.cooking_method,
           i.unit_id, un.name AS unit_name, un.symbol AS unit_symbol, un.conversion_factor,
           i.amount, i.amount_in_base_unit,
           i.is_active, i.created_at, i.updated_at
    FROM ingredients i
    LEFT JOIN ingredient_categories c ON c.id = i.category_id
    JOIN units un ON un.id = i.unit_id
"#;

/// Active ingredients of a diet, name-ordered.
pub async fn list_for_diet(
    db: &PgPool,
    diet_id: Uuid,
    category_id: Option<Uuid>,
    cooking_method: Option<&str>,
    search: Option<&str>,
) -> anyhow::Result<Vec<IngredientRow>> {
    let sql = format!(
        "{SELECT_INGREDIENT} \
         WHERE i.diet_id = $1 AND i.is_active \
           AND ($2::uuid IS NULL OR i.category_id = $2) \
           AND ($3::text IS NULL OR i.cooking_method = $3) \
           AND ($4::text IS NULL OR i.name ILIKE '%' || $4 || '%') \
         ORDER BY i.name"
    );
    let rows = sqlx::query_as::<_, IngredientRow>(&sql)
        .bind(diet_id)
        .bind(category_id)
        .bind(cooking_method)
        .bind(search)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<IngredientRow>> {
    let sql = format!("{SELECT_INGREDIENT} WHERE i.id = $1");
    let row = sqlx::query_as::<_, IngredientRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// Insert inside the caller's transaction; `amount_in_base_unit` is supplied
/// by the service, already converted.
pub async fn insert(
    conn: &mut PgConnection,
    diet_id: Uuid,
    name: &str,
    category_id: Option<Uuid>,
    cooking_method: &str,
    unit_id: Uuid,
    amount: Decimal,
    amount_in_base_unit: Decimal,
) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO ingredients
            (diet_id, name, category_id, cooking_method, unit_id, amount, amount_in_base_unit)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(diet_id)
    .bind(name)
    .bind(category_id)
    .bind(cooking_method)
    .bind(unit_id)
    .bind(amount)
    .bind(amount_in_base_unit)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// `category_id` takes a double `Option` so an explicit `Some(None)` can
/// detach the category.
pub async fn update(
    conn: &mut PgConnection,
    id: Uuid,
    name: Option<&str>,
    category_id: Option<Option<Uuid>>,
    cooking_method: Option<&str>,
    unit_id: Uuid,
    amount: Decimal,
    amount_in_base_unit: Decimal,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE ingredients
        SET name = COALESCE($2, name),
            category_id = CASE WHEN $3 THEN $4 ELSE category_id END,
            cooking_method = COALESCE($5, cooking_method),
            unit_id = $6,
            amount = $7,
            amount_in_base_unit = $8,
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(category_id.is_some())
    .bind(category_id.flatten())
    .bind(cooking_method)
    .bind(unit_id)
    .bind(amount)
    .bind(amount_in_base_unit)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn soft_delete(conn: &mut PgConnection, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        "UPDATE ingredients SET is_active = FALSE, updated_at = now() \
         WHERE id = $1 AND is_active",
    )
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Serializes concurrent recomputations of the same diet.
pub async fn lock_diet(conn: &mut PgConnection, diet_id: Uuid) -> anyhow::Result<Option<Uuid>> {
    let id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM diets WHERE id = $1 FOR UPDATE")
        .bind(diet_id)
        .fetch_optional(conn)
        .await?;
    Ok(id)
}
