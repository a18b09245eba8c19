use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool, QueryBuilder};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{access::filter, shopping::aggregate::AggregatedItem};

#[derive(Debug, Clone, FromRow)]
pub struct ShoppingListRow {
    pub id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub days_count: i32,
    pub is_completed: bool,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub items_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ShoppingListItemRow {
    pub id: Uuid,
    pub shopping_list_id: Uuid,
    pub ingredient_name: String,
    pub category: String,
    pub unit_id: Uuid,
    pub unit_name: String,
    pub unit_symbol: String,
    pub conversion_factor: Decimal,
    pub total_amount: Decimal,
    pub is_checked: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct DietInfoRow {
    pub id: Uuid,
    pub animal_id: Uuid,
    pub animal_name: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
}

const SELECT_LIST: &str = r#"
    SELECT sl.id, sl.created_by, sl.title, sl.days_count,
           sl.is_completed, sl.is_active, sl.created_at, sl.updated_at,
           (SELECT count(*) FROM shopping_list_items it
             WHERE it.shopping_list_id = sl.id AND it.is_active) AS items_count
    FROM shopping_lists sl
"#;

const SELECT_ITEM: &str = r#"
    SELECT it.id, it.shopping_list_id, it.ingredient_name, it.category,
           it.unit_id, un.name AS unit_name, un.symbol AS unit_symbol, un.conversion_factor,
           it.total_amount, it.is_checked, it.created_at, it.updated_at
    FROM shopping_list_items it
    JOIN units un ON un.id = it.unit_id
"#;

/// Lists created by the user, newest first.
pub async fn list_for_user(
    db: &PgPool,
    user_id: Uuid,
    is_completed: Option<bool>,
) -> anyhow::Result<Vec<ShoppingListRow>> {
    let sql = format!(
        "{SELECT_LIST} \
         WHERE sl.created_by = $1 AND sl.is_active \
           AND ($2::boolean IS NULL OR sl.is_completed = $2) \
         ORDER BY sl.created_at DESC"
    );
    let rows = sqlx::query_as::<_, ShoppingListRow>(&sql)
        .bind(user_id)
        .bind(is_completed)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Soft-deleted lists are gone from the API, so `find` is active-only.
pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<ShoppingListRow>> {
    let sql = format!("{SELECT_LIST} WHERE sl.id = $1 AND sl.is_active");
    let row = sqlx::query_as::<_, ShoppingListRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// Creator, or anyone with access to at least one active diet on the list.
pub async fn can_access(db: &PgPool, user_id: Uuid, list_id: Uuid) -> anyhow::Result<bool> {
    let sql = format!(
        "SELECT EXISTS (SELECT 1 FROM shopping_lists sl WHERE sl.id = $2 AND {})",
        filter::accessible_shopping_lists("sl", 1)
    );
    let allowed: bool = sqlx::query_scalar(&sql)
        .bind(user_id)
        .bind(list_id)
        .fetch_one(db)
        .await?;
    Ok(allowed)
}

/// Active diets attached to the list, with their animal.
pub async fn diets_info(db: &PgPool, list_id: Uuid) -> anyhow::Result<Vec<DietInfoRow>> {
    let rows = sqlx::query_as::<_, DietInfoRow>(
        r#"
        SELECT d.id, d.animal_id, a.name AS animal_name, d.start_date, d.end_date
        FROM shopping_list_diets sld
        JOIN diets d ON d.id = sld.diet_id AND d.is_active
        JOIN animals a ON a.id = d.animal_id
        WHERE sld.shopping_list_id = $1
        ORDER BY d.start_date DESC
        "#,
    )
    .bind(list_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn active_diet_ids(conn: &mut PgConnection, list_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
    let ids: Vec<Uuid> = sqlx::query_scalar(
        r#"
        SELECT d.id FROM shopping_list_diets sld
        JOIN diets d ON d.id = sld.diet_id AND d.is_active
        WHERE sld.shopping_list_id = $1
        "#,
    )
    .bind(list_id)
    .fetch_all(conn)
    .await?;
    Ok(ids)
}

/// Active items in generation order.
pub async fn items(db: &PgPool, list_id: Uuid) -> anyhow::Result<Vec<ShoppingListItemRow>> {
    let sql = format!(
        "{SELECT_ITEM} WHERE it.shopping_list_id = $1 AND it.is_active ORDER BY it.position"
    );
    let rows = sqlx::query_as::<_, ShoppingListItemRow>(&sql)
        .bind(list_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_item(
    db: &PgPool,
    list_id: Uuid,
    item_id: Uuid,
) -> anyhow::Result<Option<ShoppingListItemRow>> {
    let sql = format!(
        "{SELECT_ITEM} WHERE it.id = $1 AND it.shopping_list_id = $2 AND it.is_active"
    );
    let row = sqlx::query_as::<_, ShoppingListItemRow>(&sql)
        .bind(item_id)
        .bind(list_id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn set_item_checked(db: &PgPool, item_id: Uuid, checked: bool) -> anyhow::Result<bool> {
    let result = sqlx::query(
        "UPDATE shopping_list_items SET is_checked = $2, updated_at = now() \
         WHERE id = $1 AND is_active",
    )
    .bind(item_id)
    .bind(checked)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn toggle_item_checked(db: &PgPool, item_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        "UPDATE shopping_list_items SET is_checked = NOT is_checked, updated_at = now() \
         WHERE id = $1 AND is_active",
    )
    .bind(item_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn insert_list(
    conn: &mut PgConnection,
    created_by: Uuid,
    title: &str,
    days_count: i32,
) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO shopping_lists (created_by, title, days_count)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(created_by)
    .bind(title)
    .bind(days_count)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

pub async fn link_diets(
    conn: &mut PgConnection,
    list_id: Uuid,
    diet_ids: &[Uuid],
) -> anyhow::Result<()> {
    if diet_ids.is_empty() {
        return Ok(());
    }
    let mut qb: QueryBuilder<sqlx::Postgres> =
        QueryBuilder::new("INSERT INTO shopping_list_diets (shopping_list_id, diet_id) ");
    qb.push_values(diet_ids, |mut b, diet_id| {
        b.push_bind(list_id).push_bind(diet_id);
    });
    qb.build().execute(conn).await?;
    Ok(())
}

pub async fn unlink_diets(conn: &mut PgConnection, list_id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM shopping_list_diets WHERE shopping_list_id = $1")
        .bind(list_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Bulk insert of freshly aggregated items; `position` preserves the
/// first-encounter order of the aggregation.
pub async fn insert_items(
    conn: &mut PgConnection,
    list_id: Uuid,
    items: &[AggregatedItem],
) -> anyhow::Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
        "INSERT INTO shopping_list_items \
         (shopping_list_id, ingredient_name, category, unit_id, total_amount, position) ",
    );
    qb.push_values(items.iter().enumerate(), |mut b, (position, item)| {
        b.push_bind(list_id)
            .push_bind(&item.ingredient_name)
            .push_bind(&item.category)
            .push_bind(item.unit_id)
            .push_bind(item.total_amount)
            .push_bind(position as i32);
    });
    qb.build().execute(conn).await?;
    Ok(())
}

pub async fn deactivate_items(conn: &mut PgConnection, list_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        "UPDATE shopping_list_items SET is_active = FALSE, updated_at = now() \
         WHERE shopping_list_id = $1 AND is_active",
    )
    .bind(list_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn update_meta(
    conn: &mut PgConnection,
    id: Uuid,
    title: Option<&str>,
    days_count: Option<i32>,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE shopping_lists
        SET title = COALESCE($2, title),
            days_count = COALESCE($3, days_count),
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(days_count)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn set_completed(db: &PgPool, id: Uuid, completed: bool) -> anyhow::Result<bool> {
    let result = sqlx::query(
        "UPDATE shopping_lists SET is_completed = $2, updated_at = now() \
         WHERE id = $1 AND is_active",
    )
    .bind(id)
    .bind(completed)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn soft_delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        "UPDATE shopping_lists SET is_active = FALSE, updated_at = now() \
         WHERE id = $1 AND is_active",
    )
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Serializes concurrent regenerations of the same list.
pub async fn lock_list(conn: &mut PgConnection, id: Uuid) -> anyhow::Result<Option<Uuid>> {
    let id: Option<Uuid> = sqlx::query_scalar(
        "SELECT id FROM shopping_lists WHERE id = $1 AND is_active FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(id)
}

/// Among the requested diets, those that are active and whose animal the user
/// can access. Order of the input is preserved by matching on the array.
pub async fn resolve_generatable_diets(
    db: &PgPool,
    user_id: Uuid,
    diet_ids: &[Uuid],
) -> anyhow::Result<Vec<Uuid>> {
    let sql = format!(
        "SELECT d.id FROM diets d \
         WHERE d.id = ANY($2) AND d.is_active AND {} \
         ORDER BY array_position($2, d.id)",
        filter::accessible_diets("d", 1)
    );
    let ids: Vec<Uuid> = sqlx::query_scalar(&sql)
        .bind(user_id)
        .bind(diet_ids)
        .fetch_all(db)
        .await?;
    Ok(ids)
}

/// Active ingredients of the given diets, in diet order then insertion order,
/// shaped for aggregation.
pub async fn collect_ingredient_lines(
    conn: &mut PgConnection,
    diet_ids: &[Uuid],
) -> anyhow::Result<Vec<crate::shopping::aggregate::IngredientLine>> {
    #[derive(FromRow)]
    struct Line {
        name: String,
        category: Option<String>,
        unit_id: Uuid,
        amount_in_base_unit: Decimal,
    }

    let rows = sqlx::query_as::<_, Line>(
        r#"
        SELECT i.name, c.name AS category, i.unit_id, i.amount_in_base_unit
        FROM ingredients i
        LEFT JOIN ingredient_categories c ON c.id = i.category_id
        WHERE i.diet_id = ANY($1) AND i.is_active
        ORDER BY array_position($1, i.diet_id), i.created_at
        "#,
    )
    .bind(diet_ids)
    .fetch_all(conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|l| crate::shopping::aggregate::IngredientLine {
            name: l.name,
            category: l.category,
            unit_id: l.unit_id,
            amount_in_base_unit: l.amount_in_base_unit,
        })
        .collect())
}
