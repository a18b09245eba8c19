use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::ApiError,
    shopping::{
        aggregate,
        dto::{CreateShoppingListRequest, UpdateShoppingListRequest},
        repo::{self, ShoppingListRow},
    },
};

pub fn default_title(days_count: i32) -> String {
    format!("Shopping list ({days_count} days)")
}

fn validate_days(days_count: i32) -> Result<(), ApiError> {
    if days_count < 1 {
        return Err(ApiError::validation(
            "days_count",
            "Days count must be at least 1.",
        ));
    }
    Ok(())
}

/// The requested diet set must yield at least one generatable diet.
fn ensure_generatable(diet_ids: &[Uuid]) -> Result<(), ApiError> {
    if diet_ids.is_empty() {
        return Err(ApiError::domain("No active diets found."));
    }
    Ok(())
}

/// Builds the consolidated items for the list's current active diet set and
/// stores them, replacing whatever items the list had. A list whose diets
/// have all been soft-deleted since creation rebuilds to an empty item set.
async fn rebuild_items(
    conn: &mut PgConnection,
    list_id: Uuid,
    days_count: i32,
) -> Result<(), ApiError> {
    repo::deactivate_items(&mut *conn, list_id).await?;
    let diet_ids = repo::active_diet_ids(&mut *conn, list_id).await?;
    if diet_ids.is_empty() {
        return Ok(());
    }
    let lines = repo::collect_ingredient_lines(&mut *conn, &diet_ids).await?;
    let items = aggregate::aggregate(&lines, days_count);
    repo::insert_items(&mut *conn, list_id, &items).await?;
    Ok(())
}

/// Creates a shopping list from the requested diets. Only active diets on
/// animals the user can access count; an empty effective set is a domain
/// error, not a silent empty list.
pub async fn generate(
    db: &PgPool,
    user_id: Uuid,
    payload: CreateShoppingListRequest,
) -> Result<Uuid, ApiError> {
    validate_days(payload.days_count)?;
    if payload.diets.is_empty() {
        return Err(ApiError::validation(
            "diets",
            "At least one diet is required.",
        ));
    }

    let diet_ids = repo::resolve_generatable_diets(db, user_id, &payload.diets).await?;
    ensure_generatable(&diet_ids)?;

    let title = match payload.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => default_title(payload.days_count),
    };

    let mut tx = db.begin().await?;
    let list_id = repo::insert_list(&mut *tx, user_id, &title, payload.days_count).await?;
    repo::link_diets(&mut *tx, list_id, &diet_ids).await?;
    rebuild_items(&mut *tx, list_id, payload.days_count).await?;
    tx.commit().await?;

    info!(list_id = %list_id, diets = diet_ids.len(), "shopping list generated");
    Ok(list_id)
}

/// Rebuilds the list's items against its current diet set. A regenerated
/// list is implicitly incomplete again.
pub async fn regenerate(db: &PgPool, list: &ShoppingListRow) -> Result<(), ApiError> {
    let mut tx = db.begin().await?;
    repo::lock_list(&mut *tx, list.id)
        .await?
        .ok_or(ApiError::NotFound)?;
    rebuild_items(&mut *tx, list.id, list.days_count).await?;
    sqlx::query(
        "UPDATE shopping_lists SET is_completed = FALSE, updated_at = now() WHERE id = $1",
    )
    .bind(list.id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    info!(list_id = %list.id, "shopping list regenerated");
    Ok(())
}

/// Updates title, days count and diet set. Changing the days count or the
/// diet set regenerates the items and clears completion; a title-only change
/// leaves the items alone.
pub async fn update_list(
    db: &PgPool,
    user_id: Uuid,
    list: &ShoppingListRow,
    payload: UpdateShoppingListRequest,
) -> Result<(), ApiError> {
    if let Some(days) = payload.days_count {
        validate_days(days)?;
    }

    let new_diets = match &payload.diets {
        Some(requested) => {
            if requested.is_empty() {
                return Err(ApiError::validation(
                    "diets",
                    "At least one diet is required.",
                ));
            }
            let resolved = repo::resolve_generatable_diets(db, user_id, requested).await?;
            ensure_generatable(&resolved)?;
            Some(resolved)
        }
        None => None,
    };

    let days_changed = payload
        .days_count
        .is_some_and(|days| days != list.days_count);

    let mut tx = db.begin().await?;
    repo::lock_list(&mut *tx, list.id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut diets_changed = false;
    if let Some(diet_ids) = &new_diets {
        let current = repo::active_diet_ids(&mut *tx, list.id).await?;
        let mut requested_sorted = diet_ids.clone();
        requested_sorted.sort_unstable();
        let mut current_sorted = current;
        current_sorted.sort_unstable();
        diets_changed = requested_sorted != current_sorted;
        if diets_changed {
            repo::unlink_diets(&mut *tx, list.id).await?;
            repo::link_diets(&mut *tx, list.id, diet_ids).await?;
        }
    }

    repo::update_meta(
        &mut *tx,
        list.id,
        payload.title.as_deref().map(str::trim),
        payload.days_count,
    )
    .await?;

    if days_changed || diets_changed {
        let days = payload.days_count.unwrap_or(list.days_count);
        rebuild_items(&mut *tx, list.id, days).await?;
        sqlx::query(
            "UPDATE shopping_lists SET is_completed = FALSE, updated_at = now() WHERE id = $1",
        )
        .bind(list.id)
        .execute(&mut *tx)
        .await?;
        info!(list_id = %list.id, "shopping list regenerated");
    }

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_title_mentions_the_horizon() {
        assert_eq!(default_title(7), "Shopping list (7 days)");
        assert_eq!(default_title(1), "Shopping list (1 days)");
    }

    #[test]
    fn generation_requires_a_nonempty_resolved_diet_set() {
        assert!(matches!(
            ensure_generatable(&[]).unwrap_err(),
            ApiError::Domain(_)
        ));
        assert!(ensure_generatable(&[Uuid::new_v4()]).is_ok());
    }

    #[test]
    fn days_count_must_be_positive() {
        assert!(validate_days(0).is_err());
        assert!(validate_days(-3).is_err());
        assert!(validate_days(1).is_ok());
        assert!(validate_days(30).is_ok());
    }
}
