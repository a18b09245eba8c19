use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    conversion,
    dictionaries::repo::Unit,
    diets::services::recalculate_diet_total,
    error::ApiError,
    ingredients::{
        dto::{CreateIngredientRequest, UpdateIngredientRequest},
        repo::{self, IngredientRow},
    },
};

const MIN_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 3); // 0.001

fn validate_amount(amount: Decimal) -> Result<(), ApiError> {
    if amount < MIN_AMOUNT {
        return Err(ApiError::validation(
            "amount",
            "Amount must be at least 0.001.",
        ));
    }
    Ok(())
}

async fn resolve_unit(db: &PgPool, unit_id: Uuid) -> Result<Unit, ApiError> {
    Unit::find(db, unit_id)
        .await?
        .ok_or_else(|| ApiError::validation("unit_id", "Unknown unit."))
}

async fn check_category(db: &PgPool, category_id: Option<Uuid>) -> Result<(), ApiError> {
    if let Some(id) = category_id {
        if crate::dictionaries::repo::IngredientCategory::find(db, id)
            .await?
            .is_none()
        {
            return Err(ApiError::validation("category_id", "Unknown category."));
        }
    }
    Ok(())
}

/// Creates an ingredient and recomputes the diet total in one transaction.
/// The diet row is locked for the duration so concurrent mutations on the
/// same diet serialize instead of racing the recompute.
pub async fn create_ingredient(
    db: &PgPool,
    diet_id: Uuid,
    payload: CreateIngredientRequest,
) -> Result<IngredientRow, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("name", "Name must not be empty."));
    }
    validate_amount(payload.amount)?;
    let unit = resolve_unit(db, payload.unit_id).await?;
    check_category(db, payload.category_id).await?;

    let base_amount = conversion::to_base_unit(payload.amount, unit.conversion_factor);

    let mut tx = db.begin().await?;
    repo::lock_diet(&mut *tx, diet_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let id = repo::insert(
        &mut *tx,
        diet_id,
        payload.name.trim(),
        payload.category_id,
        payload.cooking_method.as_db(),
        unit.id,
        payload.amount,
        base_amount,
    )
    .await?;
    recalculate_diet_total(&mut *tx, diet_id).await?;
    tx.commit().await?;

    info!(ingredient_id = %id, diet_id = %diet_id, "ingredient created");
    let row = repo::find(db, id).await?;
    row.ok_or_else(|| anyhow::anyhow!("ingredient vanished after insert").into())
}

/// Updates an ingredient; `amount_in_base_unit` is recomputed from the
/// effective amount and unit, then the diet total follows in the same
/// transaction.
pub async fn update_ingredient(
    db: &PgPool,
    existing: &IngredientRow,
    payload: UpdateIngredientRequest,
) -> Result<IngredientRow, ApiError> {
    if let Some(name) = payload.name.as_deref() {
        if name.trim().is_empty() {
            return Err(ApiError::validation("name", "Name must not be empty."));
        }
    }

    let amount = payload.amount.unwrap_or(existing.amount);
    validate_amount(amount)?;
    let unit_id = payload.unit_id.unwrap_or(existing.unit_id);
    let unit = resolve_unit(db, unit_id).await?;
    // only a newly assigned category needs validating; Some(None) detaches
    check_category(db, payload.category_id.flatten()).await?;

    let base_amount = conversion::to_base_unit(amount, unit.conversion_factor);

    let mut tx = db.begin().await?;
    repo::lock_diet(&mut *tx, existing.diet_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let updated = repo::update(
        &mut *tx,
        existing.id,
        payload.name.as_deref().map(str::trim),
        payload.category_id,
        payload.cooking_method.map(|m| m.as_db()),
        unit.id,
        amount,
        base_amount,
    )
    .await?;
    if !updated {
        return Err(ApiError::NotFound);
    }
    recalculate_diet_total(&mut *tx, existing.diet_id).await?;
    tx.commit().await?;

    let row = repo::find(db, existing.id).await?;
    row.ok_or(ApiError::NotFound)
}

/// Soft-deletes an ingredient and recomputes the diet total in the same
/// transaction. Deleting an already-deleted or missing ingredient is a no-op.
pub async fn delete_ingredient(db: &PgPool, ingredient: &IngredientRow) -> Result<bool, ApiError> {
    let mut tx = db.begin().await?;
    repo::lock_diet(&mut *tx, ingredient.diet_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let deleted = repo::soft_delete(&mut *tx, ingredient.id).await?;
    recalculate_diet_total(&mut *tx, ingredient.diet_id).await?;
    tx.commit().await?;

    if deleted {
        info!(ingredient_id = %ingredient.id, diet_id = %ingredient.diet_id, "ingredient soft-deleted");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_amount_constant_is_one_thousandth() {
        assert_eq!(MIN_AMOUNT.to_string(), "0.001");
    }

    #[test]
    fn amounts_below_minimum_are_rejected() {
        assert!(validate_amount(Decimal::new(5, 4)).is_err()); // 0.0005
        assert!(validate_amount(Decimal::ZERO).is_err());
        assert!(validate_amount(Decimal::new(1, 3)).is_ok()); // exactly 0.001
        assert!(validate_amount(Decimal::from(500)).is_ok());
    }
}
