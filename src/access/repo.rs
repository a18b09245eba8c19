//! Database-facing half of access resolution.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;

use super::{resolve_level, AccessPolicy, Operation, PermissionLevel};

/// Resolves the caller's level for an animal, or `None` when the animal does
/// not exist or the caller has no relation to it.
pub async fn level_for_animal(
    db: &PgPool,
    user_id: Uuid,
    animal_id: Uuid,
) -> Result<Option<PermissionLevel>, ApiError> {
    // No is_active filter: permission on a soft-deleted animal resolves the
    // same as on a live one.
    let owner_id: Option<Uuid> = sqlx::query_scalar("SELECT owner_id FROM animals WHERE id = $1")
        .bind(animal_id)
        .fetch_optional(db)
        .await?;

    let Some(owner_id) = owner_id else {
        return Ok(None);
    };

    if owner_id == user_id {
        return Ok(resolve_level(owner_id, user_id, None));
    }

    let permission: Option<String> = sqlx::query_scalar(
        r#"
        SELECT permission
        FROM collaborations
        WHERE animal_id = $1 AND user_id = $2 AND is_active
        "#,
    )
    .bind(animal_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(resolve_level(
        owner_id,
        user_id,
        permission.as_deref().and_then(PermissionLevel::from_db),
    ))
}

/// Diet-to-animal extraction for diet-scoped permission checks. An unknown
/// id yields `None`, which callers treat as not-found.
pub async fn animal_of_diet(db: &PgPool, diet_id: Uuid) -> Result<Option<Uuid>, ApiError> {
    let id = sqlx::query_scalar("SELECT animal_id FROM diets WHERE id = $1")
        .bind(diet_id)
        .fetch_optional(db)
        .await?;
    Ok(id)
}

/// Guard used by every object-level handler: resolves the caller's level for
/// the animal and applies the policy.
///
/// Zero visibility maps to [`ApiError::NotFound`] so existence never leaks;
/// a visible resource with a denied operation maps to [`ApiError::Forbidden`].
pub async fn require(
    db: &PgPool,
    user_id: Uuid,
    animal_id: Uuid,
    op: Operation,
    policy: AccessPolicy,
) -> Result<PermissionLevel, ApiError> {
    match level_for_animal(db, user_id, animal_id).await? {
        None => Err(ApiError::NotFound),
        Some(level) if policy.allows(Some(level), op) => Ok(level),
        Some(_) => Err(ApiError::Forbidden),
    }
}

/// [`require`] for a diet-scoped resource: extract the animal first.
pub async fn require_for_diet(
    db: &PgPool,
    user_id: Uuid,
    diet_id: Uuid,
    op: Operation,
    policy: AccessPolicy,
) -> Result<PermissionLevel, ApiError> {
    let animal_id = animal_of_diet(db, diet_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    require(db, user_id, animal_id, op, policy).await
}
