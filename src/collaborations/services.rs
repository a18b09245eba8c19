use sqlx::PgPool;
use uuid::Uuid;

use crate::access::PermissionLevel;
use crate::collaborations::repo::{self, CollaborationRow};
use crate::error::ApiError;

/// Domain validation for adding a collaborator. Pure so the rules are
/// testable without a database.
pub fn validate_collaboration(
    owner_id: Uuid,
    target_user_id: Uuid,
    has_active_collaboration: bool,
) -> Result<(), ApiError> {
    if owner_id == target_user_id {
        return Err(ApiError::domain(
            "The owner cannot be added as a collaborator.",
        ));
    }
    if has_active_collaboration {
        return Err(ApiError::domain(
            "This user already has an active collaboration with this animal.",
        ));
    }
    Ok(())
}

/// Validates and creates a collaboration. The owner may never appear as a
/// collaborator of their own animal, and at most one active collaboration
/// exists per (animal, user) pair.
pub async fn create_collaboration(
    db: &PgPool,
    animal_id: Uuid,
    owner_id: Uuid,
    target_user_id: Uuid,
    permission: PermissionLevel,
) -> Result<CollaborationRow, ApiError> {
    let has_active = repo::has_active(db, animal_id, target_user_id).await?;
    validate_collaboration(owner_id, target_user_id, has_active)?;

    let row = repo::create(db, animal_id, target_user_id, permission).await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_cannot_collaborate_on_own_animal() {
        let owner = Uuid::new_v4();
        let err = validate_collaboration(owner, owner, false).unwrap_err();
        assert!(matches!(err, ApiError::Domain(_)));
    }

    #[test]
    fn duplicate_active_collaboration_rejected() {
        let err = validate_collaboration(Uuid::new_v4(), Uuid::new_v4(), true).unwrap_err();
        assert!(matches!(err, ApiError::Domain(_)));
    }

    #[test]
    fn fresh_collaboration_passes() {
        // a deactivated earlier collaboration does not count as active
        assert!(validate_collaboration(Uuid::new_v4(), Uuid::new_v4(), false).is_ok());
    }
}
