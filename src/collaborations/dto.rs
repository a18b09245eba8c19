use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::access::PermissionLevel;
use crate::collaborations::repo::CollaborationRow;

#[derive(Debug, Deserialize)]
pub struct CreateCollaborationRequest {
    pub user_id: Uuid,
    pub permission: Option<PermissionLevel>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCollaborationRequest {
    pub permission: PermissionLevel,
}

#[derive(Debug, Serialize)]
pub struct CollaborationResponse {
    pub id: Uuid,
    pub animal: Uuid,
    pub animal_name: String,
    pub user: Uuid,
    pub user_email: String,
    pub permission: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<CollaborationRow> for CollaborationResponse {
    fn from(c: CollaborationRow) -> Self {
        Self {
            id: c.id,
            animal: c.animal_id,
            animal_name: c.animal_name,
            user: c.user_id,
            user_email: c.user_email,
            permission: c.permission,
            is_active: c.is_active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}
