use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    access::{repo as access, AccessPolicy, Operation, PermissionLevel},
    auth::{repo::User, AuthUser},
    collaborations::{
        dto::{CollaborationResponse, CreateCollaborationRequest, UpdateCollaborationRequest},
        repo, services,
    },
    error::ApiError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/animals/:animal_id/collaborations",
            get(list_collaborations).post(create_collaboration),
        )
        .route(
            "/animals/:animal_id/collaborations/:id",
            get(get_collaboration)
                .patch(update_collaboration)
                .delete(delete_collaboration),
        )
}

/// Collaboration management is owner-only across the board.
async fn require_owner(
    state: &AppState,
    user_id: Uuid,
    animal_id: Uuid,
    op: Operation,
) -> Result<(), ApiError> {
    access::require(&state.db, user_id, animal_id, op, AccessPolicy::OWNER_ONLY).await?;
    Ok(())
}

#[instrument(skip(state))]
async fn list_collaborations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(animal_id): Path<Uuid>,
) -> Result<Json<Vec<CollaborationResponse>>, ApiError> {
    require_owner(&state, user_id, animal_id, Operation::Read).await?;
    let rows = repo::list_for_animal(&state.db, animal_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
async fn create_collaboration(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(animal_id): Path<Uuid>,
    Json(payload): Json<CreateCollaborationRequest>,
) -> Result<(StatusCode, Json<CollaborationResponse>), ApiError> {
    require_owner(&state, user_id, animal_id, Operation::Create).await?;

    if User::find_by_id(&state.db, payload.user_id).await?.is_none() {
        return Err(ApiError::validation("user_id", "Unknown user."));
    }
    let permission = payload.permission.unwrap_or(PermissionLevel::ReadOnly);
    if permission == PermissionLevel::Owner {
        return Err(ApiError::validation(
            "permission",
            "Permission must be EDIT or READ_ONLY.",
        ));
    }

    let row =
        services::create_collaboration(&state.db, animal_id, user_id, payload.user_id, permission)
            .await?;
    info!(collaboration_id = %row.id, animal_id = %animal_id, "collaboration created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

#[instrument(skip(state))]
async fn get_collaboration(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((animal_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CollaborationResponse>, ApiError> {
    require_owner(&state, user_id, animal_id, Operation::Read).await?;
    let row = repo::find(&state.db, id)
        .await?
        .filter(|c| c.animal_id == animal_id)
        .ok_or(ApiError::NotFound)?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, payload))]
async fn update_collaboration(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((animal_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateCollaborationRequest>,
) -> Result<Json<CollaborationResponse>, ApiError> {
    require_owner(&state, user_id, animal_id, Operation::Write).await?;

    if payload.permission == PermissionLevel::Owner {
        return Err(ApiError::validation(
            "permission",
            "Permission must be EDIT or READ_ONLY.",
        ));
    }

    let existing = repo::find(&state.db, id)
        .await?
        .filter(|c| c.animal_id == animal_id)
        .ok_or(ApiError::NotFound)?;

    let row = repo::update_permission(&state.db, existing.id, payload.permission)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
async fn delete_collaboration(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((animal_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    require_owner(&state, user_id, animal_id, Operation::Delete).await?;
    let existing = repo::find(&state.db, id)
        .await?
        .filter(|c| c.animal_id == animal_id)
        .ok_or(ApiError::NotFound)?;
    repo::soft_delete(&state.db, existing.id).await?;
    info!(collaboration_id = %id, "collaboration soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}
