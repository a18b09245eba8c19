use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    access::{repo as access, AccessPolicy, Operation},
    animals::{
        dto::{AnimalListQuery, AnimalResponse, CreateAnimalRequest, UpdateAnimalRequest},
        repo,
    },
    auth::AuthUser,
    dictionaries::repo::AnimalType,
    error::ApiError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/animals", get(list_animals).post(create_animal))
        .route(
            "/animals/:id",
            get(get_animal)
                .patch(update_animal)
                .put(update_animal)
                .delete(delete_animal),
        )
        .route("/animals/:id/restore", post(restore_animal))
}

#[instrument(skip(state))]
async fn list_animals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<AnimalListQuery>,
) -> Result<Json<Vec<AnimalResponse>>, ApiError> {
    let rows = repo::list_accessible(
        &state.db,
        user_id,
        q.active,
        q.species_id,
        q.search.as_deref(),
    )
    .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
async fn get_animal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AnimalResponse>, ApiError> {
    access::require(&state.db, user_id, id, Operation::Read, AccessPolicy::SHARED).await?;
    let row = repo::find(&state.db, id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, payload))]
async fn create_animal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateAnimalRequest>,
) -> Result<(StatusCode, Json<AnimalResponse>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("name", "Name must not be empty."));
    }
    if let Some(weight) = payload.weight_kg {
        if weight <= rust_decimal::Decimal::ZERO {
            return Err(ApiError::validation("weight_kg", "Weight must be positive."));
        }
    }
    if AnimalType::find(&state.db, payload.species_id).await?.is_none() {
        return Err(ApiError::validation("species_id", "Unknown species."));
    }

    let row = repo::create(
        &state.db,
        user_id,
        payload.species_id,
        payload.name.trim(),
        payload.date_of_birth,
        payload.weight_kg,
        &payload.note,
    )
    .await?;

    info!(animal_id = %row.id, "animal created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

#[instrument(skip(state, payload))]
async fn update_animal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAnimalRequest>,
) -> Result<Json<AnimalResponse>, ApiError> {
    access::require(&state.db, user_id, id, Operation::Write, AccessPolicy::SHARED).await?;

    if let Some(name) = payload.name.as_deref() {
        if name.trim().is_empty() {
            return Err(ApiError::validation("name", "Name must not be empty."));
        }
    }
    if let Some(Some(weight)) = payload.weight_kg {
        if weight <= rust_decimal::Decimal::ZERO {
            return Err(ApiError::validation("weight_kg", "Weight must be positive."));
        }
    }
    if let Some(species_id) = payload.species_id {
        if AnimalType::find(&state.db, species_id).await?.is_none() {
            return Err(ApiError::validation("species_id", "Unknown species."));
        }
    }

    let row = repo::update(
        &state.db,
        id,
        payload.species_id,
        payload.name.as_deref().map(str::trim),
        payload.date_of_birth,
        payload.weight_kg,
        payload.note.as_deref(),
    )
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
async fn delete_animal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    access::require(&state.db, user_id, id, Operation::Delete, AccessPolicy::SHARED).await?;
    repo::soft_delete(&state.db, id).await?;
    info!(animal_id = %id, "animal soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
async fn restore_animal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AnimalResponse>, ApiError> {
    // Deletion and restore are both destructive-side operations: owner only.
    access::require(&state.db, user_id, id, Operation::Delete, AccessPolicy::OWNER_ONLY).await?;
    repo::restore(&state.db, id).await?;
    let row = repo::find(&state.db, id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(row.into()))
}
