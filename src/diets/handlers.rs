use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    access::{repo as access, AccessPolicy, Operation},
    auth::AuthUser,
    diets::{
        dto::{
            CreateDietRequest, DietDetailResponse, DietListQuery, DietResponse, UpdateDietRequest,
        },
        repo, services,
    },
    error::ApiError,
    ingredients,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/diets", get(list_diets).post(create_diet))
        .route(
            "/diets/:id",
            get(get_diet)
                .patch(update_diet)
                .put(update_diet)
                .delete(delete_diet),
        )
}

#[instrument(skip(state))]
async fn list_diets(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DietListQuery>,
) -> Result<Json<Vec<DietResponse>>, ApiError> {
    let rows = repo::list_accessible(
        &state.db,
        user_id,
        q.animal_id,
        q.active,
        q.start_date_gte,
        q.end_date_lte,
    )
    .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
async fn get_diet(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DietDetailResponse>, ApiError> {
    access::require_for_diet(&state.db, user_id, id, Operation::Read, AccessPolicy::SHARED)
        .await?;
    let row = repo::find(&state.db, id).await?.ok_or(ApiError::NotFound)?;
    let items = ingredients::repo::list_for_diet(&state.db, id, None, None, None).await?;
    Ok(Json(DietDetailResponse {
        diet: row.into(),
        ingredients: items.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(state, payload))]
async fn create_diet(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateDietRequest>,
) -> Result<(StatusCode, Json<DietResponse>), ApiError> {
    // The diet does not exist yet, so the permission check targets the
    // parent animal; EDIT collaborators may create.
    access::require(
        &state.db,
        user_id,
        payload.animal_id,
        Operation::Create,
        AccessPolicy::SHARED_WITH_CREATE,
    )
    .await?;

    services::validate_date_range(payload.start_date, payload.end_date)?;

    let row = repo::create(
        &state.db,
        payload.animal_id,
        payload.start_date,
        payload.end_date,
        &payload.description,
    )
    .await?;
    info!(diet_id = %row.id, animal_id = %payload.animal_id, "diet created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

#[instrument(skip(state, payload))]
async fn update_diet(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDietRequest>,
) -> Result<Json<DietResponse>, ApiError> {
    access::require_for_diet(&state.db, user_id, id, Operation::Write, AccessPolicy::SHARED)
        .await?;

    let existing = repo::find(&state.db, id).await?.ok_or(ApiError::NotFound)?;
    let start = payload.start_date.unwrap_or(existing.start_date);
    let end = match payload.end_date {
        Some(end) => end,
        None => existing.end_date,
    };
    services::validate_date_range(start, end)?;

    let row = repo::update(
        &state.db,
        id,
        payload.start_date,
        payload.end_date,
        payload.description.as_deref(),
    )
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
async fn delete_diet(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    access::require_for_diet(&state.db, user_id, id, Operation::Delete, AccessPolicy::SHARED)
        .await?;
    repo::soft_delete(&state.db, id).await?;
    info!(diet_id = %id, "diet soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}
