use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    access::{repo as access, AccessPolicy, Operation},
    auth::AuthUser,
    error::ApiError,
    ingredients::{
        dto::{
            CreateIngredientRequest, IngredientListQuery, IngredientResponse,
            UpdateIngredientRequest,
        },
        repo, services,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/diets/:diet_id/ingredients",
            get(list_ingredients).post(create_ingredient),
        )
        .route(
            "/diets/:diet_id/ingredients/:id",
            get(get_ingredient)
                .patch(update_ingredient)
                .put(update_ingredient)
                .delete(delete_ingredient),
        )
}

/// Loads the ingredient and verifies it belongs to the diet in the path.
async fn load_scoped(
    state: &AppState,
    diet_id: Uuid,
    id: Uuid,
) -> Result<repo::IngredientRow, ApiError> {
    repo::find(&state.db, id)
        .await?
        .filter(|i| i.diet_id == diet_id)
        .ok_or(ApiError::NotFound)
}

#[instrument(skip(state))]
async fn list_ingredients(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(diet_id): Path<Uuid>,
    Query(q): Query<IngredientListQuery>,
) -> Result<Json<Vec<IngredientResponse>>, ApiError> {
    access::require_for_diet(&state.db, user_id, diet_id, Operation::Read, AccessPolicy::SHARED)
        .await?;
    let rows = repo::list_for_diet(
        &state.db,
        diet_id,
        q.category_id,
        q.cooking_method.map(|m| m.as_db()),
        q.search.as_deref(),
    )
    .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
async fn get_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((diet_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<IngredientResponse>, ApiError> {
    access::require_for_diet(&state.db, user_id, diet_id, Operation::Read, AccessPolicy::SHARED)
        .await?;
    let row = load_scoped(&state, diet_id, id).await?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, payload))]
async fn create_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(diet_id): Path<Uuid>,
    Json(payload): Json<CreateIngredientRequest>,
) -> Result<(StatusCode, Json<IngredientResponse>), ApiError> {
    // The ingredient does not exist yet: the check targets the parent
    // diet's animal, and EDIT collaborators may create.
    access::require_for_diet(
        &state.db,
        user_id,
        diet_id,
        Operation::Create,
        AccessPolicy::SHARED_WITH_CREATE,
    )
    .await?;
    let row = services::create_ingredient(&state.db, diet_id, payload).await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

#[instrument(skip(state, payload))]
async fn update_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((diet_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateIngredientRequest>,
) -> Result<Json<IngredientResponse>, ApiError> {
    access::require_for_diet(&state.db, user_id, diet_id, Operation::Write, AccessPolicy::SHARED)
        .await?;
    let existing = load_scoped(&state, diet_id, id).await?;
    let row = services::update_ingredient(&state.db, &existing, payload).await?;
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
async fn delete_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((diet_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    access::require_for_diet(&state.db, user_id, diet_id, Operation::Delete, AccessPolicy::SHARED)
        .await?;
    let existing = load_scoped(&state, diet_id, id).await?;
    services::delete_ingredient(&state.db, &existing).await?;
    Ok(StatusCode::NO_CONTENT)
}
