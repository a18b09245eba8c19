use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    dictionaries::repo::{AnimalType, IngredientCategory, Unit},
    error::ApiError,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/animal-types", get(list_animal_types))
        .route("/animal-types/:id", get(get_animal_type))
        .route("/units", get(list_units))
        .route("/units/:id", get(get_unit))
        .route("/ingredient-categories", get(list_categories))
        .route("/ingredient-categories/:id", get(get_category))
}

#[instrument(skip(state))]
async fn list_animal_types(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<AnimalType>>, ApiError> {
    Ok(Json(AnimalType::list(&state.db, q.search.as_deref()).await?))
}

#[instrument(skip(state))]
async fn get_animal_type(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AnimalType>, ApiError> {
    let row = AnimalType::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(row))
}

#[instrument(skip(state))]
async fn list_units(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<Unit>>, ApiError> {
    Ok(Json(Unit::list(&state.db, q.search.as_deref()).await?))
}

#[instrument(skip(state))]
async fn get_unit(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Unit>, ApiError> {
    let row = Unit::find(&state.db, id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(row))
}

#[instrument(skip(state))]
async fn list_categories(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<IngredientCategory>>, ApiError> {
    Ok(Json(
        IngredientCategory::list(&state.db, q.search.as_deref()).await?,
    ))
}

#[instrument(skip(state))]
async fn get_category(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<IngredientCategory>, ApiError> {
    let row = IngredientCategory::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(row))
}
