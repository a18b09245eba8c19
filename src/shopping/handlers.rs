use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    shopping::{
        dto::{
            CreateShoppingListRequest, ShoppingListDetailResponse, ShoppingListItemResponse,
            ShoppingListQuery, ShoppingListResponse, UpdateItemRequest, UpdateShoppingListRequest,
        },
        repo, services,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shopping-lists", get(list_lists).post(create_list))
        .route(
            "/shopping-lists/:id",
            get(get_list).patch(update_list).put(update_list).delete(delete_list),
        )
        .route("/shopping-lists/:id/regenerate", post(regenerate_list))
        .route("/shopping-lists/:id/complete", post(complete_list))
        .route("/shopping-lists/:id/uncomplete", post(uncomplete_list))
        .route("/shopping-lists/:id/items", get(list_items))
        .route(
            "/shopping-lists/:id/items/:item_id",
            get(get_item).patch(update_item),
        )
        .route("/shopping-lists/:id/items/:item_id/check", post(check_item))
}

/// Loads the list and enforces visibility. Inaccessible ids read as missing.
async fn load_list(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
) -> Result<repo::ShoppingListRow, ApiError> {
    let list = repo::find(&state.db, id).await?.ok_or(ApiError::NotFound)?;
    if !repo::can_access(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(list)
}

async fn detail(
    state: &AppState,
    list: repo::ShoppingListRow,
) -> Result<ShoppingListDetailResponse, ApiError> {
    let diets_info = repo::diets_info(&state.db, list.id).await?;
    let items = repo::items(&state.db, list.id).await?;
    Ok(ShoppingListDetailResponse {
        diets: diets_info.iter().map(|d| d.id).collect(),
        diets_info: diets_info.into_iter().map(Into::into).collect(),
        items: items.into_iter().map(Into::into).collect(),
        list: list.into(),
    })
}

#[instrument(skip(state))]
async fn list_lists(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ShoppingListQuery>,
) -> Result<Json<Vec<ShoppingListResponse>>, ApiError> {
    let rows = repo::list_for_user(&state.db, user_id, q.is_completed).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
async fn create_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateShoppingListRequest>,
) -> Result<(StatusCode, Json<ShoppingListDetailResponse>), ApiError> {
    let id = services::generate(&state.db, user_id, payload).await?;
    let list = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("shopping list vanished after insert"))?;
    Ok((StatusCode::CREATED, Json(detail(&state, list).await?)))
}

#[instrument(skip(state))]
async fn get_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ShoppingListDetailResponse>, ApiError> {
    let list = load_list(&state, user_id, id).await?;
    Ok(Json(detail(&state, list).await?))
}

#[instrument(skip(state, payload))]
async fn update_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateShoppingListRequest>,
) -> Result<Json<ShoppingListDetailResponse>, ApiError> {
    let list = load_list(&state, user_id, id).await?;
    services::update_list(&state.db, user_id, &list, payload).await?;
    let refreshed = repo::find(&state.db, id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(detail(&state, refreshed).await?))
}

#[instrument(skip(state))]
async fn delete_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let list = load_list(&state, user_id, id).await?;
    repo::soft_delete(&state.db, list.id).await?;
    info!(list_id = %list.id, "shopping list soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
async fn regenerate_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ShoppingListDetailResponse>, ApiError> {
    let list = load_list(&state, user_id, id).await?;
    services::regenerate(&state.db, &list).await?;
    let refreshed = repo::find(&state.db, id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(detail(&state, refreshed).await?))
}

#[instrument(skip(state))]
async fn complete_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ShoppingListResponse>, ApiError> {
    set_completed(&state, user_id, id, true).await
}

#[instrument(skip(state))]
async fn uncomplete_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ShoppingListResponse>, ApiError> {
    set_completed(&state, user_id, id, false).await
}

async fn set_completed(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    completed: bool,
) -> Result<Json<ShoppingListResponse>, ApiError> {
    let list = load_list(state, user_id, id).await?;
    repo::set_completed(&state.db, list.id, completed).await?;
    let refreshed = repo::find(&state.db, id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(refreshed.into()))
}

#[instrument(skip(state))]
async fn list_items(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ShoppingListItemResponse>>, ApiError> {
    let list = load_list(&state, user_id, id).await?;
    let items = repo::items(&state.db, list.id).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
async fn get_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ShoppingListItemResponse>, ApiError> {
    let list = load_list(&state, user_id, id).await?;
    let item = repo::find_item(&state.db, list.id, item_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(item.into()))
}

#[instrument(skip(state, payload))]
async fn update_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<Json<ShoppingListItemResponse>, ApiError> {
    let list = load_list(&state, user_id, id).await?;
    let item = repo::find_item(&state.db, list.id, item_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    if let Some(checked) = payload.is_checked {
        repo::set_item_checked(&state.db, item.id, checked).await?;
    }
    let refreshed = repo::find_item(&state.db, list.id, item_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(refreshed.into()))
}

/// Flips the checked flag, the common interaction while shopping.
#[instrument(skip(state))]
async fn check_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ShoppingListItemResponse>, ApiError> {
    let list = load_list(&state, user_id, id).await?;
    let item = repo::find_item(&state.db, list.id, item_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    repo::toggle_item_checked(&state.db, item.id).await?;
    let refreshed = repo::find_item(&state.db, list.id, item_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(refreshed.into()))
}
