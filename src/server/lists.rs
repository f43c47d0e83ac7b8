//! CRUD handlers for to-do lists, mounted under `/api/lists`.
//!
//! Deleting a list does not delete its items.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::error::{require_text, ApiError, ErrorBody};
use super::storage::Collection;
use super::AppState;
use crate::models::{Item, List, ListPatch, ListWithItems, NewList};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_lists).post(create_list))
        .route("/{id}", get(get_list).put(update_list).delete(delete_list))
}

/// Returns all to-do lists.
#[utoipa::path(
    get,
    path = "/api/lists",
    tag = "To-do Lists",
    responses(
        (status = 200, description = "The array with all to-do lists", body = Vec<List>)
    )
)]
pub async fn list_lists(State(state): State<AppState>) -> Json<Vec<List>> {
    Json(state.store.all::<List>().await)
}

/// Gets a to-do list by id, including its items.
#[utoipa::path(
    get,
    path = "/api/lists/{id}",
    tag = "To-do Lists",
    params(("id" = String, Path, description = "The list ID")),
    responses(
        (status = 200, description = "The to-do list by id", body = ListWithItems),
        (status = 404, description = "List not found", body = ErrorBody)
    )
)]
pub async fn get_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ListWithItems>, ApiError> {
    let Some(list) = state.store.find::<List>(&id).await else {
        return Err(ApiError::NotFound(Collection::Lists, id));
    };

    let items = state.store.filter(|item: &Item| item.list_id == id).await;

    Ok(Json(ListWithItems { list, items }))
}

/// Creates a new to-do list.
#[utoipa::path(
    post,
    path = "/api/lists",
    tag = "To-do Lists",
    request_body = NewList,
    responses(
        (status = 200, description = "List successfully created", body = List),
        (status = 400, description = "Missing title", body = ErrorBody),
        (status = 500, description = "Some server error", body = ErrorBody)
    )
)]
pub async fn create_list(
    State(state): State<AppState>,
    payload: Result<Json<NewList>, JsonRejection>,
) -> Result<Json<List>, ApiError> {
    let Json(new_list) = payload?;

    let title = require_text(new_list.title, "title")?;
    let list = state
        .store
        .insert(List::new(title).with_completed_at(new_list.completed_at))
        .await?;

    tracing::info!("Created list {}", list.id);
    Ok(Json(list))
}

/// Updates a list by id. Only the fields present in the body change.
#[utoipa::path(
    put,
    path = "/api/lists/{id}",
    tag = "To-do Lists",
    params(("id" = String, Path, description = "The list ID")),
    request_body = ListPatch,
    responses(
        (status = 200, description = "List successfully modified", body = List),
        (status = 400, description = "Empty title", body = ErrorBody),
        (status = 404, description = "List not found", body = ErrorBody),
        (status = 500, description = "Some server error", body = ErrorBody)
    )
)]
pub async fn update_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ListPatch>, JsonRejection>,
) -> Result<Json<List>, ApiError> {
    let Json(mut patch) = payload?;

    if !state.store.contains::<List>(&id).await {
        return Err(ApiError::NotFound(Collection::Lists, id));
    }
    if let Some(title) = patch.title.take() {
        patch.title = Some(require_text(Some(title), "title")?);
    }

    let list = state
        .store
        .merge::<List>(&id, patch)
        .await?
        .ok_or(ApiError::NotFound(Collection::Lists, id))?;

    tracing::info!("Updated list {}", list.id);
    Ok(Json(list))
}

/// Removes a list by id. Items referencing it are kept.
#[utoipa::path(
    delete,
    path = "/api/lists/{id}",
    tag = "To-do Lists",
    params(("id" = String, Path, description = "The list ID")),
    responses(
        (status = 200, description = "List successfully removed"),
        (status = 404, description = "List not found", body = ErrorBody),
        (status = 500, description = "Some server error", body = ErrorBody)
    )
)]
pub async fn delete_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.store.remove::<List>(&id).await? {
        Some(list) => {
            tracing::info!("Deleted list {}", list.id);
            Ok(StatusCode::OK)
        }
        None => Err(ApiError::NotFound(Collection::Lists, id)),
    }
}
