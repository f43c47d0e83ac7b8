//! CRUD handlers for to-do items, mounted under `/api/items`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::error::{require_text, ApiError, ErrorBody};
use super::storage::Collection;
use super::AppState;
use crate::models::{Item, ItemPatch, List, NewItem};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/list/{id}", get(list_items_by_list))
        .route("/{id}", get(get_item).put(update_item).delete(delete_item))
}

/// Fails with a validation error unless `list_id` names an existing list.
async fn ensure_list_exists(state: &AppState, list_id: &str) -> Result<(), ApiError> {
    if state.store.contains::<List>(list_id).await {
        Ok(())
    } else {
        Err(ApiError::Validation(format!("list {} does not exist", list_id)))
    }
}

/// Returns all to-do items.
#[utoipa::path(
    get,
    path = "/api/items",
    tag = "To-do Items",
    responses(
        (status = 200, description = "The list of the to-do items", body = Vec<Item>)
    )
)]
pub async fn list_items(State(state): State<AppState>) -> Json<Vec<Item>> {
    Json(state.store.all::<Item>().await)
}

/// Gets a to-do item by id.
#[utoipa::path(
    get,
    path = "/api/items/{id}",
    tag = "To-do Items",
    params(("id" = String, Path, description = "The item ID")),
    responses(
        (status = 200, description = "The to-do item by id", body = Item),
        (status = 404, description = "Item not found", body = ErrorBody)
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    state
        .store
        .find::<Item>(&id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound(Collection::Items, id))
}

/// Gets the to-do items of a list. Unknown lists yield an empty array.
#[utoipa::path(
    get,
    path = "/api/items/list/{id}",
    tag = "To-do Items",
    params(("id" = String, Path, description = "The list ID")),
    responses(
        (status = 200, description = "The to-do items by list id", body = Vec<Item>)
    )
)]
pub async fn list_items_by_list(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
) -> Json<Vec<Item>> {
    Json(state.store.filter(|item: &Item| item.list_id == list_id).await)
}

/// Creates a new to-do item that belongs to the list with `list_id`.
#[utoipa::path(
    post,
    path = "/api/items",
    tag = "To-do Items",
    request_body = NewItem,
    responses(
        (status = 200, description = "Item successfully created", body = Item),
        (status = 400, description = "Missing label or unknown list_id", body = ErrorBody),
        (status = 500, description = "Some server error", body = ErrorBody)
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<NewItem>, JsonRejection>,
) -> Result<Json<Item>, ApiError> {
    let Json(new_item) = payload?;

    let list_id = require_text(new_item.list_id, "list_id")?;
    ensure_list_exists(&state, &list_id).await?;
    let label = require_text(new_item.label, "label")?;

    let item = Item::new(list_id, label).with_completed_at(new_item.completed_at);
    let item = state.store.insert(item).await?;

    tracing::info!("Created item {} in list {}", item.id, item.list_id);
    Ok(Json(item))
}

/// Updates an item by id. Only the fields present in the body change.
#[utoipa::path(
    put,
    path = "/api/items/{id}",
    tag = "To-do Items",
    params(("id" = String, Path, description = "The item ID")),
    request_body = ItemPatch,
    responses(
        (status = 200, description = "Item successfully modified", body = Item),
        (status = 400, description = "Empty label or unknown list_id", body = ErrorBody),
        (status = 404, description = "Item not found", body = ErrorBody),
        (status = 500, description = "Some server error", body = ErrorBody)
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ItemPatch>, JsonRejection>,
) -> Result<Json<Item>, ApiError> {
    let Json(mut patch) = payload?;

    // An unknown item is 404 even when the body would also fail validation.
    if !state.store.contains::<Item>(&id).await {
        return Err(ApiError::NotFound(Collection::Items, id));
    }
    if let Some(list_id) = patch.list_id.take() {
        let list_id = require_text(Some(list_id), "list_id")?;
        ensure_list_exists(&state, &list_id).await?;
        patch.list_id = Some(list_id);
    }
    if let Some(label) = patch.label.take() {
        patch.label = Some(require_text(Some(label), "label")?);
    }

    let item = state
        .store
        .merge::<Item>(&id, patch)
        .await?
        .ok_or(ApiError::NotFound(Collection::Items, id))?;

    tracing::info!("Updated item {}", item.id);
    Ok(Json(item))
}

/// Removes an item by id.
#[utoipa::path(
    delete,
    path = "/api/items/{id}",
    tag = "To-do Items",
    params(("id" = String, Path, description = "The item ID")),
    responses(
        (status = 200, description = "Item successfully removed"),
        (status = 404, description = "Item not found", body = ErrorBody),
        (status = 500, description = "Some server error", body = ErrorBody)
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.store.remove::<Item>(&id).await? {
        Some(item) => {
            tracing::info!("Deleted item {}", item.id);
            Ok(StatusCode::OK)
        }
        None => Err(ApiError::NotFound(Collection::Items, id)),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{send, TestApp};
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    async fn create_list(app: &TestApp, title: &str) -> String {
        let (status, body) =
            send(app, Method::POST, "/api/lists", Some(json!({ "title": title }))).await;
        assert_eq!(status, StatusCode::OK);
        body["id"].as_str().unwrap().to_string()
    }

    async fn create_item(app: &TestApp, list_id: &str, label: &str) -> Value {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/items",
            Some(json!({ "list_id": list_id, "label": label })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_create_item_in_existing_list() {
        let app = TestApp::new();
        let list_id = create_list(&app, "Groceries").await;

        let item = create_item(&app, &list_id, "Milk").await;

        assert_eq!(item["list_id"], list_id.as_str());
        assert_eq!(item["label"], "Milk");
        let created_at = item["created_at"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());
        assert!(item.get("completed_at").is_none());
    }

    #[tokio::test]
    async fn test_create_item_ignores_client_id_and_created_at() {
        let app = TestApp::new();
        let list_id = create_list(&app, "Groceries").await;
        let existing = create_item(&app, &list_id, "Bread").await;

        let (status, item) = send(
            &app,
            Method::POST,
            "/api/items",
            Some(json!({
                "id": existing["id"],
                "list_id": list_id,
                "label": "This is a test",
                "created_at": "2021-12-18T15:21:18Z"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_ne!(item["id"], existing["id"]);
        assert_ne!(item["created_at"], "2021-12-18T15:21:18Z");

        let (_, all) = send(&app, Method::GET, "/api/items", None).await;
        assert_eq!(all.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_created_item_persists() {
        let app = TestApp::new();
        let list_id = create_list(&app, "Groceries").await;
        let item = create_item(&app, &list_id, "Milk").await;

        let uri = format!("/api/items/{}", item["id"].as_str().unwrap());
        let (status, fetched) = send(&app, Method::GET, &uri, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, item);
    }

    #[tokio::test]
    async fn test_create_item_unknown_list_is_rejected() {
        let app = TestApp::new();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/items",
            Some(json!({ "list_id": "nope", "label": "Milk" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");
        let (_, all) = send(&app, Method::GET, "/api/items", None).await;
        assert!(all.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_item_requires_label() {
        let app = TestApp::new();
        let list_id = create_list(&app, "Groceries").await;

        for body in [json!({ "list_id": list_id }), json!({ "list_id": list_id, "label": "" })] {
            let (status, _) = send(&app, Method::POST, "/api/items", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_create_item_malformed_body() {
        let app = TestApp::new();
        let list_id = create_list(&app, "Groceries").await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/items",
            Some(json!({ "list_id": list_id, "label": "Milk", "completed_at": "yesterday" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_unknown_item() {
        let app = TestApp::new();

        let (status, body) = send(&app, Method::GET, "/api/items/missing", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_items_by_list() {
        let app = TestApp::new();
        let groceries = create_list(&app, "Groceries").await;
        let chores = create_list(&app, "Chores").await;
        create_item(&app, &groceries, "Milk").await;
        create_item(&app, &chores, "Laundry").await;
        create_item(&app, &groceries, "Eggs").await;

        let (status, items) =
            send(&app, Method::GET, &format!("/api/items/list/{}", groceries), None).await;

        assert_eq!(status, StatusCode::OK);
        let labels: Vec<&str> = items
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["label"].as_str().unwrap())
            .collect();
        assert_eq!(labels, vec!["Milk", "Eggs"]);
    }

    #[tokio::test]
    async fn test_items_by_list_empty_is_ok() {
        let app = TestApp::new();
        let list_id = create_list(&app, "Empty").await;

        for uri in [format!("/api/items/list/{}", list_id), "/api/items/list/unknown".to_string()] {
            let (status, items) = send(&app, Method::GET, &uri, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(items, json!([]));
        }
    }

    #[tokio::test]
    async fn test_update_item_is_partial() {
        let app = TestApp::new();
        let list_id = create_list(&app, "Groceries").await;
        let item = create_item(&app, &list_id, "Milk").await;
        let uri = format!("/api/items/{}", item["id"].as_str().unwrap());

        let (status, updated) = send(&app, Method::PUT, &uri, Some(json!({ "label": "x" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["label"], "x");
        assert_eq!(updated["id"], item["id"]);
        assert_eq!(updated["list_id"], item["list_id"]);
        assert_eq!(updated["created_at"], item["created_at"]);
    }

    #[tokio::test]
    async fn test_update_item_all_fields() {
        let app = TestApp::new();
        let first = create_list(&app, "Groceries").await;
        let second = create_list(&app, "Chores").await;
        let item = create_item(&app, &first, "Milk").await;
        let uri = format!("/api/items/{}", item["id"].as_str().unwrap());

        let data = json!({
            "id": "hijacked",
            "list_id": second,
            "label": "This is a new label",
            "created_at": "2022-08-10T13:11:12Z",
            "completed_at": "2023-01-13T11:12:15Z"
        });
        let (status, updated) = send(&app, Method::PUT, &uri, Some(data)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, fetched) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(fetched, updated);
        assert_eq!(fetched["id"], item["id"]);
        assert_eq!(fetched["list_id"], second.as_str());
        assert_eq!(fetched["label"], "This is a new label");
        assert_eq!(fetched["created_at"], "2022-08-10T13:11:12Z");
        assert_eq!(fetched["completed_at"], "2023-01-13T11:12:15Z");

        let (_, cleared) =
            send(&app, Method::PUT, &uri, Some(json!({ "completed_at": null }))).await;
        assert!(cleared.get("completed_at").is_none());
    }

    #[tokio::test]
    async fn test_update_item_unknown_list_is_rejected() {
        let app = TestApp::new();
        let list_id = create_list(&app, "Groceries").await;
        let item = create_item(&app, &list_id, "Milk").await;
        let uri = format!("/api/items/{}", item["id"].as_str().unwrap());

        let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "list_id": "nope" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, fetched) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(fetched["list_id"], list_id.as_str());
    }

    #[tokio::test]
    async fn test_update_unknown_item() {
        let app = TestApp::new();

        let (status, _) =
            send(&app, Method::PUT, "/api/items/missing", Some(json!({ "label": "x" }))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_unknown_item_with_unknown_list_is_404() {
        let app = TestApp::new();

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/items/missing",
            Some(json!({ "list_id": "nope", "label": "" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_delete_item() {
        let app = TestApp::new();
        let list_id = create_list(&app, "Groceries").await;
        let item = create_item(&app, &list_id, "Milk").await;
        let uri = format!("/api/items/{}", item["id"].as_str().unwrap());

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
