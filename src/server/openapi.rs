//! OpenAPI document built from the annotations on each handler.

use axum::Json;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use super::error::ErrorBody;
use super::{items, lists};
use crate::models::{Item, ItemPatch, List, ListPatch, ListWithItems, NewItem, NewList};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TODO API",
        version = "1.0.0",
        description = "A simple todo api"
    ),
    servers((url = "http://localhost:3000")),
    paths(
        items::list_items,
        items::get_item,
        items::list_items_by_list,
        items::create_item,
        items::update_item,
        items::delete_item,
        lists::list_lists,
        lists::get_list,
        lists::create_list,
        lists::update_list,
        lists::delete_list,
    ),
    components(schemas(
        Item,
        NewItem,
        ItemPatch,
        List,
        NewList,
        ListPatch,
        ListWithItems,
        ErrorBody
    )),
    tags(
        (name = "To-do Items", description = "The to-do items api"),
        (name = "To-do Lists", description = "The to-do lists api")
    )
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Interactive API reference page at `/api-docs`.
pub fn docs_ui() -> Scalar<utoipa::openapi::OpenApi> {
    Scalar::with_url("/api-docs", ApiDoc::openapi())
}
