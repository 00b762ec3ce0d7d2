//! Item endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;
use crate::domain::Item;
use crate::state::AppState;
use crate::usecase::{CategorySummary, CreateItemInput, PatchItemInput};

/// Item routes; the caller supplies [`AppState`]
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/summary",
            get(category_summary).fallback(summary_as_id),
        )
        .route(
            "/items/{id}",
            get(get_item).patch(patch_item).delete(delete_item),
        )
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::invalid_id(raw))
}

/// Bodies must be JSON objects; serde would otherwise fill a struct from an
/// array by position.
fn decode<T: DeserializeOwned>(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<T, ApiError> {
    let Json(body) =
        payload.map_err(|rejection| ApiError::invalid_request(rejection.body_text()))?;
    if !body.is_object() {
        return Err(ApiError::invalid_request("request body must be a JSON object"));
    }
    serde_json::from_value(body).map_err(|e| ApiError::invalid_request(e.to_string()))
}

/// Any other method on `/items/summary` treats `summary` as an item id
async fn summary_as_id() -> ApiError {
    ApiError::invalid_id("summary")
}

/// `GET /items`
pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, ApiError> {
    let items = state.items().get_all_items(&state.request_context()).await?;
    Ok(Json(items))
}

/// `GET /items/{id}`
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    let id = parse_id(&id)?;
    let item = state
        .items()
        .get_item_by_id(&state.request_context(), id)
        .await?;
    Ok(Json(item))
}

/// `POST /items`
pub async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let input: CreateItemInput = decode(payload)?;
    let item = state
        .items()
        .create_item(&state.request_context(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// `PATCH /items/{id}`
///
/// The id is checked before the body, so a bad id wins over a bad body.
pub async fn patch_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Item>, ApiError> {
    let id = parse_id(&id)?;
    let input: PatchItemInput = decode(payload)?;
    let item = state
        .items()
        .patch_item(&state.request_context(), id, input)
        .await?;
    Ok(Json(item))
}

/// `DELETE /items/{id}`
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state
        .items()
        .delete_item(&state.request_context(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /items/summary`
pub async fn category_summary(
    State(state): State<AppState>,
) -> Result<Json<CategorySummary>, ApiError> {
    let summary = state
        .items()
        .get_category_summary(&state.request_context())
        .await?;
    Ok(Json(summary))
}
