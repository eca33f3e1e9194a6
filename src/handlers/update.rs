use crate::error::{ApiError, ErrorResponse};
use crate::models::{ItemFields, ItemPayload, ItemResponse};
use crate::routes;
use crate::state::AppState;
use axum::{extract::Path, extract::State, http::StatusCode, Json};

/// PUT /items/{id} handler - Replace an item's name and description
///
/// The id and creation timestamp are left untouched.
#[utoipa::path(
    put,
    path = routes::ITEM,
    params(
        ("id" = String, Path, description = "Item id")
    ),
    request_body = ItemPayload,
    responses(
        (status = 200, description = "Item updated", body = ItemResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 422, description = "Invalid name or description", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ItemPayload>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let fields = ItemFields::try_from(payload)?;

    let item = state.repository.update(&id, fields).await?;

    tracing::info!("Successfully updated item with id: {}", id);
    Ok((StatusCode::OK, Json(item.into())))
}
