use crate::error::{ApiError, ErrorResponse};
use crate::models::{ItemFields, ItemPayload, ItemResponse};
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// POST /items handler - Create an item
///
/// The id and creation timestamp are assigned by the server.
#[utoipa::path(
    post,
    path = routes::ITEMS,
    request_body = ItemPayload,
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 422, description = "Invalid name or description", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn create_handler(
    State(state): State<AppState>,
    Json(payload): Json<ItemPayload>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let fields = ItemFields::try_from(payload)?;

    let item = state.repository.create(fields).await?;

    tracing::info!("Successfully created item with id: {}", item.id);
    Ok((StatusCode::CREATED, Json(item.into())))
}
