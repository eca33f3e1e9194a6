use crate::error::{ApiError, ErrorResponse};
use crate::models::MessageResponse;
use crate::routes;
use crate::state::AppState;
use axum::{extract::Path, extract::State, http::StatusCode, Json};

/// DELETE /items/{id} handler - Remove an item
#[utoipa::path(
    delete,
    path = routes::ITEM,
    params(
        ("id" = String, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state.repository.delete(&id).await?;

    tracing::info!("Successfully deleted item with id: {}", id);
    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "Item deleted successfully".to_string(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{body_json, failing_app, request, test_app};
    use crate::models::ItemResponse;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_delete_endpoint_success() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/items",
                Some(serde_json::json!({"name": "N", "description": "D"})),
            ))
            .await
            .unwrap();
        let created: ItemResponse = body_json(response).await;

        let response = app
            .clone()
            .oneshot(request("DELETE", &format!("/items/{}", created.id), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: MessageResponse = body_json(response).await;
        assert_eq!(body.message, "Item deleted successfully");

        let response = app
            .oneshot(request("GET", &format!("/items/{}", created.id), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_endpoint_repeated_is_not_found() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/items",
                Some(serde_json::json!({"name": "N", "description": "D"})),
            ))
            .await
            .unwrap();
        let created: ItemResponse = body_json(response).await;
        let uri = format!("/items/{}", created.id);

        let first = app.clone().oneshot(request("DELETE", &uri, None)).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        for _ in 0..2 {
            let again = app.clone().oneshot(request("DELETE", &uri, None)).await.unwrap();
            assert_eq!(again.status(), StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_delete_endpoint_not_found() {
        let response = test_app()
            .oneshot(request("DELETE", "/items/never-existed", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error: ErrorResponse = body_json(response).await;
        assert!(error.error.contains("never-existed"));
    }

    #[tokio::test]
    async fn test_delete_endpoint_store_error() {
        let response = failing_app()
            .oneshot(request("DELETE", "/items/anything", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
