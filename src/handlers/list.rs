use crate::error::{ApiError, ErrorResponse};
use crate::models::ItemResponse;
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// GET /items handler - List all items
///
/// Returns every item, newest first. There is no pagination.
#[utoipa::path(
    get,
    path = routes::ITEMS,
    responses(
        (status = 200, description = "All items, newest first", body = [ItemResponse]),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn list_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<ItemResponse>>), ApiError> {
    let items = state.repository.list().await?;

    tracing::info!("Listed {} items", items.len());

    let data: Vec<ItemResponse> = items.into_iter().map(ItemResponse::from).collect();
    Ok((StatusCode::OK, Json(data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{body_json, failing_app, request, test_app};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_list_endpoint_empty() {
        let response = test_app()
            .oneshot(request("GET", "/items", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let items: Vec<ItemResponse> = body_json(response).await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_list_endpoint_newest_first() {
        let app = test_app();

        let mut created = Vec::new();
        for name in ["A", "B", "C"] {
            let response = app
                .clone()
                .oneshot(request(
                    "POST",
                    "/items",
                    Some(serde_json::json!({"name": name, "description": ""})),
                ))
                .await
                .unwrap();
            let item: ItemResponse = body_json(response).await;
            created.push(item.id);
            tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        }

        let response = app.oneshot(request("GET", "/items", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let items: Vec<ItemResponse> = body_json(response).await;
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);

        created.reverse();
        let ids: Vec<String> = items.into_iter().map(|i| i.id).collect();
        assert_eq!(ids, created);
    }

    #[tokio::test]
    async fn test_list_endpoint_store_error() {
        let response = failing_app()
            .oneshot(request("GET", "/items", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let error: ErrorResponse = body_json(response).await;
        assert!(error.error.starts_with("Database error"));
    }
}
