use utoipa::OpenApi;

use crate::error::{ErrorResponse, HealthResponse, UnhealthyResponse};
use crate::handlers;
use crate::models::{BannerResponse, ItemPayload, ItemResponse, MessageResponse};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "rust-spanner-items API",
        version = "1.0.0",
        description = "A minimal CRUD API for items backed by Google Cloud Spanner"
    ),
    paths(
        handlers::health::root_handler,
        handlers::health::health_handler,
        handlers::health::ready_handler,
        handlers::create::create_handler,
        handlers::get::get_handler,
        handlers::list::list_handler,
        handlers::update::update_handler,
        handlers::delete::delete_handler
    ),
    components(
        schemas(
            ItemPayload,
            ItemResponse,
            MessageResponse,
            BannerResponse,
            ErrorResponse,
            HealthResponse,
            UnhealthyResponse
        )
    ),
    tags(
        (name = "health", description = "Health check operations"),
        (name = "items", description = "Item CRUD operations")
    )
)]
pub struct ApiDoc;
