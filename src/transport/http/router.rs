use crate::domain::Product;
use crate::transport::http::handlers::{health, orders, products};
use crate::transport::http::types::{ApiResponse, AppState, ProductFormBody};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        products::list_products_handler,
        products::create_product_handler,
        products::update_product_handler,
        products::delete_product_handler,
        orders::create_order_handler
    ),
    components(schemas(ApiResponse, Product, ProductFormBody))
)]
pub struct ApiDoc;

/// Routes only. `/uploads` is served from the catalog's upload directory.
pub fn create_router(app_state: AppState) -> Router {
    let upload_dir = app_state.catalog.uploads().dir().to_path_buf();

    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/api/products",
            get(products::list_products_handler).post(products::create_product_handler),
        )
        .route(
            "/api/products/:id",
            put(products::update_product_handler).delete(products::delete_product_handler),
        )
        .route("/api/orders", post(orders::create_order_handler))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .with_state(app_state)
}

/// Wraps `router` with the body cap, request tracing and permissive CORS.
pub fn with_middleware(router: Router, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
