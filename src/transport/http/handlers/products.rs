use crate::domain::{parse_product_id, Product};
use crate::transport::http::handlers::common::{ApiError, ProductForm};
use crate::transport::http::types::{ApiResponse, AppState, ProductFormBody};
use axum::extract::{Path, State};
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products in insertion order", body = [Product]),
        (status = 500, description = "Store unreadable", body = ApiResponse)
    )
)]
pub async fn list_products_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.catalog.list().await?))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body(content = ProductFormBody, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product created", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn create_product_handler(
    State(state): State<AppState>,
    form: ProductForm,
) -> Result<Json<ApiResponse>, ApiError> {
    let product = state.catalog.create(form.input, form.file).await?;
    Ok(Json(ApiResponse::product(product)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = u64, Path, description = "Product id")
    ),
    request_body(content = ProductFormBody, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated", body = ApiResponse),
        (status = 404, description = "No product with this id", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn update_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: ProductForm,
) -> Result<Json<ApiResponse>, ApiError> {
    let id = parse_product_id(&id).ok_or(ApiError::NotFound)?;
    let product = state.catalog.update(id, form.input, form.file).await?;
    Ok(Json(ApiResponse::product(product)))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = u64, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product removed (or never existed)", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse>, ApiError> {
    if let Some(id) = parse_product_id(&id) {
        state.catalog.delete(id).await?;
    }
    Ok(Json(ApiResponse::ok()))
}
