use crate::app::CatalogService;
use crate::domain::Product;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
}

impl AppState {
    pub fn new(catalog: CatalogService) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

/// Envelope for every write endpoint: `{ok, product?, error?}`.
#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            product: None,
            error: None,
        }
    }

    pub fn product(product: Product) -> Self {
        Self {
            ok: true,
            product: Some(product),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            product: None,
            error: Some(message.into()),
        }
    }
}

/// Request body accepted by create/update, as multipart form fields or a JSON object.
///
/// Only used for the OpenAPI document; handlers read the body through `ProductForm`.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ProductFormBody {
    pub name: Option<String>,
    pub category: Option<String>,
    /// Coerced to a number; non-numeric input is stored as `null`.
    pub price: Option<String>,
    pub tag: Option<String>,
    /// External image URL. Used on create only, and only when no file is uploaded.
    pub img: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}
