use crate::app::CatalogError;
use crate::domain::ProductInput;
use crate::storage::uploads::IMAGE_FIELD;
use crate::storage::{IncomingFile, UploadError};
use crate::transport::http::types::ApiResponse;
use axum::async_trait;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value as JsonValue;

/// Handler error, rendered as `{ok:false, error}`.
#[derive(Debug)]
pub enum ApiError {
    /// 404 with the fixed message `not found`.
    NotFound,
    /// 500 carrying the underlying error message.
    Internal(String),
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        if e.is_not_found() {
            ApiError::NotFound
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(ApiResponse::error("not found"))).into_response()
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::error(message)),
                )
                    .into_response()
            }
        }
    }
}

pub fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Only `application/json` itself; `+json` media types are treated like any other body.
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence == "application/json"
}

/// Product fields plus the optional `image` file, read from a multipart or JSON body.
///
/// Bodies of any other content type yield no fields.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub input: ProductInput,
    pub file: Option<IncomingFile>,
}

#[async_trait]
impl<S> FromRequest<S> for ProductForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = content_type(req.headers());

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::Internal(e.body_text()))?;
            return read_multipart(multipart).await;
        }

        if is_json_content_type(&content_type) {
            let Json(body) = Json::<JsonValue>::from_request(req, state)
                .await
                .map_err(|e| ApiError::Internal(e.body_text()))?;
            let input = body
                .as_object()
                .map(ProductInput::from_json_object)
                .unwrap_or_default();
            return Ok(Self { input, file: None });
        }

        Ok(Self::default())
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<ProductForm, ApiError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Internal(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        let Some(original_name) = field.file_name().map(str::to_string) else {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::Internal(e.body_text()))?;
            form.input.set_text(&name, text);
            continue;
        };

        if name != IMAGE_FIELD || form.file.is_some() {
            return Err(UploadError::UnexpectedField { field: name }.into());
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Internal(e.body_text()))?;
        // Browsers send an empty part for an untouched file input.
        if original_name.is_empty() && data.is_empty() {
            continue;
        }
        form.file = Some(IncomingFile {
            original_name,
            data: data.to_vec(),
        });
    }

    Ok(form)
}
