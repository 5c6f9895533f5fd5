use crate::app::receive_order;
use crate::transport::http::handlers::common::{content_type, is_json_content_type, ApiError};
use crate::transport::http::types::ApiResponse;
use axum::body::Bytes;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::Value as JsonValue;

#[utoipa::path(
    post,
    path = "/api/orders",
    responses(
        (status = 200, description = "Order logged", body = ApiResponse),
        (status = 500, description = "Body is not valid JSON", body = ApiResponse)
    )
)]
pub async fn create_order_handler(
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse>, ApiError> {
    let order = parse_order(&headers, &body)?;
    receive_order(&order);
    Ok(Json(ApiResponse::ok()))
}

/// Non-JSON and empty bodies count as `{}`.
fn parse_order(headers: &HeaderMap, body: &[u8]) -> Result<JsonValue, ApiError> {
    if !is_json_content_type(&content_type(headers)) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(JsonValue::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CONTENT_TYPE;
    use serde_json::json;

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "application/json".parse().unwrap());
        headers
    }

    #[test]
    fn parses_json_orders() {
        let order = parse_order(&json_headers(), br#"{"items":[{"id":1,"qty":2}]}"#).unwrap();
        assert_eq!(order, json!({"items": [{"id": 1, "qty": 2}]}));
    }

    #[test]
    fn non_json_bodies_are_empty_orders() {
        assert_eq!(parse_order(&HeaderMap::new(), b"hello").unwrap(), json!({}));
        assert_eq!(parse_order(&json_headers(), b"  ").unwrap(), json!({}));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            parse_order(&json_headers(), b"{oops"),
            Err(ApiError::Internal(_))
        ));
    }
}
