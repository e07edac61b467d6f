// Success envelope: `{success: true, data, meta?}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::PageMeta;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Response {
        Self::with_status(StatusCode::OK, data, None)
    }

    pub fn created(data: T) -> Response {
        Self::with_status(StatusCode::CREATED, data, None)
    }

    pub fn paged(data: T, meta: PageMeta) -> Response {
        Self::with_status(StatusCode::OK, data, Some(meta))
    }

    fn with_status(status: StatusCode, data: T, meta: Option<PageMeta>) -> Response {
        let body = ApiResponse {
            success: true,
            data,
            meta,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_envelope_without_meta() {
        let response = ApiResponse::created(vec![1, 2]);
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json.get("meta").is_none());
    }

    #[tokio::test]
    async fn test_envelope_with_meta() {
        let meta = PageMeta {
            page: 2,
            limit: 10,
            total: 25,
            total_pages: 3,
        };
        let json = body_json(ApiResponse::paged(Vec::<u8>::new(), meta)).await;
        assert_eq!(json["meta"]["page"], 2);
        assert_eq!(json["meta"]["total_pages"], 3);
    }
}
