//! Request body extraction with the API's error shape.
//!
//! `axum::Json` rejects malformed bodies with a plain-text `400`/`415`/`422`.
//! [`ApiJson`] answers every body rejection with `400 Bad Request` and a
//! `{ "error": ... }` body instead.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use serde::de::DeserializeOwned;

use super::{ApiError, error_response};

/// JSON body extractor whose rejection is an [`ApiError`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(body_error(rejection)),
        }
    }
}

fn body_error(rejection: JsonRejection) -> ApiError {
    let message = match &rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected request with `Content-Type: application/json`".to_string()
        }
        JsonRejection::JsonSyntaxError(_) => "Malformed JSON body".to_string(),
        _ => rejection.body_text(),
    };
    tracing::debug!(error = %rejection, "Rejected request body");
    error_response(StatusCode::BAD_REQUEST, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        count: u32,
    }

    fn request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let ApiJson(payload) =
            ApiJson::<Payload>::from_request(request(Some("application/json"), r#"{"count":3}"#), &())
                .await
                .unwrap();
        assert_eq!(payload.count, 3);
    }

    #[tokio::test]
    async fn test_wrong_type_is_bad_request() {
        let (status, Json(body)) =
            ApiJson::<Payload>::from_request(request(Some("application/json"), r#"{"count":"x"}"#), &())
                .await
                .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.error.is_empty());
    }

    #[tokio::test]
    async fn test_syntax_error_is_bad_request() {
        let (status, Json(body)) =
            ApiJson::<Payload>::from_request(request(Some("application/json"), "{"), &())
                .await
                .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Malformed JSON body");
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let (status, _) = ApiJson::<Payload>::from_request(request(None, r#"{"count":3}"#), &())
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
