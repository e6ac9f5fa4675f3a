//! `Json` and `Query` extractors whose rejections use the `AppError` body.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// JSON request body. Malformed or mistyped bodies are a 400 `VALIDATION_ERROR`.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// Query string. Unknown enum values, such as a sort key, are a 400 `VALIDATION_ERROR`.
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        Ok(ApiQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::header;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Note {
        note: String,
    }

    fn json_request(body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_body_parses() {
        let ApiJson(note) = ApiJson::<Note>::from_request(json_request(r#"{"note": "hi"}"#), &())
            .await
            .unwrap();
        assert_eq!(note.note, "hi");
    }

    #[tokio::test]
    async fn test_json_rejections_become_validation_errors() {
        for body in [r#"{"note": 5}"#, "{}", "{oops"] {
            let err = ApiJson::<Note>::from_request(json_request(body), &())
                .await
                .err()
                .unwrap();
            assert!(matches!(err, AppError::Validation(_)), "{body}");
        }
    }

    #[tokio::test]
    async fn test_query_rejection_becomes_validation_error() {
        #[derive(Debug, Deserialize)]
        struct Paging {
            #[allow(dead_code)]
            page: u32,
        }

        let (mut parts, _) = axum::http::Request::builder()
            .uri("/?page=many")
            .body(())
            .unwrap()
            .into_parts();
        let err = ApiQuery::<Paging>::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
