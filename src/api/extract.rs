// =============================================================================
// Request Extractors — axum extractors that reject with `ApiError`
// =============================================================================
//
// Thin wrappers over `Path`, `Query` and `Json`. A malformed path segment,
// query string or body is answered with the same `{ error, code }` JSON shape
// as every other failure instead of axum's plain-text rejection.
//
//   async fn handler(ApiPath(id): ApiPath<i64>, ApiQuery(q): ApiQuery<Q>) { ... }
// =============================================================================

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::ApiError;

pub struct ApiPath<T>(pub T);

pub struct ApiQuery<T>(pub T);

pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(uri = %parts.uri, error = %rejection.body_text(), "rejected path");
                Err(ApiError::InvalidRequest {
                    status: rejection.status(),
                    message: rejection.body_text(),
                })
            }
        }
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(uri = %parts.uri, error = %rejection.body_text(), "rejected query");
                Err(ApiError::InvalidRequest {
                    status: rejection.status(),
                    message: rejection.body_text(),
                })
            }
        }
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(error = %rejection.body_text(), "rejected JSON body");
                Err(ApiError::InvalidRequest {
                    status: rejection.status(),
                    message: rejection.body_text(),
                })
            }
        }
    }
}
