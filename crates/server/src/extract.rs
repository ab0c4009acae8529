//! Request extractors that turn axum rejections into the uniform error body.
//! Both reject before the store is ever invoked.

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use service::books::BookId;
use tracing::debug;

use crate::errors::ApiError;

/// `{id}` path segment parsed as an integer; anything else is a 400.
#[derive(Debug, Clone, Copy)]
pub struct BookIdParam(pub BookId);

#[async_trait]
impl<S> FromRequestParts<S> for BookIdParam
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<BookId>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => {
                debug!(%rejection, "rejected book id");
                Err(ApiError::bad_request("Invalid book id"))
            }
        }
    }
}

/// JSON body; undecodable payloads become 400 `Invalid request body`,
/// kept apart from field validation failures.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(%rejection, "rejected request body");
                Err(ApiError::bad_request("Invalid request body"))
            }
        }
    }
}
