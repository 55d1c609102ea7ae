// Request extractors that reject with `ProjectError`
//
// axum's own `Json` and `Path` rejections answer in plain text; these keep
// every failure in the `{"errors": [...]}` shape.

use crate::projects::ProjectError;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

/// JSON body; any parse failure is `INVALID_REQUEST_BODY`
#[derive(Debug, Clone)]
pub struct ProjectJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ProjectJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProjectError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ProjectJson(value))
    }
}

/// Numeric `:id` path segment; anything else is a 404
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceId(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = ProjectError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i32>::from_request_parts(parts, state).await?;
        Ok(ResourceId(id))
    }
}
