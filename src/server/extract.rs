use async_trait::async_trait;
use axum::body::HttpBody;
use axum::extract::{Extension, FromRequest, Json, RequestParts};
use axum::http::header::AUTHORIZATION;
use axum::BoxError;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::auth::{TokenVerifier, User};
use crate::error::{invalid_input_error, server_error, Error};

/// Handlers taking a `User` only run for requests carrying a valid bearer
/// token; everything else is answered with 401.
#[async_trait]
impl<B> FromRequest<B> for User
where
    B: Send,
{
    type Rejection = Error;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let Extension(verifier) = Extension::<Arc<TokenVerifier>>::from_request(req)
            .await
            .map_err(server_error)?;

        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        verifier.verify_header(header)
    }
}

/// `Json` whose rejections come back as invalid input in the crate's error
/// shape instead of axum's plain-text responses.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, B> FromRequest<B> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    B: HttpBody + Send,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Rejection = Error;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "rejected request body");
                Err(invalid_input_error())
            }
        }
    }
}
