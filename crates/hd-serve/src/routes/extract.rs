use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use std::convert::Infallible;

/// JSON body that never rejects; the handler decides how to report a
/// malformed payload.
pub struct JsonPayload<T>(pub Result<T, String>);

impl<S, T> FromRequest<S> for JsonPayload<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            Json::<T>::from_request(request, state)
                .await
                .map(|Json(value)| value)
                .map_err(|rejection| rejection.body_text()),
        ))
    }
}

/// Query string counterpart of [`JsonPayload`].
pub struct QueryPayload<T>(pub Result<T, String>);

impl<S, T> FromRequestParts<S> for QueryPayload<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            Query::<T>::from_request_parts(parts, state)
                .await
                .map(|Query(value)| value)
                .map_err(|rejection| rejection.body_text()),
        ))
    }
}
