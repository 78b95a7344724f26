//! Request extractors with the API's error conventions.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Query, Request},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{AppError, AppResult};

pub const INVALID_JSON: &str = "invalid json body";

/// JSON body where an empty body means `T::default()`.
pub struct JsonBody<T>(pub T);

/// List filter taken from the JSON body, or from the query string when the body is empty.
///
/// The JSON body is the primary form. Query values are form-decoded, so a literal `+`
/// reads as a space: timestamps must use `Z` or percent-encode the offset (`%2B00:00`).
pub struct FilterParams<T>(pub T);

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> AppResult<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        debug!(error = %e, "rejecting request body");
        AppError::invalid(INVALID_JSON)
    })
}

async fn read_body<S: Send + Sync>(req: Request, state: &S) -> AppResult<Bytes> {
    Bytes::from_request(req, state).await.map_err(|e| {
        debug!(error = %e, "failed to read request body");
        AppError::invalid(INVALID_JSON)
    })
}

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = read_body(req, state).await?;
        if is_blank(&bytes) {
            return Ok(JsonBody(T::default()));
        }
        decode_json(&bytes).map(JsonBody)
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for FilterParams<T>
where
    T: DeserializeOwned + Default + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let uri = req.uri().clone();
        let bytes = read_body(req, state).await?;
        if !is_blank(&bytes) {
            return decode_json(&bytes).map(FilterParams);
        }
        if uri.query().map_or(true, str::is_empty) {
            return Ok(FilterParams(T::default()));
        }
        let Query(filter) = Query::<T>::try_from_uri(&uri).map_err(|e| {
            debug!(error = %e, "rejecting query string");
            AppError::invalid("invalid query string")
        })?;
        Ok(FilterParams(filter))
    }
}

/// Parses a `{id}` path segment.
pub fn parse_id(raw: &str, message: &'static str) -> AppResult<i64> {
    raw.trim().parse::<i64>().map_err(|_| AppError::invalid(message))
}
