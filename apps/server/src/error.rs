use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use passfinder_catalog::CatalogError;
use serde::Serialize;
use thiserror::Error;

/// Message returned for every upstream or internal failure.
pub const FETCH_FAILED: &str = "Failed to fetch user items";

/// Message returned when the user identifier is absent.
pub const MISSING_USER_ID: &str = "Missing userId";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Catalog(#[from] CatalogError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            ApiError::Catalog(CatalogError::InvalidIdentifier(_)) => {
                (StatusCode::BAD_REQUEST, MISSING_USER_ID.to_string())
            }
            // Upstream detail stays in the server log.
            ApiError::Catalog(e) => {
                tracing::error!("[Error] Fetching user items: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, FETCH_FAILED.to_string())
            }
        };
        (status, Json(ErrorBody { error: msg })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
