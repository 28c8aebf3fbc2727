use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use walkto_core::Tile;

use crate::world::EntityId;

/// Faults when starting an interaction. Unreachable targets and missing
/// handlers are not errors; they end in a notification instead.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InteractError {
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
    #[error("no object {id} at {tile}")]
    UnknownObject { id: u32, tile: Tile },
    #[error("object {0} has no definition")]
    MissingDefinition(u32),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<InteractError> for AppError {
    fn from(e: InteractError) -> Self {
        match e {
            InteractError::MissingDefinition(_) => AppError::Internal(e.into()),
            _ => AppError::NotFound(e.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorPayload<'a>,
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    code: &'a str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            AppError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", e.to_string()),
        };
        (status, Json(ErrorBody { error: ErrorPayload { code, message } })).into_response()
    }
}
