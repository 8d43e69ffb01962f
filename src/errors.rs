use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Not Found")]
    NotFound,
    #[error("Login required")]
    NotAuthorized,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    RunTimeError(&'static str),
    #[error("Bad upload: {0}")]
    BadUpload(String),
    #[error("Internal Server Error")]
    ServerError,
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl From<MultipartError> for RequestError {
    fn from(value: MultipartError) -> Self {
        Self::BadUpload(value.to_string())
    }
}

impl From<image::ImageError> for RequestError {
    fn from(value: image::ImageError) -> Self {
        Self::BadUpload(value.to_string())
    }
}

impl RequestError {
    /// True when the underlying database error is a UNIQUE constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            RequestError::DatabaseError(sqlx::Error::Database(e)) => {
                e.message().contains("UNIQUE constraint failed")
            }
            _ => false,
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        match self {
            RequestError::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            RequestError::NotAuthorized => Redirect::to("/login").into_response(),
            RequestError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, Html(message)).into_response()
            }
            RequestError::RunTimeError(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Html(message)).into_response()
            }
            RequestError::BadUpload(message) => {
                (StatusCode::BAD_REQUEST, format!("Bad upload: {}", message)).into_response()
            }
            RequestError::ServerError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
            RequestError::DatabaseError(e) => {
                error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
            RequestError::Storage(e) => {
                error!("Storage error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
