use crate::fetch::FetchError;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Application-wide error taxonomy. The transport boundary classifies by
/// variant; messages keep the original cause for diagnostics.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("feed not found: id={0}")]
    FeedNotFound(i32),
    #[error("entry not found: id={0}")]
    EntryNotFound(i32),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("operation cancelled")]
    Cancelled,
    /// A database failure wrapped with the storage operation that hit it.
    #[error("{op}: {source}")]
    Db {
        op: &'static str,
        source: diesel::result::Error,
    },
    #[error("connection pool: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        AppError::InvalidArgument(message.into())
    }

    fn code(&self) -> (u16, &'static str) {
        match self {
            AppError::FeedNotFound(_) => (404, "FEED_NOT_FOUND"),
            AppError::EntryNotFound(_) => (404, "ENTRY_NOT_FOUND"),
            AppError::InvalidArgument(_) => (400, "INVALID_ARGUMENT"),
            AppError::Fetch(_) => (502, "FETCH_ERROR"),
            AppError::Cancelled => (408, "CANCELLED"),
            AppError::Db { .. } | AppError::Pool(_) => (500, "DATABASE_ERROR"),
            AppError::Internal(_) => (500, "INTERNAL_ERROR"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_code) = self.code();

        match self {
            AppError::Db { .. } | AppError::Pool(_) | AppError::Internal(_) => {
                log::error!("Server error: {:?}", self);
            }
            _ => {
                log::info!("Client error: {:?}", self);
            }
        }

        HttpResponse::build(
            actix_web::http::StatusCode::from_u16(status)
                .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR),
        )
        .json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string()
            }
        }))
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Catch-all for database errors that escape an operation without an
/// explicit breadcrumb (e.g. the transaction combinator itself).
impl From<diesel::result::Error> for AppError {
    fn from(source: diesel::result::Error) -> Self {
        AppError::Db {
            op: "transaction",
            source,
        }
    }
}

/// Attaches the storage-operation name to a low-level database error while
/// preserving the typed cause for classification.
pub trait DbResultExt<T> {
    fn op(self, op: &'static str) -> Result<T, AppError>;
}

impl<T> DbResultExt<T> for Result<T, diesel::result::Error> {
    fn op(self, op: &'static str) -> Result<T, AppError> {
        self.map_err(|source| AppError::Db { op, source })
    }
}
