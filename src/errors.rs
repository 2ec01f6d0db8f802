use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// SQLite primary result codes for lock contention.
const SQLITE_BUSY: &str = "5";
const SQLITE_LOCKED: &str = "6";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Insufficient stock for '{0}'")]
    InsufficientStock(String),

    #[error("Temporarily unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ServiceError::NotFound("record not found".to_string()),
            sqlx::Error::PoolTimedOut => {
                ServiceError::Unavailable("connection pool timed out".to_string())
            }
            sqlx::Error::Database(db) => {
                let code = db.code().map(|c| c.to_string()).unwrap_or_default();
                if code == SQLITE_BUSY || code == SQLITE_LOCKED {
                    ServiceError::Unavailable("database is busy".to_string())
                } else if db.message().contains("UNIQUE constraint failed") {
                    ServiceError::AlreadyExists(db.message().to_string())
                } else {
                    ServiceError::Database(err)
                }
            }
            _ => ServiceError::Database(err),
        }
    }
}

impl ServiceError {
    /// Single source of truth for the error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InsufficientStock(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) | Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message suitable for a page. Internal errors stay generic so storage
    /// details never reach the browser.
    pub fn response_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Template(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// True for failures the caller may simply retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("request failed: {}", self);
        }
        let body = format!(
            "<!doctype html><html><body><h1>{}</h1><p>{}</p><p><a href=\"/\">Voltar</a></p></body></html>",
            status
                .canonical_reason()
                .unwrap_or("Error"),
            self.response_message()
        );
        (status, Html(body)).into_response()
    }
}
