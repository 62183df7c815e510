use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Errors raised by repository adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint `{constraint}` violated")]
    UniqueViolation { constraint: String },
    #[error("foreign key `{constraint}` violated")]
    ForeignKeyViolation { constraint: String },
    #[error("corrupt row: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn unique(constraint: &str) -> Self {
        Self::UniqueViolation {
            constraint: constraint.to_string(),
        }
    }

    /// True when this is a unique violation of the named constraint.
    pub fn violates(&self, name: &str) -> bool {
        matches!(self, Self::UniqueViolation { constraint } if constraint == name)
    }

    /// True when this is a foreign-key violation of the named constraint.
    pub fn violates_reference(&self, name: &str) -> bool {
        matches!(self, Self::ForeignKeyViolation { constraint } if constraint == name)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            let constraint = db.constraint().unwrap_or_default().to_string();
            if db.is_unique_violation() {
                return Self::UniqueViolation { constraint };
            }
            if db.is_foreign_key_violation() {
                return Self::ForeignKeyViolation { constraint };
            }
        }
        Self::Database(e)
    }
}

/// Application error surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("booking not found")]
    BookingNotFound,
    #[error("invoice not found")]
    InvoiceNotFound,
    #[error("payment not found")]
    PaymentNotFound,
    #[error("{0}")]
    NotFound(String),
    #[error("booking status does not allow this operation")]
    InvalidStatus,
    #[error("the requested slot is not available")]
    SlotUnavailable,
    #[error("{0}")]
    Conflict(String),
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BookingNotFound
            | Self::InvoiceNotFound
            | Self::PaymentNotFound
            | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidStatus | Self::SlotUnavailable | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "ACCESS_DENIED",
            Self::BookingNotFound => "BOOKING_NOT_FOUND",
            Self::InvoiceNotFound => "INVOICE_NOT_FOUND",
            Self::PaymentNotFound => "PAYMENT_NOT_FOUND",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::SlotUnavailable => "SLOT_UNAVAILABLE",
            Self::Conflict(_) => "CONFLICT",
            Self::Store(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    success: bool,
    data: Option<()>,
    message: String,
    error: ErrorDetail,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = if status.is_server_error() {
            error!(error = %self, code, "request failed");
            "internal server error".to_string()
        } else {
            warn!(error = %self, code, "request rejected");
            self.to_string()
        };
        let body = ErrorEnvelope {
            success: false,
            data: None,
            message,
            error: ErrorDetail { code },
        };
        (status, Json(body)).into_response()
    }
}
