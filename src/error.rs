use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::model::leave_request::LeaveStatus;

/// Errors produced by the leave engine and its persistence layer.
#[derive(Debug, Error)]
pub enum LeaveError {
    #[error("{0}")]
    Validation(String),

    #[error("Insufficient leave balance: requested {requested} hours, {remaining} remaining")]
    InsufficientBalance {
        requested: rust_decimal::Decimal,
        remaining: rust_decimal::Decimal,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Request is already {current}: {action} not allowed")]
    InvalidState {
        current: LeaveStatus,
        action: &'static str,
    },

    #[error("{0}")]
    Forbidden(String),

    /// Lost a race on a unique row or a lock; the caller may retry.
    #[error("Conflicting update: {0}")]
    Conflict(String),

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    /// Ledger bookkeeping went wrong; a workflow bug, never user input.
    #[error("Ledger invariant violated: {0}")]
    Invariant(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl LeaveError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LeaveError::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        LeaveError::NotFound(what.into())
    }

    fn code(&self) -> &'static str {
        match self {
            LeaveError::Validation(_) => "validation_error",
            LeaveError::InsufficientBalance { .. } => "insufficient_balance",
            LeaveError::NotFound(_) => "not_found",
            LeaveError::InvalidState { .. } => "invalid_state",
            LeaveError::Forbidden(_) => "forbidden",
            LeaveError::Conflict(_) => "conflict",
            LeaveError::DependencyUnavailable(_) => "dependency_unavailable",
            LeaveError::Invariant(_) | LeaveError::Database(_) => "internal_error",
        }
    }
}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::Validation(_)
            | LeaveError::InsufficientBalance { .. }
            | LeaveError::InvalidState { .. } => StatusCode::BAD_REQUEST,
            LeaveError::NotFound(_) => StatusCode::NOT_FOUND,
            LeaveError::Forbidden(_) => StatusCode::FORBIDDEN,
            LeaveError::Conflict(_) => StatusCode::CONFLICT,
            LeaveError::DependencyUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            LeaveError::Invariant(_) | LeaveError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            LeaveError::Invariant(_) | LeaveError::Database(_) => {
                tracing::error!(error = %self, "Internal error");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "error": self.code(),
            "message": message,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn maps_taxonomy_to_http_status() {
        assert_eq!(
            LeaveError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LeaveError::InsufficientBalance {
                requested: Decimal::from(200),
                remaining: Decimal::from(168),
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LeaveError::not_found("Leave balance").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            LeaveError::DependencyUnavailable("holidays".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            LeaveError::Conflict("leave_balances".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            LeaveError::Invariant("pending underflow".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn invalid_state_names_current_status() {
        let err = LeaveError::InvalidState {
            current: LeaveStatus::Rejected,
            action: "cancel",
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("rejected"));
    }
}
