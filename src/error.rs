//! Unified application error model and mapping helpers.
//! Every session and catalog operation returns `AppResult`; the `message()` of an
//! error is always human-readable so callers can render it inline next to the form
//! that triggered it.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::api::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    Validation { code: String, message: String },
    Auth { code: String, message: String },
    SessionInvalid { code: String, message: String },
    Network { code: String, message: String },
    Rejected { code: String, message: String },
    Busy { code: String, message: String },
    Superseded { code: String, message: String },
    Storage { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::Validation { code, .. }
            | AppError::Auth { code, .. }
            | AppError::SessionInvalid { code, .. }
            | AppError::Network { code, .. }
            | AppError::Rejected { code, .. }
            | AppError::Busy { code, .. }
            | AppError::Superseded { code, .. }
            | AppError::Storage { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Validation { message, .. }
            | AppError::Auth { message, .. }
            | AppError::SessionInvalid { message, .. }
            | AppError::Network { message, .. }
            | AppError::Rejected { message, .. }
            | AppError::Busy { message, .. }
            | AppError::Superseded { message, .. }
            | AppError::Storage { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn validation<S: Into<String>>(code: S, msg: S) -> Self { AppError::Validation { code: code.into(), message: msg.into() } }
    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn session_invalid<S: Into<String>>(code: S, msg: S) -> Self { AppError::SessionInvalid { code: code.into(), message: msg.into() } }
    pub fn network<S: Into<String>>(code: S, msg: S) -> Self { AppError::Network { code: code.into(), message: msg.into() } }
    pub fn rejected<S: Into<String>>(code: S, msg: S) -> Self { AppError::Rejected { code: code.into(), message: msg.into() } }
    pub fn storage<S: Into<String>>(code: S, msg: S) -> Self { AppError::Storage { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    pub fn busy() -> Self {
        AppError::Busy { code: "in_flight".into(), message: "Another request is already in progress".into() }
    }

    pub fn superseded() -> Self {
        AppError::Superseded { code: "superseded".into(), message: "Session changed before the request completed".into() }
    }

    /// Map a failed credential exchange (login, register, admin login, setup).
    /// The server's `message` wins; otherwise `fallback` is shown.
    pub fn from_credential_exchange(err: ApiError, code: &str, fallback: &str) -> Self {
        match err {
            ApiError::Status { message, .. } => {
                AppError::auth(code.to_string(), message.unwrap_or_else(|| fallback.to_string()))
            }
            ApiError::Transport(_) => AppError::network("network".to_string(), fallback.to_string()),
            ApiError::Decode(_) | ApiError::Url(_) => AppError::internal(code.to_string(), fallback.to_string()),
        }
    }

    pub fn is_validation(&self) -> bool { matches!(self, AppError::Validation { .. }) }
    pub fn is_auth(&self) -> bool { matches!(self, AppError::Auth { .. }) }

    /// Map to a representative HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Validation { .. } => 400,
            AppError::Auth { .. } | AppError::SessionInvalid { .. } => 401,
            AppError::Rejected { .. } => 422,
            AppError::Busy { .. } | AppError::Superseded { .. } => 409,
            AppError::Network { .. } | AppError::Storage { .. } => 503,
            AppError::Internal { .. } => 500,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, message } => {
                let msg = message.unwrap_or_else(|| format!("Request failed (HTTP {})", status));
                if status == 401 || status == 403 {
                    AppError::auth("unauthorized".to_string(), msg)
                } else {
                    AppError::rejected(format!("http_{}", status), msg)
                }
            }
            ApiError::Transport(e) => {
                tracing::debug!(target: "recipebox::api", "transport error: {}", e);
                AppError::network("network", "Unable to reach the server. Please try again.")
            }
            ApiError::Decode(m) => AppError::internal("malformed_response".to_string(), m),
            ApiError::Url(m) => AppError::internal("invalid_url".to_string(), m),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage { code: "io".into(), message: err.to_string() }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal { code: "internal".into(), message: err.to_string() }
    }
}
