use actix_web::{
    HttpResponse, ResponseError,
    http::{StatusCode, header},
};
use thiserror::Error;

use crate::api::envelope::Envelope;

pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";

const DEFAULT_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";
const DEFAULT_FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action";
const DEFAULT_FAILURE_MESSAGE: &str = "Request failed";
const INTERNAL_MESSAGE: &str = "An internal error occurred. Please try again later.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    AuthenticationRequired(String),

    #[error("Method not allowed")]
    MethodNotAllowed { allowed: Vec<&'static str> },

    #[error("No active session found")]
    NoActiveSession,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("{message}")]
    Upstream {
        status: StatusCode,
        message: String,
        code: Option<String>,
    },

    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Переводит ошибочный ответ бэкенда в ошибку с тем же статусом.
    /// 401 всегда получает код `TOKEN_EXPIRED`, для 403 есть сообщение об отказе по умолчанию.
    pub fn from_upstream(status: StatusCode, message: Option<String>, code: Option<String>) -> Self {
        let message = message.filter(|m| !m.trim().is_empty());
        if status == StatusCode::UNAUTHORIZED {
            AppError::Upstream {
                status,
                message: message.unwrap_or_else(|| DEFAULT_EXPIRED_MESSAGE.to_string()),
                code: Some(TOKEN_EXPIRED.to_string()),
            }
        } else if status == StatusCode::FORBIDDEN {
            AppError::Upstream {
                status,
                message: message.unwrap_or_else(|| DEFAULT_FORBIDDEN_MESSAGE.to_string()),
                code: code.or_else(|| Some("FORBIDDEN".to_string())),
            }
        } else {
            AppError::Upstream {
                status,
                message: message.unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
                code,
            }
        }
    }

    pub fn code(&self) -> &str {
        match self {
            AppError::AuthenticationRequired(_) => "AUTH_REQUIRED",
            AppError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            AppError::NoActiveSession => "NO_ACTIVE_SESSION",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::InvalidJson(_) => "INVALID_JSON",
            AppError::Upstream { code, .. } => code.as_deref().unwrap_or("UPSTREAM_ERROR"),
            AppError::Transport(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Сообщение, которое уходит клиенту. Детали транспортных ошибок только в логах.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Transport(_) | AppError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            AppError::InvalidJson(_) => "Request body must be valid JSON".to_string(),
            other => other.to_string(),
        }
    }

    pub fn unauthenticated() -> Self {
        AppError::AuthenticationRequired("Authentication required".to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthenticationRequired(_) => StatusCode::UNAUTHORIZED,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::NoActiveSession | AppError::InvalidInput(_) | AppError::InvalidJson(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Upstream { status, .. } => *status,
            AppError::Transport(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Transport(e) => log::error!("Upstream transport failure: {}", e),
            AppError::Internal(e) => log::error!("Internal error: {}", e),
            _ => {}
        }

        let body = Envelope::<()>::failure(self.public_message(), Some(self.code().to_string()));
        let mut builder = HttpResponse::build(self.status_code());
        if let AppError::MethodNotAllowed { allowed } = self {
            builder.insert_header((header::ALLOW, allowed.join(", ")));
        }
        builder.json(body)
    }
}
