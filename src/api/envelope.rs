//! Единый формат ответа `{success, data, message, code}` для всех обработчиков.

use actix_web::{HttpResponse, HttpResponseBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Request completed successfully";

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
            code: None,
        }
    }

    pub fn failure(message: impl Into<String>, code: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
            code,
        }
    }
}

/// Собирает успешный ответ со статусом бэкенда. Заголовки (например `Set-Cookie`)
/// можно дописать в `builder` до вызова.
pub fn respond_success(
    mut builder: HttpResponseBuilder,
    data: Option<Value>,
    message: Option<String>,
) -> HttpResponse {
    let message = message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string());
    builder.json(Envelope::success(data, message))
}
