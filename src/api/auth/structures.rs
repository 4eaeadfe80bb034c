use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::services::password::PasswordStrength;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PasswordValidationRequest {
    pub password: Option<String>,
}

/// Почему проверка вернула `valid: false`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SoftReason {
    NoSession,
    EmptyPassword,
    InvalidRequest,
    /// Бэкенд ответил и отклонил
    Rejected,
    /// Проверить не удалось
    Unavailable,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifySessionResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SoftReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VerifySessionResponse {
    pub fn invalid(reason: SoftReason, message: Option<String>) -> Self {
        Self {
            valid: false,
            data: None,
            reason: Some(reason),
            message,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PasswordValidationResponse {
    pub valid: bool,
    pub strength: PasswordStrength,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SoftReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
