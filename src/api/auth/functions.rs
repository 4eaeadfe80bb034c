use actix_web::HttpResponse;
use serde_json::Value;

use crate::{
    api::{
        session::{SESSION_COOKIES, SessionCookies, set_cookie_name},
        validation::{ensure_max_len, require_field, sanitize_phone, validate_email},
    },
    errors::AppError,
    services::{
        password::{self, StrengthLevel},
        upstream::UpstreamReply,
    },
};

use super::structures::{LoginRequest, RegisterRequest};

const MAX_NAME_LEN: usize = 100;

/// Добавляет в ответ истёкшие cookie сессии
pub fn clear_session_cookies(resp: &mut HttpResponse, cookies: &SessionCookies) {
    for cookie in cookies.cleared() {
        if let Err(e) = resp.add_cookie(&cookie) {
            log::warn!("Failed to clear cookie {}: {}", cookie.name(), e);
        }
    }
}

/// Убирает из ответа бэкенда `Set-Cookie` для cookie сессии, которые мы очищаем сами
pub fn drop_session_set_cookies(reply: &mut UpstreamReply) {
    reply.set_cookies.retain(|raw| {
        set_cookie_name(raw)
            .map(|name| !SESSION_COOKIES.contains(&name))
            .unwrap_or(true)
    });
}

pub fn validate_login(request: &LoginRequest) -> Result<(), AppError> {
    let email = require_field(request.email.as_deref(), "Email")?;
    require_field(request.password.as_deref(), "Password")?;
    if !validate_email(email) {
        return Err(AppError::InvalidInput("Invalid email address".to_string()));
    }
    Ok(())
}

/// Проверяет форму регистрации и нормализует телефон в теле запроса
pub fn validate_registration(request: &RegisterRequest, payload: &mut Value) -> Result<(), AppError> {
    let name = require_field(request.name.as_deref(), "Name")?;
    if !ensure_max_len(name, MAX_NAME_LEN) {
        return Err(AppError::InvalidInput(format!(
            "Name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }

    let email = require_field(request.email.as_deref(), "Email")?;
    if !validate_email(email) {
        return Err(AppError::InvalidInput("Invalid email address".to_string()));
    }

    let pass = request.password.as_deref().unwrap_or_default();
    let strength = password::evaluate(pass);
    if strength.level == StrengthLevel::Weak {
        return Err(AppError::InvalidInput(format!(
            "Password is too weak: {}",
            strength.feedback.join(", ")
        )));
    }

    if let Some(raw) = request.phone.as_deref().filter(|p| !p.trim().is_empty()) {
        let phone = sanitize_phone(raw)
            .ok_or_else(|| AppError::InvalidInput("Invalid phone number".to_string()))?;
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("phone".to_string(), Value::String(phone));
        }
    }

    Ok(())
}
