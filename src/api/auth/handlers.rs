use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use reqwest::Method;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    api::{
        middleware::RequestId,
        proxy::{CookiePolicy, get_only, parse_body, post_only, success_response},
        session::{SessionCookies, SessionCredentials},
    },
    app_state::AppState,
    errors::AppError,
    services::{password, upstream::Forward},
};

use super::functions::{
    clear_session_cookies, drop_session_set_cookies, validate_login, validate_registration,
};
use super::structures::{
    LoginRequest, PasswordValidationRequest, PasswordValidationResponse, RegisterRequest,
    SoftReason, VerifySessionResponse,
};

/// Вход по email и паролю
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookies forwarded from the backend"),
        (status = 400, description = "Email or password missing or malformed"),
        (status = 401, description = "Rejected by the backend (code TOKEN_EXPIRED)"),
        (status = 500, description = "Backend unreachable")
    )
)]
pub async fn login(
    req: HttpRequest,
    body: web::Bytes,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let payload = parse_body(&body)?
        .ok_or_else(|| AppError::InvalidInput("Email and password are required".to_string()))?;
    let request: LoginRequest = read_form(&payload)?;
    validate_login(&request)?;

    let credentials = SessionCredentials::from_request(&req);
    let request_id = RequestId::of(&req);
    let reply = app_state
        .upstream
        .forward(
            Forward::new(Method::POST, "auth/login")
                .body(Some(payload))
                .credentials(&credentials)
                .request_id(request_id.as_deref()),
        )
        .await?;

    log::info!("Login succeeded, forwarding {} cookie(s)", reply.set_cookies.len());
    Ok(success_response(reply, CookiePolicy::ForwardSetCookie))
}

/// Регистрация новой учётной записи
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, session cookies forwarded from the backend"),
        (status = 400, description = "Invalid form data or weak password"),
        (status = 409, description = "Account already exists (status mirrored from the backend)")
    )
)]
pub async fn register(
    req: HttpRequest,
    body: web::Bytes,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let mut payload = parse_body(&body)?
        .ok_or_else(|| AppError::InvalidInput("Registration details are required".to_string()))?;
    let request: RegisterRequest = read_form(&payload)?;
    validate_registration(&request, &mut payload)?;

    let credentials = SessionCredentials::from_request(&req);
    let request_id = RequestId::of(&req);
    let reply = app_state
        .upstream
        .forward(
            Forward::new(Method::POST, "auth/register")
                .body(Some(payload))
                .credentials(&credentials)
                .request_id(request_id.as_deref()),
        )
        .await?;

    log::info!("Registration succeeded");
    Ok(success_response(reply, CookiePolicy::ForwardSetCookie))
}

/// Обновление токенов по `refreshToken`. При невалидном токене cookie очищаются.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "Auth",
    responses(
        (status = 200, description = "Tokens refreshed, new cookies forwarded"),
        (status = 401, description = "Refresh token missing or rejected; session cookies cleared")
    )
)]
pub async fn refresh(req: HttpRequest, app_state: web::Data<AppState>) -> HttpResponse {
    let credentials = SessionCredentials::from_request(&req);
    let cookies = SessionCookies::from_config(&app_state.config);

    if credentials.refresh_token().is_none() {
        log::info!("Refresh requested without a refresh token");
        let mut resp =
            AppError::AuthenticationRequired("No refresh token found".to_string()).error_response();
        clear_session_cookies(&mut resp, &cookies);
        return resp;
    }

    let request_id = RequestId::of(&req);
    let result = app_state
        .upstream
        .forward(
            Forward::new(Method::POST, "auth/refresh")
                .credentials(&credentials)
                .request_id(request_id.as_deref()),
        )
        .await;

    match result {
        Ok(reply) => success_response(reply, CookiePolicy::ForwardSetCookie),
        Err(err) => {
            let mut resp = err.error_response();
            let status = err.status_code();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                log::info!("Refresh token rejected, clearing session cookies");
                clear_session_cookies(&mut resp, &cookies);
            }
            resp
        }
    }
}

/// Выход. Cookie сессии очищаются независимо от ответа бэкенда.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Logged out, session cookies cleared"),
        (status = 400, description = "No active session found")
    )
)]
pub async fn logout(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let credentials = SessionCredentials::from_request(&req);
    if credentials.session_token().is_none() {
        return Err(AppError::NoActiveSession);
    }

    let request_id = RequestId::of(&req);
    let result = app_state
        .upstream
        .forward(
            Forward::new(Method::POST, "auth/logout")
                .credentials(&credentials)
                .request_id(request_id.as_deref()),
        )
        .await;

    let mut resp = match result {
        Ok(mut reply) => {
            drop_session_set_cookies(&mut reply);
            if reply.body.message.is_none() {
                reply.body.message = Some("Logged out successfully".to_string());
            }
            success_response(reply, CookiePolicy::ForwardSetCookie)
        }
        Err(err) => {
            log::warn!("Upstream logout failed: {}", err);
            err.error_response()
        }
    };

    clear_session_cookies(&mut resp, &SessionCookies::from_config(&app_state.config));
    Ok(resp)
}

/// Проверка сессии. Всегда 200; `valid: false` с причиной вместо ошибки.
#[utoipa::path(
    get,
    path = "/api/auth/verify-session",
    tag = "Auth",
    responses(
        (status = 200, description = "Verification result", body = VerifySessionResponse)
    )
)]
pub async fn verify_session(req: HttpRequest, app_state: web::Data<AppState>) -> HttpResponse {
    let credentials = SessionCredentials::from_request(&req);
    if credentials.session_token().is_none() {
        return HttpResponse::Ok().json(VerifySessionResponse::invalid(SoftReason::NoSession, None));
    }

    let request_id = RequestId::of(&req);
    let result = app_state
        .upstream
        .send(
            Forward::new(Method::GET, "auth/verify-session")
                .credentials(&credentials)
                .request_id(request_id.as_deref()),
        )
        .await;

    let response = match result {
        Err(err) => {
            log::warn!("Session verification unavailable: {}", err);
            VerifySessionResponse::invalid(SoftReason::Unavailable, None)
        }
        Ok(reply) if !reply.is_success() => {
            log::info!("Session rejected by backend with status {}", reply.status);
            VerifySessionResponse::invalid(SoftReason::Rejected, reply.body.message())
        }
        Ok(reply) => {
            let valid = reported_validity(reply.body.data.as_ref());
            VerifySessionResponse {
                valid,
                reason: (!valid).then_some(SoftReason::Rejected),
                message: reply.body.message.clone(),
                data: reply.body.data,
            }
        }
    };

    HttpResponse::Ok().json(response)
}

/// Проверка пароля: локальная оценка сложности плюс правила бэкенда.
/// Любой сбой превращается в `valid: false` с кодом 200.
#[utoipa::path(
    post,
    path = "/api/auth/validate-password",
    tag = "Auth",
    request_body = PasswordValidationRequest,
    responses(
        (status = 200, description = "Validation result", body = PasswordValidationResponse)
    )
)]
pub async fn validate_password(
    req: HttpRequest,
    body: web::Bytes,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let payload = match parse_body(&body) {
        Ok(payload) => payload,
        Err(err) => {
            log::debug!("Unreadable password validation request: {}", err);
            return soft_password_result(password::evaluate(""), SoftReason::InvalidRequest, None);
        }
    };
    let request: PasswordValidationRequest = payload
        .clone()
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default();
    let candidate = request.password.unwrap_or_default();
    let strength = password::evaluate(&candidate);

    if candidate.is_empty() {
        return soft_password_result(strength, SoftReason::EmptyPassword, None);
    }

    let credentials = SessionCredentials::from_request(&req);
    let request_id = RequestId::of(&req);
    let result = app_state
        .upstream
        .send(
            Forward::new(Method::POST, "auth/validate-password")
                .body(payload)
                .credentials(&credentials)
                .request_id(request_id.as_deref()),
        )
        .await;

    match result {
        Err(err) => {
            log::warn!("Password validation unavailable: {}", err);
            soft_password_result(strength, SoftReason::Unavailable, None)
        }
        Ok(reply) if !reply.is_success() => {
            soft_password_result(strength, SoftReason::Rejected, reply.body.message())
        }
        Ok(reply) => {
            let valid = reported_validity(reply.body.data.as_ref());
            HttpResponse::Ok().json(PasswordValidationResponse {
                valid,
                strength,
                reason: (!valid).then_some(SoftReason::Rejected),
                message: reply.body.message,
            })
        }
    }
}

/// Корректный JSON с полями не того типа считается ошибкой формы, а не JSON
fn read_form<T: DeserializeOwned>(payload: &Value) -> Result<T, AppError> {
    T::deserialize(payload).map_err(|e| AppError::InvalidInput(format!("Invalid form data: {}", e)))
}

fn soft_password_result(
    strength: password::PasswordStrength,
    reason: SoftReason,
    message: Option<String>,
) -> HttpResponse {
    HttpResponse::Ok().json(PasswordValidationResponse {
        valid: false,
        strength,
        reason: Some(reason),
        message,
    })
}

/// `data.valid` из ответа бэкенда; без поля ответ 2xx считается подтверждением
fn reported_validity(data: Option<&Value>) -> bool {
    data.and_then(|d| d.get("valid"))
        .and_then(Value::as_bool)
        .unwrap_or(true)
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Без web::scope: остальные `/auth/*` маршруты из таблицы прокси живут рядом
    cfg.service(
        web::resource("/auth/login")
            .route(web::post().to(login))
            .default_service(web::to(post_only)),
    )
    .service(
        web::resource("/auth/register")
            .route(web::post().to(register))
            .default_service(web::to(post_only)),
    )
    .service(
        web::resource("/auth/refresh")
            .route(web::post().to(refresh))
            .default_service(web::to(post_only)),
    )
    .service(
        web::resource("/auth/logout")
            .route(web::post().to(logout))
            .default_service(web::to(post_only)),
    )
    .service(
        web::resource("/auth/verify-session")
            .route(web::get().to(verify_session))
            .default_service(web::to(get_only)),
    )
    .service(
        web::resource("/auth/validate-password")
            .route(web::post().to(validate_password))
            .default_service(web::to(post_only)),
    );
}
