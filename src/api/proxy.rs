//! Обобщённый проксирующий обработчик: один маршрут из таблицы `routes::ROUTES`
//! превращается в запрос к бэкенду с cookie сессии.

use actix_web::{
    HttpRequest, HttpResponse,
    http::{Method as HttpMethod, StatusCode, header::SET_COOKIE},
    web,
};
use reqwest::Method;
use serde_json::Value;

use crate::{
    api::{envelope, middleware::RequestId, session::SessionCredentials},
    app_state::AppState,
    errors::AppError,
    services::upstream::{Forward, UpstreamReply},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
        }
    }

    pub fn to_method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Нужны `accessToken` и `sessionToken`
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookiePolicy {
    Passthrough,
    /// `Set-Cookie` бэкенда копируется в ответ без изменений
    ForwardSetCookie,
}

#[derive(Debug, Clone, Copy)]
pub struct ProxyRoute {
    /// Путь внутри `/api`, в синтаксисе actix (`/roles/{id}`)
    pub path: &'static str,
    pub methods: &'static [Verb],
    /// Путь на бэкенде относительно базового URL, те же плейсхолдеры
    pub upstream: &'static str,
    pub access: Access,
    pub cookies: CookiePolicy,
}

impl ProxyRoute {
    pub fn verb_for(&self, method: &HttpMethod) -> Option<Verb> {
        self.methods
            .iter()
            .copied()
            .find(|verb| verb.as_str() == method.as_str())
    }

    pub fn allowed(&self) -> Vec<&'static str> {
        self.methods.iter().map(|verb| verb.as_str()).collect()
    }

    /// Подставляет параметры пути в шаблон бэкенда
    pub fn upstream_segments(&self, req: &HttpRequest) -> Result<Vec<String>, AppError> {
        resolve_segments(self.upstream, |name| {
            req.match_info().get(name).map(str::to_string)
        })
    }
}

pub fn resolve_segments<F>(template: &str, lookup: F) -> Result<Vec<String>, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    template
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => {
                let raw = lookup(name).filter(|v| !v.is_empty()).ok_or_else(|| {
                    AppError::InvalidInput(format!("Missing path parameter `{}`", name))
                })?;
                decode_param(name, &raw)
            }
            None => Ok(segment.to_string()),
        })
        .collect()
}

/// actix оставляет `%`, `/` и `+` закодированными, остальное уже раскодировано.
/// Значение раскодируется полностью; `.` и `..` запрещены, иначе URL бэкенда
/// схлопнется в соседний путь.
fn decode_param(name: &str, raw: &str) -> Result<String, AppError> {
    let value = urlencoding::decode(raw)
        .map_err(|_| AppError::InvalidInput(format!("Path parameter `{}` is not valid UTF-8", name)))?
        .into_owned();
    if value.is_empty() || value == "." || value == ".." {
        return Err(AppError::InvalidInput(format!(
            "Invalid path parameter `{}`",
            name
        )));
    }
    Ok(value)
}

/// Пустое тело даёт `None`, иначе тело обязано быть JSON
pub fn parse_body(body: &web::Bytes) -> Result<Option<Value>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(body)?))
}

/// Ответ бэкенда 2xx в конверте. 204 превращается в 200, так как у конверта есть тело.
pub fn success_response(reply: UpstreamReply, cookies: CookiePolicy) -> HttpResponse {
    let status = StatusCode::from_u16(reply.status)
        .ok()
        .filter(|status| *status != StatusCode::NO_CONTENT)
        .unwrap_or(StatusCode::OK);
    let mut builder = HttpResponse::build(status);
    if cookies == CookiePolicy::ForwardSetCookie {
        for cookie in reply.set_cookies {
            builder.append_header((SET_COOKIE, cookie));
        }
    }
    envelope::respond_success(builder, reply.body.data, reply.body.message)
}

pub async fn proxy_handler(
    req: HttpRequest,
    body: web::Bytes,
    route: web::Data<ProxyRoute>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let verb = route
        .verb_for(req.method())
        .ok_or_else(|| AppError::MethodNotAllowed {
            allowed: route.allowed(),
        })?;

    let credentials = SessionCredentials::from_request(&req);
    if route.access == Access::Session {
        if let Err(err) = credentials.require_session() {
            log::info!("Rejected {} {}: no session cookies", verb.as_str(), req.path());
            return Err(err);
        }
    }

    let payload = parse_body(&body)?;
    let segments = route.upstream_segments(&req)?;
    let request_id = RequestId::of(&req);

    let forward = Forward {
        method: verb.to_method(),
        segments,
        ..Default::default()
    }
    .body(payload)
    .credentials(&credentials)
    .query(req.query_string())
    .request_id(request_id.as_deref());

    let reply = app_state.upstream.forward(forward).await?;
    Ok(success_response(reply, route.cookies))
}

pub async fn post_only() -> Result<HttpResponse, AppError> {
    Err(AppError::MethodNotAllowed {
        allowed: vec!["POST"],
    })
}

pub async fn get_only() -> Result<HttpResponse, AppError> {
    Err(AppError::MethodNotAllowed {
        allowed: vec!["GET"],
    })
}
