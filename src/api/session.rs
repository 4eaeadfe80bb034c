//! Cookie сессии: чтение из входящего запроса, восстановление заголовка `Cookie`
//! для бэкенда и очистка при выходе.

use actix_web::{
    HttpRequest,
    cookie::{Cookie, SameSite, time::Duration},
    http::header,
};

use crate::{config::Config, errors::AppError};

pub const ACCESS_TOKEN: &str = "accessToken";
pub const REFRESH_TOKEN: &str = "refreshToken";
pub const SESSION_TOKEN: &str = "sessionToken";

pub const SESSION_COOKIES: [&str; 3] = [ACCESS_TOKEN, REFRESH_TOKEN, SESSION_TOKEN];

/// Cookie входящего запроса: разобранные значения для проверки токенов и
/// исходный заголовок `Cookie`, который уходит на бэкенд без изменений.
#[derive(Debug, Clone, Default)]
pub struct SessionCredentials {
    cookies: Vec<(String, String)>,
    raw_header: Option<String>,
    authorization: Option<String>,
}

impl SessionCredentials {
    pub fn from_request(req: &HttpRequest) -> Self {
        let cookies = match req.cookies() {
            Ok(jar) => jar
                .iter()
                .map(|c| (c.name().to_string(), c.value().to_string()))
                .collect(),
            Err(e) => {
                log::warn!("Failed to parse Cookie header: {}", e);
                Vec::new()
            }
        };

        let raw = req
            .headers()
            .get_all(header::COOKIE)
            .filter_map(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>();
        let raw_header = (!raw.is_empty()).then(|| raw.join("; "));

        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Self {
            cookies,
            raw_header,
            authorization,
        }
    }

    #[cfg(test)]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let cookies: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let raw_header = (!cookies.is_empty()).then(|| {
            cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ")
        });
        Self {
            cookies,
            raw_header,
            authorization: None,
        }
    }

    /// Значение cookie; пустые значения считаются отсутствующими
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }

    pub fn access_token(&self) -> Option<&str> {
        self.get(ACCESS_TOKEN)
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.get(REFRESH_TOKEN)
    }

    pub fn session_token(&self) -> Option<&str> {
        self.get(SESSION_TOKEN)
    }

    /// Защищённые маршруты требуют одновременно access и session токен
    pub fn require_session(&self) -> Result<(), AppError> {
        if self.access_token().is_some() && self.session_token().is_some() {
            Ok(())
        } else {
            Err(AppError::unauthenticated())
        }
    }

    /// Заголовок `Cookie` в том виде, в каком его прислал клиент.
    /// Несколько заголовков склеиваются через `; `.
    pub fn cookie_header(&self) -> Option<&str> {
        self.raw_header.as_deref()
    }

    /// `Bearer <accessToken>`, а без cookie входящий `Authorization` как есть
    pub fn authorization(&self) -> Option<String> {
        match self.access_token() {
            Some(token) => Some(format!("Bearer {}", token)),
            None => self.authorization.clone(),
        }
    }
}

/// Построитель cookie с атрибутами сессии: HttpOnly, SameSite=Strict, Path=/,
/// Secure только в production.
pub struct SessionCookies {
    secure: bool,
}

impl SessionCookies {
    pub fn from_config(config: &Config) -> Self {
        Self {
            secure: config.is_production(),
        }
    }

    pub fn expired(&self, name: &str) -> Cookie<'static> {
        let mut cookie = Cookie::new(name.to_string(), String::new());
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(SameSite::Strict);
        cookie.set_max_age(Duration::ZERO);
        cookie
    }

    pub fn cleared(&self) -> Vec<Cookie<'static>> {
        SESSION_COOKIES.iter().map(|name| self.expired(name)).collect()
    }
}

/// Имя cookie из значения заголовка `Set-Cookie`
pub fn set_cookie_name(raw: &str) -> Option<&str> {
    raw.split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(name, _)| name.trim())
        .filter(|name| !name.is_empty())
}
