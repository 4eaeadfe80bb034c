use crate::api::session::SessionCredentials;
use crate::config::Config;
use crate::errors::AppError;
use reqwest::{
    Client, Method,
    header::{AUTHORIZATION, COOKIE, SET_COOKIE},
};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Один исходящий запрос к бэкенду
#[derive(Debug, Default)]
pub struct Forward<'a> {
    pub method: Method,
    /// Сегменты пути относительно базового URL, без кодирования
    pub segments: Vec<String>,
    pub query: Option<&'a str>,
    pub body: Option<Value>,
    pub credentials: Option<&'a SessionCredentials>,
    pub request_id: Option<&'a str>,
}

impl<'a> Forward<'a> {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            ..Default::default()
        }
    }

    pub fn body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    pub fn credentials(mut self, credentials: &'a SessionCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn query(mut self, query: &'a str) -> Self {
        if !query.is_empty() {
            self.query = Some(query);
        }
        self
    }

    pub fn request_id(mut self, request_id: Option<&'a str>) -> Self {
        self.request_id = request_id;
        self
    }
}

/// Тело ответа бэкенда. Все поля необязательные, пустое или не-JSON тело
/// превращается в значение по умолчанию.
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamBody {
    pub success: Option<bool>,
    pub data: Option<Value>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub code: Option<String>,
}

impl UpstreamBody {
    fn parse(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::default();
        }
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => {
                serde_json::from_value(Value::Object(map)).unwrap_or_default()
            }
            Ok(other) => Self {
                data: Some(other),
                ..Default::default()
            },
            Err(_) => Self::default(),
        }
    }

    /// `message`, а если его нет, то `error`
    pub fn message(&self) -> Option<String> {
        self.message.clone().or_else(|| self.error.clone())
    }
}

#[derive(Debug)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: UpstreamBody,
    pub set_cookies: Vec<String>,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 2xx остаётся ответом, всё остальное становится `AppError::Upstream`
    pub fn into_result(self) -> Result<UpstreamReply, AppError> {
        if self.is_success() {
            return Ok(self);
        }
        let status = actix_web::http::StatusCode::from_u16(self.status)
            .map_err(|_| AppError::Internal(format!("invalid upstream status {}", self.status)))?;
        let message = self.body.message();
        Err(AppError::from_upstream(status, message, self.body.code))
    }
}

#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: Url,
}

impl UpstreamClient {
    pub fn new(base_url: Url, client: Client) -> Self {
        Self { client, base_url }
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let base_url = config
            .upstream_url()
            .map_err(|e| AppError::Internal(format!("invalid api_base_url: {}", e)))?;
        let client = Client::builder().timeout(config.effective_timeout()).build()?;
        Ok(Self::new(base_url, client))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Базовый URL плюс сегменты; каждый сегмент кодируется отдельно
    pub fn url_for(&self, segments: &[String], query: Option<&str>) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| AppError::Internal("api_base_url cannot be a base".to_string()))?;
            path.pop_if_empty();
            path.extend(segments.iter().map(String::as_str));
        }
        url.set_query(query);
        Ok(url)
    }

    /// Отправляет запрос и возвращает ответ как есть. Ошибкой считается только
    /// сбой транспорта; статус бэкенда разбирает `UpstreamReply::into_result`.
    pub async fn send(&self, forward: Forward<'_>) -> Result<UpstreamReply, AppError> {
        let url = self.url_for(&forward.segments, forward.query)?;
        log::debug!("Forwarding {} {}", forward.method, url.path());

        let mut request_builder = self.client.request(forward.method.clone(), url);

        if let Some(credentials) = forward.credentials {
            if let Some(cookie) = credentials.cookie_header() {
                request_builder = request_builder.header(COOKIE, cookie);
            }
            if let Some(authorization) = credentials.authorization() {
                request_builder = request_builder.header(AUTHORIZATION, authorization);
            }
        }

        if let Some(id) = forward.request_id {
            request_builder = request_builder.header(REQUEST_ID_HEADER, id);
        }

        if let Some(body) = &forward.body {
            request_builder = request_builder.json(body);
        }

        let response = request_builder.send().await?;

        let status = response.status().as_u16();
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect::<Vec<_>>();
        let bytes = response.bytes().await?;
        let body = UpstreamBody::parse(&bytes);

        if !(200..300).contains(&status) {
            log::warn!(
                "Upstream {} {} answered {}: {}",
                forward.method,
                forward.segments.join("/"),
                status,
                body.message().unwrap_or_default()
            );
        }

        Ok(UpstreamReply {
            status,
            body,
            set_cookies,
        })
    }

    /// Запрос, у которого неуспешный статус сразу превращается в ошибку
    pub async fn forward(&self, forward: Forward<'_>) -> Result<UpstreamReply, AppError> {
        self.send(forward).await?.into_result()
    }
}
