use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Базовый URL бэкенда, к которому проксируются все запросы
    pub api_base_url: String,
    /// `production` включает флаг `Secure` у cookie
    pub app_env: Option<String>,
    pub upstream_timeout_secs: Option<u64>,
    pub max_body_bytes: Option<usize>,
    /// Список origin через запятую, для которых включается CORS с credentials
    pub allowed_origins: Option<String>,
    pub workers: Option<usize>,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let cfg = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .add_source(config::Environment::default())
            .build()?;

        let mut config: Config = cfg.try_deserialize()?;

        if config.app_env.is_none() {
            config.app_env = Some("development".to_string());
        }

        config.validate()?;

        Ok(config)
    }

    /// Конфигурация для указанного бэкенда со значениями по умолчанию
    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            api_base_url: api_base_url.into(),
            app_env: Some("development".to_string()),
            upstream_timeout_secs: None,
            max_body_bytes: None,
            allowed_origins: None,
            workers: None,
        }
    }

    /// Валидирует конфигурацию на наличие потенциальных проблем безопасности
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if !self
            .host
            .chars()
            .all(|c| c.is_alphanumeric() || ".:-_".contains(c))
        {
            return Err(config::ConfigError::Message(
                "Invalid host format".to_string(),
            ));
        }

        if self.port < 1024 {
            return Err(config::ConfigError::Message(
                "Port must be 1024 or higher for security reasons".to_string(),
            ));
        }

        let base = self.upstream_url().map_err(|e| {
            config::ConfigError::Message(format!("Invalid api_base_url: {}", e))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(config::ConfigError::Message(format!(
                "api_base_url must use http or https, got {}",
                base.scheme()
            )));
        }
        if base.cannot_be_a_base() {
            return Err(config::ConfigError::Message(
                "api_base_url cannot be used as a base URL".to_string(),
            ));
        }

        if let Some(timeout) = self.upstream_timeout_secs {
            if !(1..=300).contains(&timeout) {
                return Err(config::ConfigError::Message(
                    "upstream_timeout_secs must be between 1 and 300".to_string(),
                ));
            }
        }

        // 1KB..50MB
        if let Some(limit) = self.max_body_bytes {
            let min = 1024;
            let max = 50 * 1024 * 1024;
            if limit < min || limit > max {
                return Err(config::ConfigError::Message(format!(
                    "max_body_bytes must be between {} and {} bytes",
                    min, max
                )));
            }
        }

        if self.workers == Some(0) {
            return Err(config::ConfigError::Message(
                "workers must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl Config {
    pub fn upstream_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(self.api_base_url.trim())
    }

    pub fn is_production(&self) -> bool {
        self.app_env
            .as_deref()
            .map(|env| env.trim().eq_ignore_ascii_case("production"))
            .unwrap_or(false)
    }

    pub fn effective_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn effective_max_body_bytes(&self) -> usize {
        self.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES)
    }

    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}
