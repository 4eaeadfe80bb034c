use crate::config::Config;
use crate::errors::AppError;
use crate::services::upstream::UpstreamClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let upstream = UpstreamClient::from_config(&config)?;
        Ok(Self { config, upstream })
    }
}
