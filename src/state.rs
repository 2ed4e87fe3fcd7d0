use std::sync::Arc;

use crate::api::{ApiClient, Directory};
use crate::config::Config;
use crate::error::ApiError;
use crate::hosts::HostResolver;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub api: ApiClient,
    pub directory: Arc<dyn Directory>,
    pub hosts: HostResolver,
    pub renderer: reqwest::Client,
}

impl AppState {
    /// Build the state for `config`, talking to the real API.
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api_url, config.api_timeout)?;
        let renderer = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.api_timeout * 3)
            .build()?;

        Ok(Self {
            hosts: HostResolver::from_config(&config),
            directory: Arc::new(api.clone()),
            api,
            renderer,
            config,
        })
    }
}
