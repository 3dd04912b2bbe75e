use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::cores::conn::{ApiConnection, ConnectionConfig, Transport};
use crate::errors::RetdecError;
use crate::models::{RequestParams, StartedJobRecord, UploadFile};

pub const DEFAULT_API_URL: &str = "https://retdec.com/service/api";
pub const API_KEY_ENV: &str = "RETDEC_API_KEY";
pub const API_URL_ENV: &str = "RETDEC_API_URL";

/// Service settings; unset key and URL fall back to the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let conn = ConnectionConfig::default();
        Self {
            api_key: None,
            api_url: None,
            timeout: conn.timeout,
            user_agent: conn.user_agent,
        }
    }
}

/// Resolved API key and URL, shared by the service front doors.
#[derive(Debug, Clone)]
pub struct Service {
    api_url: String,
    conn_config: ConnectionConfig,
}

impl Service {
    pub fn new(config: ServiceConfig) -> Result<Self, RetdecError> {
        Self::with_env(config, |name| std::env::var(name).ok())
    }

    /// Like [`Service::new`] with a custom environment lookup.
    pub fn with_env<F>(config: ServiceConfig, env: F) -> Result<Self, RetdecError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = config
            .api_key
            .or_else(|| env(API_KEY_ENV))
            .ok_or(RetdecError::MissingApiKey)?;
        let api_url = config
            .api_url
            .or_else(|| env(API_URL_ENV))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = api_url.trim_end_matches('/').to_string();
        url::Url::parse(&api_url).map_err(|_| RetdecError::InvalidValue {
            name: "api_url".into(),
            value: api_url.clone(),
        })?;

        Ok(Self {
            api_url,
            conn_config: ConnectionConfig {
                api_key,
                timeout: config.timeout,
                user_agent: config.user_agent,
            },
        })
    }

    pub fn api_key(&self) -> &str {
        &self.conn_config.api_key
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Opens a connection to `<api_url><path>`.
    pub fn connect(&self, path: &str) -> Result<Arc<dyn Transport>, RetdecError> {
        let conn = ApiConnection::new(&format!("{}{}", self.api_url, path), &self.conn_config)?;
        Ok(Arc::new(conn))
    }
}

/// Uploads a new job to the connection's base URL and returns its id.
pub(crate) fn start_job(
    conn: &dyn Transport,
    params: &RequestParams,
    files: &[UploadFile],
) -> Result<String, RetdecError> {
    let body: Value = conn.post_json("", params, files)?;
    let started: StartedJobRecord = serde_json::from_value(body)
        .map_err(|e| RetdecError::ParseError(format!("upload response: {}", e)))?;
    Ok(started.id)
}
