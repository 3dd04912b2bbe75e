use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response, multipart};
use reqwest::header::CONTENT_DISPOSITION;
use serde_json::Value;
use tracing::debug;

use super::{RemoteFile, Transport};
use crate::errors::RetdecError;
use crate::models::{ApiErrorRecord, RequestParams, UploadFile};

/// HTTP client settings shared by every connection of a service.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub api_key: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            timeout: Duration::from_secs(60),
            user_agent: concat!("retdec-rs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Connection to one base URL of the API (e.g. `.../decompiler/decompilations`).
#[derive(Debug, Clone)]
pub struct ApiConnection {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ApiConnection {
    pub fn new(base_url: &str, config: &ConnectionConfig) -> Result<Self, RetdecError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| RetdecError::Connection {
                url: base_url.to_string(),
                source: e,
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        if path.is_empty() {
            self.base_url.clone()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn send(&self, req: RequestBuilder, url: &str) -> Result<Response, RetdecError> {
        let resp = req
            .basic_auth(&self.api_key, Some(""))
            .send()
            .map_err(|e| RetdecError::Connection {
                url: url.to_string(),
                source: e,
            })?;
        debug!(%url, status = resp.status().as_u16(), "api response");
        ensure_success(resp)
    }

    fn parse_json(resp: Response, url: &str) -> Result<Value, RetdecError> {
        resp.json::<Value>().map_err(|e| RetdecError::ParseError(format!("{}: {}", url, e)))
    }
}

impl Transport for ApiConnection {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_json(&self, path: &str, params: &RequestParams) -> Result<Value, RetdecError> {
        let url = self.url_for(path);
        debug!(%url, "GET");
        let resp = self.send(self.client.get(&url).query(params.pairs()), &url)?;
        Self::parse_json(resp, &url)
    }

    fn post_json(
        &self,
        path: &str,
        params: &RequestParams,
        files: &[UploadFile],
    ) -> Result<Value, RetdecError> {
        let url = self.url_for(path);
        debug!(%url, files = files.len(), "POST");
        let mut form = multipart::Form::new();
        for file in files {
            form = form.file(file.field.clone(), &file.path)?;
        }
        let req = self.client.post(&url).query(params.pairs()).multipart(form);
        let resp = self.send(req, &url)?;
        Self::parse_json(resp, &url)
    }

    fn get_file(&self, path: &str, params: &RequestParams) -> Result<RemoteFile, RetdecError> {
        let url = self.url_for(path);
        debug!(%url, "GET file");
        let resp = self.send(self.client.get(&url).query(params.pairs()), &url)?;
        let name = resp
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(RemoteFile::name_from_disposition)
            .unwrap_or_else(|| fallback_name(&url));
        Ok(RemoteFile::new(name, resp))
    }
}

/// Maps error responses onto `RetdecError`; successful ones pass through.
fn ensure_success(resp: Response) -> Result<Response, RetdecError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(RetdecError::authentication());
    }
    let text = resp.text().unwrap_or_default();
    Err(api_error(status, &text))
}

fn api_error(status: StatusCode, body: &str) -> RetdecError {
    match serde_json::from_str::<ApiErrorRecord>(body) {
        Ok(rec) => RetdecError::UnknownApi {
            code: rec.code().unwrap_or(status.as_u16()),
            message: rec.message,
            description: rec.description,
        },
        Err(_) => RetdecError::UnknownApi {
            code: status.as_u16(),
            message: status.canonical_reason().unwrap_or("").to_string(),
            description: body.to_string(),
        },
    }
}

fn fallback_name(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}
