//! Supplier API HTTP client
//!
//! Every call carries the default `key` query parameter and the
//! `Authorization` / `content-type` headers; call-specific values are merged
//! over them and win on collision.

use crate::error::{WbError, WbResult};
use crate::types::Credentials;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://suppliers-api.wildberries.ru";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Query parameters. Values are rendered as plain text (`"a"` → `a`, `0` → `0`).
pub type Params = Map<String, Value>;

/// Immutable client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub credentials: Credentials,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A file sent as one part of a multipart POST body.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

/// HTTP client for the Wildberries supplier API
pub struct SupplierClient {
    config: ClientConfig,
    default_headers: HeaderMap,
    http: Client,
}

impl SupplierClient {
    pub fn new(config: ClientConfig) -> WbResult<Self> {
        let default_headers = default_headers(&config.credentials)?;
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WbError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            default_headers,
            http,
        })
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    pub fn default_params(&self) -> Params {
        let mut params = Params::new();
        params.insert(
            "key".to_string(),
            Value::String(self.config.credentials.key.clone()),
        );
        params
    }

    /// Absolute URL of an endpoint; `card/x` and `/card/x` are the same path.
    pub fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// GET `endpoint` and parse the JSON body.
    pub fn get(
        &self,
        endpoint: &str,
        params: Option<&Params>,
        headers: Option<&HeaderMap>,
    ) -> WbResult<Value> {
        let url = self.url(endpoint);
        debug!(method = "GET", url = %url, "supplier API request");

        let request = self
            .http
            .get(&url)
            .headers(merge_headers(&self.default_headers, headers))
            .query(&query_pairs(&merge_params(&self.default_params(), params)));
        send(request)
    }

    /// POST `endpoint` with `data` as a JSON body and parse the JSON reply.
    ///
    /// With `files`, the body becomes a multipart form: one part per file plus
    /// a `data` text part holding the JSON when `data` is also given.
    pub fn post(
        &self,
        endpoint: &str,
        params: Option<&Params>,
        data: Option<&Value>,
        files: Option<&[Attachment]>,
        headers: Option<&HeaderMap>,
    ) -> WbResult<Value> {
        let url = self.url(endpoint);
        debug!(method = "POST", url = %url, "supplier API request");

        let mut merged_headers = merge_headers(&self.default_headers, headers);
        let body = data.map(serde_json::to_string).transpose()?;

        let mut request = self
            .http
            .post(&url)
            .query(&query_pairs(&merge_params(&self.default_params(), params)));

        match files {
            Some(files) if !files.is_empty() => {
                merged_headers.remove(CONTENT_TYPE);
                request = request
                    .headers(merged_headers)
                    .multipart(multipart_form(body, files)?);
            }
            _ => {
                request = request.headers(merged_headers);
                if let Some(body) = body {
                    request = request.body(body);
                }
            }
        }
        send(request)
    }
}

fn default_headers(credentials: &Credentials) -> WbResult<HeaderMap> {
    let mut token = HeaderValue::from_str(&credentials.token)
        .map_err(|_| WbError::Config("API token contains characters not allowed in a header".into()))?;
    token.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(AUTHORIZATION, token);
    Ok(headers)
}

/// Defaults first, call-specific parameters replace defaults of the same name.
pub fn merge_params(defaults: &Params, overrides: Option<&Params>) -> Params {
    let mut merged = defaults.clone();
    if let Some(overrides) = overrides {
        for (name, value) in overrides {
            merged.insert(name.clone(), value.clone());
        }
    }
    merged
}

/// Same as [`merge_params`]; header names compare case-insensitively.
pub fn merge_headers(defaults: &HeaderMap, overrides: Option<&HeaderMap>) -> HeaderMap {
    let mut merged = defaults.clone();
    if let Some(overrides) = overrides {
        for name in overrides.keys() {
            merged.remove(name);
        }
        for (name, value) in overrides {
            merged.append(name.clone(), value.clone());
        }
    }
    merged
}

/// Render parameters as query pairs. Strings go as-is, everything else as JSON text.
pub fn query_pairs(params: &Params) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(name, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (name.clone(), text)
        })
        .collect()
}

fn multipart_form(body: Option<String>, files: &[Attachment]) -> WbResult<Form> {
    let mut form = Form::new();
    if let Some(body) = body {
        form = form.text("data", body);
    }
    for file in files {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(mime) = &file.mime {
            part = part.mime_str(mime)?;
        }
        form = form.part(file.field.clone(), part);
    }
    Ok(form)
}

fn send(request: RequestBuilder) -> WbResult<Value> {
    let response = request.send()?;
    decode(response)
}

/// Non-success statuses fail with the status and raw body for GET and POST alike.
fn decode(response: Response) -> WbResult<Value> {
    let status = response.status();
    let body = response.text()?;

    if !status.is_success() {
        warn!(status = status.as_u16(), "supplier API returned an error");
        return Err(WbError::Request {
            status: status.as_u16(),
            body,
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body)?)
}
