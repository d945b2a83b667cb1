//! HTTP capability used by providers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, redirect, Client};
use serde::de::DeserializeOwned;
use url::form_urlencoded;

use crate::config::HttpConfig;
use crate::error::{Error, Result};

/// Request verb. Upstreams only ever need these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A single outbound call.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: Method,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Build a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            body: None,
            headers: Vec::new(),
        }
    }

    /// Build a POST request with no body yet.
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Post,
            body: None,
            headers: Vec::new(),
        }
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set an `application/x-www-form-urlencoded` body.
    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.body = Some(encode_form(fields));
        self.header(
            header::CONTENT_TYPE.as_str(),
            "application/x-www-form-urlencoded",
        )
    }

    /// Set a JSON body.
    pub fn json(mut self, value: &serde_json::Value) -> Self {
        self.body = Some(value.to_string());
        self.header(header::CONTENT_TYPE.as_str(), "application/json")
    }

    /// Look up a header value (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response status and body text.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Truncated body for diagnostics.
    pub fn snippet(&self) -> &str {
        snippet(&self.body, 200)
    }
}

/// Generic HTTP-call capability.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform one call. Transport failures are `Err`; any HTTP status is `Ok`.
    async fn call(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Production client backed by reqwest.
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Build a client with the configured user agent, timeouts, and redirect policy.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn call(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        tracing::debug!("{:?} {}", request.method, request.url);

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(describe_transport_error(&e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(describe_transport_error(&e)))?;

        tracing::debug!("Response status: {} ({} bytes)", status, body.len());

        Ok(HttpResponse { status, body })
    }
}

/// Short description of a reqwest failure, without the full error chain.
fn describe_transport_error(err: &reqwest::Error) -> String {
    let host = err
        .url()
        .and_then(|u| u.host_str())
        .unwrap_or("upstream")
        .to_string();

    if err.is_timeout() {
        format!("request to {} timed out", host)
    } else if err.is_connect() {
        format!("could not connect to {}", host)
    } else if err.is_redirect() {
        format!("too many redirects from {}", host)
    } else {
        format!("request to {} failed: {}", host, err)
    }
}

/// URL-encode form fields.
pub fn encode_form(fields: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields.iter().copied())
        .finish()
}

/// Truncate text at a char boundary.
pub fn snippet(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
