//! HTTP transport seam.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::time::{Duration, Instant};

use crate::config::HttpConfig;
use crate::errors::LoadcheckError;

/// HTTP method used by the service APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
        })
    }
}

/// A request to send.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// JSON body, for `POST`.
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Creates a `GET` request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    /// Creates a `POST` request with a JSON body.
    #[must_use]
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body),
        }
    }
}

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body; `None` if empty or not JSON.
    pub body: Option<Value>,
    /// Time from send to full body received.
    pub duration: Duration,
}

impl ApiResponse {
    /// Creates a response (mainly for tests and stubs).
    #[must_use]
    pub const fn new(status: u16, body: Option<Value>) -> Self {
        Self {
            status,
            body,
            duration: Duration::ZERO,
        }
    }

    /// The parsed JSON body.
    #[must_use]
    pub const fn json(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Whether the status is one the HTTP layer counts as failed (>= 400).
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.status >= 400
    }

    /// Elements of an array body; empty for anything else.
    #[must_use]
    pub fn items(&self) -> &[Value] {
        self.body
            .as_ref()
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice)
    }
}

/// Sends requests on behalf of [`ApiClient`](super::ApiClient).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request and waits for the full response.
    async fn send(&self, request: HttpRequest) -> Result<ApiResponse, LoadcheckError>;
}

/// [`HttpTransport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a transport from HTTP settings.
    pub fn new(config: &HttpConfig) -> Result<Self, LoadcheckError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout()?)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<ApiResponse, LoadcheckError> {
        let started = Instant::now();
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = if bytes.is_empty() {
            None
        } else {
            serde_json::from_slice(&bytes).ok()
        };

        Ok(ApiResponse {
            status,
            body,
            duration: started.elapsed(),
        })
    }
}
