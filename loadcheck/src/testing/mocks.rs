//! Scripted HTTP transport for exercising scenarios without live services.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

use crate::client::{ApiResponse, HttpRequest, HttpTransport, Method};
use crate::errors::LoadcheckError;

#[derive(Debug, Clone)]
enum Reply {
    Respond(ApiResponse),
    Fail(String),
}

#[derive(Debug, Default)]
struct Route {
    queued: VecDeque<Reply>,
    fallback: Option<Reply>,
}

/// Transport that answers from scripted routes and records every request.
///
/// Routes are matched by method and URL suffix; the longest matching suffix
/// wins. Queued replies are used once each, after which the route's last
/// `with_route` reply repeats. Unmatched requests get the default reply, or
/// `404` when none is set.
#[derive(Debug, Default)]
pub struct StubTransport {
    routes: Mutex<HashMap<(Method, String), Route>>,
    default: Option<ApiResponse>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    /// Creates a transport with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply used for requests no route matches.
    #[must_use]
    pub fn with_default(mut self, response: ApiResponse) -> Self {
        self.default = Some(response);
        self
    }

    /// Answers `method` requests whose URL ends with `suffix`.
    #[must_use]
    pub fn with_route(self, method: Method, suffix: impl Into<String>, response: ApiResponse) -> Self {
        self.routes
            .lock()
            .entry((method, suffix.into()))
            .or_default()
            .fallback = Some(Reply::Respond(response));
        self
    }

    /// Queues a one-shot reply ahead of the route's repeating one.
    #[must_use]
    pub fn with_once(self, method: Method, suffix: impl Into<String>, response: ApiResponse) -> Self {
        self.routes
            .lock()
            .entry((method, suffix.into()))
            .or_default()
            .queued
            .push_back(Reply::Respond(response));
        self
    }

    /// Fails matching requests with a transport error.
    #[must_use]
    pub fn with_error(self, method: Method, suffix: impl Into<String>, message: impl Into<String>) -> Self {
        self.routes
            .lock()
            .entry((method, suffix.into()))
            .or_default()
            .fallback = Some(Reply::Fail(message.into()));
        self
    }

    /// Every request sent so far.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Number of `method` requests whose URL ends with `suffix`.
    #[must_use]
    pub fn count(&self, method: Method, suffix: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.url.ends_with(suffix))
            .count()
    }

    fn reply_for(&self, request: &HttpRequest) -> Reply {
        let mut routes = self.routes.lock();
        let key = routes
            .keys()
            .filter(|(method, suffix)| *method == request.method && request.url.ends_with(suffix.as_str()))
            .max_by_key(|(_, suffix)| suffix.len())
            .cloned();

        let scripted = key.and_then(|key| {
            let route = routes.get_mut(&key)?;
            route.queued.pop_front().or_else(|| route.fallback.clone())
        });

        scripted.unwrap_or_else(|| {
            Reply::Respond(self.default.clone().unwrap_or_else(|| ApiResponse::new(404, None)))
        })
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<ApiResponse, LoadcheckError> {
        let reply = self.reply_for(&request);
        self.requests.lock().push(request);
        match reply {
            Reply::Respond(response) => Ok(response),
            Reply::Fail(message) => Err(LoadcheckError::Http(message)),
        }
    }
}
