//! In-memory `HttpClient` for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::client::{HttpClient, HttpRequest, HttpResponse, Method};
use crate::error::{Error, Result};

struct Route {
    url_contains: String,
    method: Option<Method>,
    reply: std::result::Result<HttpResponse, String>,
}

/// Routes requests by URL substring and records every call.
///
/// The first matching route wins. Unmatched requests fail with a network error.
#[derive(Default)]
pub struct StubHttp {
    routes: Vec<Route>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl StubHttp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to any method whose URL contains `pattern`.
    pub fn respond(mut self, pattern: &str, status: u16, body: &str) -> Self {
        self.routes.push(Route {
            url_contains: pattern.to_string(),
            method: None,
            reply: Ok(HttpResponse::new(status, body)),
        });
        self
    }

    /// Reply only to `method` requests whose URL contains `pattern`.
    pub fn respond_to(mut self, method: Method, pattern: &str, status: u16, body: &str) -> Self {
        self.routes.push(Route {
            url_contains: pattern.to_string(),
            method: Some(method),
            reply: Ok(HttpResponse::new(status, body)),
        });
        self
    }

    /// Fail requests whose URL contains `pattern` with a transport error.
    pub fn fail(mut self, pattern: &str, message: &str) -> Self {
        self.routes.push(Route {
            url_contains: pattern.to_string(),
            method: None,
            reply: Err(message.to_string()),
        });
        self
    }

    /// Every request seen so far.
    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of requests whose URL contains `pattern`.
    pub fn count(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.contains(pattern))
            .count()
    }
}

#[async_trait]
impl HttpClient for StubHttp {
    async fn call(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(request.clone());

        let route = self.routes.iter().find(|r| {
            request.url.contains(&r.url_contains) && r.method.map_or(true, |m| m == request.method)
        });

        match route {
            Some(route) => route.reply.clone().map_err(Error::Network),
            None => Err(Error::Network(format!("no stub route for {}", request.url))),
        }
    }
}
