//! Scripted HTTP client for tests.
//!
//! Routes are matched in insertion order against the request URL: exact
//! match, or prefix match when the pattern ends in `*`. Unmatched requests
//! get a 404. Every request is logged so tests can assert on call counts.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::http::{FetchRequest, FetchResponse, HttpClient, Method};

#[derive(Debug, Clone)]
enum Reply {
    Response {
        status: u16,
        content_type: Option<String>,
        body: String,
    },
    Fail(FetchError),
}

#[derive(Debug, Clone)]
struct Route {
    method: Option<Method>,
    pattern: String,
    reply: Reply,
}

impl Route {
    fn matches(&self, request: &FetchRequest) -> bool {
        if self.method.is_some_and(|m| m != request.method) {
            return false;
        }
        match self.pattern.strip_suffix('*') {
            Some(prefix) => request.url.starts_with(prefix),
            None => request.url == self.pattern,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScriptedHttp {
    routes: Vec<Route>,
    calls: Mutex<Vec<(Method, String)>>,
}

impl ScriptedHttp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer any method on `pattern` with `status` and an HTML body.
    pub fn page(self, pattern: &str, status: u16, body: &str) -> Self {
        self.route(None, pattern, status, Some("text/html; charset=utf-8"), body)
    }

    /// Answer any method on `pattern` with `status` and no body.
    pub fn status(self, pattern: &str, status: u16) -> Self {
        self.route(None, pattern, status, None, "")
    }

    /// Answer any method on `pattern` with an image response.
    pub fn image(self, pattern: &str) -> Self {
        self.route(None, pattern, 200, Some("image/jpeg"), "")
    }

    /// Answer one method on `pattern` with `status` and no body.
    pub fn method_status(self, method: Method, pattern: &str, status: u16) -> Self {
        self.route(Some(method), pattern, status, None, "")
    }

    /// Fail every request to `pattern` with `error`.
    pub fn fail(mut self, pattern: &str, error: FetchError) -> Self {
        self.routes.push(Route {
            method: None,
            pattern: pattern.to_string(),
            reply: Reply::Fail(error),
        });
        self
    }

    pub fn route(
        mut self,
        method: Option<Method>,
        pattern: &str,
        status: u16,
        content_type: Option<&str>,
        body: &str,
    ) -> Self {
        self.routes.push(Route {
            method,
            pattern: pattern.to_string(),
            reply: Reply::Response {
                status,
                content_type: content_type.map(str::to_string),
                body: body.to_string(),
            },
        });
        self
    }

    /// Every request made so far, in order.
    pub fn calls(&self) -> Vec<(Method, String)> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    /// Requests whose URL starts with `prefix`.
    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|(_, url)| url.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((request.method, request.url.clone()));

        let reply = self
            .routes
            .iter()
            .find(|r| r.matches(&request))
            .map(|r| r.reply.clone())
            .unwrap_or(Reply::Response {
                status: 404,
                content_type: None,
                body: String::new(),
            });

        match reply {
            Reply::Fail(e) => Err(e),
            Reply::Response {
                status,
                content_type,
                body,
            } => Ok(FetchResponse {
                status,
                final_url: request.url,
                content_type,
                body: if request.want_body { body } else { String::new() },
            }),
        }
    }
}
