//! HTTP client abstraction.
//!
//! Everything network-facing goes through [`HttpClient`], so gatherers and
//! the validator can be exercised against a scripted client (`ScriptedHttp`,
//! behind the `testing` feature).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::error::FetchError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Bodies beyond this are truncated. Search result pages fit comfortably.
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Head,
    Get,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Head => write!(f, "HEAD"),
            Self::Get => write!(f, "GET"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    /// Read the response body. Liveness probes skip it.
    pub want_body: bool,
}

impl FetchRequest {
    pub fn head(url: impl Into<String>) -> Self {
        Self {
            method: Method::Head,
            url: url.into(),
            want_body: false,
        }
    }

    /// GET and read the body.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            want_body: true,
        }
    }

    /// GET without reading the body.
    pub fn probe(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            want_body: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    /// URL after following redirects.
    pub final_url: String,
    pub content_type: Option<String>,
    /// Empty unless the request asked for it.
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Status in `[200, 400)`.
    pub fn is_live(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform one request, following redirects up to the client's limit.
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError>;
}

/// Production client: per-request timeout, bounded redirects, browser UA.
pub struct ReqwestClient {
    http: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(timeout: Duration, max_redirects: usize) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(max_redirects))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let builder = match request.method {
            Method::Head => self.http.head(&request.url),
            Method::Get => self.http.get(&request.url),
        };
        let mut resp = builder
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.8")
            .send()
            .await?;

        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());

        let mut body = Vec::new();
        if request.want_body {
            while let Some(chunk) = resp.chunk().await? {
                body.extend_from_slice(&chunk);
                if body.len() >= MAX_BODY_BYTES {
                    body.truncate(MAX_BODY_BYTES);
                    break;
                }
            }
        }

        log::trace!("{} {} -> {}", request.method, request.url, status);
        Ok(FetchResponse {
            status,
            final_url,
            content_type,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

/// Minimum spacing between requests to one service, shared by all workers.
pub struct Throttle {
    interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Wait until at least `interval` has passed since the previous call
    /// returned.
    pub async fn wait(&self) {
        if self.interval.is_zero() {
            return;
        }
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
