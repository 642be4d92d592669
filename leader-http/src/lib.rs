//! Bounded single-shot HTTP GET for bot commands.
//!
//! - Every request carries the bot's fixed [`USER_AGENT`]
//! - Optional HTTP basic auth, applied only when both halves are non-empty
//! - Separate connect timeout and read/write deadline (2s each by default)
//! - The body is returned as text whatever the status code; no retries
//!
//! ```no_run
//! # async fn demo() -> Result<(), leader_http::FetchError> {
//! use leader_http::{Credentials, FetchRequest};
//!
//! let body = FetchRequest::new("http://radio.example.com:8000/admin.cgi?mode=viewxml")
//!     .with_credentials(Credentials::new("admin", "secret"))
//!     .send()
//!     .await?;
//! # let _ = body;
//! # Ok(()) }
//! ```
//!
//! Observability: `tracing` events for request start, response, and each
//! failure (`warn`). Auth is logged only as its kind (`basic`/`none`).
//! With `LEADER_HTTP_RAW=1` a truncated body is traced on target `http.raw`.

use reqwest::{Client, Url};
use std::env;
use std::error::Error as StdError;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const USER_AGENT: &str = "Mozilla/5.0 Leader-1/Mighty, Mighty GoBot";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(2);

const RAW_ENV: &str = "LEADER_HTTP_RAW";
const RAW_MAX_BODY: usize = 4 * 1024;

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("couldn't build http request: {0}")]
    RequestBuild(String),
    #[error("couldn't perform http request: {0}")]
    Transport(String),
    #[error("couldn't read http response body: {0}")]
    BodyRead(String),
}

/// Basic-auth user/password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    password: String,
}

impl Credentials {
    /// Returns `None` unless both parts are non-empty.
    ///
    /// ```
    /// use leader_http::Credentials;
    ///
    /// assert!(Credentials::new("admin", "secret").is_some());
    /// assert!(Credentials::new("admin", "").is_none());
    /// assert!(Credentials::new("", "secret").is_none());
    /// ```
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Option<Self> {
        let (user, password) = (user.into(), password.into());
        if user.is_empty() || password.is_empty() {
            return None;
        }
        Some(Self { user, password })
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One GET against `url`. Built fresh per call; nothing is shared.
#[derive(Clone, Debug)]
pub struct FetchRequest {
    url: String,
    credentials: Option<Credentials>,
    pub connect_timeout: Duration,
    /// Deadline for the exchange once the connection is up.
    pub io_timeout: Duration,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credentials: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = dur;
        self
    }

    pub fn with_io_timeout(mut self, dur: Duration) -> Self {
        self.io_timeout = dur;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn user_agent(&self) -> &'static str {
        USER_AGENT
    }

    pub async fn send(&self) -> Result<String, FetchError> {
        fetch_page(self).await
    }
}

/// Perform exactly one GET and return the whole body as text.
pub async fn fetch_page(req: &FetchRequest) -> Result<String, FetchError> {
    let url = parse_target(&req.url).map_err(|message| {
        tracing::warn!(url = %req.url, message = %message, "http.build_error.url");
        FetchError::RequestBuild(message)
    })?;

    // `read_timeout` bounds each wait on the server once connected; the total
    // cap stops a server that drips bytes just inside it.
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(req.connect_timeout)
        .read_timeout(req.io_timeout)
        .timeout(req.connect_timeout + req.io_timeout)
        .build()
        .map_err(|e| {
            let message = describe(&e);
            tracing::warn!(message = %message, "http.build_error.client");
            FetchError::RequestBuild(message)
        })?;

    let mut rb = client.get(url.clone());
    let auth_kind = match &req.credentials {
        Some(creds) => {
            rb = rb.basic_auth(&creds.user, Some(&creds.password));
            "basic"
        }
        None => "none",
    };

    let req_id = format!(
        "r{:x}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    );
    let host_path = format!("{}{}", url.host_str().unwrap_or("-"), url.path());

    tracing::debug!(
        req_id = %req_id,
        host_path = %host_path,
        auth_kind,
        connect_timeout_ms = req.connect_timeout.as_millis() as u64,
        io_timeout_ms = req.io_timeout.as_millis() as u64,
        "http.request.start"
    );

    let t0 = Instant::now();
    let resp = rb.send().await.map_err(|e| {
        let message = describe(&e);
        tracing::warn!(
            req_id = %req_id,
            host_path = %host_path,
            timeout = e.is_timeout(),
            connect = e.is_connect(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            message = %message,
            "http.network_error.send"
        );
        FetchError::Transport(message)
    })?;

    let status = resp.status();
    let bytes = resp.bytes().await.map_err(|e| {
        let message = describe(&e);
        tracing::warn!(
            req_id = %req_id,
            %status,
            timeout = e.is_timeout(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            message = %message,
            "http.network_error.body"
        );
        FetchError::BodyRead(message)
    })?;

    tracing::debug!(
        req_id = %req_id,
        %status,
        duration_ms = t0.elapsed().as_millis() as u64,
        body_len = bytes.len(),
        "http.response"
    );

    let body = String::from_utf8_lossy(&bytes).into_owned();

    if raw_enabled() {
        tracing::trace!(target: "http.raw", %req_id, body = %snip_body(&body, RAW_MAX_BODY), "response");
    }

    Ok(body)
}

fn parse_target(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("invalid URL {raw:?}: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported protocol scheme {other:?}")),
    }
}

/// reqwest's `Display` hides the cause ("error sending request"); walk the chain.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

fn snip_body(body: &str, max: usize) -> String {
    if body.len() <= max {
        return body.to_string();
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
