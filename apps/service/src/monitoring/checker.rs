use std::error::Error as StdError;
use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_LENGTH, HeaderMap};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::types::CheckResult;
use crate::config::CheckerConfig;

/// Error raised while building the shared HTTP client
pub type ClientError = reqwest::Error;

/// Performs a single check against a URL.
///
/// Implementations never fail: unreachable targets are reported as offline
/// results, not errors.
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    async fn check(&self, url: &str) -> CheckResult;
}

/// Completed response measurements
struct Probe {
    load_time: u64,
    status_code: u16,
    content_length: u64,
}

/// Timed HTTP GET checker
pub struct HttpChecker {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpChecker {
    pub fn new(config: &CheckerConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().user_agent(config.user_agent.clone()).build()?;

        Ok(Self { client, timeout: Duration::from_millis(config.timeout_ms) })
    }

    /// Send the request and measure the response.
    ///
    /// The load time is taken once headers arrive; the body is only read
    /// when no usable `Content-Length` header was sent.
    async fn probe(&self, url: &str, start: Instant) -> reqwest::Result<Probe> {
        let response = self.client.get(url).send().await?;

        let load_time = elapsed_ms(start);
        let status_code = response.status().as_u16();

        let content_length = match header_content_length(response.headers()) {
            Some(length) => length,
            None => response.bytes().await?.len() as u64,
        };

        Ok(Probe { load_time, status_code, content_length })
    }
}

#[async_trait::async_trait]
impl Checker for HttpChecker {
    async fn check(&self, url: &str) -> CheckResult {
        debug!("Checking {url}");
        let result = CheckResult::new(url);
        let start = Instant::now();

        // Dropping the probe future on timeout aborts the in-flight request.
        match timeout(self.timeout, self.probe(url, start)).await {
            Ok(Ok(probe)) => {
                let result =
                    result.online(probe.load_time, probe.status_code, Some(probe.content_length));
                info!(
                    "Checked {url}: status {} in {}ms, score {}",
                    probe.status_code, probe.load_time, result.performance_score
                );
                result
            }
            Ok(Err(error)) => {
                let load_time = elapsed_ms(start);
                let message = describe_error(&error);
                warn!("Check of {url} failed after {load_time}ms: {message}");
                result.offline(load_time, message)
            }
            Err(_) => {
                let load_time = elapsed_ms(start);
                warn!("Check of {url} timed out after {load_time}ms");
                result.offline(
                    load_time,
                    format!("Request timed out after {}ms", self.timeout.as_millis()),
                )
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// `Content-Length` header value, if present and a valid integer
fn header_content_length(headers: &HeaderMap) -> Option<u64> {
    headers.get(CONTENT_LENGTH)?.to_str().ok()?.trim().parse().ok()
}

/// Render an error together with its source chain, e.g.
/// `error sending request for url (...): dns error: ...`
fn describe_error(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }

    message
}
