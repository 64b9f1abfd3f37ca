use std::thread;
use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::{RequestBuilder, Response};
use reqwest::header::RETRY_AFTER;

use crate::error::ScrapeError;

/// Bounded retry with exponential backoff, handed to the HTTP client at
/// construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `0` disables retrying.
    pub max_retries: usize,
    pub backoff_base: Duration,
    /// Upper bound for both computed backoff and `Retry-After`.
    pub backoff_max: Duration,
    pub retryable_statuses: Vec<u16>,
    pub retryable_methods: Vec<Method>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_base: Duration::from_millis(1000),
            backoff_max: Duration::from_secs(120),
            retryable_statuses: default_retryable_statuses(),
            retryable_methods: vec![Method::HEAD, Method::GET, Method::OPTIONS],
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt + 1`: the first retry goes out
    /// immediately, then 2*base, 4*base, 8*base, ... capped at `backoff_max`.
    pub fn delay(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempt as u32).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor).min(self.backoff_max)
    }

    /// Server-requested wait for 413/429/503, taking precedence over the
    /// computed backoff.
    fn delay_for(&self, response: &Response, attempt: usize) -> Duration {
        let status = response.status().as_u16();
        let requested = matches!(status, 413 | 429 | 503)
            .then(|| response.headers().get(RETRY_AFTER))
            .flatten()
            .and_then(|value| value.to_str().ok())
            .and_then(parse_retry_after);
        match requested {
            Some(wait) => wait.min(self.backoff_max),
            None => self.delay(attempt),
        }
    }

    pub fn allows_method(&self, method: &Method) -> bool {
        self.retryable_methods.contains(method)
    }

    pub fn should_retry_status(&self, method: &Method, status: u16, attempt: usize) -> bool {
        attempt < self.max_retries
            && self.allows_method(method)
            && self.retryable_statuses.contains(&status)
    }

    fn should_retry_error(&self, method: &Method, err: &reqwest::Error, attempt: usize) -> bool {
        attempt < self.max_retries && self.allows_method(method) && is_retryable_error(err)
    }

    /// Sends the request built by `make_req`, rebuilding it for every
    /// attempt. A retryable status that survives the last attempt is returned
    /// as-is for the caller to reject.
    pub fn send_with_retries<F>(&self, method: &Method, mut make_req: F) -> Result<Response, ScrapeError>
    where
        F: FnMut() -> RequestBuilder,
    {
        let mut attempt = 0usize;
        loop {
            match make_req().send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if self.should_retry_status(method, status, attempt) {
                        let delay = self.delay_for(&resp, attempt);
                        tracing::warn!(status, attempt = attempt + 1, ?delay, "retrying request");
                        thread::sleep(delay);
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if self.should_retry_error(method, &err, attempt) {
                        let delay = self.delay(attempt);
                        tracing::warn!(error = %err, attempt = attempt + 1, ?delay, "retrying request");
                        thread::sleep(delay);
                        attempt += 1;
                        continue;
                    }
                    return Err(ScrapeError::NistHttp(err.to_string()));
                }
            }
        }
    }
}

pub fn default_retryable_statuses() -> Vec<u16> {
    vec![429, 500, 502, 503, 504]
}

/// Delta-seconds form of `Retry-After`; HTTP-date values are ignored.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
