//! Confluence REST API client.
//!
//! Provides a sync HTTP client for the Confluence Cloud REST API with Basic
//! authentication (account email and API token).

mod attachments;
mod pages;

use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use confmark_config::{ConfluenceConfig, HttpConfig};
use serde::de::DeserializeOwned;
use tracing::warn;
use ureq::Agent;
use ureq::http::Response;

use crate::error::ConfluenceError;

/// Attempts made for idempotent reads before giving up.
const MAX_ATTEMPTS: u32 = 3;

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
    rate_limit: Duration,
}

impl ConfluenceClient {
    /// Create a client for a Confluence Cloud site.
    ///
    /// `base_url` is the site root, e.g. `https://acme.atlassian.net`.
    #[must_use]
    pub fn new(base_url: &str, email: &str, api_token: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        let credentials = BASE64_STANDARD.encode(format!("{email}:{api_token}"));

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_header: format!("Basic {credentials}"),
            rate_limit: Duration::ZERO,
        }
    }

    /// Create client from validated configuration.
    #[must_use]
    pub fn from_config(confluence: &ConfluenceConfig, http: &HttpConfig) -> Self {
        let mut client = Self::new(
            &confluence.base_url,
            &confluence.email,
            &confluence.api_token,
            http.timeout(),
        );
        client.rate_limit = http.rate_limit();
        client
    }

    /// Site base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Delay to keep between consecutive write requests.
    #[must_use]
    pub fn rate_limit(&self) -> Duration {
        self.rate_limit
    }

    /// Sleep for the configured rate-limit delay.
    pub(crate) fn pause(&self) {
        if !self.rate_limit.is_zero() {
            std::thread::sleep(self.rate_limit);
        }
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/wiki/rest/api", self.base_url)
    }

    /// Run `op`, retrying rate-limited, server and transport failures.
    fn with_retry<T>(
        what: &str,
        mut op: impl FnMut() -> Result<T, ConfluenceError>,
    ) -> Result<T, ConfluenceError> {
        let mut attempt = 1;
        loop {
            match op() {
                Err(err) if err.is_retryable() && attempt < MAX_ATTEMPTS => {
                    let delay = retry_delay(&err, attempt);
                    warn!(
                        "{what} failed (attempt {attempt}/{MAX_ATTEMPTS}): {err}; retrying in {}s",
                        delay.as_secs()
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

/// Backoff before the next attempt: rate limits wait longer and grow linearly.
fn retry_delay(err: &ConfluenceError, attempt: u32) -> Duration {
    if err.status() == Some(429) {
        Duration::from_secs(5 * u64::from(attempt))
    } else {
        Duration::from_secs(1 << (attempt - 1))
    }
}

/// Turn an error status into [`ConfluenceError::HttpResponse`], otherwise parse JSON.
fn read_json<T: DeserializeOwned>(response: Response<ureq::Body>) -> Result<T, ConfluenceError> {
    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if status >= 400 {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ConfluenceError::HttpResponse {
            status,
            body: error_body,
        });
    }

    Ok(body_reader.read_json()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_client() {
        let client = ConfluenceClient::new(
            "https://acme.atlassian.net/",
            "alice@example.com",
            "secret",
            Duration::from_secs(5),
        );
        assert_eq!(client.base_url(), "https://acme.atlassian.net");
        assert_eq!(client.api_url(), "https://acme.atlassian.net/wiki/rest/api");
        assert_eq!(
            client.auth_header,
            "Basic YWxpY2VAZXhhbXBsZS5jb206c2VjcmV0"
        );
        assert_eq!(client.rate_limit(), Duration::ZERO);
    }

    #[test]
    fn test_from_config_uses_rate_limit() {
        let confluence = ConfluenceConfig {
            base_url: "https://acme.atlassian.net".to_owned(),
            email: "alice@example.com".to_owned(),
            api_token: "secret".to_owned(),
            space_key: None,
        };
        let client = ConfluenceClient::from_config(&confluence, &HttpConfig::default());
        assert_eq!(client.rate_limit(), Duration::from_millis(300));
    }

    fn response_error(status: u16) -> ConfluenceError {
        ConfluenceError::HttpResponse {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_retry_delay() {
        assert_eq!(retry_delay(&response_error(429), 1), Duration::from_secs(5));
        assert_eq!(retry_delay(&response_error(429), 2), Duration::from_secs(10));
        assert_eq!(retry_delay(&response_error(503), 1), Duration::from_secs(1));
        assert_eq!(retry_delay(&response_error(503), 2), Duration::from_secs(2));
    }

    #[test]
    fn test_retry_gives_up_on_client_errors() {
        let mut calls = 0;
        let result: Result<(), _> = ConfluenceClient::with_retry("get page", || {
            calls += 1;
            Err(response_error(404))
        });
        assert_eq!(result.unwrap_err().status(), Some(404));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_retry_returns_first_success() {
        let mut calls = 0;
        let result = ConfluenceClient::with_retry("get page", || {
            calls += 1;
            Ok::<_, ConfluenceError>(calls)
        });
        assert_eq!(result.unwrap(), 1);
    }
}
