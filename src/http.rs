//! HTTP transport seam.
//!
//! Every hop in the publish pipeline builds an [`HttpRequest`] and hands it to
//! a [`Transport`]. Production code uses [`ReqwestTransport`]; tests plug in a
//! scripted implementation so each hop can be exercised without a network.

use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use tracing::{debug, trace};
use url::Url;

/// Error returned when a request never produced a response.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Whether the transport may follow `3xx` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Redirects {
  #[default]
  Follow,
  /// Hand the redirect response back to the caller untouched.
  Manual,
}

/// An outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
  pub method: Method,
  pub url: Url,
  pub headers: Vec<(&'static str, String)>,
  pub body: Option<String>,
  pub redirects: Redirects,
}

impl HttpRequest {
  pub fn new(method: Method, url: Url) -> Self {
    Self {
      method,
      url,
      headers: Vec::new(),
      body: None,
      redirects: Redirects::Follow,
    }
  }

  pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
    self.headers.push((name, value.into()));
    self
  }

  pub fn body(mut self, body: impl Into<String>) -> Self {
    self.body = Some(body.into());
    self
  }

  pub fn redirects(mut self, redirects: Redirects) -> Self {
    self.redirects = redirects;
    self
  }

  /// First value of the named header (case-insensitive).
  pub fn header_value(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(key, _)| key.eq_ignore_ascii_case(name))
      .map(|(_, value)| value.as_str())
  }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
  pub status: StatusCode,
  pub headers: HeaderMap,
  pub body: String,
}

impl HttpResponse {
  pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
    Self {
      status,
      headers: HeaderMap::new(),
      body: body.into(),
    }
  }

  pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
    self.headers.append(name, value);
    self
  }

  pub fn is_success(&self) -> bool {
    self.status.is_success()
  }

  /// All values of the named header that are valid visible ASCII.
  pub fn header_values<'a>(&'a self, name: &HeaderName) -> impl Iterator<Item = &'a str> + 'a {
    self
      .headers
      .get_all(name)
      .iter()
      .filter_map(|value| value.to_str().ok())
  }
}

/// Sends a single request and buffers the response.
///
/// Implementations must not retry: one call, one attempt.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Clone)]
pub struct ReqwestTransport {
  client: reqwest::Client,
  no_redirect: reqwest::Client,
}

impl ReqwestTransport {
  /// Build the transport with the given request timeout.
  ///
  /// # Errors
  /// Returns an error if the timeout is zero or if either underlying
  /// `reqwest::Client` cannot be built.
  pub fn new(timeout_secs: u64) -> anyhow::Result<Self> {
    if timeout_secs == 0 {
      return Err(anyhow!("Timeout must be at least 1 second"));
    }

    let user_agent = format!("topaz-publish/{} ({})", env!("CARGO_PKG_VERSION"), env!("TARGET"));
    let timeout = Duration::from_secs(timeout_secs);

    let client = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(user_agent.clone())
      .build()
      .context("Failed to create HTTP client")?;

    let no_redirect = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(user_agent)
      .redirect(reqwest::redirect::Policy::none())
      .build()
      .context("Failed to create HTTP client")?;

    Ok(Self { client, no_redirect })
  }
}

#[async_trait]
impl Transport for ReqwestTransport {
  async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
    let client = match request.redirects {
      Redirects::Follow => &self.client,
      Redirects::Manual => &self.no_redirect,
    };

    // The query string may carry the API key, so only host and path are logged.
    debug!(
      method = %request.method,
      host = request.url.host_str().unwrap_or_default(),
      path = request.url.path(),
      "Sending request"
    );

    let mut builder = client.request(request.method, request.url);
    for (name, value) in &request.headers {
      builder = builder.header(*name, value.as_str());
    }
    if let Some(body) = request.body {
      builder = builder.body(body);
    }

    let response = builder.send().await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.text().await?;

    trace!(%status, bytes = body.len(), "Received response");

    Ok(HttpResponse { status, headers, body })
  }
}

#[cfg(test)]
mod tests {
  use reqwest::header::SET_COOKIE;

  use super::*;

  #[test]
  fn test_reqwest_transport_rejects_zero_timeout() {
    assert!(ReqwestTransport::new(0).is_err());
    assert!(ReqwestTransport::new(30).is_ok());
  }

  #[test]
  fn test_request_builder_collects_headers() {
    let url = Url::parse("https://topaz.dev/api/auth/login").unwrap();
    let request = HttpRequest::new(Method::POST, url)
      .header("origin", "https://topaz.dev")
      .header("token", "cookie-value")
      .redirects(Redirects::Manual);

    assert_eq!(request.header_value("Origin"), Some("https://topaz.dev"));
    assert_eq!(request.header_value("token"), Some("cookie-value"));
    assert_eq!(request.header_value("cookie"), None);
    assert_eq!(request.redirects, Redirects::Manual);
    assert!(request.body.is_none());
  }

  #[test]
  fn test_response_header_values_returns_every_value() {
    let response = HttpResponse::new(StatusCode::NO_CONTENT, "")
      .with_header(SET_COOKIE, HeaderValue::from_static("a=1; Path=/"))
      .with_header(SET_COOKIE, HeaderValue::from_static("b=2; Path=/"));

    let values: Vec<&str> = response.header_values(&SET_COOKIE).collect();
    assert_eq!(values, vec!["a=1; Path=/", "b=2; Path=/"]);
    assert!(response.is_success());
  }
}
