//! Scripted transport for testing
//!
//! Serves queued responses in order and records every request it receives,
//! so tests can assert both what the pipeline sent and where it stopped.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderValue, SET_COOKIE};
use serde_json::Value;
use topaz_publish::http::{HttpRequest, HttpResponse, Transport, TransportError};

enum Reply {
  Respond(HttpResponse),
  Fail(String),
}

/// A fake transport that answers from a queue of canned replies
pub struct FakeTransport {
  replies: Mutex<VecDeque<Reply>>,
  requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
  /// Create a transport with no replies queued
  pub fn new() -> Self {
    Self {
      replies: Mutex::new(VecDeque::new()),
      requests: Mutex::new(Vec::new()),
    }
  }

  /// Queue a response with a plain body
  pub fn respond(self, status: StatusCode, body: impl Into<String>) -> Self {
    self.push(Reply::Respond(HttpResponse::new(status, body)))
  }

  /// Queue a `200` response with a JSON body
  pub fn respond_json(self, body: Value) -> Self {
    self.respond(StatusCode::OK, body.to_string())
  }

  /// Queue a login response carrying the given `set-cookie` headers
  pub fn respond_login(self, status: StatusCode, set_cookies: &[&str]) -> Self {
    let response = set_cookies.iter().fold(HttpResponse::new(status, ""), |response, cookie| {
      let value = HeaderValue::from_str(cookie).expect("valid set-cookie header");
      response.with_header(SET_COOKIE, value)
    });
    self.push(Reply::Respond(response))
  }

  /// Queue a failure where no response is received
  pub fn fail(self, message: &str) -> Self {
    self.push(Reply::Fail(message.to_string()))
  }

  /// All requests received so far, in order
  pub fn requests(&self) -> Vec<HttpRequest> {
    self.requests.lock().unwrap().clone()
  }

  /// Paths of the requests received so far, in order
  pub fn paths(&self) -> Vec<String> {
    self.requests().iter().map(|request| request.url.path().to_string()).collect()
  }

  /// Number of queued replies that were never consumed
  pub fn unused_replies(&self) -> usize {
    self.replies.lock().unwrap().len()
  }

  fn push(self, reply: Reply) -> Self {
    self.replies.lock().unwrap().push_back(reply);
    self
  }
}

impl Default for FakeTransport {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl Transport for FakeTransport {
  async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
    let path = request.url.path().to_string();
    self.requests.lock().unwrap().push(request);

    match self.replies.lock().unwrap().pop_front() {
      Some(Reply::Respond(response)) => Ok(response),
      Some(Reply::Fail(message)) => Err(message.into()),
      None => Err(format!("no reply queued for {path}").into()),
    }
  }
}
