//! Project read/write calls authenticated by a platform session.

use reqwest::Method;
use tracing::{debug, info};

use crate::auth::PlatformSession;
use crate::endpoints::Endpoints;
use crate::error::{Error, Result, Step};
use crate::http::{HttpRequest, Transport};

/// Client for the Topaz project endpoints.
#[derive(Clone, Copy)]
pub struct RecordClient<'a> {
  transport: &'a dyn Transport,
  endpoints: &'a Endpoints,
}

impl<'a> RecordClient<'a> {
  pub fn new(transport: &'a dyn Transport, endpoints: &'a Endpoints) -> Self {
    Self { transport, endpoints }
  }

  /// Fetch a project's edit representation.
  ///
  /// The body is returned verbatim; parsing is left to the caller so fields
  /// outside the object model are not disturbed.
  ///
  /// # Errors
  /// * [`Error::Fetch`] on a non-success status.
  /// * [`Error::Transport`] when no response is received.
  pub async fn fetch(&self, session: &PlatformSession, project_id: &str) -> Result<String> {
    let request = HttpRequest::new(Method::GET, self.endpoints.project_edit_url(project_id))
      .header("cookie", session.cookie_header())
      .header("accept", "application/json");

    debug!(step = %Step::FetchRecord, project_id, "Fetching project");
    let response = self.transport.send(request).await.map_err(|source| Error::Transport {
      step: Step::FetchRecord,
      source,
    })?;

    if !response.is_success() {
      return Err(Error::Fetch {
        status: response.status,
        body: response.body,
      });
    }

    debug!(bytes = response.body.len(), "Fetched project");
    Ok(response.body)
  }

  /// Replace a project with the given JSON document.
  ///
  /// # Errors
  /// * [`Error::Update`] on a non-success status.
  /// * [`Error::Transport`] when no response is received.
  pub async fn update(&self, session: &PlatformSession, project_id: &str, project_json: &str) -> Result<()> {
    let request = HttpRequest::new(Method::PUT, self.endpoints.project_url(project_id))
      .header("cookie", session.cookie_header())
      .header("content-type", "application/json")
      .header("origin", self.endpoints.topaz_origin())
      .header("referer", self.endpoints.project_editor_page(project_id).to_string())
      .body(project_json);

    debug!(step = %Step::UpdateRecord, project_id, "Updating project");
    let response = self.transport.send(request).await.map_err(|source| Error::Transport {
      step: Step::UpdateRecord,
      source,
    })?;

    if !response.is_success() {
      return Err(Error::Update {
        status: response.status,
        body: response.body,
      });
    }

    info!(project_id, "Project updated");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use async_trait::async_trait;
  use reqwest::StatusCode;

  use super::*;
  use crate::http::{HttpResponse, TransportError};

  struct Canned {
    status: StatusCode,
    body: &'static str,
    seen: Mutex<Vec<HttpRequest>>,
  }

  impl Canned {
    fn new(status: StatusCode, body: &'static str) -> Self {
      Self {
        status,
        body,
        seen: Mutex::new(Vec::new()),
      }
    }
  }

  #[async_trait]
  impl Transport for Canned {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
      self.seen.lock().unwrap().push(request);
      Ok(HttpResponse::new(self.status, self.body))
    }
  }

  struct Unreachable;

  #[async_trait]
  impl Transport for Unreachable {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
      Err("connection refused".into())
    }
  }

  #[tokio::test]
  async fn test_fetch_returns_body_verbatim() {
    let body = r#"{"title":"T",  "extra":{"kept":[1,2.50]}}"#;
    let transport = Canned::new(StatusCode::OK, body);
    let endpoints = Endpoints::default();
    let client = RecordClient::new(&transport, &endpoints);

    let fetched = client.fetch(&PlatformSession::new("s e"), "p1").await.unwrap();
    assert_eq!(fetched, body);

    let seen = transport.seen.lock().unwrap();
    let request = &seen[0];
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.url.as_str(), "https://topaz.dev/api/projects/p1/edit");
    assert_eq!(request.header_value("cookie"), Some("topaz_session=s e"));
    assert_eq!(request.header_value("accept"), Some("application/json"));
  }

  #[tokio::test]
  async fn test_fetch_non_success() {
    let transport = Canned::new(StatusCode::FORBIDDEN, "not yours");
    let endpoints = Endpoints::default();
    let client = RecordClient::new(&transport, &endpoints);

    let err = client.fetch(&PlatformSession::new("s"), "p1").await.unwrap_err();
    match err {
      Error::Fetch { status, body } => {
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, "not yours");
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[tokio::test]
  async fn test_update_sends_headers_and_body() {
    let transport = Canned::new(StatusCode::OK, "ignored");
    let endpoints = Endpoints::default();
    let client = RecordClient::new(&transport, &endpoints);

    client
      .update(&PlatformSession::new("sess"), "p 1", r#"{"body":"x"}"#)
      .await
      .unwrap();

    let seen = transport.seen.lock().unwrap();
    let request = &seen[0];
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.url.as_str(), "https://topaz.dev/api/projects/p%201");
    assert_eq!(request.header_value("cookie"), Some("topaz_session=sess"));
    assert_eq!(request.header_value("content-type"), Some("application/json"));
    assert_eq!(request.header_value("origin"), Some("https://topaz.dev"));
    assert_eq!(
      request.header_value("referer"),
      Some("https://topaz.dev/projects/p%201/edit")
    );
    assert_eq!(request.body.as_deref(), Some(r#"{"body":"x"}"#));
  }

  #[tokio::test]
  async fn test_update_non_success() {
    let transport = Canned::new(StatusCode::UNPROCESSABLE_ENTITY, "{\"error\":\"title required\"}");
    let endpoints = Endpoints::default();
    let client = RecordClient::new(&transport, &endpoints);

    let err = client.update(&PlatformSession::new("s"), "p1", "{}").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
    assert!(matches!(err, Error::Update { .. }));
    assert!(err.to_string().contains("title required"));
  }

  #[tokio::test]
  async fn test_transport_failure_is_attributed() {
    let transport = Unreachable;
    let endpoints = Endpoints::default();
    let client = RecordClient::new(&transport, &endpoints);

    let err = client.fetch(&PlatformSession::new("s"), "p1").await.unwrap_err();
    assert_eq!(err.step(), Some(Step::FetchRecord));
    assert!(err.to_string().contains("connection refused"));
  }
}
