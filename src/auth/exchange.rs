//! Refresh token → identity token exchange against the Firebase secure token
//! service.

use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::credentials::RefreshCredential;
use crate::endpoints::Endpoints;
use crate::error::{Error, Result, Step};
use crate::http::{HttpRequest, Transport};

/// Output of a successful exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenResult {
  /// Compact JWT identifying the user; only its claims are read downstream.
  pub id_token: String,
  /// Firebase user identifier.
  pub user_id: String,
}

impl std::fmt::Debug for TokenResult {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TokenResult")
      .field("id_token", &crate::credentials::mask_secret(&self.id_token))
      .field("user_id", &self.user_id)
      .finish()
  }
}

// The endpoint also rotates `refresh_token`; the rotated value is not reused.
#[derive(Deserialize)]
struct TokenResponse {
  id_token: String,
  user_id: String,
}

/// Exchange a refresh token for an identity token.
///
/// Sends a single form-encoded `POST` to the token endpoint with the API key
/// as the `key` query parameter.
///
/// # Errors
/// * [`Error::AuthExchange`] when the endpoint answers with a non-success
///   status, or with a success body lacking `id_token`/`user_id`.
/// * [`Error::Transport`] when no response is received.
pub async fn exchange_refresh_token(
  transport: &dyn Transport,
  endpoints: &Endpoints,
  credential: &RefreshCredential,
) -> Result<TokenResult> {
  let mut url = endpoints.token_url.clone();
  url.query_pairs_mut().append_pair("key", credential.api_key());

  let body = url::form_urlencoded::Serializer::new(String::new())
    .append_pair("grant_type", "refresh_token")
    .append_pair("refresh_token", credential.refresh_token())
    .finish();

  let request = HttpRequest::new(Method::POST, url)
    .header("content-type", "application/x-www-form-urlencoded")
    .body(body);

  debug!(step = %Step::TokenExchange, "Exchanging refresh token");
  let response = transport.send(request).await.map_err(|source| Error::Transport {
    step: Step::TokenExchange,
    source,
  })?;

  if !response.is_success() {
    return Err(Error::AuthExchange {
      status: response.status,
      body: response.body,
    });
  }

  let parsed: TokenResponse = match serde_json::from_str(&response.body) {
    Ok(parsed) => parsed,
    Err(e) => {
      warn!("Token endpoint returned an unexpected body: {e}");
      return Err(Error::AuthExchange {
        status: response.status,
        body: response.body,
      });
    }
  };

  info!(user_id = %parsed.user_id, "Obtained identity token");

  Ok(TokenResult {
    id_token: parsed.id_token,
    user_id: parsed.user_id,
  })
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use async_trait::async_trait;
  use reqwest::StatusCode;

  use super::*;
  use crate::http::{HttpResponse, TransportError};

  /// Answers every request with the same response and records each request.
  struct OneShot {
    response: HttpResponse,
    seen: Mutex<Vec<HttpRequest>>,
  }

  impl OneShot {
    fn new(status: StatusCode, body: &str) -> Self {
      Self {
        response: HttpResponse::new(status, body),
        seen: Mutex::new(Vec::new()),
      }
    }
  }

  #[async_trait]
  impl Transport for OneShot {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
      self.seen.lock().unwrap().push(request);
      Ok(self.response.clone())
    }
  }

  fn credential() -> RefreshCredential {
    RefreshCredential::new("api key", "refresh/token+1").unwrap()
  }

  #[tokio::test]
  async fn test_exchange_success() {
    let transport = OneShot::new(
      StatusCode::OK,
      r#"{"id_token":"a.b.c","user_id":"uid-1","refresh_token":"rotated","expires_in":"3600"}"#,
    );

    let result = exchange_refresh_token(&transport, &Endpoints::default(), &credential())
      .await
      .unwrap();

    assert_eq!(result.id_token, "a.b.c");
    assert_eq!(result.user_id, "uid-1");

    let seen = transport.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let request = &seen[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(
      request.url.as_str(),
      "https://securetoken.googleapis.com/v1/token?key=api+key"
    );
    assert_eq!(
      request.header_value("content-type"),
      Some("application/x-www-form-urlencoded")
    );
    assert_eq!(
      request.body.as_deref(),
      Some("grant_type=refresh_token&refresh_token=refresh%2Ftoken%2B1")
    );
  }

  #[tokio::test]
  async fn test_exchange_non_success_carries_status_and_body() {
    let transport = OneShot::new(StatusCode::UNAUTHORIZED, "INVALID_REFRESH_TOKEN");

    let err = exchange_refresh_token(&transport, &Endpoints::default(), &credential())
      .await
      .unwrap_err();

    match err {
      Error::AuthExchange { status, body } => {
        assert_eq!(status.as_u16(), 401);
        assert_eq!(body, "INVALID_REFRESH_TOKEN");
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[tokio::test]
  async fn test_exchange_missing_fields_is_auth_exchange_error() {
    let transport = OneShot::new(StatusCode::OK, r#"{"user_id":"uid-1"}"#);

    let err = exchange_refresh_token(&transport, &Endpoints::default(), &credential())
      .await
      .unwrap_err();

    assert!(matches!(err, Error::AuthExchange { status, .. } if status == StatusCode::OK));
  }

  #[test]
  fn test_token_result_debug_masks_token() {
    let result = TokenResult {
      id_token: "eyJhbGciOiJSUzI1NiJ9.payload.signature".to_string(),
      user_id: "uid-1".to_string(),
    };
    let debug = format!("{result:?}");
    assert!(!debug.contains("payload.signature"));
    assert!(debug.contains("uid-1"));
  }
}
