//! Error taxonomy for the publish pipeline.
//!
//! Every variant identifies the hop that produced it so a failed run can be
//! attributed without inspecting log output. Nothing in the pipeline recovers
//! from these errors; they surface to the caller unmodified.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias used throughout the pipeline.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The network hop an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  /// Refresh credential → identity token.
  TokenExchange,
  /// Identity token → session cookie.
  SessionCookie,
  /// Session cookie → platform session.
  Login,
  /// Reading the record.
  FetchRecord,
  /// Writing the record.
  UpdateRecord,
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      Self::TokenExchange => "token exchange",
      Self::SessionCookie => "session cookie",
      Self::Login => "login",
      Self::FetchRecord => "record fetch",
      Self::UpdateRecord => "record update",
    };
    f.write_str(label)
  }
}

/// Errors produced by the credential chain and record client.
#[derive(Debug, Error)]
pub enum Error {
  /// The API key or refresh token was empty.
  #[error("Invalid credential: {0}")]
  InvalidCredential(&'static str),

  /// The token endpoint rejected the refresh credential or returned an
  /// unreadable body.
  #[error("Token exchange failed ({status}): {body}")]
  AuthExchange { status: StatusCode, body: String },

  /// The identity token's claims segment could not be decoded.
  #[error("Invalid ID token format: {0}")]
  MalformedToken(String),

  /// The cookie-minting endpoint failed or omitted the session cookie.
  #[error("createSessionCookie failed ({status}): {body}")]
  SessionMint { status: StatusCode, body: String },

  /// The platform login endpoint returned an unexpected status.
  #[error("Topaz login failed ({status}): {body}")]
  Login { status: StatusCode, body: String },

  /// The login response did not carry a usable platform session.
  #[error("{0}")]
  SessionExtraction(String),

  /// The record could not be fetched.
  #[error("Failed to fetch project data ({status}): {body}")]
  Fetch { status: StatusCode, body: String },

  /// The fetched record text is not a valid project document.
  #[error("Failed to parse project data: {0}")]
  RecordDecode(#[source] serde_json::Error),

  /// The write record could not be serialized.
  #[error("Failed to serialize project update: {0}")]
  RecordEncode(#[source] serde_json::Error),

  /// The record update was rejected.
  #[error("Failed to update project ({status}): {body}")]
  Update { status: StatusCode, body: String },

  /// The request never produced a response.
  #[error("{step} request failed: {source}")]
  Transport {
    step: Step,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

impl Error {
  /// The hop this error is attributed to, when it belongs to one.
  pub fn step(&self) -> Option<Step> {
    match self {
      Self::InvalidCredential(_) | Self::AuthExchange { .. } => Some(Step::TokenExchange),
      Self::MalformedToken(_) | Self::SessionMint { .. } => Some(Step::SessionCookie),
      Self::Login { .. } | Self::SessionExtraction(_) => Some(Step::Login),
      Self::Fetch { .. } | Self::RecordDecode(_) => Some(Step::FetchRecord),
      Self::RecordEncode(_) | Self::Update { .. } => Some(Step::UpdateRecord),
      Self::Transport { step, .. } => Some(*step),
    }
  }

  /// HTTP status carried by the error, if the remote side answered.
  pub fn status(&self) -> Option<StatusCode> {
    match self {
      Self::AuthExchange { status, .. }
      | Self::SessionMint { status, .. }
      | Self::Login { status, .. }
      | Self::Fetch { status, .. }
      | Self::Update { status, .. } => Some(*status),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_messages_include_status_and_body() {
    let err = Error::AuthExchange {
      status: StatusCode::UNAUTHORIZED,
      body: "INVALID_REFRESH_TOKEN".to_string(),
    };
    assert_eq!(
      err.to_string(),
      "Token exchange failed (401 Unauthorized): INVALID_REFRESH_TOKEN"
    );
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
  }

  #[test]
  fn test_step_attribution() {
    assert_eq!(Error::MalformedToken("x".into()).step(), Some(Step::SessionCookie));
    assert_eq!(Error::SessionExtraction("missing".into()).step(), Some(Step::Login));
    let transport = Error::Transport {
      step: Step::UpdateRecord,
      source: "connection reset".into(),
    };
    assert_eq!(transport.step(), Some(Step::UpdateRecord));
    assert_eq!(transport.to_string(), "record update request failed: connection reset");
  }
}
