//! Strongly typed refresh credential and secret masking.

use std::fmt;

use crate::error::{Error, Result};

/// An API key plus the refresh token it was issued for.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshCredential {
  api_key: String,
  refresh_token: String,
}

impl RefreshCredential {
  /// Build a credential, rejecting empty parts.
  ///
  /// The contents are otherwise not validated; the token endpoint is the
  /// source of truth.
  ///
  /// # Errors
  /// Returns [`Error::InvalidCredential`] if either value is empty.
  pub fn new(api_key: impl Into<String>, refresh_token: impl Into<String>) -> Result<Self> {
    let api_key = api_key.into();
    let refresh_token = refresh_token.into();

    if api_key.is_empty() {
      return Err(Error::InvalidCredential("API key must not be empty"));
    }
    if refresh_token.is_empty() {
      return Err(Error::InvalidCredential("refresh token must not be empty"));
    }

    Ok(Self { api_key, refresh_token })
  }

  pub fn api_key(&self) -> &str {
    &self.api_key
  }

  pub fn refresh_token(&self) -> &str {
    &self.refresh_token
  }
}

impl fmt::Debug for RefreshCredential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RefreshCredential")
      .field("api_key", &mask_secret(&self.api_key))
      .field("refresh_token", &mask_secret(&self.refresh_token))
      .finish()
  }
}

/// Mask a secret for display.
///
/// Secrets longer than eight characters keep their first four characters so
/// users can tell which value is configured; shorter ones are fully masked.
pub fn mask_secret(secret: &str) -> String {
  let len = secret.chars().count();
  if len > 8 {
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}{}", "*".repeat(len - 4))
  } else {
    "*".repeat(len)
  }
}
