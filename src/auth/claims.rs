//! Identity token claim decoding.
//!
//! The identity token is a compact JWT (`header.claims.signature`). Only the
//! claims segment is read, and **the signature is never verified**. This is a
//! deliberate trust decision: the token arrives directly from the secure token
//! service over an authenticated TLS channel, and no verification key is
//! available to this program. Do not add verification here without also
//! provisioning a key source.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// URL-safe base64 that accepts segments with or without `=` padding.
const BASE64_URL_LENIENT: GeneralPurpose = GeneralPurpose::new(
  &alphabet::URL_SAFE,
  GeneralPurposeConfig::new()
    .with_encode_padding(false)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decoded claims object, preserved exactly as encoded.
pub type Claims = serde_json::Map<String, Value>;

/// Decode the claims segment of an identity token.
///
/// # Errors
/// Returns [`Error::MalformedToken`] if the token has no second segment, the
/// segment is empty or not base64url, or it does not hold a JSON object.
pub fn decode_claims(id_token: &str) -> Result<Claims> {
  let payload = id_token
    .split('.')
    .nth(1)
    .filter(|segment| !segment.is_empty())
    .ok_or_else(|| Error::MalformedToken("token has no claims segment".to_string()))?;

  let bytes = BASE64_URL_LENIENT
    .decode(payload)
    .map_err(|e| Error::MalformedToken(format!("claims segment is not base64url: {e}")))?;

  serde_json::from_slice(&bytes)
    .map_err(|e| Error::MalformedToken(format!("claims segment is not a JSON object: {e}")))
}

/// The claim fields needed to mint a session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionClaims {
  /// Issued-at, seconds since the epoch.
  pub iat: i64,
  /// Expiry, seconds since the epoch.
  pub exp: i64,
  /// Time the user last authenticated, seconds since the epoch.
  pub auth_time: i64,
  #[serde(default)]
  firebase: Option<ProviderClaims>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct ProviderClaims {
  #[serde(default)]
  sign_in_provider: Option<String>,
}

impl SessionClaims {
  /// Extract the timing and provider fields from decoded claims.
  ///
  /// # Errors
  /// Returns [`Error::MalformedToken`] when `iat`, `exp` or `auth_time` is
  /// missing or not an integer.
  pub fn from_claims(claims: &Claims) -> Result<Self> {
    Self::deserialize(Value::Object(claims.clone()))
      .map_err(|e| Error::MalformedToken(format!("claims are missing required fields: {e}")))
  }

  /// `firebase.sign_in_provider`, when present.
  pub fn sign_in_provider(&self) -> Option<&str> {
    self.firebase.as_ref()?.sign_in_provider.as_deref()
  }
}

/// Format epoch seconds as an HTTP date, e.g. `Thu, 01 Jan 1970 00:00:00 GMT`.
///
/// # Errors
/// Returns [`Error::MalformedToken`] if the timestamp is out of range.
pub fn http_date(epoch_secs: i64) -> Result<String> {
  DateTime::from_timestamp(epoch_secs, 0)
    .map(|time| time.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
    .ok_or_else(|| Error::MalformedToken(format!("timestamp out of range: {epoch_secs}")))
}
