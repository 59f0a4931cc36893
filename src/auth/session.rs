//! Identity token → session cookie → platform session.

use std::fmt;

use reqwest::header::SET_COOKIE;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::claims::{Claims, SessionClaims, decode_claims, http_date};
use crate::credentials::mask_secret;
use crate::endpoints::Endpoints;
use crate::error::{Error, Result, Step};
use crate::http::{HttpRequest, HttpResponse, Redirects, Transport};

/// Name of the cookie that carries the platform session.
pub const SESSION_COOKIE_NAME: &str = "topaz_session";

/// Opaque cookie minted from identity token claims.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie(String);

impl SessionCookie {
  pub fn new(value: impl Into<String>) -> Self {
    Self(value.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for SessionCookie {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("SessionCookie").field(&mask_secret(&self.0)).finish()
  }
}

/// Percent-decoded `topaz_session` value identifying the user to the platform.
#[derive(Clone, PartialEq, Eq)]
pub struct PlatformSession(String);

impl PlatformSession {
  pub fn new(value: impl Into<String>) -> Self {
    Self(value.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// `topaz_session=<value>`, ready for a `cookie` request header.
  pub fn cookie_header(&self) -> String {
    format!("{SESSION_COOKIE_NAME}={}", self.0)
  }
}

impl fmt::Debug for PlatformSession {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("PlatformSession").field(&mask_secret(&self.0)).finish()
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionCookieRequest<'a> {
  claims: &'a Claims,
  token: &'a str,
  auth_time: String,
  issued_at_time: String,
  expiration_time: String,
  sign_in_provider: Option<&'a str>,
  sign_in_second_factor: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionCookieResponse {
  session_cookie: Option<String>,
}

/// Build the JSON body for the cookie-minting endpoint.
fn session_cookie_body(id_token: &str) -> Result<String> {
  let claims = decode_claims(id_token)?;
  let times = SessionClaims::from_claims(&claims)?;

  let request = SessionCookieRequest {
    claims: &claims,
    token: id_token,
    auth_time: http_date(times.auth_time)?,
    issued_at_time: http_date(times.iat)?,
    expiration_time: http_date(times.exp)?,
    sign_in_provider: times.sign_in_provider(),
    sign_in_second_factor: None,
  };

  serde_json::to_string(&request).map_err(|e| Error::MalformedToken(format!("claims could not be re-encoded: {e}")))
}

/// Mint a session cookie from an identity token.
///
/// # Errors
/// * [`Error::MalformedToken`] if the claims cannot be decoded or lack
///   `iat`/`exp`/`auth_time`.
/// * [`Error::SessionMint`] on a non-success status or a body without
///   `sessionCookie`.
/// * [`Error::Transport`] when no response is received.
pub async fn mint_session_cookie(
  transport: &dyn Transport,
  endpoints: &Endpoints,
  id_token: &str,
) -> Result<SessionCookie> {
  let body = session_cookie_body(id_token)?;

  let request = HttpRequest::new(Method::POST, endpoints.session_cookie_url.clone())
    .header("content-type", "application/json")
    .body(body);

  debug!(step = %Step::SessionCookie, "Minting session cookie");
  let response = transport.send(request).await.map_err(|source| Error::Transport {
    step: Step::SessionCookie,
    source,
  })?;

  if !response.is_success() {
    return Err(Error::SessionMint {
      status: response.status,
      body: response.body,
    });
  }

  let cookie = serde_json::from_str::<SessionCookieResponse>(&response.body)
    .ok()
    .and_then(|parsed| parsed.session_cookie);

  match cookie {
    Some(cookie) => {
      debug!("Session cookie minted");
      Ok(SessionCookie(cookie))
    }
    None => Err(Error::SessionMint {
      status: response.status,
      body: response.body,
    }),
  }
}

/// Log in to the platform with a minted session cookie.
///
/// The cookie travels in a custom `token` header, not as a cookie. Redirects
/// are not followed so that the `set-cookie` on the login response itself is
/// observed.
///
/// # Errors
/// * [`Error::Login`] on any status other than `204` or `2xx`.
/// * [`Error::SessionExtraction`] when the response carries no usable
///   `topaz_session` cookie.
/// * [`Error::Transport`] when no response is received.
pub async fn login(
  transport: &dyn Transport,
  endpoints: &Endpoints,
  cookie: &SessionCookie,
) -> Result<PlatformSession> {
  let origin = endpoints.topaz_origin();
  let request = HttpRequest::new(Method::POST, endpoints.login_url())
    .header("token", cookie.as_str())
    .header("origin", origin.clone())
    .header("referer", format!("{origin}/"))
    .redirects(Redirects::Manual);

  debug!(step = %Step::Login, "Logging in to Topaz");
  let response = transport.send(request).await.map_err(|source| Error::Transport {
    step: Step::Login,
    source,
  })?;

  if response.status != StatusCode::NO_CONTENT && !response.is_success() {
    return Err(Error::Login {
      status: response.status,
      body: response.body,
    });
  }

  let session = extract_platform_session(&response)?;
  info!("Topaz session established");
  Ok(session)
}

/// Pull the `topaz_session` value out of a login response's `set-cookie`
/// headers and percent-decode it.
///
/// # Errors
/// Returns [`Error::SessionExtraction`] when there is no `set-cookie` header,
/// no non-empty `topaz_session=` assignment in it, or the value has a
/// malformed `%` escape or does not decode to UTF-8.
pub fn extract_platform_session(response: &HttpResponse) -> Result<PlatformSession> {
  if !response.headers.contains_key(SET_COOKIE) {
    return Err(Error::SessionExtraction(
      "Topaz login did not return set-cookie header".to_string(),
    ));
  }

  let raw = response
    .header_values(&SET_COOKIE)
    .find_map(|header| cookie_value(header, SESSION_COOKIE_NAME))
    .ok_or_else(|| Error::SessionExtraction(format!("{SESSION_COOKIE_NAME} cookie not found in response")))?;

  if !has_valid_escapes(raw) {
    return Err(Error::SessionExtraction(format!("{SESSION_COOKIE_NAME} cookie has a malformed percent-escape")));
  }

  let decoded = urlencoding::decode(raw)
    .map_err(|e| Error::SessionExtraction(format!("{SESSION_COOKIE_NAME} cookie is not valid UTF-8: {e}")))?;

  Ok(PlatformSession(decoded.into_owned()))
}

/// Every `%` must be followed by two hex digits.
fn has_valid_escapes(value: &str) -> bool {
  value.split('%').skip(1).all(|chunk| {
    chunk
      .as_bytes()
      .get(..2)
      .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
  })
}

/// First non-empty `name=value` assignment in a header, value ending at `;`.
fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
  let needle = format!("{name}=");
  header.match_indices(&needle).find_map(|(start, _)| {
    let rest = &header[start + needle.len()..];
    let value = rest.split(';').next().unwrap_or_default();
    (!value.is_empty()).then_some(value)
  })
}

/// Derive a platform session from an identity token.
///
/// Mints the session cookie, then logs in with it. Errors from either hop are
/// returned unchanged.
pub async fn derive_session(
  transport: &dyn Transport,
  endpoints: &Endpoints,
  id_token: &str,
) -> Result<PlatformSession> {
  let cookie = mint_session_cookie(transport, endpoints, id_token).await?;
  login(transport, endpoints, &cookie).await
}
