//! Test fixtures for Firebase and Topaz responses
//!
//! Realistic sample payloads for each hop of a publish run.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use reqwest::StatusCode;
use serde_json::{Value, json};

use super::fake_transport::FakeTransport;

pub const USER_ID: &str = "uid-42";
pub const MINTED_COOKIE: &str = "minted-session-cookie";
pub const PROJECT_ID: &str = "proj123";

// Claims of a Google sign-in identity token
pub fn sample_claims() -> Value {
  json!({
    "iss": "https://securetoken.google.com/topaz-prod",
    "aud": "topaz-prod",
    "auth_time": 1_700_000_000,
    "user_id": USER_ID,
    "sub": USER_ID,
    "iat": 1_700_000_100,
    "exp": 1_700_003_700,
    "email": "dev@example.com",
    "firebase": {
      "identities": {"google.com": ["1234567890"]},
      "sign_in_provider": "google.com"
    }
  })
}

// Compact identity token with the given claims and a dummy signature
pub fn identity_token(claims: &Value) -> String {
  let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","kid":"test","typ":"JWT"}"#);
  let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
  format!("{header}.{payload}.c2lnbmF0dXJl")
}

// Secure token service response for a refresh-token grant
pub fn token_response(id_token: &str) -> Value {
  json!({
    "access_token": id_token,
    "expires_in": "3600",
    "token_type": "Bearer",
    "refresh_token": "rotated-refresh-token",
    "id_token": id_token,
    "user_id": USER_ID,
    "project_id": "1234567890"
  })
}

// Session cookie minting response
pub fn session_cookie_response() -> Value {
  json!({ "sessionCookie": MINTED_COOKIE })
}

// A project as returned by the edit endpoint; promote keys are deliberately
// out of alphabetical order
pub const SAMPLE_PROJECT_RESPONSE: &str = r##"{
  "id": "proj123",
  "title": "Rust CLI",
  "description": "A small publishing tool",
  "body": "# Old body",
  "github_url": "https://github.com/example/topaz-publish",
  "reference_url": null,
  "published": true,
  "created_at": "2024-01-01T00:00:00Z",
  "technology_tag_list": [
    {"id": "t-rust", "name": "Rust"},
    {"id": "t-tokio", "name": "Tokio"}
  ],
  "promote": {
    "why": {"title": "Why", "body": "Fast"},
    "how": {"title": "How", "body": "Async"}
  }
}"##;

// Transport scripted through a successful login
pub fn authenticated_transport() -> FakeTransport {
  FakeTransport::new()
    .respond_json(token_response(&identity_token(&sample_claims())))
    .respond_json(session_cookie_response())
    .respond_login(
      StatusCode::NO_CONTENT,
      &["topaz_session=abc%20def; Path=/; HttpOnly; Secure; SameSite=Lax"],
    )
}
