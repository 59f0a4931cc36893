//! Remote endpoints used by the publish pipeline.

use anyhow::{Context, Result};
use url::Url;

pub const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";
pub const DEFAULT_SESSION_COOKIE_URL: &str =
  "https://gkllavg0p8.execute-api.ap-northeast-1.amazonaws.com/default/topaz-prod-createSessionCookie";
pub const DEFAULT_TOPAZ_URL: &str = "https://topaz.dev";

/// The three services the pipeline talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
  /// Refresh-token exchange endpoint (without the `key` query parameter).
  pub token_url: Url,
  /// Session-cookie minting endpoint.
  pub session_cookie_url: Url,
  /// Platform origin; login and record URLs are derived from it.
  pub topaz_url: Url,
}

impl Default for Endpoints {
  fn default() -> Self {
    // Constants are known-good; `from_strs` only fails on user overrides.
    Self::from_strs(DEFAULT_TOKEN_URL, DEFAULT_SESSION_COOKIE_URL, DEFAULT_TOPAZ_URL)
      .unwrap_or_else(|e| unreachable!("default endpoints must parse: {e}"))
  }
}

impl Endpoints {
  /// Parse all three endpoints.
  ///
  /// # Errors
  /// Returns an error naming the first URL that fails to parse.
  pub fn from_strs(token_url: &str, session_cookie_url: &str, topaz_url: &str) -> Result<Self> {
    Ok(Self {
      token_url: Url::parse(token_url).with_context(|| format!("Invalid token URL: {token_url}"))?,
      session_cookie_url: Url::parse(session_cookie_url)
        .with_context(|| format!("Invalid session cookie URL: {session_cookie_url}"))?,
      topaz_url: Url::parse(topaz_url.trim_end_matches('/'))
        .with_context(|| format!("Invalid Topaz URL: {topaz_url}"))?,
    })
  }

  /// `scheme://host[:port]` of the platform, used for `origin` headers.
  pub fn topaz_origin(&self) -> String {
    self.topaz_url.origin().ascii_serialization()
  }

  pub fn login_url(&self) -> Url {
    self.topaz_path(&["api", "auth", "login"])
  }

  /// `.../api/projects/{id}/edit`, the read endpoint for a project.
  pub fn project_edit_url(&self, project_id: &str) -> Url {
    self.topaz_path(&["api", "projects", project_id, "edit"])
  }

  /// `.../api/projects/{id}`, the write endpoint for a project.
  pub fn project_url(&self, project_id: &str) -> Url {
    self.topaz_path(&["api", "projects", project_id])
  }

  /// Browser page for editing the project, sent as `referer` on updates.
  pub fn project_editor_page(&self, project_id: &str) -> Url {
    self.topaz_path(&["projects", project_id, "edit"])
  }

  /// Append segments to the platform URL, percent-encoding each one.
  fn topaz_path(&self, segments: &[&str]) -> Url {
    let mut url = self.topaz_url.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }
}
