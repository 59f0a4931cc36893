//! One publish run: authenticate, fetch, convert, overlay, update.
//!
//! Each stage consumes the previous stage's output and either yields the next
//! value or stops the run with the stage's error. Nothing is retried and
//! nothing is recovered.

use tracing::{Instrument, info, info_span};

use crate::auth::{self, PlatformSession};
use crate::credentials::RefreshCredential;
use crate::endpoints::Endpoints;
use crate::error::Result;
use crate::http::Transport;
use crate::topaz::{RawRecord, RecordClient, WriteRecord, convert};

/// Whether the final `PUT` is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMode {
  Apply,
  /// Stop after building the write record.
  DryRun,
}

/// A session ready to call record endpoints.
#[derive(Debug, Clone)]
pub struct Authenticated {
  pub user_id: String,
  pub session: PlatformSession,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct PublishOutcome {
  pub user_id: String,
  pub project_id: String,
  /// The document that was (or, in a dry run, would have been) sent.
  pub record: WriteRecord,
  /// `false` for dry runs.
  pub updated: bool,
}

/// Drives the pipeline against a transport and endpoint set.
#[derive(Clone, Copy)]
pub struct Publisher<'a> {
  transport: &'a dyn Transport,
  endpoints: &'a Endpoints,
}

impl<'a> Publisher<'a> {
  pub fn new(transport: &'a dyn Transport, endpoints: &'a Endpoints) -> Self {
    Self { transport, endpoints }
  }

  pub fn records(&self) -> RecordClient<'a> {
    RecordClient::new(self.transport, self.endpoints)
  }

  /// Refresh token → identity token → session cookie → platform session.
  pub async fn authenticate(&self, credential: &RefreshCredential) -> Result<Authenticated> {
    info!("Obtaining Firebase ID token");
    let token = auth::exchange_refresh_token(self.transport, self.endpoints, credential).await?;

    info!("Obtaining Topaz session");
    let session = auth::derive_session(self.transport, self.endpoints, &token.id_token).await?;

    Ok(Authenticated {
      user_id: token.user_id,
      session,
    })
  }

  /// Fetch a project and convert it to the write shape.
  pub async fn fetch_write_record(&self, session: &PlatformSession, project_id: &str) -> Result<WriteRecord> {
    info!(project_id, "Fetching project data");
    let text = self.records().fetch(session, project_id).await?;
    let raw = RawRecord::from_json(&text)?;
    Ok(convert(&raw))
  }

  /// Run the whole chain, replacing the project's body with `content`.
  pub async fn publish(
    &self,
    credential: &RefreshCredential,
    project_id: &str,
    content: &str,
    mode: PublishMode,
  ) -> Result<PublishOutcome> {
    let span = info_span!("publish", project_id);
    self.publish_inner(credential, project_id, content, mode).instrument(span).await
  }

  async fn publish_inner(
    &self,
    credential: &RefreshCredential,
    project_id: &str,
    content: &str,
    mode: PublishMode,
  ) -> Result<PublishOutcome> {
    let Authenticated { user_id, session } = self.authenticate(credential).await?;

    let record = self.fetch_write_record(&session, project_id).await?.with_body(content);

    let updated = match mode {
      PublishMode::Apply => {
        info!("Updating project");
        self.records().update(&session, project_id, &record.to_json()?).await?;
        true
      }
      PublishMode::DryRun => {
        info!("Dry run: skipping project update");
        false
      }
    };

    Ok(PublishOutcome {
      user_id,
      project_id: project_id.to_string(),
      record,
      updated,
    })
  }
}
