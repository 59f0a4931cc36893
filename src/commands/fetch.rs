//! Project fetch handler.
//!
//! Implements `topaz-publish fetch`, which prints a project's current record
//! without modifying it. Useful for checking what a publish run would start
//! from.

use std::process;

use tracing::debug;

use super::auth::{connect, exit_code, load_credential};
use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::credentials::RefreshCredential;
use crate::error::Result;
use crate::pipeline::Publisher;

/// Fetch a project and print it to stdout.
///
/// # Arguments
/// * `project_id` - Project to fetch; falls back to `--project-id`.
/// * `converted` - Print the write-shaped record instead of the raw response.
/// * `cli` - Parsed CLI settings containing credentials and endpoints.
/// * `colors` - Shared color palette for diagnostics on stderr.
pub(crate) async fn handle_fetch_command(project_id: Option<&str>, converted: bool, cli: &Cli, colors: &ColorScheme) {
  let Some(project_id) = project_id.or(cli.project.project_id.as_deref()).filter(|id| !id.is_empty()) else {
    eprintln!(
      "{} Project ID is required. Pass it as an argument or use --project-id / TOPAZ_PROJECT_ID",
      colors.error("Error:")
    );
    process::exit(4);
  };

  let credential = match load_credential(cli) {
    Ok(credential) => credential,
    Err(e) => {
      eprintln!("{} {}", colors.error("Error:"), e);
      process::exit(2);
    }
  };

  let (transport, endpoints) = match connect(cli) {
    Ok(parts) => parts,
    Err(e) => {
      eprintln!("{} {}", colors.error("Error:"), e);
      process::exit(1);
    }
  };

  let publisher = Publisher::new(&transport, &endpoints);
  match render(&publisher, &credential, project_id, converted).await {
    Ok(output) => println!("{output}"),
    Err(e) => {
      eprintln!("{} {}", colors.error("✗"), colors.error(&e));
      process::exit(exit_code(&e));
    }
  }
}

async fn render(
  publisher: &Publisher<'_>,
  credential: &RefreshCredential,
  project_id: &str,
  converted: bool,
) -> Result<String> {
  let session = publisher.authenticate(credential).await?.session;

  if converted {
    let record = publisher.fetch_write_record(&session, project_id).await?;
    return record.to_json_pretty();
  }

  let text = publisher.records().fetch(&session, project_id).await?;
  debug!(bytes = text.len(), "Printing raw project response");
  Ok(text)
}
