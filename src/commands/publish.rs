//! Default action: publish a Markdown file as a project's body.

use std::path::Path;
use std::process;

use anyhow::Context;
use tracing::debug;

use super::auth::{connect, exit_code, load_credential};
use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::pipeline::{PublishMode, Publisher};

/// Publish `content_file` to the configured project.
///
/// # Arguments
/// * `content_file` - Markdown file whose text replaces the project body.
/// * `cli` - Parsed CLI settings containing credentials and endpoints.
/// * `colors` - Shared color palette for styled terminal output.
pub(crate) async fn handle_publish(content_file: &Path, cli: &Cli, colors: &ColorScheme) {
  // validate() has already rejected a missing project ID for this path.
  let project_id = cli.project.project_id.as_deref().unwrap_or_default();
  let mode = if cli.behavior.dry_run {
    PublishMode::DryRun
  } else {
    PublishMode::Apply
  };

  let content = match read_content(content_file).await {
    Ok(content) => content,
    Err(e) => {
      eprintln!("{} {:#}", colors.error("Error:"), e);
      process::exit(1);
    }
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
      eprintln!("{} {:#}", colors.error("Error:"), e);
      process::exit(1);
    }
  };

  println!(
    "{} {} {} {}",
    colors.info("→"),
    colors.info("Publishing"),
    colors.path(content_file.display()),
    colors.dimmed(format!("({} bytes)", content.len()))
  );
  println!("  {}: {}", colors.emphasis("Project"), project_id);
  println!(
    "  {}: {}",
    colors.emphasis("Topaz"),
    colors.link(endpoints.topaz_url.as_str())
  );
  if mode == PublishMode::DryRun {
    println!("  {}", colors.warning("Dry run: the project will not be modified"));
  }

  let publisher = Publisher::new(&transport, &endpoints);
  match publisher.publish(&credential, project_id, &content, mode).await {
    Ok(outcome) => {
      debug!(user_id = %outcome.user_id, "Publish finished");
      if outcome.updated {
        println!(
          "\n{} {}",
          colors.success("✓"),
          colors.success("Project updated successfully")
        );
        return;
      }

      match outcome.record.to_json_pretty() {
        Ok(json) => {
          println!("\n{}", colors.dimmed("Record that would be sent:"));
          println!("{json}");
        }
        Err(e) => {
          eprintln!("{} {}", colors.error("Error:"), e);
          process::exit(1);
        }
      }
    }
    Err(e) => {
      eprintln!("\n{} {}", colors.error("✗"), colors.error("Publish failed"));
      if let Some(step) = e.step() {
        eprintln!("  {}: {}", colors.emphasis("Step"), step);
      }
      eprintln!("  {e}");
      process::exit(exit_code(&e));
    }
  }
}

/// Read the content file as UTF-8 text.
pub(crate) async fn read_content(path: &Path) -> anyhow::Result<String> {
  tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("Failed to read content file {}", path.display()))
}
