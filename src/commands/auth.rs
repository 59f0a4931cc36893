//! Authentication subcommand handlers.
//!
//! Covers both `topaz-publish auth test`, which runs the full credential
//! chain against the live services, and `topaz-publish auth show`, which
//! prints where each configuration value comes from.

use std::process;

use anyhow::{Context, anyhow};

use crate::cli::{AuthCommand, Cli};
use crate::color::ColorScheme;
use crate::credentials::{RefreshCredential, mask_secret};
use crate::endpoints::Endpoints;
use crate::error::{Error, Step};
use crate::http::ReqwestTransport;
use crate::pipeline::Publisher;

/// Dispatch the authentication subcommands defined under `topaz-publish auth`.
///
/// # Arguments
/// * `subcommand` - Auth-specific variant to execute.
/// * `cli` - Parsed CLI settings containing credentials and endpoints.
/// * `colors` - Shared color scheme used to render output consistently.
pub(crate) async fn handle_auth_command(subcommand: &AuthCommand, cli: &Cli, colors: &ColorScheme) {
  match subcommand {
    AuthCommand::Test => test_auth(cli, colors).await,
    AuthCommand::Show => show_auth_config(cli, colors),
  }
}

async fn test_auth(cli: &Cli, colors: &ColorScheme) {
  println!("{} {}", colors.info("→"), colors.info("Testing authentication"));
  println!(
    "  {}: {}",
    colors.emphasis("Topaz"),
    colors.link(&cli.endpoints.topaz_url)
  );

  let credential = match load_credential(cli) {
    Ok(credential) => credential,
    Err(e) => {
      eprintln!("\n{} {}", colors.error("✗"), colors.error("Failed to load credentials"));
      eprintln!("  {e}");
      eprintln!("\n{}", colors.info("Provide credentials via:"));
      eprintln!("  • CLI flags: --api-key and --refresh-token");
      eprintln!("  • Environment variables: FIREBASE_API_KEY and FIREBASE_REFRESH_TOKEN");
      process::exit(2);
    }
  };

  println!(
    "  {}: {}",
    colors.emphasis("API key"),
    colors.dimmed(mask_secret(credential.api_key()))
  );

  let (transport, endpoints) = match connect(cli) {
    Ok(parts) => parts,
    Err(e) => {
      eprintln!(
        "\n{} {}",
        colors.error("✗"),
        colors.error("Failed to create HTTP client")
      );
      eprintln!("  {e}");
      process::exit(1);
    }
  };

  println!("\n{} {}", colors.info("→"), colors.info("Deriving Topaz session..."));
  match Publisher::new(&transport, &endpoints).authenticate(&credential).await {
    Ok(authenticated) => {
      println!(
        "\n{} {}",
        colors.success("✓"),
        colors.success("Authentication successful!")
      );
      println!("  {}: {}", colors.emphasis("User ID"), authenticated.user_id);
      println!(
        "  {}: {}",
        colors.emphasis("Session"),
        colors.dimmed(mask_secret(authenticated.session.as_str()))
      );
    }
    Err(e) => {
      eprintln!("\n{} {}", colors.error("✗"), colors.error("Authentication failed"));
      if let Some(step) = e.step() {
        eprintln!("  {}: {}", colors.emphasis("Step"), step);
      }
      eprintln!("  {e}");
      eprintln!("\n{}", colors.info("Common issues:"));
      eprintln!("  1. Expired or revoked refresh token - sign in again to obtain a new one");
      eprintln!("  2. API key from a different Firebase project");
      eprintln!("  3. Network connectivity issues");
      eprintln!(
        "\n{}",
        colors.dimmed("Run 'topaz-publish auth show' to see your current configuration")
      );
      process::exit(2);
    }
  }
}

/// Display the configured values and where they came from.
///
/// Secrets are masked; only their length and a short prefix are shown.
fn show_auth_config(cli: &Cli, colors: &ColorScheme) {
  println!("{}\n", colors.emphasis("Configuration"));

  println!(
    "{}: {}",
    colors.emphasis("Topaz URL"),
    colors.link(&cli.endpoints.topaz_url)
  );
  println!(
    "  {}: {}",
    colors.dimmed("Source"),
    colors.dimmed(if std::env::var("TOPAZ_URL").is_ok() {
      "environment variable"
    } else {
      "default or command-line flag"
    })
  );

  show_secret("API Key", cli.auth.api_key.as_deref(), "FIREBASE_API_KEY", colors);
  show_secret(
    "Refresh Token",
    cli.auth.refresh_token.as_deref(),
    "FIREBASE_REFRESH_TOKEN",
    colors
  );

  match cli.project.project_id.as_deref() {
    Some(project_id) => {
      println!("\n{}: {}", colors.emphasis("Project ID"), project_id);
      println!(
        "  {}: {}",
        colors.dimmed("Source"),
        colors.dimmed(value_source("TOPAZ_PROJECT_ID", true))
      );
    }
    None => println!("\n{}: {}", colors.emphasis("Project ID"), colors.dimmed("(not set)")),
  }

  match cli.content_file.as_deref() {
    Some(path) => {
      println!("\n{}: {}", colors.emphasis("Content File"), colors.path(path.display()));
      println!(
        "  {}: {}",
        colors.dimmed("Source"),
        colors.dimmed(value_source("CONTENT_FILE_PATH", true))
      );
    }
    None => println!("\n{}: {}", colors.emphasis("Content File"), colors.dimmed("(not set)")),
  }

  let mut missing = Vec::new();
  if cli.auth.api_key.is_none() {
    missing.push("API key (use --api-key or FIREBASE_API_KEY)");
  }
  if cli.auth.refresh_token.is_none() {
    missing.push("refresh token (use --refresh-token or FIREBASE_REFRESH_TOKEN)");
  }
  if cli.project.project_id.is_none() {
    missing.push("project ID (use --project-id or TOPAZ_PROJECT_ID)");
  }

  if missing.is_empty() {
    println!("\n{} {}", colors.success("✓"), colors.success("Configuration complete"));
  } else {
    println!(
      "\n{} {}",
      colors.warning("⚠"),
      colors.warning("Configuration incomplete for publishing")
    );
    for item in missing {
      println!("  Missing: {item}");
    }
  }
}

fn show_secret(label: &str, value: Option<&str>, env_var: &str, colors: &ColorScheme) {
  match value {
    Some(secret) => {
      println!("\n{}: {}", colors.emphasis(label), colors.dimmed(mask_secret(secret)));
      println!(
        "  {}: {} characters",
        colors.dimmed("Length"),
        colors.number(secret.chars().count())
      );
      println!(
        "  {}: {}",
        colors.dimmed("Source"),
        colors.dimmed(value_source(env_var, true))
      );
    }
    None => println!("\n{}: {}", colors.emphasis(label), colors.dimmed("(not set)")),
  }
}

/// Describe where a configured value came from.
fn value_source(env_var: &str, is_set: bool) -> &'static str {
  if !is_set {
    "not set"
  } else if std::env::var_os(env_var).is_some() {
    "environment variable"
  } else {
    "command-line flag"
  }
}

/// Build the refresh credential from CLI flags or environment variables.
///
/// # Errors
/// Returns an error when either value is missing or empty.
pub(crate) fn load_credential(cli: &Cli) -> anyhow::Result<RefreshCredential> {
  let api_key = cli
    .auth
    .api_key
    .clone()
    .ok_or_else(|| anyhow!("Firebase API key not provided. Use --api-key or set FIREBASE_API_KEY"))?;
  let refresh_token = cli
    .auth
    .refresh_token
    .clone()
    .ok_or_else(|| anyhow!("Refresh token not provided. Use --refresh-token or set FIREBASE_REFRESH_TOKEN"))?;

  Ok(RefreshCredential::new(api_key, refresh_token)?)
}

/// Build the HTTP transport and endpoint set from CLI options.
pub(crate) fn connect(cli: &Cli) -> anyhow::Result<(ReqwestTransport, Endpoints)> {
  let endpoints = cli.endpoints.resolve()?;
  let transport = ReqwestTransport::new(cli.performance.timeout).context("Failed to initialize HTTP transport")?;
  Ok((transport, endpoints))
}

/// Process exit code for a failed run.
///
/// Failures in the credential chain exit with `2`, everything else with `1`.
pub(crate) fn exit_code(err: &Error) -> i32 {
  match err.step() {
    Some(Step::TokenExchange | Step::SessionCookie | Step::Login) => 2,
    _ => 1,
  }
}
