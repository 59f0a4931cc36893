//! Command-line interface definitions for topaz-publish.
//!
//! Every option that a CI job would set has an environment-variable fallback
//! so the tool can run from workflow `env:` blocks without flags.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use url::Url;

use crate::color::ColorScheme;
use crate::commands::auth::handle_auth_command;
use crate::commands::completions::handle_completions_command;
use crate::commands::fetch::handle_fetch_command;
use crate::commands::publish::handle_publish;
use crate::commands::version::handle_version_command;
use crate::endpoints::{DEFAULT_SESSION_COOKIE_URL, DEFAULT_TOKEN_URL, DEFAULT_TOPAZ_URL, Endpoints};

/// topaz-publish - Publish Markdown content to a Topaz project
#[derive(Debug, Parser)]
#[command(
  name = "topaz-publish",
  version,
  about = "Publish Markdown content to a Topaz project",
  long_about = "Authenticates with a Firebase refresh token, derives a Topaz session, and replaces\n\
                the body of a Topaz project with the contents of a Markdown file.",
  styles = get_clap_styles()
)]
pub struct Cli {
  /// Markdown file whose contents become the project body
  #[arg(value_name = "CONTENT_FILE", env = "CONTENT_FILE_PATH")]
  pub content_file: Option<PathBuf>,

  /// Subcommand to execute
  #[command(subcommand)]
  pub command: Option<Command>,

  /// Authentication options
  #[command(flatten)]
  pub auth: AuthOptions,

  /// Project options
  #[command(flatten)]
  pub project: ProjectOptions,

  /// Endpoint overrides
  #[command(flatten)]
  pub endpoints: EndpointOptions,

  /// Behavior options
  #[command(flatten)]
  pub behavior: BehaviorOptions,

  /// Performance options
  #[command(flatten)]
  pub performance: PerformanceOptions,
}

/// Subcommands for debugging and introspection
#[derive(Debug, Subcommand)]
pub enum Command {
  /// Authentication testing and inspection
  Auth {
    #[command(subcommand)]
    subcommand: AuthCommand,
  },

  /// Print a project's current data without modifying it
  Fetch {
    /// Project to fetch (defaults to --project-id)
    #[arg(value_name = "PROJECT_ID")]
    project_id: Option<String>,

    /// Print the update payload instead of the raw project JSON
    #[arg(long)]
    converted: bool,
  },

  /// Display version and build information
  Version {
    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Show only version number
    #[arg(long)]
    short: bool,
  },

  /// Generate shell completion scripts
  Completions {
    /// Target shell for completions
    #[arg(value_enum)]
    shell: Shell,
  },
}

/// Authentication subcommands
#[derive(Debug, Subcommand)]
pub enum AuthCommand {
  /// Derive a Topaz session from the configured refresh token
  Test,
  /// Show where each configuration value comes from
  Show,
}

/// Shells supported by `completions`
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
  Bash,
  Zsh,
  Fish,
  Powershell,
  Elvish,
}

/// Normalize a URL by adding https:// if no scheme is present
fn normalize_url(url: &str) -> Result<String, String> {
  let trimmed = url.trim();

  let parsed = match Url::parse(trimmed) {
    Ok(parsed) => parsed,
    Err(_) => {
      // Most likely a bare host such as `topaz.dev`
      let with_https = format!("https://{trimmed}");
      Url::parse(&with_https).map_err(|e| format!("Invalid URL: {e}"))?
    }
  };

  let mut url_str = parsed.to_string();
  if url_str.ends_with('/') && url_str.len() > 1 {
    url_str.pop();
  }

  Ok(url_str)
}

/// Authentication options
#[derive(Debug, Parser)]
pub struct AuthOptions {
  /// Firebase web API key of the Topaz project
  #[arg(long, env = "FIREBASE_API_KEY", value_name = "KEY", hide_env_values = true)]
  pub api_key: Option<String>,

  /// Firebase refresh token of the publishing account
  #[arg(long, env = "FIREBASE_REFRESH_TOKEN", value_name = "TOKEN", hide_env_values = true)]
  pub refresh_token: Option<String>,
}

/// Project options
#[derive(Debug, Parser)]
pub struct ProjectOptions {
  /// Topaz project to update
  #[arg(long, env = "TOPAZ_PROJECT_ID", value_name = "ID")]
  pub project_id: Option<String>,
}

/// Endpoint overrides, mainly for staging and local testing
#[derive(Debug, Parser)]
pub struct EndpointOptions {
  /// Topaz base URL
  #[arg(long, env = "TOPAZ_URL", default_value = DEFAULT_TOPAZ_URL, value_name = "URL", value_parser = normalize_url)]
  pub topaz_url: String,

  /// Firebase secure token endpoint
  #[arg(long, env = "TOPAZ_TOKEN_URL", default_value = DEFAULT_TOKEN_URL, value_name = "URL", hide = true)]
  pub token_url: String,

  /// Session cookie minting endpoint
  #[arg(
    long,
    env = "TOPAZ_SESSION_COOKIE_URL",
    default_value = DEFAULT_SESSION_COOKIE_URL,
    value_name = "URL",
    hide = true
  )]
  pub session_cookie_url: String,
}

impl EndpointOptions {
  /// Parse the configured URLs into an [`Endpoints`] set.
  pub fn resolve(&self) -> anyhow::Result<Endpoints> {
    Endpoints::from_strs(&self.token_url, &self.session_cookie_url, &self.topaz_url)
  }
}

/// Behavior options
#[derive(Debug, Parser)]
pub struct BehaviorOptions {
  /// Run every step except the final update and print the payload
  #[arg(long)]
  pub dry_run: bool,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Colorize output
  #[arg(long, value_enum, default_value = "auto", value_name = "WHEN")]
  pub color: ColorOption,
}

/// Color output options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorOption {
  Auto,
  Always,
  Never,
}

/// Performance options
#[derive(Debug, Parser)]
pub struct PerformanceOptions {
  /// Request timeout in seconds
  #[arg(long, default_value = "30", value_name = "SECONDS")]
  pub timeout: u64,
}

impl Cli {
  /// Parse CLI arguments from the environment
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Validate CLI arguments
  ///
  /// Returns an error if the CLI configuration is invalid.
  pub fn validate(&self) -> Result<(), String> {
    if self.content_file.is_none() && self.command.is_none() {
      return Err("Either provide a content file or use a subcommand".to_string());
    }

    if self.performance.timeout == 0 {
      return Err("--timeout must be at least 1 second".to_string());
    }

    // Subcommands check their own requirements.
    if self.command.is_none() {
      if self.auth.api_key.as_deref().is_none_or(str::is_empty) {
        return Err("--api-key (or FIREBASE_API_KEY) is required to publish".to_string());
      }
      if self.auth.refresh_token.as_deref().is_none_or(str::is_empty) {
        return Err("--refresh-token (or FIREBASE_REFRESH_TOKEN) is required to publish".to_string());
      }
      if self.project.project_id.as_deref().is_none_or(str::is_empty) {
        return Err("--project-id (or TOPAZ_PROJECT_ID) is required to publish".to_string());
      }
    }

    Ok(())
  }
}

/// Parse CLI arguments, initialize shared services, and dispatch to the chosen
/// command.
pub async fn run() {
  let cli = Cli::parse_args();

  init_tracing(&cli.behavior);

  let colors = ColorScheme::new(cli.behavior.color);

  if let Err(e) = cli.validate() {
    eprintln!("{} {}", colors.error("Error:"), e);
    process::exit(4); // Invalid arguments exit code
  }

  if let Some(ref command) = cli.command {
    match command {
      Command::Auth { subcommand } => {
        handle_auth_command(subcommand, &cli, &colors).await;
      }
      Command::Fetch { project_id, converted } => {
        handle_fetch_command(project_id.as_deref(), *converted, &cli, &colors).await;
      }
      Command::Version { json, short } => {
        handle_version_command(*json, *short, &colors);
      }
      Command::Completions { shell } => {
        handle_completions_command(*shell);
      }
    }
    return;
  }

  if let Some(ref content_file) = cli.content_file {
    handle_publish(content_file, &cli, &colors).await;
  }
}

fn init_tracing(behavior: &BehaviorOptions) {
  let level = if behavior.quiet {
    LevelFilter::ERROR
  } else {
    match behavior.verbose {
      0 => LevelFilter::WARN,
      1 => LevelFilter::INFO,
      2 => LevelFilter::DEBUG,
      _ => LevelFilter::TRACE,
    }
  };

  let env_filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  let _ = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}

/// Get custom styles for clap help output
fn get_clap_styles() -> clap::builder::Styles {
  use clap::builder::styling::{AnsiColor, Effects};

  clap::builder::Styles::styled()
    .header(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .literal(AnsiColor::BrightGreen.on_default())
    .placeholder(AnsiColor::BrightCyan.on_default())
    .error(AnsiColor::BrightRed.on_default() | Effects::BOLD)
    .valid(AnsiColor::BrightGreen.on_default())
    .invalid(AnsiColor::BrightRed.on_default())
}
