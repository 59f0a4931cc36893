//! Color utilities for terminal output
//!
//! Semantic styles for progress, results and secrets printed by the CLI,
//! honoring `--color` and whether stdout is a terminal.

use std::fmt::Display;
use std::io::IsTerminal;

use owo_colors::OwoColorize;

use crate::cli::ColorOption;

/// Semantic palette shared by every command handler.
///
/// Each method returns the plain text when colors are disabled, so output
/// stays readable in CI logs.
pub struct ColorScheme {
  enabled: bool,
}

impl ColorScheme {
  pub fn new(color_option: ColorOption) -> Self {
    let enabled = match color_option {
      ColorOption::Always => true,
      ColorOption::Never => false,
      ColorOption::Auto => std::io::stdout().is_terminal(),
    };

    Self { enabled }
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  fn paint<T: Display>(&self, text: T, style: impl FnOnce(&T) -> String) -> String {
    if self.enabled { style(&text) } else { text.to_string() }
  }

  /// Completed steps (green).
  pub fn success<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.green().to_string())
  }

  /// Failures (bright red, bold).
  pub fn error<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_red().bold().to_string())
  }

  /// Dry runs and incomplete configuration (yellow).
  pub fn warning<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.yellow().to_string())
  }

  /// Progress lines (cyan).
  pub fn info<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.cyan().to_string())
  }

  /// Labels (bright white, bold).
  pub fn emphasis<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_white().bold().to_string())
  }

  /// URLs (blue, underlined).
  pub fn link<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.blue().underline().to_string())
  }

  /// File paths (magenta).
  pub fn path<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.magenta().to_string())
  }

  /// Counts and versions (bright blue).
  pub fn number<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_blue().to_string())
  }

  /// Commit hashes and commands (bright green).
  pub fn code<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_green().to_string())
  }

  /// Secondary details such as masked secrets (dimmed).
  pub fn dimmed<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.dimmed().to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_color_scheme_disabled() {
    let scheme = ColorScheme::new(ColorOption::Never);
    assert!(!scheme.is_enabled());
    assert_eq!(scheme.success("Project updated"), "Project updated");
    assert_eq!(scheme.error("Publish failed"), "Publish failed");
    assert_eq!(scheme.dimmed("AIza****"), "AIza****");
  }

  #[test]
  fn test_color_scheme_enabled() {
    let scheme = ColorScheme::new(ColorOption::Always);
    assert!(scheme.is_enabled());
    assert_ne!(scheme.success("test"), "test");
    assert!(scheme.error("test").contains("test"));
  }

  #[test]
  fn test_all_semantic_colors() {
    let scheme = ColorScheme::new(ColorOption::Always);
    let text = "test";

    for styled in [
      scheme.success(text),
      scheme.error(text),
      scheme.warning(text),
      scheme.info(text),
      scheme.emphasis(text),
      scheme.link(text),
      scheme.path(text),
      scheme.number(text),
      scheme.code(text),
      scheme.dimmed(text),
    ] {
      assert!(styled.contains(text));
      assert!(styled.starts_with('\u{1b}'));
    }
  }
}
