//! topaz-publish - Publish Markdown content to a Topaz project
//!
//! This is the main entry point for the CLI application.

#[tokio::main]
async fn main() {
  topaz_publish::cli::run().await;
}
