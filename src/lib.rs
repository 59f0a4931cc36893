//! Topaz publishing library
//!
//! Turns a Firebase refresh token into a Topaz session and replaces the body
//! of a Topaz project with new Markdown content.

pub mod auth;
pub mod cli;
pub mod color;
pub mod commands;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod topaz;

pub use error::{Error, Result, Step};
