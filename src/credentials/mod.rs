//! Credentials for the Firebase refresh-token flow.
//!
//! The publish job authenticates with two values issued by the Firebase
//! project backing Topaz:
//!
//! - the **web API key**, passed as the `key` query parameter of the token
//!   endpoint, and
//! - a long-lived **refresh token** belonging to the publishing account.
//!
//! Provide them via `--api-key`/`--refresh-token` or the `FIREBASE_API_KEY`
//! and `FIREBASE_REFRESH_TOKEN` environment variables. Both are treated as
//! opaque secrets: they are never parsed, and every place that prints them
//! goes through [`mask_secret`].

mod types;

pub use types::{RefreshCredential, mask_secret};
