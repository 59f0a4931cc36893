//! Credential derivation chain.
//!
//! A Firebase refresh token is turned into a Topaz platform session in three
//! hops, each consuming the previous hop's output:
//!
//! 1. [`exchange_refresh_token`]: refresh token → identity token + user id.
//! 2. [`mint_session_cookie`]: identity token claims → session cookie.
//! 3. [`login`]: session cookie → `topaz_session` value.
//!
//! [`derive_session`] composes hops 2 and 3.

pub mod claims;
pub mod exchange;
pub mod session;

pub use claims::{Claims, SessionClaims, decode_claims};
pub use exchange::{TokenResult, exchange_refresh_token};
pub use session::{PlatformSession, SessionCookie, derive_session, extract_platform_session, login, mint_session_cookie};
