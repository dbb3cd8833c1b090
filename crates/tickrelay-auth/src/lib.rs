//! Token acquisition for the upstream platform API.
//!
//! The platform issues short-lived bearer tokens through an OAuth2
//! password grant. [`TokenProvider`] caches the current token and
//! refreshes it on demand; every other crate that talks to the platform
//! borrows tokens from here instead of authenticating itself.

pub mod error;
pub mod provider;

pub use error::{AuthError, AuthResult};
pub use provider::{AuthConfig, TokenProvider};
