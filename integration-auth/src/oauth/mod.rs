//! OAuth 2.0 token refresh for providers that issue expiring access tokens.

mod provider;

pub mod providers;
pub mod token;

pub use provider::Provider;
