//! API keys in both directions.
//!
//! Inbound: workspace API keys presented as `Authorization: Bearer tap_<env>_<secret>`,
//! digested for lookup and checked against granted scopes.
//!
//! Outbound: traits and implementations for authenticating requests to providers
//! that take a static key or bearer token (Airtable, Gmail).

mod auth;
mod bearer;
mod scope;
mod token;

pub use auth::{ApiKeyAuth, AuthMethod, ProviderAuth, ServiceProvider};
pub use bearer::BearerTokenAuth;
pub use scope::{has_scope, is_valid_scope, WILDCARD_SCOPE};
pub use token::{
    generate, hash_api_key, parse, parse_bearer, ApiKeyToken, Environment, GeneratedApiKey,
    TOKEN_PREFIX,
};
