//! # integration-auth
//!
//! Credential primitives shared by every integration and by inbound request auth:
//! - Workspace API keys: token format, digesting, bearer parsing and scope matching
//! - Outbound provider authentication (Airtable personal access tokens, Google bearer tokens)
//! - OAuth 2.0 token refresh for providers that issue expiring access tokens
//! - HTTP client building with timeouts and a stable user agent
//!
//! ## Usage
//!
//! ```rust,ignore
//! use integration_auth::{
//!     api_key::{hash_api_key, has_scope, parse_bearer},
//!     http::AuthenticatedClientBuilder,
//!     oauth::{providers::google, Provider},
//! };
//! ```

pub mod api_key;
pub mod error;
pub mod http;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
