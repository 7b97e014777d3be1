//! HTTP client building for provider APIs.

mod client;

pub use client::{AuthenticatedClient, AuthenticatedClientBuilder, HttpClientConfig};
