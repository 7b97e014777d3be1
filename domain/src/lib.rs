//! Business logic of core_db: request authentication and the integration sync engine.
//!
//! Entity models are re-exported from `entity_api` so that `web` never depends on the
//! entity crates directly.

pub use entity_api::{
    api_keys, gmail_tracked_emails, integration_activity_log, integration_connections,
    integration_name, integration_status, integration_sync_logs, pitch_status, pitches,
    sync_direction, users, workspace_contacts, Id,
};

pub mod auth;
pub mod error;
pub mod gateway;
pub mod integration;
pub mod user;
