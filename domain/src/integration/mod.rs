//! Integration sync: per-workspace provider connections and the adapters that sync
//! contacts and pitches with them.

pub mod adapter;
pub mod airtable;
pub mod config;
pub mod field_mapping;
pub mod gmail;
pub mod result;
pub mod store;
pub mod sync;

pub use adapter::{run_sync, IntegrationAdapter};
pub use airtable::AirtableAdapter;
pub use config::{ConfigUpdate, Credentials, IntegrationConfig, ProviderSettings};
pub use gmail::{GmailAdapter, SendPitchParams, SentPitch};
pub use result::SyncResult;
pub use store::{DbStore, Store};
pub use sync::{ConnectionStatus, IntegrationSync};
