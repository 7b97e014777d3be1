use uuid::Uuid;

pub mod prelude;

// Session principals and API credentials
pub mod api_keys;
pub mod users;

// Integration connections and their audit trail
pub mod integration_activity_log;
pub mod integration_connections;
pub mod integration_name;
pub mod integration_status;
pub mod integration_sync_logs;
pub mod sync_direction;

// Records the adapters map to and from external providers
pub mod gmail_tracked_emails;
pub mod pitch_status;
pub mod pitches;
pub mod workspace_contacts;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
