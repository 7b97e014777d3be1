pub use super::api_keys::Entity as ApiKeys;
pub use super::gmail_tracked_emails::Entity as GmailTrackedEmails;
pub use super::integration_activity_log::Entity as IntegrationActivityLog;
pub use super::integration_connections::Entity as IntegrationConnections;
pub use super::integration_sync_logs::Entity as IntegrationSyncLogs;
pub use super::pitches::Entity as Pitches;
pub use super::users::Entity as Users;
pub use super::workspace_contacts::Entity as WorkspaceContacts;
