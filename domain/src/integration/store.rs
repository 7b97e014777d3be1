//! Persistence used by the integration adapters.
//!
//! `Store` keeps the sync lifecycle independent of the database so adapters can be
//! exercised against an in-memory store. `DbStore` is the production implementation
//! backed by `entity_api`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use entity_api::{
    integration_activity, integration_connection, integration_sync_log, pitch, tracked_email,
    workspace_contact,
};

use crate::error::Error;
use crate::integration_name::IntegrationName;
use crate::{
    gmail_tracked_emails, integration_activity_log, integration_connections,
    integration_sync_logs, pitches, workspace_contacts, Id,
};

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_connection(
        &self,
        workspace_id: Id,
        name: IntegrationName,
    ) -> Result<Option<integration_connections::Model>, Error>;

    /// Insert-or-replace keyed by (workspace_id, integration_type)
    async fn upsert_connection(
        &self,
        model: integration_connections::Model,
    ) -> Result<integration_connections::Model, Error>;

    async fn record_sync_log(&self, model: integration_sync_logs::Model) -> Result<(), Error>;

    async fn record_activity(&self, model: integration_activity_log::Model) -> Result<(), Error>;

    async fn list_contacts(&self, workspace_id: Id)
        -> Result<Vec<workspace_contacts::Model>, Error>;

    /// Case-insensitive on `email`
    async fn find_contact_by_email(
        &self,
        workspace_id: Id,
        email: &str,
    ) -> Result<Option<workspace_contacts::Model>, Error>;

    async fn create_contact(
        &self,
        model: workspace_contacts::Model,
    ) -> Result<workspace_contacts::Model, Error>;

    async fn update_contact(
        &self,
        model: workspace_contacts::Model,
    ) -> Result<workspace_contacts::Model, Error>;

    async fn find_pitch(&self, workspace_id: Id, pitch_id: Id) -> Result<pitches::Model, Error>;

    async fn mark_pitch_sent(&self, pitch_id: Id, sent_at: DateTime<Utc>) -> Result<(), Error>;

    async fn mark_pitch_replied(&self, pitch_id: Id, replied_at: DateTime<Utc>)
        -> Result<(), Error>;

    async fn track_email(
        &self,
        model: gmail_tracked_emails::Model,
    ) -> Result<gmail_tracked_emails::Model, Error>;

    /// Tracked emails in the workspace with no reply and no bounce
    async fn tracked_emails_awaiting_reply(
        &self,
        workspace_id: Id,
    ) -> Result<Vec<gmail_tracked_emails::Model>, Error>;

    async fn mark_tracked_email_replied(
        &self,
        id: Id,
        replied_at: DateTime<Utc>,
    ) -> Result<(), Error>;

    async fn touch_tracked_email(&self, id: Id, checked_at: DateTime<Utc>) -> Result<(), Error>;
}

/// Database-backed store.
pub struct DbStore<'db> {
    db: &'db DatabaseConnection,
}

impl<'db> DbStore<'db> {
    pub fn new(db: &'db DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<'db> Store for DbStore<'db> {
    async fn find_connection(
        &self,
        workspace_id: Id,
        name: IntegrationName,
    ) -> Result<Option<integration_connections::Model>, Error> {
        Ok(integration_connection::find_by_workspace_and_type(self.db, workspace_id, name).await?)
    }

    async fn upsert_connection(
        &self,
        model: integration_connections::Model,
    ) -> Result<integration_connections::Model, Error> {
        Ok(integration_connection::upsert(self.db, model).await?)
    }

    async fn record_sync_log(&self, model: integration_sync_logs::Model) -> Result<(), Error> {
        integration_sync_log::create(self.db, model).await?;
        Ok(())
    }

    async fn record_activity(&self, model: integration_activity_log::Model) -> Result<(), Error> {
        integration_activity::create(self.db, model).await?;
        Ok(())
    }

    async fn list_contacts(
        &self,
        workspace_id: Id,
    ) -> Result<Vec<workspace_contacts::Model>, Error> {
        Ok(workspace_contact::find_by_workspace(self.db, workspace_id).await?)
    }

    async fn find_contact_by_email(
        &self,
        workspace_id: Id,
        email: &str,
    ) -> Result<Option<workspace_contacts::Model>, Error> {
        Ok(workspace_contact::find_by_workspace_and_email(self.db, workspace_id, email).await?)
    }

    async fn create_contact(
        &self,
        model: workspace_contacts::Model,
    ) -> Result<workspace_contacts::Model, Error> {
        Ok(workspace_contact::create(self.db, model).await?)
    }

    async fn update_contact(
        &self,
        model: workspace_contacts::Model,
    ) -> Result<workspace_contacts::Model, Error> {
        Ok(workspace_contact::update(self.db, model).await?)
    }

    async fn find_pitch(&self, workspace_id: Id, pitch_id: Id) -> Result<pitches::Model, Error> {
        Ok(pitch::find_by_workspace_and_id(self.db, workspace_id, pitch_id).await?)
    }

    async fn mark_pitch_sent(&self, pitch_id: Id, sent_at: DateTime<Utc>) -> Result<(), Error> {
        pitch::mark_sent(self.db, pitch_id, sent_at).await?;
        Ok(())
    }

    async fn mark_pitch_replied(
        &self,
        pitch_id: Id,
        replied_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        pitch::mark_replied(self.db, pitch_id, replied_at).await?;
        Ok(())
    }

    async fn track_email(
        &self,
        model: gmail_tracked_emails::Model,
    ) -> Result<gmail_tracked_emails::Model, Error> {
        Ok(tracked_email::create(self.db, model).await?)
    }

    async fn tracked_emails_awaiting_reply(
        &self,
        workspace_id: Id,
    ) -> Result<Vec<gmail_tracked_emails::Model>, Error> {
        Ok(tracked_email::find_awaiting_reply(self.db, workspace_id).await?)
    }

    async fn mark_tracked_email_replied(
        &self,
        id: Id,
        replied_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        tracked_email::mark_replied(self.db, id, replied_at).await?;
        Ok(())
    }

    async fn touch_tracked_email(&self, id: Id, checked_at: DateTime<Utc>) -> Result<(), Error> {
        tracked_email::touch_checked(self.db, id, checked_at).await?;
        Ok(())
    }
}

/// In-memory `Store` for lifecycle tests.
#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use crate::pitch_status::PitchStatus;
    use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub connections: Mutex<Vec<integration_connections::Model>>,
        pub sync_logs: Mutex<Vec<integration_sync_logs::Model>>,
        pub activities: Mutex<Vec<integration_activity_log::Model>>,
        pub contacts: Mutex<Vec<workspace_contacts::Model>>,
        pub pitches: Mutex<Vec<pitches::Model>>,
        pub tracked: Mutex<Vec<gmail_tracked_emails::Model>>,
        /// Makes `record_sync_log` fail like an unreachable table.
        pub reject_sync_logs: AtomicBool,
    }

    fn not_found() -> Error {
        EntityApiError::not_found().into()
    }

    impl MemoryStore {
        pub(crate) fn with_connection(model: integration_connections::Model) -> Self {
            let store = Self::default();
            store.connections.lock().unwrap().push(model);
            store
        }

        pub(crate) fn connection(&self) -> integration_connections::Model {
            self.connections.lock().unwrap()[0].clone()
        }

        pub(crate) fn actions(&self) -> Vec<String> {
            self.activities
                .lock()
                .unwrap()
                .iter()
                .map(|activity| activity.action.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Store for MemoryStore {
        async fn find_connection(
            &self,
            workspace_id: Id,
            name: IntegrationName,
        ) -> Result<Option<integration_connections::Model>, Error> {
            Ok(self
                .connections
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.workspace_id == workspace_id && c.integration_type == name)
                .cloned())
        }

        async fn upsert_connection(
            &self,
            model: integration_connections::Model,
        ) -> Result<integration_connections::Model, Error> {
            let mut connections = self.connections.lock().unwrap();
            match connections.iter_mut().find(|c| {
                c.workspace_id == model.workspace_id && c.integration_type == model.integration_type
            }) {
                Some(existing) => {
                    let id = existing.id;
                    let created_at = existing.created_at;
                    *existing = integration_connections::Model {
                        id,
                        created_at,
                        ..model
                    };
                    Ok(existing.clone())
                }
                None => {
                    connections.push(model.clone());
                    Ok(model)
                }
            }
        }

        async fn record_sync_log(&self, model: integration_sync_logs::Model) -> Result<(), Error> {
            if self.reject_sync_logs.load(Ordering::SeqCst) {
                return Err(EntityApiError {
                    source: None,
                    error_kind: EntityApiErrorKind::SystemError,
                }
                .into());
            }
            self.sync_logs.lock().unwrap().push(model);
            Ok(())
        }

        async fn record_activity(
            &self,
            model: integration_activity_log::Model,
        ) -> Result<(), Error> {
            self.activities.lock().unwrap().push(model);
            Ok(())
        }

        async fn list_contacts(
            &self,
            workspace_id: Id,
        ) -> Result<Vec<workspace_contacts::Model>, Error> {
            Ok(self
                .contacts
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.workspace_id == workspace_id)
                .cloned()
                .collect())
        }

        async fn find_contact_by_email(
            &self,
            workspace_id: Id,
            email: &str,
        ) -> Result<Option<workspace_contacts::Model>, Error> {
            let email = email.trim().to_lowercase();
            Ok(self
                .contacts
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.workspace_id == workspace_id && c.email.to_lowercase() == email)
                .cloned())
        }

        async fn create_contact(
            &self,
            model: workspace_contacts::Model,
        ) -> Result<workspace_contacts::Model, Error> {
            let model = workspace_contacts::Model {
                id: Id::new_v4(),
                email: model.email.trim().to_lowercase(),
                ..model
            };
            self.contacts.lock().unwrap().push(model.clone());
            Ok(model)
        }

        async fn update_contact(
            &self,
            model: workspace_contacts::Model,
        ) -> Result<workspace_contacts::Model, Error> {
            let mut contacts = self.contacts.lock().unwrap();
            let existing = contacts
                .iter_mut()
                .find(|c| c.id == model.id)
                .ok_or_else(not_found)?;
            *existing = model;
            Ok(existing.clone())
        }

        async fn find_pitch(
            &self,
            workspace_id: Id,
            pitch_id: Id,
        ) -> Result<pitches::Model, Error> {
            self.pitches
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == pitch_id && p.workspace_id == workspace_id)
                .cloned()
                .ok_or_else(not_found)
        }

        async fn mark_pitch_sent(
            &self,
            pitch_id: Id,
            sent_at: DateTime<Utc>,
        ) -> Result<(), Error> {
            let mut pitches = self.pitches.lock().unwrap();
            let pitch = pitches
                .iter_mut()
                .find(|p| p.id == pitch_id)
                .ok_or_else(not_found)?;
            pitch.status = PitchStatus::Sent;
            pitch.sent_at = Some(sent_at.into());
            Ok(())
        }

        async fn mark_pitch_replied(
            &self,
            pitch_id: Id,
            replied_at: DateTime<Utc>,
        ) -> Result<(), Error> {
            let mut pitches = self.pitches.lock().unwrap();
            let pitch = pitches
                .iter_mut()
                .find(|p| p.id == pitch_id)
                .ok_or_else(not_found)?;
            pitch.status = PitchStatus::Replied;
            pitch.replied_at = Some(replied_at.into());
            Ok(())
        }

        async fn track_email(
            &self,
            model: gmail_tracked_emails::Model,
        ) -> Result<gmail_tracked_emails::Model, Error> {
            self.tracked.lock().unwrap().push(model.clone());
            Ok(model)
        }

        async fn tracked_emails_awaiting_reply(
            &self,
            workspace_id: Id,
        ) -> Result<Vec<gmail_tracked_emails::Model>, Error> {
            Ok(self
                .tracked
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.workspace_id == workspace_id && t.replied_at.is_none() && !t.bounced)
                .cloned()
                .collect())
        }

        async fn mark_tracked_email_replied(
            &self,
            id: Id,
            replied_at: DateTime<Utc>,
        ) -> Result<(), Error> {
            let mut tracked = self.tracked.lock().unwrap();
            let email = tracked
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(not_found)?;
            email.replied_at = Some(replied_at.into());
            email.last_checked_at = Some(replied_at.into());
            Ok(())
        }

        async fn touch_tracked_email(
            &self,
            id: Id,
            checked_at: DateTime<Utc>,
        ) -> Result<(), Error> {
            let mut tracked = self.tracked.lock().unwrap();
            let email = tracked
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(not_found)?;
            email.last_checked_at = Some(checked_at.into());
            Ok(())
        }
    }
}
