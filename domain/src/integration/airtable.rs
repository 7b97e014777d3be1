//! Two-way contact sync with an Airtable table, deduplicated by email.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use log::*;
use secrecy::SecretString;
use serde_json::{json, Map, Value};
use service::config::Config;

use super::adapter::IntegrationAdapter;
use super::config::{AirtableSettings, ConfigUpdate};
use super::field_mapping::{self, FieldMapping, MappedContact};
use super::result::SyncResult;
use super::store::Store;
use super::sync::{ConnectionStatus, IntegrationSync};
use crate::error::{Error, IntegrationErrorKind};
use crate::gateway::airtable::AirtableClient;
use crate::integration_name::IntegrationName;
use crate::integration_status::IntegrationStatus;
use crate::sync_direction::SyncDirection;
use crate::{workspace_contacts, Id};

const SOURCE: &str = "airtable";

pub struct AirtableAdapter<S: Store> {
    sync: IntegrationSync<S>,
    app_config: Config,
}

impl<S: Store> AirtableAdapter<S> {
    pub fn new(store: S, workspace_id: Id, app_config: &Config) -> Self {
        Self {
            sync: IntegrationSync::new(store, workspace_id, IntegrationName::Airtable),
            app_config: app_config.clone(),
        }
    }

    fn settings(&self) -> Result<&AirtableSettings, Error> {
        self.sync.loaded_config()?.settings.airtable().ok_or_else(|| {
            Error::integration(IntegrationErrorKind::InvalidSettings(
                "Connection does not hold Airtable settings".to_string(),
            ))
        })
    }

    fn client(&self) -> Result<AirtableClient, Error> {
        let api_key: SecretString =
            self.sync.loaded_config()?.credentials.api_key().ok_or_else(|| {
                Error::integration(IntegrationErrorKind::MissingCredentials(
                    "No Airtable API key found in config".to_string(),
                ))
            })?;
        let settings = self.settings()?;
        AirtableClient::new(
            &self.app_config,
            api_key,
            &settings.base_id,
            &settings.table_name,
        )
    }

    fn field_mapping(&self) -> Result<FieldMapping, Error> {
        Ok(FieldMapping::with_overrides(&self.settings()?.field_mapping))
    }

    fn with_location(&self, result: SyncResult) -> SyncResult {
        match self.settings() {
            Ok(settings) => result
                .with_metadata("base_id", settings.base_id.clone())
                .with_metadata("table_name", settings.table_name.clone()),
            Err(_) => result,
        }
    }

    /// Creates or updates the workspace contact for `mapped`. Returns true when created.
    async fn upsert_workspace_contact(&self, email: String, mapped: MappedContact) -> Result<bool, Error> {
        let store = self.sync.store();
        let workspace_id = self.sync.workspace_id();
        let now = Utc::now();
        let existing = store.find_contact_by_email(workspace_id, &email).await?;

        let mut metadata = match existing.as_ref().map(|contact| &contact.metadata) {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        if let Some(city) = &mapped.location_city {
            metadata.insert(field_mapping::LOCATION_CITY.to_string(), json!(city));
        }
        metadata.insert(
            field_mapping::ENRICHMENT_SOURCE.to_string(),
            json!(mapped.enrichment_source.as_deref().unwrap_or(SOURCE)),
        );
        metadata.insert("airtable_synced_at".to_string(), json!(now.to_rfc3339()));

        match existing {
            Some(contact) => {
                let tags = if mapped.genre_tags.is_empty() {
                    contact.tags.clone()
                } else {
                    json!(mapped.genre_tags)
                };
                store
                    .update_contact(workspace_contacts::Model {
                        email,
                        name: mapped.name.or(contact.name.clone()),
                        company: mapped.outlet.or(contact.company.clone()),
                        job_title: mapped.role.or(contact.job_title.clone()),
                        tags,
                        metadata: Value::Object(metadata),
                        updated_at: now.into(),
                        ..contact
                    })
                    .await?;
                Ok(false)
            }
            None => {
                store
                    .create_contact(workspace_contacts::Model {
                        id: Id::new_v4(),
                        workspace_id,
                        email,
                        name: mapped.name,
                        company: mapped.outlet,
                        job_title: mapped.role,
                        tags: json!(mapped.genre_tags),
                        metadata: Value::Object(metadata),
                        intel_contact_id: None,
                        pitch_contact_id: None,
                        tracker_contact_id: None,
                        created_at: now.into(),
                        updated_at: now.into(),
                    })
                    .await?;
                Ok(true)
            }
        }
    }

    /// Status from the stored connection. Airtable has no account identity to report.
    pub async fn connection_status(&mut self) -> Result<ConnectionStatus, Error> {
        self.sync.load_config().await?;
        Ok(self.sync.connection_status())
    }
}

#[async_trait]
impl<S: Store> IntegrationAdapter for AirtableAdapter<S> {
    type Record = workspace_contacts::Model;
    type Store = S;

    fn integration_name(&self) -> IntegrationName {
        IntegrationName::Airtable
    }

    fn sync(&self) -> &IntegrationSync<S> {
        &self.sync
    }

    fn sync_mut(&mut self) -> &mut IntegrationSync<S> {
        &mut self.sync
    }

    async fn validate_credentials(&mut self) -> bool {
        if self.sync.config().is_none() {
            if let Err(err) = self.sync.load_config().await {
                warn!("Could not load Airtable config: {err}");
                return false;
            }
        }
        if self.sync.config().is_none() {
            return false;
        }

        let access = match self.client() {
            Ok(client) => client.check_access().await,
            Err(err) => Err(err),
        };

        match access {
            Ok(()) => true,
            Err(err) => {
                warn!("Airtable credential validation failed: {err}");
                let update = ConfigUpdate {
                    status: Some(IntegrationStatus::Error),
                    error_message: Some(Some(err.message())),
                    ..Default::default()
                };
                if let Err(save_err) = self.sync.save_config(update).await {
                    warn!("Could not record Airtable validation failure: {save_err}");
                }
                false
            }
        }
    }

    async fn sync_to_external(
        &mut self,
        contacts: Vec<workspace_contacts::Model>,
    ) -> Result<SyncResult, Error> {
        self.sync.ensure_initialized()?;
        let mut result = SyncResult::start(SyncDirection::ToExternal);
        if contacts.is_empty() {
            return Ok(self.with_location(result.finish()));
        }

        let view = self.settings()?.view_name.clone();
        let mapping = self.field_mapping()?;
        let client = match self.client() {
            Ok(client) => client,
            Err(err) => {
                return Ok(self.with_location(SyncResult::failed(
                    SyncDirection::ToExternal,
                    result.started_at,
                    err.message(),
                )))
            }
        };

        let existing = match client.list_all(&view).await {
            Ok(records) => records,
            Err(err) => {
                return Ok(self.with_location(SyncResult::failed(
                    SyncDirection::ToExternal,
                    result.started_at,
                    err.message(),
                )))
            }
        };

        let email_column = mapping.column(field_mapping::EMAIL).to_string();
        let mut record_ids: HashMap<String, String> = existing
            .into_iter()
            .filter_map(|record| {
                let email = record.fields.get(&email_column)?.as_str()?.trim().to_lowercase();
                Some((email, record.id))
            })
            .collect();

        for contact in &contacts {
            let fields = mapping.contact_to_fields(contact);
            let key = contact.email.trim().to_lowercase();

            let outcome = match record_ids.get(&key) {
                Some(record_id) => client.update_record(record_id, &fields).await.map(|_| false),
                None => client.create_record(&fields).await.map(|record| {
                    record_ids.insert(key.clone(), record.id);
                    true
                }),
            };

            match outcome {
                Ok(true) => result.created(),
                Ok(false) => result.updated(),
                Err(err) => {
                    warn!("Error syncing contact {} to Airtable: {err}", contact.email);
                    result.record_failure(format!(
                        "Failed to sync {}: {}",
                        contact.email,
                        err.message()
                    ));
                }
            }
        }

        Ok(self.with_location(result.finish()))
    }

    async fn sync_from_external(&mut self) -> Result<SyncResult, Error> {
        self.sync.ensure_initialized()?;
        let mut result = SyncResult::start(SyncDirection::FromExternal);

        let view = self.settings()?.view_name.clone();
        let mapping = self.field_mapping()?;
        let records = match self.client() {
            Ok(client) => client.list_all(&view).await,
            Err(err) => Err(err),
        };
        let records = match records {
            Ok(records) => records,
            Err(err) => {
                return Ok(self.with_location(SyncResult::failed(
                    SyncDirection::FromExternal,
                    result.started_at,
                    err.message(),
                )))
            }
        };

        for record in records {
            let mapped = mapping.fields_to_contact(&record.fields);
            let Some(email) = mapped.email.clone() else {
                result.record_failure(format!("Skipped Airtable record {}: No email", record.id));
                continue;
            };

            match self.upsert_workspace_contact(email, mapped).await {
                Ok(true) => result.created(),
                Ok(false) => result.updated(),
                Err(err) => {
                    warn!("Error importing Airtable record {}: {err}", record.id);
                    result.record_failure(format!(
                        "Failed to import Airtable record {}: {}",
                        record.id,
                        err.message()
                    ));
                }
            }
        }

        Ok(self.with_location(result.finish()))
    }

    async fn refresh_oauth_token(&mut self) -> Result<SecretString, Error> {
        Err(Error::integration(IntegrationErrorKind::Unsupported(
            "Airtable personal access tokens do not expire".to_string(),
        )))
    }
}
