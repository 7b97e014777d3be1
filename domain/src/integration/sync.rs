//! State and bookkeeping shared by every integration adapter.

use chrono::{DateTime, Utc};
use integration_auth::oauth::token::RefreshResult;
use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{json, Map, Value};
use utoipa::ToSchema;

use super::config::{ConfigUpdate, Credentials, IntegrationConfig};
use super::result::SyncResult;
use super::store::Store;
use crate::error::{Error, IntegrationErrorKind};
use crate::integration_activity_log;
use crate::integration_name::IntegrationName;
use crate::integration_status::IntegrationStatus;
use crate::Id;

/// Consecutive failed syncs after which a connection moves to `error`.
pub const ERROR_ESCALATION_THRESHOLD: i32 = 3;

pub const ACTION_OAUTH_REFRESH_ATTEMPT: &str = "oauth_refresh_attempt";
pub const ACTION_OAUTH_REFRESH_SUCCESS: &str = "oauth_refresh_success";
pub const ACTION_OAUTH_REFRESH_FAILURE: &str = "oauth_refresh_failure";
pub const ACTION_SYNC_ERROR: &str = "sync_error";

/// An entry for the integration activity log.
#[derive(Debug, Clone)]
pub struct Activity {
    pub action: &'static str,
    pub success: bool,
    pub records_affected: i32,
    pub error_message: Option<String>,
    pub metadata: Map<String, Value>,
}

impl Activity {
    pub fn new(action: &'static str, success: bool) -> Self {
        Self {
            action,
            success,
            records_affected: 0,
            error_message: None,
            metadata: Map::new(),
        }
    }

    pub fn with_error(mut self, message: String) -> Self {
        self.error_message = Some(message);
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Summary of a connection for status endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ConnectionStatus {
    pub integration: IntegrationName,
    pub connected: bool,
    pub status: Option<IntegrationStatus>,
    pub enabled: bool,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_sync_at: Option<DateTime<Utc>>,
    pub error_count: i32,
    pub error_message: Option<String>,
    /// Mailbox address, for Gmail connections that answered a profile request
    pub account: Option<String>,
}

/// Per-(workspace, integration) sync state: the loaded config, the ready flag and the
/// persistence helpers adapters build on.
pub struct IntegrationSync<S: Store> {
    store: S,
    workspace_id: Id,
    name: IntegrationName,
    config: Option<IntegrationConfig>,
    initialized: bool,
}

impl<S: Store> IntegrationSync<S> {
    pub fn new(store: S, workspace_id: Id, name: IntegrationName) -> Self {
        Self {
            store,
            workspace_id,
            name,
            config: None,
            initialized: false,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn workspace_id(&self) -> Id {
        self.workspace_id
    }

    pub fn name(&self) -> IntegrationName {
        self.name
    }

    pub fn config(&self) -> Option<&IntegrationConfig> {
        self.config.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Reads the connection row into memory, replacing whatever was loaded before.
    pub async fn load_config(&mut self) -> Result<Option<&IntegrationConfig>, Error> {
        self.config = match self
            .store
            .find_connection(self.workspace_id, self.name)
            .await?
        {
            Some(model) => Some(IntegrationConfig::from_model(model)?),
            None => None,
        };
        Ok(self.config.as_ref())
    }

    /// Loads the config and rejects missing or disabled connections.
    pub(crate) async fn load_for_initialize(&mut self) -> Result<(), Error> {
        self.initialized = false;
        let workspace_id = self.workspace_id;
        let name = self.name;
        match self.load_config().await? {
            None => {
                warn!("Integration '{name}' not found for workspace {workspace_id}");
                Err(Error::integration(IntegrationErrorKind::NotConfigured))
            }
            Some(config) if !config.enabled => {
                warn!("Integration '{name}' is disabled for workspace {workspace_id}");
                Err(Error::integration(IntegrationErrorKind::Disabled))
            }
            Some(_) => Ok(()),
        }
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    /// The loaded config, or `NotInitialized` before `initialize` has succeeded.
    pub fn ensure_initialized(&self) -> Result<&IntegrationConfig, Error> {
        match (&self.config, self.initialized) {
            (Some(config), true) => Ok(config),
            _ => Err(Error::integration(IntegrationErrorKind::NotInitialized)),
        }
    }

    /// The loaded config whether or not `initialize` ran.
    pub fn loaded_config(&self) -> Result<&IntegrationConfig, Error> {
        self.config
            .as_ref()
            .ok_or_else(|| Error::integration(IntegrationErrorKind::NotConfigured))
    }

    async fn load_if_needed(&mut self) -> Result<(), Error> {
        if self.config.is_none() {
            self.load_config().await?;
        }
        Ok(())
    }

    /// Layers `update` onto the in-memory config (or a fresh one) and upserts it.
    pub async fn save_config(&mut self, update: ConfigUpdate) -> Result<&IntegrationConfig, Error> {
        let mut config = match &self.config {
            Some(config) => config.clone(),
            None => IntegrationConfig::new(self.workspace_id, self.name),
        };
        config.apply(update)?;

        let saved = self.store.upsert_connection(config.to_model()?).await?;
        let config = self.config.insert(IntegrationConfig::from_model(saved)?);
        Ok(config)
    }

    /// Persists the run. A successful run also marks the connection healthy.
    ///
    /// The log row is best effort; a failed write never blocks the connection update
    /// or the error escalation that follows a failed run.
    pub async fn log_sync_activity(&mut self, result: &SyncResult) -> Result<(), Error> {
        let connection_id = self.loaded_config()?.id;
        if let Err(err) = self.store.record_sync_log(result.to_log(connection_id)).await {
            warn!("Failed to record {} sync log: {err}", self.name);
        }

        if result.success {
            self.save_config(ConfigUpdate {
                last_sync_at: Some(result.completed_at),
                status: Some(IntegrationStatus::Active),
                error_count: Some(0),
                error_message: Some(None),
                ..Default::default()
            })
            .await?;
        }
        Ok(())
    }

    /// Best effort: a failed write is logged and dropped.
    pub async fn log_activity(&self, activity: Activity) {
        info!(
            "[{}] workspace {}: {} (success: {})",
            self.name, self.workspace_id, activity.action, activity.success
        );

        let model = integration_activity_log::Model {
            id: Id::new_v4(),
            workspace_id: self.workspace_id,
            connection_id: self.config.as_ref().map(|config| config.id),
            integration_type: self.name,
            action: activity.action.to_string(),
            success: activity.success,
            records_affected: activity.records_affected,
            error_message: activity.error_message,
            metadata: Some(Value::Object(activity.metadata)),
            created_at: Utc::now().into(),
        };
        if let Err(err) = self.store.record_activity(model).await {
            warn!("Failed to record {} activity: {err}", self.name);
        }
    }

    /// Counts a failed sync and escalates the connection to `error` at the threshold.
    pub async fn handle_sync_error(
        &mut self,
        message: &str,
        context: Map<String, Value>,
    ) -> Result<(), Error> {
        error!("[{}] Sync error: {message}", self.name);

        let error_count = self.loaded_config()?.error_count + 1;
        let status = if error_count >= ERROR_ESCALATION_THRESHOLD {
            IntegrationStatus::Error
        } else {
            IntegrationStatus::Active
        };

        self.save_config(ConfigUpdate {
            status: Some(status),
            error_count: Some(error_count),
            error_message: Some(Some(message.to_string())),
            ..Default::default()
        })
        .await?;

        self.log_activity(
            Activity::new(ACTION_SYNC_ERROR, false)
                .with_error(message.to_string())
                .with_metadata(context),
        )
        .await;
        Ok(())
    }

    pub fn status(&self) -> Option<IntegrationStatus> {
        self.config.as_ref().map(|config| config.status)
    }

    /// A connection that has not been loaded counts as enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.as_ref().map_or(true, |config| config.enabled)
    }

    pub fn last_sync_at(&self) -> Option<DateTime<Utc>> {
        self.config.as_ref().and_then(|config| config.last_sync_at)
    }

    /// Resumes syncing and clears the error state.
    pub async fn enable(&mut self) -> Result<(), Error> {
        self.load_if_needed().await?;
        self.loaded_config()?;
        self.save_config(ConfigUpdate {
            enabled: Some(true),
            status: Some(IntegrationStatus::Active),
            error_count: Some(0),
            error_message: Some(None),
            ..Default::default()
        })
        .await?;
        Ok(())
    }

    /// Stops syncing. The connection row is kept.
    pub async fn disable(&mut self) -> Result<(), Error> {
        self.load_if_needed().await?;
        self.loaded_config()?;
        self.save_config(ConfigUpdate {
            enabled: Some(false),
            status: Some(IntegrationStatus::Paused),
            ..Default::default()
        })
        .await?;
        self.initialized = false;
        Ok(())
    }

    /// True when an access token is stored and expires within the refresh threshold.
    pub fn token_needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.config
            .as_ref()
            .and_then(|config| config.credentials.tokens())
            .is_some_and(|tokens| tokens.needs_refresh(now))
    }

    /// Returns the stored refresh token after logging the attempt.
    pub async fn begin_token_refresh(&self) -> Result<SecretString, Error> {
        let refresh_token = self
            .loaded_config()?
            .credentials
            .refresh_token()
            .ok_or_else(|| Error::integration(IntegrationErrorKind::MissingRefreshToken))?;

        let mut metadata = Map::new();
        metadata.insert("integration_name".to_string(), json!(self.name.to_string()));
        self.log_activity(
            Activity::new(ACTION_OAUTH_REFRESH_ATTEMPT, false).with_metadata(metadata),
        )
        .await;
        Ok(refresh_token)
    }

    /// Stores refreshed tokens, keeping the old refresh token when the provider did
    /// not rotate it, and returns the new access token.
    pub async fn complete_token_refresh(
        &mut self,
        refreshed: RefreshResult,
    ) -> Result<SecretString, Error> {
        let tokens = refreshed.tokens;
        let mut credentials =
            Credentials::new().with("access_token", tokens.access_token.expose_secret().clone());
        if let Some(refresh_token) = &tokens.refresh_token {
            credentials.set("refresh_token", refresh_token.expose_secret().clone());
        }
        let expires_at = tokens.expires_at.map(|at| at.to_rfc3339());
        if let Some(expires_at) = &expires_at {
            credentials.set("token_expires_at", expires_at.clone());
        }

        self.save_config(ConfigUpdate {
            credentials: Some(credentials),
            ..Default::default()
        })
        .await?;

        let mut metadata = Map::new();
        metadata.insert("expires_at".to_string(), json!(expires_at));
        metadata.insert(
            "refresh_token_rotated".to_string(),
            json!(refreshed.refresh_token_rotated),
        );
        self.log_activity(Activity::new(ACTION_OAUTH_REFRESH_SUCCESS, true).with_metadata(metadata))
            .await;

        Ok(tokens.access_token)
    }

    pub async fn fail_token_refresh(&self, err: &Error) {
        warn!("[{}] OAuth token refresh failed: {err}", self.name);
        self.log_activity(
            Activity::new(ACTION_OAUTH_REFRESH_FAILURE, false).with_error(err.to_string()),
        )
        .await;
    }

    /// Status summary built from the loaded config.
    pub fn connection_status(&self) -> ConnectionStatus {
        match &self.config {
            Some(config) => ConnectionStatus {
                integration: self.name,
                connected: config.enabled && config.status != IntegrationStatus::Disconnected,
                status: Some(config.status),
                enabled: config.enabled,
                last_sync_at: config.last_sync_at,
                error_count: config.error_count,
                error_message: config.error_message.clone(),
                account: None,
            },
            None => ConnectionStatus {
                integration: self.name,
                connected: false,
                status: None,
                enabled: false,
                last_sync_at: None,
                error_count: 0,
                error_message: None,
                account: None,
            },
        }
    }
}
