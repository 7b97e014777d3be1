//! Typed view of an `integration_connections` row.
//!
//! Credentials stay an opaque JSON map because each provider stores different keys,
//! but settings are decoded into a per-provider struct and validated when the row
//! is loaded or saved.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use integration_auth::oauth::token::Tokens;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, IntegrationErrorKind};
use crate::integration_connections::Model;
use crate::integration_name::IntegrationName;
use crate::integration_status::IntegrationStatus;
use crate::Id;

pub const DEFAULT_AIRTABLE_TABLE: &str = "Contacts";
pub const DEFAULT_AIRTABLE_VIEW: &str = "Grid view";
pub const DEFAULT_SYNC_FREQUENCY_MINUTES: i32 = 15;

/// Opaque provider credentials. Values are never printed by `Debug`.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(Map<String, Value>);

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anything other than a JSON object decodes to empty credentials.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Shallow merge: keys present in `other` replace ours, everything else is kept.
    pub fn merge(&mut self, other: Credentials) {
        self.0.extend(other.0);
    }

    fn string(&self, key: &str) -> Option<String> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    fn secret(&self, key: &str) -> Option<SecretString> {
        self.string(key).map(SecretString::new)
    }

    /// Airtable personal access token
    pub fn api_key(&self) -> Option<SecretString> {
        self.secret("api_key")
    }

    pub fn access_token(&self) -> Option<SecretString> {
        self.secret("access_token")
    }

    pub fn refresh_token(&self) -> Option<SecretString> {
        self.secret("refresh_token")
    }

    pub fn client_id(&self) -> Option<String> {
        self.string("client_id")
    }

    pub fn client_secret(&self) -> Option<SecretString> {
        self.secret("client_secret")
    }

    /// Stored as an RFC 3339 string; unparseable values are treated as absent.
    pub fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.string("token_expires_at")
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|at| at.with_timezone(&Utc))
    }

    /// OAuth tokens, when an access token is present.
    pub fn tokens(&self) -> Option<Tokens> {
        Some(Tokens {
            access_token: self.access_token()?,
            refresh_token: self.refresh_token(),
            expires_at: self.token_expires_at(),
            scopes: Vec::new(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("keys", &self.0.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Airtable base and table a workspace syncs its contacts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirtableSettings {
    #[serde(default)]
    pub base_id: String,
    #[serde(default = "default_table_name")]
    pub table_name: String,
    #[serde(default = "default_view_name")]
    pub view_name: String,
    /// Overrides of canonical field name -> Airtable column name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_mapping: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_table_name() -> String {
    DEFAULT_AIRTABLE_TABLE.to_string()
}

fn default_view_name() -> String {
    DEFAULT_AIRTABLE_VIEW.to_string()
}

impl Default for AirtableSettings {
    fn default() -> Self {
        Self {
            base_id: String::new(),
            table_name: default_table_name(),
            view_name: default_view_name(),
            field_mapping: BTreeMap::new(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GmailSettings {
    /// Appended below the body of every pitch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings decoded according to the connection's integration type.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderSettings {
    Airtable(AirtableSettings),
    Gmail(GmailSettings),
}

impl ProviderSettings {
    pub fn default_for(name: IntegrationName) -> Self {
        match name {
            IntegrationName::Airtable => ProviderSettings::Airtable(AirtableSettings::default()),
            IntegrationName::Gmail => ProviderSettings::Gmail(GmailSettings::default()),
        }
    }

    /// Decodes and validates settings. `null` yields the provider defaults.
    pub fn from_json(name: IntegrationName, value: Value) -> Result<Self, Error> {
        let value = match value {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        let settings = match name {
            IntegrationName::Airtable => {
                ProviderSettings::Airtable(serde_json::from_value(value).map_err(invalid)?)
            }
            IntegrationName::Gmail => {
                ProviderSettings::Gmail(serde_json::from_value(value).map_err(invalid)?)
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<Value, Error> {
        Ok(match self {
            ProviderSettings::Airtable(settings) => serde_json::to_value(settings)?,
            ProviderSettings::Gmail(settings) => serde_json::to_value(settings)?,
        })
    }

    pub fn validate(&self) -> Result<(), Error> {
        match self {
            ProviderSettings::Airtable(settings) if settings.base_id.trim().is_empty() => {
                Err(Error::integration(IntegrationErrorKind::InvalidSettings(
                    "Airtable settings require a base_id".to_string(),
                )))
            }
            ProviderSettings::Airtable(settings) if settings.table_name.trim().is_empty() => {
                Err(Error::integration(IntegrationErrorKind::InvalidSettings(
                    "Airtable settings require a table_name".to_string(),
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn airtable(&self) -> Option<&AirtableSettings> {
        match self {
            ProviderSettings::Airtable(settings) => Some(settings),
            _ => None,
        }
    }

    pub fn gmail(&self) -> Option<&GmailSettings> {
        match self {
            ProviderSettings::Gmail(settings) => Some(settings),
            _ => None,
        }
    }
}

fn invalid(err: serde_json::Error) -> Error {
    Error::integration(IntegrationErrorKind::InvalidSettings(err.to_string()))
}

/// One workspace's connection to one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationConfig {
    pub id: Id,
    pub workspace_id: Id,
    pub name: IntegrationName,
    pub credentials: Credentials,
    pub settings: ProviderSettings,
    pub status: IntegrationStatus,
    pub enabled: bool,
    pub error_count: i32,
    pub error_message: Option<String>,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub sync_frequency_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IntegrationConfig {
    /// A not-yet-persisted connection with provider default settings.
    pub fn new(workspace_id: Id, name: IntegrationName) -> Self {
        let now = Utc::now();
        Self {
            id: Id::new_v4(),
            workspace_id,
            name,
            credentials: Credentials::new(),
            settings: ProviderSettings::default_for(name),
            status: IntegrationStatus::Active,
            enabled: true,
            error_count: 0,
            error_message: None,
            last_sync_at: None,
            sync_frequency_minutes: DEFAULT_SYNC_FREQUENCY_MINUTES,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn from_model(model: Model) -> Result<Self, Error> {
        let settings = ProviderSettings::from_json(model.integration_type, model.settings)?;
        Ok(Self {
            id: model.id,
            workspace_id: model.workspace_id,
            name: model.integration_type,
            credentials: Credentials::from_json(model.credentials),
            settings,
            status: model.status,
            enabled: model.sync_enabled,
            error_count: model.error_count,
            error_message: model.error_message,
            last_sync_at: model.last_sync_at.map(|at| at.with_timezone(&Utc)),
            sync_frequency_minutes: model.sync_frequency_minutes,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }

    pub fn to_model(&self) -> Result<Model, Error> {
        Ok(Model {
            id: self.id,
            workspace_id: self.workspace_id,
            integration_type: self.name,
            credentials: self.credentials.to_json(),
            settings: self.settings.to_json()?,
            status: self.status,
            sync_enabled: self.enabled,
            error_count: self.error_count,
            error_message: self.error_message.clone(),
            last_sync_at: self.last_sync_at.map(Into::into),
            sync_frequency_minutes: self.sync_frequency_minutes,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        })
    }

    /// Applies a partial update. Credentials are shallow-merged; settings are replaced
    /// wholesale and re-validated.
    pub fn apply(&mut self, update: ConfigUpdate) -> Result<(), Error> {
        if let Some(credentials) = update.credentials {
            self.credentials.merge(credentials);
        }
        if let Some(settings) = update.settings {
            self.settings = ProviderSettings::from_json(self.name, settings)?;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
        if let Some(error_count) = update.error_count {
            self.error_count = error_count;
        }
        if let Some(error_message) = update.error_message {
            self.error_message = error_message;
        }
        if let Some(last_sync_at) = update.last_sync_at {
            self.last_sync_at = Some(last_sync_at);
        }
        if let Some(minutes) = update.sync_frequency_minutes {
            self.sync_frequency_minutes = minutes;
        }
        self.updated_at = Utc::now();
        self.settings.validate()
    }
}

/// Partial update layered onto the current config by `IntegrationSync::save_config`.
/// `None` leaves a field untouched; `error_message: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    pub credentials: Option<Credentials>,
    pub settings: Option<Value>,
    pub status: Option<IntegrationStatus>,
    pub enabled: Option<bool>,
    pub error_count: Option<i32>,
    pub error_message: Option<Option<String>>,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub sync_frequency_minutes: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serde_json::json;

    fn airtable_model(settings: Value) -> Model {
        let now = Utc::now().fixed_offset();
        Model {
            id: Id::new_v4(),
            workspace_id: Id::new_v4(),
            integration_type: IntegrationName::Airtable,
            credentials: json!({"api_key": "pat123"}),
            settings,
            status: IntegrationStatus::Active,
            sync_enabled: true,
            error_count: 0,
            error_message: None,
            last_sync_at: None,
            sync_frequency_minutes: 15,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn airtable_settings_fill_in_defaults() {
        let config = IntegrationConfig::from_model(airtable_model(json!({"base_id": "app123"})))
            .unwrap();
        let settings = config.settings.airtable().unwrap();

        assert_eq!(settings.base_id, "app123");
        assert_eq!(settings.table_name, "Contacts");
        assert_eq!(settings.view_name, "Grid view");
        assert!(settings.field_mapping.is_empty());
    }

    #[test]
    fn airtable_settings_without_base_id_are_rejected_at_load() {
        let err = IntegrationConfig::from_model(airtable_model(json!({}))).unwrap_err();
        assert!(matches!(
            err.error_kind,
            crate::error::DomainErrorKind::Integration(IntegrationErrorKind::InvalidSettings(_))
        ));
    }

    #[test]
    fn unknown_settings_keys_survive_a_round_trip() {
        let config = IntegrationConfig::from_model(airtable_model(
            json!({"base_id": "app123", "webhook_id": "ach42"}),
        ))
        .unwrap();
        let model = config.to_model().unwrap();
        assert_eq!(model.settings["webhook_id"], "ach42");
    }

    #[test]
    fn credentials_merge_is_shallow_and_preserves_unspecified_keys() {
        let mut credentials = Credentials::new()
            .with("access_token", "old")
            .with("refresh_token", "keep-me");
        credentials.merge(Credentials::new().with("access_token", "new"));

        assert_eq!(credentials.access_token().unwrap().expose_secret(), "new");
        assert_eq!(
            credentials.refresh_token().unwrap().expose_secret(),
            "keep-me"
        );
    }

    #[test]
    fn credentials_debug_hides_values() {
        let credentials = Credentials::new().with("api_key", "pat-secret");
        let printed = format!("{credentials:?}");
        assert!(printed.contains("api_key"));
        assert!(!printed.contains("pat-secret"));
    }

    #[test]
    fn token_expiry_parses_rfc3339_and_ignores_garbage() {
        let credentials = Credentials::new()
            .with("access_token", "ya29")
            .with("token_expires_at", "2030-01-01T00:00:00Z");
        let tokens = credentials.tokens().unwrap();
        assert_eq!(
            tokens.expires_at.unwrap().to_rfc3339(),
            "2030-01-01T00:00:00+00:00"
        );

        let garbage = Credentials::new().with("token_expires_at", "soon");
        assert!(garbage.token_expires_at().is_none());
        assert!(garbage.tokens().is_none());
    }

    #[test]
    fn apply_layers_partial_update_and_clears_error_message() {
        let mut config = IntegrationConfig::new(Id::new_v4(), IntegrationName::Gmail);
        config.error_message = Some("boom".to_string());
        config.error_count = 2;

        config
            .apply(ConfigUpdate {
                settings: Some(json!({"signature": "Cheers"})),
                error_message: Some(None),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(
            config.settings.gmail().unwrap().signature.as_deref(),
            Some("Cheers")
        );
        assert_eq!(config.error_message, None);
        assert_eq!(config.error_count, 2);
    }
}
