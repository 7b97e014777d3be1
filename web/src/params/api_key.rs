//! Parameters and responses for workspace API key endpoints.

use chrono::{DateTime, Utc};
use domain::api_keys;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateParams {
    pub name: String,
    /// e.g. `integrations:read`, `pitches:*` or `*`
    #[serde(default)]
    pub scopes: Vec<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A newly created key. `key` is the only time the plaintext token is returned.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub api_key: api_keys::Model,
    pub key: String,
}
