//! Parameters for workspace integration endpoints.

use domain::sync_direction::SyncDirection;
use domain::Id;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Partial update of a connection. Omitted fields are left as they are;
/// `credentials` is merged key by key into what is stored.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateParams {
    #[schema(value_type = Option<Object>)]
    pub credentials: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub settings: Option<Value>,
    pub sync_frequency_minutes: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SyncParams {
    /// Defaults to `from_external`
    pub direction: Option<SyncDirection>,
    /// Gmail only: pitches to send when pushing
    #[serde(default)]
    #[schema(value_type = Vec<Uuid>)]
    pub pitch_ids: Vec<Id>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateResponse {
    pub valid: bool,
}
