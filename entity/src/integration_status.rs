use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status of an integration connection.
///
/// `Active -> Error` happens automatically once the error count reaches the
/// escalation threshold. Every other transition is an explicit operator action
/// or a successful sync.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    EnumIter,
    Deserialize,
    Default,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "integration_status")]
pub enum IntegrationStatus {
    #[sea_orm(string_value = "active")]
    #[default]
    Active,
    #[sea_orm(string_value = "paused")]
    Paused,
    #[sea_orm(string_value = "error")]
    Error,
    #[sea_orm(string_value = "disconnected")]
    Disconnected,
}

impl std::fmt::Display for IntegrationStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrationStatus::Active => write!(fmt, "active"),
            IntegrationStatus::Paused => write!(fmt, "paused"),
            IntegrationStatus::Error => write!(fmt, "error"),
            IntegrationStatus::Disconnected => write!(fmt, "disconnected"),
        }
    }
}
