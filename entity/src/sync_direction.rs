use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "sync_direction")]
pub enum SyncDirection {
    /// Local records pushed to the provider
    #[sea_orm(string_value = "to_external")]
    ToExternal,
    /// Provider records pulled into the workspace
    #[sea_orm(string_value = "from_external")]
    FromExternal,
    #[sea_orm(string_value = "bidirectional")]
    Bidirectional,
}

impl std::fmt::Display for SyncDirection {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncDirection::ToExternal => write!(fmt, "to_external"),
            SyncDirection::FromExternal => write!(fmt, "from_external"),
            SyncDirection::Bidirectional => write!(fmt, "bidirectional"),
        }
    }
}
