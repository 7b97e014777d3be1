//! SeaORM Entity for the integration_connections table.
//! One row per (workspace_id, integration_type); credentials and settings are opaque JSON
//! that the domain layer decodes into typed, per-provider structs.

use crate::integration_name::IntegrationName;
use crate::integration_status::IntegrationStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::integration_connections::Model)]
#[sea_orm(schema_name = "core_db", table_name = "integration_connections")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = Uuid)]
    pub id: Id,
    #[schema(value_type = Uuid)]
    pub workspace_id: Id,
    pub integration_type: IntegrationName,
    #[serde(skip_serializing)]
    #[schema(value_type = Object)]
    pub credentials: Json,
    #[schema(value_type = Object)]
    pub settings: Json,
    pub status: IntegrationStatus,
    pub sync_enabled: bool,
    pub error_count: i32,
    pub error_message: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_sync_at: Option<DateTimeWithTimeZone>,
    pub sync_frequency_minutes: i32,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::integration_sync_logs::Entity")]
    IntegrationSyncLogs,
}

impl Related<super::integration_sync_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IntegrationSyncLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
