use crate::sync_direction::SyncDirection;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::integration_sync_logs::Model)]
#[sea_orm(schema_name = "core_db", table_name = "integration_sync_logs")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = Uuid)]
    pub id: Id,
    #[schema(value_type = Uuid)]
    pub connection_id: Id,
    pub direction: SyncDirection,
    pub records_created: i32,
    pub records_updated: i32,
    pub records_failed: i32,
    #[schema(value_type = Vec<String>)]
    pub errors: Json,
    pub duration_ms: i64,
    #[schema(value_type = String, format = DateTime)]
    pub started_at: DateTimeWithTimeZone,
    #[schema(value_type = String, format = DateTime)]
    pub completed_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::integration_connections::Entity",
        from = "Column::ConnectionId",
        to = "super::integration_connections::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    IntegrationConnections,
}

impl Related<super::integration_connections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IntegrationConnections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
