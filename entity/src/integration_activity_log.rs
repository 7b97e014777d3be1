use crate::integration_name::IntegrationName;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Non-sync integration events such as OAuth refreshes, sync errors and status changes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::integration_activity_log::Model)]
#[sea_orm(schema_name = "core_db", table_name = "integration_activity_log")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = Uuid)]
    pub id: Id,
    #[schema(value_type = Uuid)]
    pub workspace_id: Id,
    #[schema(value_type = Option<Uuid>)]
    pub connection_id: Option<Id>,
    pub integration_type: IntegrationName,
    pub action: String,
    pub success: bool,
    pub records_affected: i32,
    pub error_message: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Json>,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
