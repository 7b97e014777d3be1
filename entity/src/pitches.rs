use crate::pitch_status::PitchStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::pitches::Model)]
#[sea_orm(schema_name = "core_db", table_name = "pitches")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = Uuid)]
    pub id: Id,
    #[schema(value_type = Uuid)]
    pub workspace_id: Id,
    #[schema(value_type = Option<Uuid>)]
    pub contact_id: Option<Id>,
    pub to_email: Option<String>,
    pub subject: Option<String>,
    pub body: String,
    pub status: PitchStatus,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub sent_at: Option<DateTimeWithTimeZone>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub replied_at: Option<DateTimeWithTimeZone>,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workspace_contacts::Entity",
        from = "Column::ContactId",
        to = "super::workspace_contacts::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    WorkspaceContacts,
}

impl Related<super::workspace_contacts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkspaceContacts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
