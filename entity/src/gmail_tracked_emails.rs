//! SeaORM Entity for the gmail_tracked_emails table.
//! A row is written for every pitch sent through Gmail and polled later for replies.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::gmail_tracked_emails::Model)]
#[sea_orm(schema_name = "core_db", table_name = "gmail_tracked_emails")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = Uuid)]
    pub id: Id,
    #[schema(value_type = Uuid)]
    pub workspace_id: Id,
    #[schema(value_type = Option<Uuid>)]
    pub connection_id: Option<Id>,
    #[schema(value_type = Option<Uuid>)]
    pub pitch_id: Option<Id>,
    #[schema(value_type = Option<Uuid>)]
    pub contact_id: Option<Id>,
    pub gmail_message_id: String,
    pub gmail_thread_id: String,
    pub to_email: String,
    pub subject: String,
    #[schema(value_type = String, format = DateTime)]
    pub sent_at: DateTimeWithTimeZone,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub replied_at: Option<DateTimeWithTimeZone>,
    pub bounced: bool,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_checked_at: Option<DateTimeWithTimeZone>,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pitches::Entity",
        from = "Column::PitchId",
        to = "super::pitches::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Pitches,
}

impl Related<super::pitches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pitches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
