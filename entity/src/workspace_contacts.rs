//! SeaORM Entity for the workspace_contacts table.
//! The canonical contact record, unique per (workspace_id, email). Emails are stored lower-cased.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::workspace_contacts::Model)]
#[sea_orm(schema_name = "core_db", table_name = "workspace_contacts")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = Uuid)]
    pub id: Id,
    #[schema(value_type = Uuid)]
    pub workspace_id: Id,
    pub email: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    #[schema(value_type = Vec<String>)]
    pub tags: Json,
    #[schema(value_type = Object)]
    pub metadata: Json,
    // Back-references to the per-app contact rows this contact was merged from
    #[schema(value_type = Option<Uuid>)]
    pub intel_contact_id: Option<Id>,
    #[schema(value_type = Option<Uuid>)]
    pub pitch_contact_id: Option<Id>,
    #[schema(value_type = Option<Uuid>)]
    pub tracker_contact_id: Option<Id>,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pitches::Entity")]
    Pitches,
}

impl Related<super::pitches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pitches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
