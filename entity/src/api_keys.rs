//! SeaORM Entity for the api_keys table.
//! Only the SHA-256 digest of a key is stored; the plaintext token is shown once at creation.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::api_keys::Model)]
#[sea_orm(schema_name = "core_db", table_name = "api_keys")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = Uuid)]
    pub id: Id,
    #[schema(value_type = Uuid)]
    pub workspace_id: Id,
    #[schema(value_type = Option<Uuid>)]
    pub user_id: Option<Id>,
    pub name: String,
    #[serde(skip_serializing)]
    #[sea_orm(unique)]
    pub key_hash: String,
    /// Leading characters of the token, safe to display (e.g. `tap_live_Xk3v`)
    pub key_prefix: String,
    pub environment: String,
    /// JSON array of scope strings. NULL is treated as no scopes.
    #[schema(value_type = Option<Vec<String>>)]
    pub scopes: Option<Json>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_used_at: Option<DateTimeWithTimeZone>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub expires_at: Option<DateTimeWithTimeZone>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub revoked_at: Option<DateTimeWithTimeZone>,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
