use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The external providers a workspace can connect to.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, EnumIter, Deserialize, Serialize, DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "integration_name")]
pub enum IntegrationName {
    #[sea_orm(string_value = "airtable")]
    Airtable,
    #[sea_orm(string_value = "gmail")]
    Gmail,
}

impl std::fmt::Display for IntegrationName {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrationName::Airtable => write!(fmt, "airtable"),
            IntegrationName::Gmail => write!(fmt, "gmail"),
        }
    }
}

impl std::str::FromStr for IntegrationName {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "airtable" => Ok(IntegrationName::Airtable),
            "gmail" => Ok(IntegrationName::Gmail),
            other => Err(format!("unknown integration: {other}")),
        }
    }
}
