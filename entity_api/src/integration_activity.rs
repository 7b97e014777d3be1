use super::error::Error;
use entity::integration_activity_log::{ActiveModel, Model};
use sea_orm::{entity::prelude::*, ActiveValue::Set, TryIntoModel};

pub async fn create(db: &impl ConnectionTrait, model: Model) -> Result<Model, Error> {
    let active_model = ActiveModel {
        workspace_id: Set(model.workspace_id),
        connection_id: Set(model.connection_id),
        integration_type: Set(model.integration_type),
        action: Set(model.action),
        success: Set(model.success),
        records_affected: Set(model.records_affected),
        error_message: Set(model.error_message),
        metadata: Set(model.metadata),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}
