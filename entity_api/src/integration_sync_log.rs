use super::error::Error;
use entity::integration_sync_logs::{ActiveModel, Model};
use log::debug;
use sea_orm::{entity::prelude::*, ActiveValue::Set, TryIntoModel};

pub async fn create(db: &impl ConnectionTrait, model: Model) -> Result<Model, Error> {
    debug!(
        "Recording {} sync for connection_id: {}",
        model.direction, model.connection_id
    );

    let active_model = ActiveModel {
        connection_id: Set(model.connection_id),
        direction: Set(model.direction),
        records_created: Set(model.records_created),
        records_updated: Set(model.records_updated),
        records_failed: Set(model.records_failed),
        errors: Set(model.errors),
        duration_ms: Set(model.duration_ms),
        started_at: Set(model.started_at),
        completed_at: Set(model.completed_at),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use entity::sync_direction::SyncDirection;
    use entity::Id;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    #[tokio::test]
    async fn create_returns_the_inserted_log() -> Result<(), Error> {
        let now = chrono::Utc::now();
        let model = Model {
            id: Id::new_v4(),
            connection_id: Id::new_v4(),
            direction: SyncDirection::ToExternal,
            records_created: 3,
            records_updated: 1,
            records_failed: 1,
            errors: json!(["Failed to sync a@b.com: 422"]),
            duration_ms: 812,
            started_at: now.into(),
            completed_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let result = create(&db, model.clone()).await?;

        assert_eq!(result.records_created, 3);
        assert_eq!(result.direction, SyncDirection::ToExternal);
        Ok(())
    }
}
