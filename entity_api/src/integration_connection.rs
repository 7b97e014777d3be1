use super::error::{EntityApiErrorKind, Error};
use entity::integration_connections::{ActiveModel, Column, Entity, Model};
use entity::integration_name::IntegrationName;
use entity::Id;
use log::debug;
use sea_orm::{entity::prelude::*, sea_query::OnConflict, ActiveValue::Set, ConnectionTrait};

/// Finds the connection for a workspace and integration (unique pair)
pub async fn find_by_workspace_and_type(
    db: &impl ConnectionTrait,
    workspace_id: Id,
    integration_type: IntegrationName,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::WorkspaceId.eq(workspace_id))
        .filter(Column::IntegrationType.eq(integration_type))
        .one(db)
        .await?)
}

/// Inserts the connection, or overwrites the existing row for the same
/// (workspace_id, integration_type) pair. `id` and `created_at` of an existing
/// row are never replaced.
pub async fn upsert(db: &impl ConnectionTrait, model: Model) -> Result<Model, Error> {
    debug!(
        "Upserting integration connection for workspace_id: {}, integration: {}",
        model.workspace_id, model.integration_type
    );

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(model.id),
        workspace_id: Set(model.workspace_id),
        integration_type: Set(model.integration_type),
        credentials: Set(model.credentials),
        settings: Set(model.settings),
        status: Set(model.status),
        sync_enabled: Set(model.sync_enabled),
        error_count: Set(model.error_count),
        error_message: Set(model.error_message),
        last_sync_at: Set(model.last_sync_at),
        sync_frequency_minutes: Set(model.sync_frequency_minutes),
        created_at: Set(model.created_at),
        updated_at: Set(now.into()),
    };

    let on_conflict = OnConflict::columns([Column::WorkspaceId, Column::IntegrationType])
        .update_columns([
            Column::Credentials,
            Column::Settings,
            Column::Status,
            Column::SyncEnabled,
            Column::ErrorCount,
            Column::ErrorMessage,
            Column::LastSyncAt,
            Column::SyncFrequencyMinutes,
            Column::UpdatedAt,
        ])
        .to_owned();

    Entity::insert(active_model)
        .on_conflict(on_conflict)
        .exec_with_returning(db)
        .await
        .map_err(|err| match err {
            DbErr::RecordNotInserted => Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::RecordNotUpdated,
            },
            other => other.into(),
        })
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use entity::integration_status::IntegrationStatus;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    fn test_model() -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            workspace_id: Id::new_v4(),
            integration_type: IntegrationName::Airtable,
            credentials: json!({"api_key": "pat123"}),
            settings: json!({"base_id": "app123"}),
            status: IntegrationStatus::Active,
            sync_enabled: true,
            error_count: 0,
            error_message: None,
            last_sync_at: None,
            sync_frequency_minutes: 15,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_by_workspace_and_type_returns_none_when_not_found() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let result =
            find_by_workspace_and_type(&db, Id::new_v4(), IntegrationName::Gmail).await?;
        assert!(result.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn find_by_workspace_and_type_returns_model_when_found() -> Result<(), Error> {
        let model = test_model();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let result =
            find_by_workspace_and_type(&db, model.workspace_id, IntegrationName::Airtable).await?;
        assert_eq!(result, Some(model));
        Ok(())
    }

    #[tokio::test]
    async fn upsert_returns_the_stored_row() -> Result<(), Error> {
        let model = test_model();
        let mut stored = model.clone();
        stored.error_count = 2;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![stored.clone()]])
            .into_connection();

        let result = upsert(&db, model).await?;

        assert_eq!(result.id, stored.id);
        assert_eq!(result.error_count, 2);
        Ok(())
    }
}
