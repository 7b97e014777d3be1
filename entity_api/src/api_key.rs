use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;
use entity::api_keys::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::debug;
use sea_orm::{
    entity::prelude::*,
    sea_query::Expr,
    ActiveValue::{Set, Unchanged},
    QueryOrder, TryIntoModel,
};

pub async fn create(db: &impl ConnectionTrait, model: Model) -> Result<Model, Error> {
    debug!(
        "Creating API key '{}' ({}) for workspace_id: {}",
        model.name, model.key_prefix, model.workspace_id
    );

    let active_model = ActiveModel {
        workspace_id: Set(model.workspace_id),
        user_id: Set(model.user_id),
        name: Set(model.name),
        key_hash: Set(model.key_hash),
        key_prefix: Set(model.key_prefix),
        environment: Set(model.environment),
        scopes: Set(model.scopes),
        expires_at: Set(model.expires_at),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

/// Exact-match lookup on the stored digest
pub async fn find_by_hash(db: &impl ConnectionTrait, key_hash: &str) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::KeyHash.eq(key_hash))
        .one(db)
        .await?)
}

pub async fn find_by_workspace(
    db: &impl ConnectionTrait,
    workspace_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::WorkspaceId.eq(workspace_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// Stamps `last_used_at` without reading the row first.
pub async fn touch_last_used(db: &impl ConnectionTrait, id: Id) -> Result<(), Error> {
    let result = Entity::update_many()
        .col_expr(Column::LastUsedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotUpdated,
        });
    }
    Ok(())
}

/// Marks a key in the given workspace as revoked. Revoking twice keeps the first timestamp.
pub async fn revoke(db: &impl ConnectionTrait, workspace_id: Id, id: Id) -> Result<Model, Error> {
    let existing = Entity::find_by_id(id)
        .filter(Column::WorkspaceId.eq(workspace_id))
        .one(db)
        .await?
        .ok_or_else(Error::not_found)?;

    if existing.revoked_at.is_some() {
        return Ok(existing);
    }

    debug!("Revoking API key: {id}");

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        revoked_at: Set(Some(Utc::now().into())),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    fn test_model() -> Model {
        Model {
            id: Id::new_v4(),
            workspace_id: Id::new_v4(),
            user_id: None,
            name: "CI".to_string(),
            key_hash: "ab".repeat(32),
            key_prefix: "tap_live_Xk3v".to_string(),
            environment: "live".to_string(),
            scopes: Some(json!(["contacts:read"])),
            last_used_at: None,
            expires_at: None,
            revoked_at: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn find_by_hash_returns_matching_key() -> Result<(), Error> {
        let model = test_model();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let result = find_by_hash(&db, &model.key_hash).await?;
        assert_eq!(result, Some(model));
        Ok(())
    }

    #[tokio::test]
    async fn touch_last_used_errors_when_no_row_matches() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let result = touch_last_used(&db, Id::new_v4()).await;
        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotUpdated
        );
    }

    #[tokio::test]
    async fn revoke_sets_revoked_at() -> Result<(), Error> {
        let model = test_model();
        let mut revoked = model.clone();
        revoked.revoked_at = Some(Utc::now().into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .append_query_results(vec![vec![revoked.clone()]])
            .into_connection();

        let result = revoke(&db, model.workspace_id, model.id).await?;
        assert!(result.revoked_at.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn revoke_returns_not_found_for_unknown_key() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let result = revoke(&db, Id::new_v4(), Id::new_v4()).await;
        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }
}
