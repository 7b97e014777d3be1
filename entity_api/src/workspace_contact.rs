use super::error::Error;
use chrono::Utc;
use entity::workspace_contacts::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::debug;
use sea_orm::{
    entity::prelude::*,
    sea_query::{Expr, Func},
    ActiveValue::{Set, Unchanged},
    QueryOrder, TryIntoModel,
};

/// All contacts in a workspace, newest first
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

/// Case-insensitive lookup of a contact by email within a workspace
pub async fn find_by_workspace_and_email(
    db: &impl ConnectionTrait,
    workspace_id: Id,
    email: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::WorkspaceId.eq(workspace_id))
        .filter(
            Expr::expr(Func::lower(Expr::col((Entity, Column::Email))))
                .eq(email.trim().to_lowercase()),
        )
        .one(db)
        .await?)
}

pub async fn create(db: &impl ConnectionTrait, model: Model) -> Result<Model, Error> {
    debug!(
        "Creating workspace contact {} in workspace_id: {}",
        model.email, model.workspace_id
    );

    let now = Utc::now();
    let active_model = ActiveModel {
        workspace_id: Set(model.workspace_id),
        email: Set(model.email.trim().to_lowercase()),
        name: Set(model.name),
        company: Set(model.company),
        job_title: Set(model.job_title),
        tags: Set(model.tags),
        metadata: Set(model.metadata),
        intel_contact_id: Set(model.intel_contact_id),
        pitch_contact_id: Set(model.pitch_contact_id),
        tracker_contact_id: Set(model.tracker_contact_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

/// Overwrites the mutable contact fields. Identity and back-references are left untouched.
pub async fn update(db: &impl ConnectionTrait, model: Model) -> Result<Model, Error> {
    debug!("Updating workspace contact: {}", model.id);

    let active_model = ActiveModel {
        id: Unchanged(model.id),
        workspace_id: Unchanged(model.workspace_id),
        email: Set(model.email.trim().to_lowercase()),
        name: Set(model.name),
        company: Set(model.company),
        job_title: Set(model.job_title),
        tags: Set(model.tags),
        metadata: Set(model.metadata),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    fn test_model(email: &str) -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            workspace_id: Id::new_v4(),
            email: email.to_string(),
            name: Some("Foo Bar".to_string()),
            company: Some("BBC Radio 6".to_string()),
            job_title: Some("Producer".to_string()),
            tags: json!(["indie"]),
            metadata: json!({}),
            intel_contact_id: None,
            pitch_contact_id: None,
            tracker_contact_id: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_by_workspace_and_email_returns_contact() -> Result<(), Error> {
        let model = test_model("foo@example.com");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let result = find_by_workspace_and_email(&db, model.workspace_id, "Foo@Example.com").await?;
        assert_eq!(result, Some(model));
        Ok(())
    }

    #[tokio::test]
    async fn create_returns_new_contact() -> Result<(), Error> {
        let model = test_model("foo@example.com");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let result = create(&db, test_model("Foo@Example.com")).await?;
        assert_eq!(result.email, "foo@example.com");
        Ok(())
    }
}
