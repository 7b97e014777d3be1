use super::error::Error;
use chrono::{DateTime, Utc};
use entity::gmail_tracked_emails::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::debug;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    QueryOrder, TryIntoModel,
};

pub async fn create(db: &impl ConnectionTrait, model: Model) -> Result<Model, Error> {
    debug!(
        "Tracking Gmail message {} (thread {}) to {}",
        model.gmail_message_id, model.gmail_thread_id, model.to_email
    );

    let active_model = ActiveModel {
        workspace_id: Set(model.workspace_id),
        connection_id: Set(model.connection_id),
        pitch_id: Set(model.pitch_id),
        contact_id: Set(model.contact_id),
        gmail_message_id: Set(model.gmail_message_id),
        gmail_thread_id: Set(model.gmail_thread_id),
        to_email: Set(model.to_email),
        subject: Set(model.subject),
        sent_at: Set(model.sent_at),
        replied_at: Set(None),
        bounced: Set(false),
        last_checked_at: Set(None),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

/// Tracked emails in a workspace that have neither a reply nor a bounce recorded.
/// Unbounded: every in-flight email is returned on each poll.
pub async fn find_awaiting_reply(
    db: &impl ConnectionTrait,
    workspace_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::WorkspaceId.eq(workspace_id))
        .filter(Column::RepliedAt.is_null())
        .filter(Column::Bounced.eq(false))
        .order_by_asc(Column::SentAt)
        .all(db)
        .await?)
}

pub async fn mark_replied(
    db: &impl ConnectionTrait,
    id: Id,
    replied_at: DateTime<Utc>,
) -> Result<Model, Error> {
    let active_model = ActiveModel {
        id: Unchanged(id),
        replied_at: Set(Some(replied_at.into())),
        last_checked_at: Set(Some(replied_at.into())),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn touch_checked(
    db: &impl ConnectionTrait,
    id: Id,
    checked_at: DateTime<Utc>,
) -> Result<Model, Error> {
    let active_model = ActiveModel {
        id: Unchanged(id),
        last_checked_at: Set(Some(checked_at.into())),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_model() -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            workspace_id: Id::new_v4(),
            connection_id: None,
            pitch_id: Some(Id::new_v4()),
            contact_id: None,
            gmail_message_id: "18c1f2".to_string(),
            gmail_thread_id: "18c1f2".to_string(),
            to_email: "dj@station.fm".to_string(),
            subject: "New single".to_string(),
            sent_at: now.into(),
            replied_at: None,
            bounced: false,
            last_checked_at: None,
            created_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_awaiting_reply_returns_pending_rows() -> Result<(), Error> {
        let model = test_model();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let results = find_awaiting_reply(&db, model.workspace_id).await?;
        assert_eq!(results, vec![model]);
        Ok(())
    }

    #[tokio::test]
    async fn mark_replied_sets_replied_at() -> Result<(), Error> {
        let mut replied = test_model();
        replied.replied_at = Some(Utc::now().into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![replied.clone()]])
            .into_connection();

        let result = mark_replied(&db, replied.id, Utc::now()).await?;
        assert!(result.replied_at.is_some());
        Ok(())
    }
}
