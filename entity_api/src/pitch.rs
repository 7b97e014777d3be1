use super::error::Error;
use chrono::{DateTime, Utc};
use entity::pitch_status::PitchStatus;
use entity::pitches::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::debug;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    TryIntoModel,
};

pub async fn find_by_workspace_and_id(
    db: &impl ConnectionTrait,
    workspace_id: Id,
    id: Id,
) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .filter(Column::WorkspaceId.eq(workspace_id))
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

pub async fn mark_sent(
    db: &impl ConnectionTrait,
    id: Id,
    sent_at: DateTime<Utc>,
) -> Result<Model, Error> {
    debug!("Marking pitch {id} as sent");

    let active_model = ActiveModel {
        id: Unchanged(id),
        status: Set(PitchStatus::Sent),
        sent_at: Set(Some(sent_at.into())),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn mark_replied(
    db: &impl ConnectionTrait,
    id: Id,
    replied_at: DateTime<Utc>,
) -> Result<Model, Error> {
    debug!("Marking pitch {id} as replied");

    let active_model = ActiveModel {
        id: Unchanged(id),
        status: Set(PitchStatus::Replied),
        replied_at: Set(Some(replied_at.into())),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}
