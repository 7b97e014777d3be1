use crate::controller::ApiResponse;
use crate::extractors::Authenticated;
use crate::{AppState, Error};

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use domain::integration::{
    DbStore, GmailAdapter, IntegrationAdapter, SendPitchParams, SentPitch, Store,
};
use domain::Id;
use log::*;

/// POST send a stored pitch through the workspace's Gmail connection
///
/// The message is tracked so reply polling can find it, and the pitch is marked sent.
#[utoipa::path(
    post,
    path = "/workspaces/{workspace_id}/pitches/{pitch_id}/send",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace ID"),
        ("pitch_id" = Uuid, Path, description = "Pitch ID"),
    ),
    responses(
        (status = 200, description = "Pitch sent", body = SentPitch),
        (status = 400, description = "Pitch has no valid recipient", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse),
        (status = 404, description = "Pitch or Gmail connection not found", body = crate::error::ErrorResponse),
        (status = 502, description = "Gmail rejected the message", body = crate::error::ErrorResponse),
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn send(
    Authenticated(context): Authenticated,
    State(app_state): State<AppState>,
    Path((workspace_id, pitch_id)): Path<(Id, Id)>,
) -> Result<impl IntoResponse, Error> {
    context.require_scope("pitches:write")?;
    context.require_workspace(workspace_id)?;

    let mut adapter = GmailAdapter::new(
        DbStore::new(app_state.db_conn_ref()),
        workspace_id,
        &app_state.config,
    );
    adapter.initialize().await?;

    let pitch = adapter.sync().store().find_pitch(workspace_id, pitch_id).await?;
    let to = pitch
        .to_email
        .filter(|to| !to.trim().is_empty())
        .ok_or_else(|| Error::invalid("Pitch has no contact email"))?;

    let sent = adapter
        .send_pitch(SendPitchParams {
            to,
            subject: pitch.subject,
            body: pitch.body,
            pitch_id: Some(pitch.id),
            contact_id: pitch.contact_id,
        })
        .await?;

    info!("Sent pitch {pitch_id} as Gmail message {}", sent.message_id);
    Ok(ApiResponse::new(sent))
}
