//! Controller for workspace integration connections (Airtable, Gmail).
//!
//! Every handler works on the connection identified by `workspace_id` and the
//! integration name in the path. Credentials are write-only: responses carry the
//! connection status, never the stored secrets.

use crate::controller::ApiResponse;
use crate::extractors::Authenticated;
use crate::params::integration::{SyncParams, UpdateParams, ValidateResponse};
use crate::{AppState, Error};

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use domain::auth::AuthContext;
use domain::integration::{
    run_sync, AirtableAdapter, ConfigUpdate, ConnectionStatus, Credentials, DbStore,
    GmailAdapter, IntegrationAdapter, IntegrationSync, Store, SyncResult,
};
use domain::integration_name::IntegrationName;
use domain::sync_direction::SyncDirection;
use domain::Id;
use log::*;

const READ_SCOPE: &str = "integrations:read";
const WRITE_SCOPE: &str = "integrations:write";

fn authorize(
    context: &AuthContext,
    scope: &str,
    workspace_id: Id,
    name: &str,
) -> Result<IntegrationName, Error> {
    context.require_scope(scope)?;
    context.require_workspace(workspace_id)?;
    name.parse::<IntegrationName>()
        .map_err(|err| Error::invalid(&err))
}

/// GET the status of a workspace's connection
///
/// Gmail connections also report the mailbox address when Gmail accepts the stored token.
#[utoipa::path(
    get,
    path = "/workspaces/{workspace_id}/integrations/{name}",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace ID"),
        ("name" = IntegrationName, Path, description = "Integration name"),
    ),
    responses(
        (status = 200, description = "Connection status", body = ConnectionStatus),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse),
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn read(
    Authenticated(context): Authenticated,
    State(app_state): State<AppState>,
    Path((workspace_id, name)): Path<(Id, String)>,
) -> Result<impl IntoResponse, Error> {
    let name = authorize(&context, READ_SCOPE, workspace_id, &name)?;
    let store = DbStore::new(app_state.db_conn_ref());

    let status = match name {
        IntegrationName::Airtable => {
            AirtableAdapter::new(store, workspace_id, &app_state.config)
                .connection_status()
                .await?
        }
        IntegrationName::Gmail => {
            GmailAdapter::new(store, workspace_id, &app_state.config)
                .connection_status()
                .await?
        }
    };
    Ok(ApiResponse::new(status))
}

/// PUT create or update a workspace's connection
///
/// Credentials are merged into the stored ones; settings are validated for the provider.
#[utoipa::path(
    put,
    path = "/workspaces/{workspace_id}/integrations/{name}",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace ID"),
        ("name" = IntegrationName, Path, description = "Integration name"),
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Connection saved", body = ConnectionStatus),
        (status = 400, description = "Invalid settings", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse),
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn update(
    Authenticated(context): Authenticated,
    State(app_state): State<AppState>,
    Path((workspace_id, name)): Path<(Id, String)>,
    Json(params): Json<UpdateParams>,
) -> Result<impl IntoResponse, Error> {
    let name = authorize(&context, WRITE_SCOPE, workspace_id, &name)?;
    if params.sync_frequency_minutes.is_some_and(|minutes| minutes < 1) {
        return Err(Error::invalid("sync_frequency_minutes must be at least 1"));
    }

    let mut sync = IntegrationSync::new(DbStore::new(app_state.db_conn_ref()), workspace_id, name);
    sync.load_config().await?;
    sync.save_config(ConfigUpdate {
        credentials: params.credentials.map(Credentials::from_json),
        settings: params.settings,
        sync_frequency_minutes: params.sync_frequency_minutes,
        ..Default::default()
    })
    .await?;

    info!("Saved {name} connection for workspace {workspace_id}");
    Ok(ApiResponse::new(sync.connection_status()))
}

/// POST check the stored credentials with one provider round-trip
#[utoipa::path(
    post,
    path = "/workspaces/{workspace_id}/integrations/{name}/validate",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace ID"),
        ("name" = IntegrationName, Path, description = "Integration name"),
    ),
    responses(
        (status = 200, description = "Validation outcome", body = ValidateResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse),
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn validate(
    Authenticated(context): Authenticated,
    State(app_state): State<AppState>,
    Path((workspace_id, name)): Path<(Id, String)>,
) -> Result<impl IntoResponse, Error> {
    let name = authorize(&context, WRITE_SCOPE, workspace_id, &name)?;
    let store = DbStore::new(app_state.db_conn_ref());

    let valid = match name {
        IntegrationName::Airtable => {
            AirtableAdapter::new(store, workspace_id, &app_state.config)
                .validate_credentials()
                .await
        }
        IntegrationName::Gmail => {
            GmailAdapter::new(store, workspace_id, &app_state.config)
                .validate_credentials()
                .await
        }
    };
    Ok(ApiResponse::new(ValidateResponse { valid }))
}

/// POST run one sync now
///
/// Airtable pushes every workspace contact; Gmail pushes the listed `pitch_ids`.
/// A run that records per-record failures still answers 200 with `success: false`
/// inside the sync result.
#[utoipa::path(
    post,
    path = "/workspaces/{workspace_id}/integrations/{name}/sync",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace ID"),
        ("name" = IntegrationName, Path, description = "Integration name"),
    ),
    request_body = SyncParams,
    responses(
        (status = 200, description = "Sync ran", body = SyncResult),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse),
        (status = 404, description = "Integration is not configured", body = crate::error::ErrorResponse),
        (status = 409, description = "Integration is disabled", body = crate::error::ErrorResponse),
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn sync(
    Authenticated(context): Authenticated,
    State(app_state): State<AppState>,
    Path((workspace_id, name)): Path<(Id, String)>,
    params: Option<Json<SyncParams>>,
) -> Result<impl IntoResponse, Error> {
    let name = authorize(&context, WRITE_SCOPE, workspace_id, &name)?;
    let params = params.map(|Json(params)| params).unwrap_or_default();
    let direction = params.direction.unwrap_or(SyncDirection::FromExternal);
    let pushes = direction != SyncDirection::FromExternal;
    let store = DbStore::new(app_state.db_conn_ref());

    let result = match name {
        IntegrationName::Airtable => {
            let mut adapter = AirtableAdapter::new(store, workspace_id, &app_state.config);
            adapter.initialize().await?;
            let contacts = if pushes {
                adapter.sync().store().list_contacts(workspace_id).await?
            } else {
                Vec::new()
            };
            run_sync(&mut adapter, direction, contacts).await?
        }
        IntegrationName::Gmail => {
            let mut adapter = GmailAdapter::new(store, workspace_id, &app_state.config);
            adapter.initialize().await?;
            let mut pitches = Vec::new();
            if pushes {
                for pitch_id in params.pitch_ids {
                    pitches.push(adapter.sync().store().find_pitch(workspace_id, pitch_id).await?);
                }
            }
            run_sync(&mut adapter, direction, pitches).await?
        }
    };

    Ok(ApiResponse::new(result))
}

/// POST resume syncing and clear the connection's error state
#[utoipa::path(
    post,
    path = "/workspaces/{workspace_id}/integrations/{name}/enable",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace ID"),
        ("name" = IntegrationName, Path, description = "Integration name"),
    ),
    responses(
        (status = 200, description = "Connection enabled", body = ConnectionStatus),
        (status = 404, description = "Integration is not configured", body = crate::error::ErrorResponse),
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn enable(
    Authenticated(context): Authenticated,
    State(app_state): State<AppState>,
    Path((workspace_id, name)): Path<(Id, String)>,
) -> Result<impl IntoResponse, Error> {
    let name = authorize(&context, WRITE_SCOPE, workspace_id, &name)?;
    let mut sync = IntegrationSync::new(DbStore::new(app_state.db_conn_ref()), workspace_id, name);
    sync.enable().await?;
    Ok(ApiResponse::new(sync.connection_status()))
}

/// POST stop syncing; the connection and its credentials are kept
#[utoipa::path(
    post,
    path = "/workspaces/{workspace_id}/integrations/{name}/disable",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace ID"),
        ("name" = IntegrationName, Path, description = "Integration name"),
    ),
    responses(
        (status = 200, description = "Connection disabled", body = ConnectionStatus),
        (status = 404, description = "Integration is not configured", body = crate::error::ErrorResponse),
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn disable(
    Authenticated(context): Authenticated,
    State(app_state): State<AppState>,
    Path((workspace_id, name)): Path<(Id, String)>,
) -> Result<impl IntoResponse, Error> {
    let name = authorize(&context, WRITE_SCOPE, workspace_id, &name)?;
    let mut sync = IntegrationSync::new(DbStore::new(app_state.db_conn_ref()), workspace_id, name);
    sync.disable().await?;
    Ok(ApiResponse::new(sync.connection_status()))
}
