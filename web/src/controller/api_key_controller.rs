//! Workspace API keys: mint, list and revoke.

use crate::controller::ApiResponse;
use crate::extractors::Authenticated;
use crate::params::api_key::{CreateParams, CreatedResponse};
use crate::{AppState, Error};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::auth::{create_api_key, list_api_keys, revoke_api_key};
use domain::Id;
use log::*;
use secrecy::ExposeSecret;
use serde_json::json;

/// POST create an API key for the workspace
///
/// The plaintext key is returned in this response only.
#[utoipa::path(
    post,
    path = "/workspaces/{workspace_id}/api_keys",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace ID"),
    ),
    request_body = CreateParams,
    responses(
        (status = 201, description = "Successfully created an API key", body = CreatedResponse),
        (status = 400, description = "Invalid name, scope or expiry", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse),
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn create(
    Authenticated(context): Authenticated,
    State(app_state): State<AppState>,
    Path(workspace_id): Path<Id>,
    Json(params): Json<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    context.require_scope("api_keys:write")?;
    context.require_workspace(workspace_id)?;
    debug!("Creating API key '{}' for workspace {workspace_id}", params.name);

    let created = create_api_key(
        app_state.db_conn_ref(),
        &app_state.config,
        workspace_id,
        context.user_id(),
        &params.name,
        params.scopes,
        params.expires_at,
    )
    .await?;

    let response = CreatedResponse {
        api_key: created.key,
        key: created.token.expose_secret().clone(),
    };
    Ok((StatusCode::CREATED, ApiResponse::new(response)))
}

/// GET all API keys of the workspace. Hashes are never returned.
#[utoipa::path(
    get,
    path = "/workspaces/{workspace_id}/api_keys",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace ID"),
    ),
    responses(
        (status = 200, description = "Successfully retrieved API keys", body = [domain::api_keys::Model]),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse),
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn index(
    Authenticated(context): Authenticated,
    State(app_state): State<AppState>,
    Path(workspace_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    context.require_scope("api_keys:read")?;
    context.require_workspace(workspace_id)?;

    let keys = list_api_keys(app_state.db_conn_ref(), workspace_id).await?;
    let count = keys.len();
    Ok(ApiResponse::new(keys).with_meta(json!({ "count": count })))
}

/// DELETE (revoke) an API key. Revoking an already revoked key succeeds.
#[utoipa::path(
    delete,
    path = "/workspaces/{workspace_id}/api_keys/{id}",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace ID"),
        ("id" = Uuid, Path, description = "API key ID"),
    ),
    responses(
        (status = 200, description = "Successfully revoked the API key", body = domain::api_keys::Model),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse),
        (status = 404, description = "API key not found", body = crate::error::ErrorResponse),
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn delete(
    Authenticated(context): Authenticated,
    State(app_state): State<AppState>,
    Path((workspace_id, id)): Path<(Id, Id)>,
) -> Result<impl IntoResponse, Error> {
    context.require_scope("api_keys:write")?;
    context.require_workspace(workspace_id)?;

    let key = revoke_api_key(app_state.db_conn_ref(), workspace_id, id).await?;
    Ok(ApiResponse::new(key))
}
