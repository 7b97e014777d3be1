use chrono::{DateTime, Utc};
use entity_api::api_key;
use integration_auth::api_key::{
    generate, has_scope, is_valid_scope, parse_bearer, Environment,
};
use log::*;
use sea_orm::DatabaseConnection;
use secrecy::SecretString;
use serde_json::Value;
use service::config::Config;

use super::AuthErrorCode;
use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use crate::{api_keys, Id};

/// Identity established by a valid API key.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiKeyContext {
    pub key_id: Id,
    pub workspace_id: Id,
    pub user_id: Option<Id>,
    pub scopes: Vec<String>,
    pub environment: Environment,
}

impl ApiKeyContext {
    pub fn has_scope(&self, required: &str) -> bool {
        has_scope(&self.scopes, required)
    }
}

/// A newly stored key together with the one copy of its plaintext token.
#[derive(Debug)]
pub struct CreatedApiKey {
    pub key: api_keys::Model,
    pub token: SecretString,
}

fn stored_scopes(scopes: Option<&Value>) -> Vec<String> {
    scopes
        .and_then(Value::as_array)
        .map(|scopes| {
            scopes
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Checks an `Authorization` header value against the stored keys.
///
/// Lookup failures are reported as `INVALID_KEY`. Expiry is checked before revocation.
/// The `last_used_at` stamp is best effort.
pub async fn validate_api_key(
    db: &DatabaseConnection,
    authorization: &str,
) -> Result<ApiKeyContext, Error> {
    let token = parse_bearer(authorization).map_err(|err| {
        debug!("Rejected malformed API key: {err}");
        Error::from(err)
    })?;

    let key = match api_key::find_by_hash(db, &token.hash()).await {
        Ok(Some(key)) => key,
        Ok(None) => {
            debug!("No API key matches the presented token");
            return Err(Error::auth(AuthErrorCode::InvalidKey));
        }
        Err(err) => {
            warn!("API key lookup failed: {err:?}");
            return Err(Error::auth(AuthErrorCode::InvalidKey));
        }
    };

    if key
        .expires_at
        .is_some_and(|expires_at| expires_at.with_timezone(&Utc) < Utc::now())
    {
        return Err(Error::auth(AuthErrorCode::ExpiredKey));
    }
    if key.revoked_at.is_some() {
        return Err(Error::auth(AuthErrorCode::RevokedKey));
    }

    if let Err(err) = api_key::touch_last_used(db, key.id).await {
        warn!("Failed to update last_used_at for API key {}: {err:?}", key.id);
    }

    Ok(ApiKeyContext {
        key_id: key.id,
        workspace_id: key.workspace_id,
        user_id: key.user_id,
        scopes: stored_scopes(key.scopes.as_ref()),
        environment: token.environment(),
    })
}

/// Mints a key for the workspace. Only its digest and display prefix are stored.
pub async fn create_api_key(
    db: &DatabaseConnection,
    config: &Config,
    workspace_id: Id,
    user_id: Option<Id>,
    name: &str,
    scopes: Vec<String>,
    expires_at: Option<DateTime<Utc>>,
) -> Result<CreatedApiKey, Error> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::invalid("API key name is required"));
    }
    if let Some(scope) = scopes.iter().find(|scope| !is_valid_scope(scope)) {
        return Err(Error::invalid(&format!("Invalid scope: {scope}")));
    }
    if expires_at.is_some_and(|at| at <= Utc::now()) {
        return Err(Error::invalid("expires_at must be in the future"));
    }

    let environment: Environment =
        config
            .api_key_environment()
            .parse()
            .map_err(|err: integration_auth::error::Error| Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
            })?;
    let generated = generate(environment);

    let key = api_key::create(
        db,
        api_keys::Model {
            id: Id::new_v4(),
            workspace_id,
            user_id,
            name: name.to_string(),
            key_hash: generated.hash,
            key_prefix: generated.prefix,
            environment: environment.to_string(),
            scopes: Some(Value::from(scopes)),
            last_used_at: None,
            expires_at: expires_at.map(Into::into),
            revoked_at: None,
            created_at: Utc::now().into(),
        },
    )
    .await?;

    info!("Created API key {} for workspace {workspace_id}", key.key_prefix);
    Ok(CreatedApiKey {
        key,
        token: generated.token,
    })
}

pub async fn list_api_keys(
    db: &DatabaseConnection,
    workspace_id: Id,
) -> Result<Vec<api_keys::Model>, Error> {
    Ok(api_key::find_by_workspace(db, workspace_id).await?)
}

pub async fn revoke_api_key(
    db: &DatabaseConnection,
    workspace_id: Id,
    id: Id,
) -> Result<api_keys::Model, Error> {
    let key = api_key::revoke(db, workspace_id, id).await?;
    info!("Revoked API key {} for workspace {workspace_id}", key.key_prefix);
    Ok(key)
}
