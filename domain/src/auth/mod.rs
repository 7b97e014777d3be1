//! Request identity: a workspace API key presented as a bearer token, or a logged-in
//! session user.

use log::*;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::Error;
use crate::{users, Id};

pub mod api_key;

pub use api_key::{
    create_api_key, list_api_keys, revoke_api_key, validate_api_key, ApiKeyContext, CreatedApiKey,
};

/// Authentication and authorization failure codes shared with API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthErrorCode {
    Unauthorized,
    InvalidKey,
    ExpiredKey,
    RevokedKey,
    Forbidden,
    InvalidScope,
    /// Part of the client contract; nothing in this workspace rate limits yet
    RateLimited,
}

impl AuthErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorCode::Unauthorized => "UNAUTHORIZED",
            AuthErrorCode::InvalidKey => "INVALID_KEY",
            AuthErrorCode::ExpiredKey => "EXPIRED_KEY",
            AuthErrorCode::RevokedKey => "REVOKED_KEY",
            AuthErrorCode::Forbidden => "FORBIDDEN",
            AuthErrorCode::InvalidScope => "INVALID_SCOPE",
            AuthErrorCode::RateLimited => "RATE_LIMITED",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthErrorCode::Unauthorized => "Authentication required",
            AuthErrorCode::InvalidKey => "Invalid API key",
            AuthErrorCode::ExpiredKey => "API key has expired",
            AuthErrorCode::RevokedKey => "API key has been revoked",
            AuthErrorCode::Forbidden => "Access to this workspace is not allowed",
            AuthErrorCode::InvalidScope => "API key is missing a required scope",
            AuthErrorCode::RateLimited => "Too many requests",
        }
    }
}

impl std::fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Resolve to [`AuthContext::Anonymous`] instead of failing when there is no session.
    /// Never applies to a bearer token that fails validation.
    pub allow_anonymous: bool,
}

/// Who is making a request.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthContext {
    ApiKey(ApiKeyContext),
    /// Session users hold every scope within their own workspace.
    Session(users::Model),
    Anonymous,
}

impl AuthContext {
    pub fn auth_type(&self) -> &'static str {
        match self {
            AuthContext::ApiKey(_) => "api_key",
            AuthContext::Session(_) => "session",
            AuthContext::Anonymous => "anonymous",
        }
    }

    pub fn workspace_id(&self) -> Option<Id> {
        match self {
            AuthContext::ApiKey(key) => Some(key.workspace_id),
            AuthContext::Session(user) => Some(user.workspace_id),
            AuthContext::Anonymous => None,
        }
    }

    pub fn user_id(&self) -> Option<Id> {
        match self {
            AuthContext::ApiKey(key) => key.user_id,
            AuthContext::Session(user) => Some(user.id),
            AuthContext::Anonymous => None,
        }
    }

    pub fn has_scope(&self, required: &str) -> bool {
        match self {
            AuthContext::ApiKey(key) => key.has_scope(required),
            AuthContext::Session(_) => true,
            AuthContext::Anonymous => false,
        }
    }

    pub fn require_scope(&self, required: &str) -> Result<(), Error> {
        match self {
            AuthContext::Anonymous => Err(Error::auth(AuthErrorCode::Unauthorized)),
            context if context.has_scope(required) => Ok(()),
            _ => {
                debug!("Request lacks scope {required}");
                Err(Error::auth(AuthErrorCode::InvalidScope))
            }
        }
    }

    pub fn require_workspace(&self, workspace_id: Id) -> Result<(), Error> {
        match self.workspace_id() {
            None => Err(Error::auth(AuthErrorCode::Unauthorized)),
            Some(id) if id == workspace_id => Ok(()),
            Some(_) => Err(Error::auth(AuthErrorCode::Forbidden)),
        }
    }
}

/// Resolves the caller. A present `Authorization` header always takes the API key path
/// and any failure there is final; otherwise the session user is used.
pub async fn resolve(
    db: &DatabaseConnection,
    authorization: Option<&str>,
    session_user: Option<users::Model>,
    options: ResolveOptions,
) -> Result<AuthContext, Error> {
    if let Some(header) = authorization {
        return Ok(AuthContext::ApiKey(validate_api_key(db, header).await?));
    }

    match session_user {
        Some(user) => Ok(AuthContext::Session(user)),
        None if options.allow_anonymous => Ok(AuthContext::Anonymous),
        None => Err(Error::auth(AuthErrorCode::Unauthorized)),
    }
}
