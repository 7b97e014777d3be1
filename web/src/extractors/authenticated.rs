use crate::{AppState, Error};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_login::AuthSession;
use domain::auth::{resolve, AuthContext, ResolveOptions};
use domain::error::{DomainErrorKind, Error as DomainError, InternalErrorKind};
use domain::user::Backend;
use log::*;
use tower_sessions::Session;

/// The resolved caller: a valid API key or a logged-in session user.
pub(crate) struct Authenticated(pub AuthContext);

/// Like [`Authenticated`], but resolves to [`AuthContext::Anonymous`] when the request
/// carries neither a bearer token nor a session. An invalid bearer token is still rejected.
pub(crate) struct MaybeAuthenticated(pub AuthContext);

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let context = resolve_context(parts, state, ResolveOptions::default()).await?;
        Ok(Authenticated(context))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthenticated {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let options = ResolveOptions {
            allow_anonymous: true,
        };
        let context = resolve_context(parts, state, options).await?;
        Ok(MaybeAuthenticated(context))
    }
}

async fn resolve_context(
    parts: &mut Parts,
    state: &AppState,
    options: ResolveOptions,
) -> Result<AuthContext, Error> {
    // A header that is not valid UTF-8 is passed through as empty so it fails as a bad key
    let authorization = parts
        .headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default().to_string());

    let session_user = if authorization.is_none() {
        session_user(parts, state).await?
    } else {
        None
    };

    let context = resolve(
        state.db_conn_ref(),
        authorization.as_deref(),
        session_user,
        options,
    )
    .await?;
    trace!("Resolved {} caller", context.auth_type());
    Ok(context)
}

async fn session_user(
    parts: &mut Parts,
    state: &AppState,
) -> Result<Option<domain::users::Model>, Error> {
    let auth_session: AuthSession<Backend> = AuthSession::from_request_parts(parts, state)
        .await
        .map_err(|(status, msg)| {
            error!("Session layer unavailable ({status}): {msg}");
            Error::from(DomainError {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Session layer unavailable".to_string(),
                )),
            })
        })?;

    // Touch the session to update the activity timestamp for session renewal
    if auth_session.user.is_some() {
        if let Ok(tower_session) = Session::from_request_parts(parts, state).await {
            if let Err(e) = tower_session.save().await {
                warn!("Failed to touch session for activity renewal: {e:?}");
            }
        }
    }

    Ok(auth_session.user)
}
