use crate::controller::ApiResponse;
use crate::extractors::MaybeAuthenticated;
use axum::response::IntoResponse;
use domain::auth::AuthContext;
use domain::Id;
use serde::Serialize;
use utoipa::ToSchema;

/// Who the server thinks the caller is.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentIdentity {
    /// `api_key`, `session` or `anonymous`
    pub auth_type: &'static str,
    #[schema(value_type = Option<Uuid>)]
    pub workspace_id: Option<Id>,
    #[schema(value_type = Option<Uuid>)]
    pub user_id: Option<Id>,
    /// Granted scopes, for API keys only
    pub scopes: Option<Vec<String>>,
    pub email: Option<String>,
}

impl From<&AuthContext> for CurrentIdentity {
    fn from(context: &AuthContext) -> Self {
        let (scopes, email) = match context {
            AuthContext::ApiKey(key) => (Some(key.scopes.clone()), None),
            AuthContext::Session(user) => (None, Some(user.email.clone())),
            AuthContext::Anonymous => (None, None),
        };
        Self {
            auth_type: context.auth_type(),
            workspace_id: context.workspace_id(),
            user_id: context.user_id(),
            scopes,
            email,
        }
    }
}

/// GET the identity of the caller. Anonymous callers are answered, not rejected.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Resolved caller identity", body = CurrentIdentity),
        (status = 401, description = "A bearer token was sent and rejected", body = crate::error::ErrorResponse)
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn me(MaybeAuthenticated(context): MaybeAuthenticated) -> impl IntoResponse {
    ApiResponse::new(CurrentIdentity::from(&context))
}
