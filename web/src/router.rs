use crate::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::controller::{
    api_key_controller, health_check_controller, integration_controller, pitch_controller,
    user_controller, user_session_controller,
};
use crate::params;

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Core DB API"
        ),
        paths(
            health_check_controller::health_check,
            user_session_controller::login,
            user_session_controller::delete,
            user_controller::me,
            api_key_controller::create,
            api_key_controller::index,
            api_key_controller::delete,
            integration_controller::read,
            integration_controller::update,
            integration_controller::validate,
            integration_controller::sync,
            integration_controller::enable,
            integration_controller::disable,
            pitch_controller::send,
        ),
        components(
            schemas(
                domain::api_keys::Model,
                domain::users::Model,
                domain::user::Credentials,
                domain::integration::ConnectionStatus,
                domain::integration::SyncResult,
                domain::integration::SentPitch,
                domain::integration_name::IntegrationName,
                domain::integration_status::IntegrationStatus,
                domain::sync_direction::SyncDirection,
                params::api_key::CreateParams,
                params::api_key::CreatedResponse,
                params::integration::UpdateParams,
                params::integration::SyncParams,
                params::integration::ValidateResponse,
                user_controller::CurrentIdentity,
                crate::error::ErrorResponse,
                crate::error::ErrorDetail,
                crate::error::ErrorCode,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "core_db", description = "Workspace integrations, API keys and sessions")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Cookie sessions for browser clients, bearer API keys for everything else.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "id",
                    "Session id value returned from successful login via Set-Cookie header",
                ))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(user_session_routes())
        .merge(user_routes(app_state.clone()))
        .merge(api_key_routes(app_state.clone()))
        .merge(integration_routes(app_state.clone()))
        .merge(pitch_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn user_session_routes() -> Router {
    Router::new()
        .route("/login", post(user_session_controller::login))
        .route("/logout", delete(user_session_controller::delete))
}

fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/me", get(user_controller::me))
        .with_state(app_state)
}

fn api_key_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/workspaces/:workspace_id/api_keys",
            post(api_key_controller::create).get(api_key_controller::index),
        )
        .route(
            "/workspaces/:workspace_id/api_keys/:id",
            delete(api_key_controller::delete),
        )
        .with_state(app_state)
}

fn integration_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/workspaces/:workspace_id/integrations/:name",
            get(integration_controller::read),
        )
        .route(
            "/workspaces/:workspace_id/integrations/:name",
            put(integration_controller::update),
        )
        .route(
            "/workspaces/:workspace_id/integrations/:name/validate",
            post(integration_controller::validate),
        )
        .route(
            "/workspaces/:workspace_id/integrations/:name/sync",
            post(integration_controller::sync),
        )
        .route(
            "/workspaces/:workspace_id/integrations/:name/enable",
            post(integration_controller::enable),
        )
        .route(
            "/workspaces/:workspace_id/integrations/:name/disable",
            post(integration_controller::disable),
        )
        .with_state(app_state)
}

fn pitch_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/workspaces/:workspace_id/pitches/:pitch_id/send",
            post(pitch_controller::send),
        )
        .with_state(app_state)
}
