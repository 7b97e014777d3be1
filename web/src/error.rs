use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use domain::auth::AuthErrorCode;
use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind,
    IntegrationErrorKind, InternalErrorKind,
};

use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl Error {
    /// Rejected request input, reported as `VALIDATION_ERROR`.
    pub(crate) fn invalid(message: &str) -> Self {
        Self(DomainError {
            source: Some(message.into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Invalid,
            )),
        })
    }
}

/// Error codes returned to API clients in the `error.code` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Unauthorized,
    InvalidKey,
    ExpiredKey,
    RevokedKey,
    Forbidden,
    InvalidScope,
    ValidationError,
    NotFound,
    Conflict,
    RateLimited,
    IntegrationError,
    InternalError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized
            | ErrorCode::InvalidKey
            | ErrorCode::ExpiredKey
            | ErrorCode::RevokedKey => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden | ErrorCode::InvalidScope => StatusCode::FORBIDDEN,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::IntegrationError => StatusCode::BAD_GATEWAY,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthErrorCode> for ErrorCode {
    fn from(code: AuthErrorCode) -> Self {
        match code {
            AuthErrorCode::Unauthorized => ErrorCode::Unauthorized,
            AuthErrorCode::InvalidKey => ErrorCode::InvalidKey,
            AuthErrorCode::ExpiredKey => ErrorCode::ExpiredKey,
            AuthErrorCode::RevokedKey => ErrorCode::RevokedKey,
            AuthErrorCode::Forbidden => ErrorCode::Forbidden,
            AuthErrorCode::InvalidScope => ErrorCode::InvalidScope,
            AuthErrorCode::RateLimited => ErrorCode::RateLimited,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Body of every failed response: `{"success": false, "error": {...}}`
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code,
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.error.details = Some(details);
        self
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.error.code.status(), Json(self)).into_response()
    }
}

impl From<&DomainError> for ErrorResponse {
    fn from(err: &DomainError) -> Self {
        match &err.error_kind {
            DomainErrorKind::Auth(code) => ErrorResponse::new((*code).into(), code.message()),
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::NotFound => {
                        ErrorResponse::new(ErrorCode::NotFound, "Resource not found")
                    }
                    EntityErrorKind::Invalid => {
                        ErrorResponse::new(ErrorCode::ValidationError, err.message())
                    }
                    EntityErrorKind::Unauthenticated => {
                        ErrorResponse::new(ErrorCode::Unauthorized, "Invalid email or password")
                    }
                    EntityErrorKind::Conflict => {
                        ErrorResponse::new(ErrorCode::Conflict, "Resource conflicts with an existing record")
                    }
                    EntityErrorKind::Other(_) => internal_error(),
                },
                InternalErrorKind::Config | InternalErrorKind::Other(_) => internal_error(),
            },
            DomainErrorKind::External(external_error_kind) => match external_error_kind {
                ExternalErrorKind::Network => ErrorResponse::new(
                    ErrorCode::IntegrationError,
                    "Integration provider could not be reached",
                ),
                ExternalErrorKind::Provider(message) => ErrorResponse::new(
                    ErrorCode::IntegrationError,
                    "Integration provider returned an error",
                )
                .with_details(json!({ "provider_message": message })),
                ExternalErrorKind::Other(_) => ErrorResponse::new(
                    ErrorCode::IntegrationError,
                    "Integration request failed",
                ),
            },
            DomainErrorKind::Integration(integration_error_kind) => match integration_error_kind {
                IntegrationErrorKind::NotConfigured => {
                    ErrorResponse::new(ErrorCode::NotFound, "Integration is not configured")
                }
                IntegrationErrorKind::Disabled => {
                    ErrorResponse::new(ErrorCode::Conflict, "Integration is disabled")
                }
                IntegrationErrorKind::InvalidSettings(message)
                | IntegrationErrorKind::Unsupported(message) => {
                    ErrorResponse::new(ErrorCode::ValidationError, message.clone())
                }
                IntegrationErrorKind::MissingCredentials(message) => {
                    ErrorResponse::new(ErrorCode::IntegrationError, message.clone())
                }
                IntegrationErrorKind::MissingRefreshToken => ErrorResponse::new(
                    ErrorCode::IntegrationError,
                    "Integration needs to be reconnected",
                ),
                IntegrationErrorKind::NotInitialized => internal_error(),
            },
        }
    }
}

fn internal_error() -> ErrorResponse {
    ErrorResponse::new(ErrorCode::InternalError, "Internal server error")
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let response = ErrorResponse::from(&self.0);
        if response.error.code.status().is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            debug!("Request rejected: {}", self.0);
        }
        response.into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain_error(error_kind: DomainErrorKind) -> DomainError {
        DomainError {
            source: None,
            error_kind,
        }
    }

    #[test]
    fn auth_codes_keep_their_status() {
        let response = ErrorResponse::from(&domain_error(DomainErrorKind::Auth(
            AuthErrorCode::ExpiredKey,
        )));
        assert_eq!(response.error.code, ErrorCode::ExpiredKey);
        assert_eq!(response.error.code.status(), StatusCode::UNAUTHORIZED);

        let response = ErrorResponse::from(&domain_error(DomainErrorKind::Auth(
            AuthErrorCode::InvalidScope,
        )));
        assert_eq!(response.error.code.status(), StatusCode::FORBIDDEN);

        let response = ErrorResponse::from(&domain_error(DomainErrorKind::Auth(
            AuthErrorCode::RateLimited,
        )));
        assert_eq!(response.error.code.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn provider_failures_are_bad_gateway_with_details() {
        let response = ErrorResponse::from(&domain_error(DomainErrorKind::External(
            ExternalErrorKind::Provider("INVALID_PERMISSIONS".to_string()),
        )));
        assert_eq!(response.error.code.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": false,
                "error": {
                    "code": "INTEGRATION_ERROR",
                    "message": "Integration provider returned an error",
                    "details": {"provider_message": "INVALID_PERMISSIONS"}
                }
            })
        );
    }

    #[test]
    fn missing_connection_is_not_found() {
        let response = ErrorResponse::from(&domain_error(DomainErrorKind::Integration(
            IntegrationErrorKind::NotConfigured,
        )));
        assert_eq!(response.error.code, ErrorCode::NotFound);
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let err = DomainError {
            source: Some("relation \"core_db.users\" does not exist".into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Other("db".to_string()),
            )),
        };
        let response = ErrorResponse::from(&err);
        assert_eq!(response.error.code, ErrorCode::InternalError);
        assert_eq!(response.error.message, "Internal server error");
        assert!(response.error.details.is_none());
    }

    #[test]
    fn validation_errors_carry_the_domain_message() {
        let err = DomainError {
            source: Some("API key name is required".into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Invalid,
            )),
        };
        let response = ErrorResponse::from(&err);
        assert_eq!(response.error.code.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.error.message, "API key name is required");
    }
}
