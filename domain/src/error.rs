//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use integration_auth::error::{
    ApiKeyErrorKind, Error as IntegrationAuthError, ErrorKind as IntegrationAuthErrorKind,
    OAuthErrorKind,
};
use std::error::Error as StdError;
use std::fmt;

use crate::auth::AuthErrorCode;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries. Ex. `domain` is dependent on `entity_api`, and `web` is dependent on `domain`.
/// but `web` should not be dependent, directly, on `entity_api`. Each layer is free to define its own
/// error kinds to whatever richeness needed at that layer. Ultimately the various `error_kind`s are used
/// by `web` to return appropriate HTTP status codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
    Integration(IntegrationErrorKind),
    Auth(AuthErrorCode),
}
/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config,
    Other(String),
}

/// Enum representing the various kinds of entity errors that can bubble up from the "Entity" layer (`entity_api` and `entity`).
/// These errors are translated from the `entity_api` layer to the `domain` layer and reduced to a subset of error kinds
/// that are relevant to the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    Unauthenticated,
    Conflict,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// The provider answered with a non-success status; carries its response text.
    Provider(String),
    Other(String),
}

/// Lifecycle and configuration failures of an integration connection.
#[derive(Debug, PartialEq)]
pub enum IntegrationErrorKind {
    /// No connection row exists for the workspace and integration
    NotConfigured,
    /// The connection exists but syncing has been disabled
    Disabled,
    /// An operation ran before `initialize`
    NotInitialized,
    /// Token refresh was needed but no refresh token is stored
    MissingRefreshToken,
    /// A credential the provider needs is absent from the stored credentials
    MissingCredentials(String),
    /// Stored settings failed validation for this provider
    InvalidSettings(String),
    /// The operation does not apply to this provider
    Unsupported(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Domain Error: {:?}: {source}", self.error_kind),
            None => write!(f, "Domain Error: {:?}", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl Error {
    pub(crate) fn integration(kind: IntegrationErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Integration(kind),
        }
    }

    pub(crate) fn auth(code: AuthErrorCode) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Auth(code),
        }
    }

    pub(crate) fn provider(message: String) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Provider(message)),
        }
    }

    /// Rejected input, reported to clients as a validation error.
    pub(crate) fn invalid(message: &str) -> Self {
        Error {
            source: Some(message.into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Invalid,
            )),
        }
    }

    /// A description without the error-kind wrapper, suitable for per-record sync errors.
    pub fn message(&self) -> String {
        match (&self.error_kind, &self.source) {
            (DomainErrorKind::External(ExternalErrorKind::Provider(message)), _) => {
                message.clone()
            }
            (DomainErrorKind::Integration(IntegrationErrorKind::InvalidSettings(message)), _)
            | (DomainErrorKind::Integration(IntegrationErrorKind::MissingCredentials(message)), _)
            | (DomainErrorKind::Integration(IntegrationErrorKind::Unsupported(message)), _) => {
                message.clone()
            }
            (_, Some(source)) => source.to_string(),
            (kind, None) => format!("{kind:?}"),
        }
    }
}

// This is where we translate errors from the `entity_api`` layer to the `domain`` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::ValidationError => EntityErrorKind::Invalid,
            EntityApiErrorKind::RecordUnauthenticated => EntityErrorKind::Unauthenticated,
            EntityApiErrorKind::RecordNotUpdated | EntityApiErrorKind::DuplicateRecord => {
                EntityErrorKind::Conflict
            }
            _ => EntityErrorKind::Other("EntityErrorKind".to_string()),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "JSON (de)serialization failed".to_string(),
            )),
        }
    }
}

impl From<IntegrationAuthError> for Error {
    fn from(err: IntegrationAuthError) -> Self {
        let error_kind = match &err.error_kind {
            IntegrationAuthErrorKind::Http(_) => {
                DomainErrorKind::External(ExternalErrorKind::Network)
            }
            IntegrationAuthErrorKind::OAuth(OAuthErrorKind::MissingClientCredentials) => {
                DomainErrorKind::Internal(InternalErrorKind::Config)
            }
            IntegrationAuthErrorKind::OAuth(OAuthErrorKind::Network) => {
                DomainErrorKind::External(ExternalErrorKind::Network)
            }
            IntegrationAuthErrorKind::OAuth(_) => {
                DomainErrorKind::External(ExternalErrorKind::Provider(err.to_string()))
            }
            IntegrationAuthErrorKind::ApiKey(ApiKeyErrorKind::InvalidFormat)
            | IntegrationAuthErrorKind::ApiKey(ApiKeyErrorKind::InvalidEnvironment) => {
                DomainErrorKind::Auth(AuthErrorCode::InvalidKey)
            }
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}
