//! REST clients for the providers the integration adapters sync with.

pub mod airtable;
pub mod gmail;

use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use log::*;

pub(crate) fn user_agent() -> String {
    format!("core-db/{}", env!("CARGO_PKG_VERSION"))
}

/// Maps a send failure to a network error.
pub(crate) fn network_error(provider: &str, err: reqwest::Error) -> Error {
    warn!("{provider} request failed: {err:?}");
    Error {
        source: Some(Box::new(err)),
        error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
    }
}

/// Turns a non-success response into a provider error carrying its body.
pub(crate) async fn provider_error(provider: &str, response: reqwest::Response) -> Error {
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    warn!("{provider} API error ({status}): {error_text}");
    Error::provider(format!("{provider} returned {status}: {error_text}"))
}

/// Decodes a success body, reporting malformed JSON as an external error.
pub(crate) async fn decode<T: serde::de::DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T, Error> {
    response.json::<T>().await.map_err(|e| {
        warn!("Failed to parse {provider} response: {e:?}");
        Error {
            source: Some(Box::new(e)),
            error_kind: DomainErrorKind::External(ExternalErrorKind::Other(format!(
                "Invalid response from {provider}"
            ))),
        }
    })
}
