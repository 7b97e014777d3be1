//! Errors raised while parsing workspace API keys, refreshing provider tokens or
//! building provider HTTP clients.

use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    ApiKey(ApiKeyErrorKind),
    OAuth(OAuthErrorKind),
    Http(HttpErrorKind),
}

/// Rejections of an inbound `Authorization` header. Both surface as `INVALID_KEY`.
#[derive(Debug, PartialEq)]
pub enum ApiKeyErrorKind {
    /// Header or token does not match `Bearer tap_<live|test>_<base64url>`
    InvalidFormat,
    /// Environment segment is neither `live` nor `test`
    InvalidEnvironment,
}

#[derive(Debug, PartialEq)]
pub enum OAuthErrorKind {
    /// The token endpoint answered with a non-success status, e.g. `invalid_grant`
    TokenRefreshFailed,
    /// No client id or secret on the connection or in the server config
    MissingClientCredentials,
    Network,
    InvalidResponse,
}

#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
}

impl Error {
    pub(crate) fn api_key(kind: ApiKeyErrorKind, message: &str) -> Self {
        Error {
            source: Some(message.into()),
            error_kind: ErrorKind::ApiKey(kind),
        }
    }

    pub(crate) fn oauth(kind: OAuthErrorKind, message: &str) -> Self {
        Error {
            source: Some(message.into()),
            error_kind: ErrorKind::OAuth(kind),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let summary = match &self.error_kind {
            ErrorKind::ApiKey(ApiKeyErrorKind::InvalidFormat) => "malformed API key",
            ErrorKind::ApiKey(ApiKeyErrorKind::InvalidEnvironment) => "unknown API key environment",
            ErrorKind::OAuth(OAuthErrorKind::TokenRefreshFailed) => "token refresh rejected",
            ErrorKind::OAuth(OAuthErrorKind::MissingClientCredentials) => {
                "OAuth client credentials missing"
            }
            ErrorKind::OAuth(OAuthErrorKind::Network) => "token endpoint unreachable",
            ErrorKind::OAuth(OAuthErrorKind::InvalidResponse) => "unreadable token response",
            ErrorKind::Http(HttpErrorKind::BuilderFailed) => "HTTP client could not be built",
            ErrorKind::Http(HttpErrorKind::RequestFailed) => "HTTP request failed",
            ErrorKind::Http(HttpErrorKind::Network) => "HTTP network error",
        };
        match &self.source {
            Some(source) => write!(f, "{summary}: {source}"),
            None => f.write_str(summary),
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

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_the_message() {
        let err = Error::oauth(OAuthErrorKind::TokenRefreshFailed, "invalid_grant");
        assert_eq!(err.to_string(), "token refresh rejected: invalid_grant");
    }

    #[test]
    fn display_without_source() {
        let err = Error {
            source: None,
            error_kind: ErrorKind::ApiKey(ApiKeyErrorKind::InvalidFormat),
        };
        assert_eq!(err.to_string(), "malformed API key");
    }
}
