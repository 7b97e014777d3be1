use async_trait::async_trait;
use secrecy::SecretString;

use super::token::RefreshResult;
use crate::error::Error;

/// An OAuth 2.0 authorization server that can mint new access tokens.
///
/// Consent and code exchange happen before a connection is saved, so stored
/// credentials already carry a refresh token and only the refresh grant runs here.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Name used in log lines, e.g. `"google"`.
    fn name(&self) -> &'static str;

    /// Exchanges `refresh_token` for a fresh access token.
    ///
    /// The result reports whether the server also issued a replacement refresh token;
    /// callers keep the old one when it did not.
    async fn refresh_token(&self, refresh_token: &SecretString) -> Result<RefreshResult, Error>;
}
