//! Google OAuth provider implementation.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, OAuthErrorKind};
use crate::oauth::token::{RefreshResult, Tokens};
use crate::oauth::Provider as _;

/// Google's OAuth 2.0 token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth token response from Google
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    #[serde(default)]
    scope: String,
}

/// Request to refresh access token
#[derive(Serialize)]
struct TokenRefreshRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    grant_type: &'static str,
}

/// Google OAuth provider.
///
/// Google does not rotate refresh tokens, but a refresh response may still carry one;
/// when it does it is passed through.
pub struct Provider {
    client_id: String,
    client_secret: SecretString,
    token_url: String,
    http_client: reqwest::Client,
}

impl Provider {
    /// Create a new Google OAuth provider.
    ///
    /// # Arguments
    ///
    /// * `client_id` - Google OAuth client ID
    /// * `client_secret` - Google OAuth client secret
    pub fn new(client_id: String, client_secret: SecretString) -> Result<Self, Error> {
        if client_id.is_empty() || client_secret.expose_secret().is_empty() {
            return Err(Error::oauth(
                OAuthErrorKind::MissingClientCredentials,
                "Google client id and secret are required",
            ));
        }

        Ok(Self {
            client_id,
            client_secret,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            http_client: reqwest::Client::builder().build()?,
        })
    }

    /// Override the token endpoint, e.g. to point at a mock server.
    pub fn with_token_url(mut self, token_url: &str) -> Self {
        self.token_url = token_url.to_string();
        self
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn refresh_token(&self, refresh_token: &SecretString) -> Result<RefreshResult, Error> {
        let request = TokenRefreshRequest {
            client_id: &self.client_id,
            client_secret: self.client_secret.expose_secret(),
            refresh_token: refresh_token.expose_secret(),
            grant_type: "refresh_token",
        };

        debug!("Refreshing {} access token", self.name());

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach Google token endpoint: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: crate::ErrorKind::OAuth(OAuthErrorKind::Network),
                }
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google token refresh failed: {}", error_text);
            return Err(Error::oauth(
                OAuthErrorKind::TokenRefreshFailed,
                &error_text,
            ));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse Google token response: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: crate::ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
            }
        })?;

        info!("Refreshed {} access token", self.name());

        let tokens = Tokens {
            access_token: SecretString::new(body.access_token),
            refresh_token: body.refresh_token.map(SecretString::new),
            expires_at: body
                .expires_in
                .map(|seconds| Utc::now() + Duration::seconds(seconds)),
            scopes: body.scope.split_whitespace().map(str::to_string).collect(),
        };

        Ok(tokens.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::Provider as _;
    use crate::ErrorKind;
    use mockito::Matcher;

    fn provider(server: &mockito::Server) -> Provider {
        Provider::new(
            "client-id".to_string(),
            SecretString::new("client-secret".to_string()),
        )
        .unwrap()
        .with_token_url(&format!("{}/token", server.url()))
    }

    #[test]
    fn test_name() {
        let server = mockito::Server::new();
        assert_eq!(provider(&server).name(), "google");
    }

    #[test]
    fn test_new_requires_client_credentials() {
        let result = Provider::new(String::new(), SecretString::new("secret".to_string()));
        assert_eq!(
            result.err().map(|e| e.error_kind),
            Some(ErrorKind::OAuth(OAuthErrorKind::MissingClientCredentials))
        );
    }

    #[tokio::test]
    async fn test_refresh_token_posts_refresh_grant() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "1//refresh".into()),
                Matcher::UrlEncoded("client_id".into(), "client-id".into()),
                Matcher::UrlEncoded("client_secret".into(), "client-secret".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"access_token":"ya29.new","expires_in":3599,"token_type":"Bearer","scope":"https://www.googleapis.com/auth/gmail.send"}"#,
            )
            .create_async()
            .await;

        let result = provider(&server)
            .refresh_token(&SecretString::new("1//refresh".to_string()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.tokens.access_token.expose_secret(), "ya29.new");
        assert!(!result.refresh_token_rotated);
        assert!(result.tokens.refresh_token.is_none());
        assert!(!result.tokens.needs_refresh(Utc::now()));
        assert_eq!(result.tokens.scopes.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_token_reports_provider_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        let err = provider(&server)
            .refresh_token(&SecretString::new("revoked".to_string()))
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::TokenRefreshFailed)
        );
        assert!(err.to_string().contains("invalid_grant"));
    }
}
