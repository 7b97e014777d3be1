//! Standard Bearer token authentication.

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

use super::{AuthMethod, ProviderAuth, ServiceProvider};

/// Standard Bearer token authentication.
///
/// Uses the standard `Authorization: Bearer <token>` header pattern. Used with OAuth
/// access tokens, which change on every refresh.
pub struct BearerTokenAuth {
    provider: ServiceProvider,
    token: SecretString,
}

impl BearerTokenAuth {
    /// Create a new Bearer token authenticator.
    pub fn new(provider: ServiceProvider, token: SecretString) -> Self {
        Self { provider, token }
    }
}

impl ProviderAuth for BearerTokenAuth {
    fn provider(&self) -> ServiceProvider {
        self.provider
    }

    fn auth_method(&self) -> AuthMethod {
        AuthMethod::BearerToken
    }

    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(self.token.expose_secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_auth_creation() {
        let token = SecretString::new("ya29.token".to_string());
        let auth = BearerTokenAuth::new(ServiceProvider::Gmail, token);

        assert_eq!(auth.provider(), ServiceProvider::Gmail);
        assert_eq!(auth.auth_method(), AuthMethod::BearerToken);
    }

    #[test]
    fn test_bearer_token_auth_sets_authorization_header() {
        let auth = BearerTokenAuth::new(
            ServiceProvider::Gmail,
            SecretString::new("ya29.token".to_string()),
        );
        let request = auth
            .authenticate(reqwest::Client::new().get("http://localhost/"))
            .build()
            .unwrap();

        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer ya29.token"
        );
    }
}
