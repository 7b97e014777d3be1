//! Outbound provider authentication.

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

/// Providers the integration adapters talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceProvider {
    Airtable,
    Gmail,
}

impl ServiceProvider {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceProvider::Airtable => "airtable",
            ServiceProvider::Gmail => "gmail",
        }
    }
}

/// Authentication method for HTTP requests.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthMethod {
    /// Custom header with optional prefix (e.g., "Authorization: Bearer xxx")
    ApiKeyHeader {
        header_name: String,
        prefix: Option<String>,
    },
    /// Standard Bearer token
    BearerToken,
}

/// Trait for authenticating HTTP requests with API keys or bearer tokens.
pub trait ProviderAuth: Send + Sync {
    /// Get the provider identifier.
    fn provider(&self) -> ServiceProvider;

    /// Get the authentication method used by this provider.
    fn auth_method(&self) -> AuthMethod;

    /// Apply authentication to a request builder.
    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder;
}

/// Static API key sent in a header.
///
/// Airtable personal access tokens go in `Authorization: Bearer <pat>`, which is the default.
pub struct ApiKeyAuth {
    provider: ServiceProvider,
    api_key: SecretString,
    header_name: String,
    prefix: Option<String>,
}

impl ApiKeyAuth {
    pub fn new(provider: ServiceProvider, api_key: SecretString) -> Self {
        Self {
            provider,
            api_key,
            header_name: "Authorization".to_string(),
            prefix: Some("Bearer".to_string()),
        }
    }
}

impl ProviderAuth for ApiKeyAuth {
    fn provider(&self) -> ServiceProvider {
        self.provider
    }

    fn auth_method(&self) -> AuthMethod {
        AuthMethod::ApiKeyHeader {
            header_name: self.header_name.clone(),
            prefix: self.prefix.clone(),
        }
    }

    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder {
        let auth_value = if let Some(prefix) = &self.prefix {
            format!("{} {}", prefix, self.api_key.expose_secret())
        } else {
            self.api_key.expose_secret().to_string()
        };

        request.header(&self.header_name, auth_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_provider_as_str() {
        assert_eq!(ServiceProvider::Airtable.as_str(), "airtable");
        assert_eq!(ServiceProvider::Gmail.as_str(), "gmail");
    }

    #[test]
    fn test_api_key_auth_defaults_to_bearer_header() {
        let auth = ApiKeyAuth::new(
            ServiceProvider::Airtable,
            SecretString::new("pat123".to_string()),
        );

        assert_eq!(auth.provider(), ServiceProvider::Airtable);
        assert_eq!(
            auth.auth_method(),
            AuthMethod::ApiKeyHeader {
                header_name: "Authorization".to_string(),
                prefix: Some("Bearer".to_string()),
            }
        );
    }

    #[test]
    fn test_authenticate_sets_header() {
        let auth = ApiKeyAuth::new(
            ServiceProvider::Airtable,
            SecretString::new("pat123".to_string()),
        );
        let request = auth
            .authenticate(reqwest::Client::new().get("http://localhost/"))
            .build()
            .unwrap();

        assert_eq!(
            request.headers().get("Authorization").unwrap(),
            "Bearer pat123"
        );
    }
}
