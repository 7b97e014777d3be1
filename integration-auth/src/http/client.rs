//! Authenticated HTTP client builder.
//!
//! Requests are sent once. There is no retry layer; a failed sync is re-run by its caller.

use std::time::Duration;

use reqwest::{Method, RequestBuilder};

use crate::api_key::ProviderAuth;
use crate::error::Error;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("integration-auth/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client bound to one provider's base URL and credentials.
pub struct AuthenticatedClient {
    client: reqwest::Client,
    base_url: String,
    auth: Option<Box<dyn ProviderAuth>>,
}

impl AuthenticatedClient {
    /// Start a request to `path`, relative to the base URL, with authentication applied.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let request = self.client.request(method, url);
        match &self.auth {
            Some(auth) => auth.authenticate(request),
            None => request,
        }
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.request(Method::PATCH, path)
    }
}

/// Builder for creating authenticated HTTP clients.
///
/// Provides a fluent API for constructing HTTP clients with:
/// - Authentication (API keys, bearer tokens)
/// - Timeout configuration
/// - A provider base URL, overridable to point at a mock server
pub struct AuthenticatedClientBuilder {
    config: HttpClientConfig,
    base_url: String,
    auth: Option<Box<dyn ProviderAuth>>,
}

impl AuthenticatedClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new(base_url: &str) -> Self {
        Self {
            config: HttpClientConfig::default(),
            base_url: base_url.to_string(),
            auth: None,
        }
    }

    /// Set the authentication provider.
    pub fn with_auth(mut self, auth: Box<dyn ProviderAuth>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    /// Build the configured HTTP client.
    pub fn build(self) -> Result<AuthenticatedClient, Error> {
        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .build()?;

        Ok(AuthenticatedClient {
            client,
            base_url: self.base_url,
            auth: self.auth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_key::{ApiKeyAuth, ServiceProvider};
    use secrecy::SecretString;

    #[test]
    fn test_builder_default() {
        let builder = AuthenticatedClientBuilder::new("https://api.airtable.com/v0");
        assert_eq!(builder.config.timeout, Duration::from_secs(30));
        assert!(builder.config.user_agent.starts_with("integration-auth/"));
    }

    #[test]
    fn test_builder_with_timeout() {
        let builder = AuthenticatedClientBuilder::new("http://localhost")
            .with_timeout(Duration::from_secs(60));
        assert_eq!(builder.config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_request_joins_base_url_and_path() {
        let client = AuthenticatedClientBuilder::new("https://api.airtable.com/v0/")
            .build()
            .unwrap();
        let request = client.get("/app123/Contacts").build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://api.airtable.com/v0/app123/Contacts"
        );
    }

    #[test]
    fn test_request_applies_auth() {
        let client = AuthenticatedClientBuilder::new("http://localhost")
            .with_auth(Box::new(ApiKeyAuth::new(
                ServiceProvider::Airtable,
                SecretString::new("pat123".to_string()),
            )))
            .build()
            .unwrap();
        let request = client.post("records").build().unwrap();
        assert_eq!(
            request.headers().get("Authorization").unwrap(),
            "Bearer pat123"
        );
    }
}
