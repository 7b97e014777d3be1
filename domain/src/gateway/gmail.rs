//! Gmail API client acting on the authenticated mailbox (`users/me`).

use std::time::Duration;

use integration_auth::api_key::{BearerTokenAuth, ServiceProvider};
use integration_auth::http::{AuthenticatedClient, AuthenticatedClientBuilder};
use log::*;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use service::config::Config;

use super::{decode, network_error, provider_error};
use crate::error::Error;

const PROVIDER: &str = "Gmail";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub email_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    raw: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thread {
    pub id: String,
    #[serde(default)]
    pub messages: Vec<ThreadMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    #[serde(default)]
    pub payload: Option<MessagePayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagePayload {
    #[serde(default)]
    pub headers: Vec<Header>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl ThreadMessage {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload
            .as_ref()?
            .headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }
}

impl Thread {
    /// The newest message is last in Gmail's ordering.
    pub fn latest_message(&self) -> Option<&ThreadMessage> {
        self.messages.last()
    }
}

pub struct GmailClient {
    http: AuthenticatedClient,
}

impl GmailClient {
    pub fn new(config: &Config, access_token: SecretString) -> Result<Self, Error> {
        let http = AuthenticatedClientBuilder::new(config.gmail_base_url())
            .with_auth(Box::new(BearerTokenAuth::new(
                ServiceProvider::Gmail,
                access_token,
            )))
            .with_timeout(Duration::from_secs(config.http_timeout_secs))
            .with_user_agent(super::user_agent())
            .build()?;
        Ok(Self { http })
    }

    pub async fn profile(&self) -> Result<Profile, Error> {
        let response = self
            .http
            .get("users/me/profile")
            .send()
            .await
            .map_err(|e| network_error(PROVIDER, e))?;

        if response.status().is_success() {
            decode(PROVIDER, response).await
        } else {
            Err(provider_error(PROVIDER, response).await)
        }
    }

    /// Sends a complete RFC 2822 message, already base64url-encoded.
    pub async fn send_raw(&self, raw: &str) -> Result<SentMessage, Error> {
        let response = self
            .http
            .post("users/me/messages/send")
            .json(&SendRequest { raw })
            .send()
            .await
            .map_err(|e| network_error(PROVIDER, e))?;

        if response.status().is_success() {
            let sent: SentMessage = decode(PROVIDER, response).await?;
            info!("Sent Gmail message {}", sent.id);
            Ok(sent)
        } else {
            Err(provider_error(PROVIDER, response).await)
        }
    }

    /// Thread with message headers only; enough to tell who wrote last.
    pub async fn thread_metadata(&self, thread_id: &str) -> Result<Thread, Error> {
        let response = self
            .http
            .get(&format!("users/me/threads/{}", urlencoding::encode(thread_id)))
            .query(&[("format", "metadata"), ("metadataHeaders", "From")])
            .send()
            .await
            .map_err(|e| network_error(PROVIDER, e))?;

        if response.status().is_success() {
            decode(PROVIDER, response).await
        } else {
            Err(provider_error(PROVIDER, response).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client(server_url: &str) -> GmailClient {
        let config = Config::default().set_gmail_base_url(server_url);
        GmailClient::new(&config, SecretString::new("ya29.token".to_string())).unwrap()
    }

    #[tokio::test]
    async fn profile_reads_email_address() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/me/profile")
            .match_header("authorization", "Bearer ya29.token")
            .with_status(200)
            .with_body(json!({"emailAddress": "promo@label.example"}).to_string())
            .create_async()
            .await;

        let profile = client(&server.url()).profile().await.unwrap();
        assert_eq!(profile.email_address.as_deref(), Some("promo@label.example"));
    }

    #[tokio::test]
    async fn send_raw_posts_the_encoded_message() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/users/me/messages/send")
            .match_body(Matcher::Json(json!({"raw": "VG86IGE"})))
            .with_status(200)
            .with_body(json!({"id": "msg1", "threadId": "thr1"}).to_string())
            .create_async()
            .await;

        let sent = client(&server.url()).send_raw("VG86IGE").await.unwrap();
        assert_eq!(sent.id, "msg1");
        assert_eq!(sent.thread_id.as_deref(), Some("thr1"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn thread_metadata_exposes_latest_from_header() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/me/threads/thr1")
            .match_query(Matcher::UrlEncoded("format".into(), "metadata".into()))
            .with_status(200)
            .with_body(
                json!({
                    "id": "thr1",
                    "messages": [
                        {"id": "m1", "payload": {"headers": [{"name": "From", "value": "me@label.example"}]}},
                        {"id": "m2", "payload": {"headers": [{"name": "From", "value": "DJ <dj@radio.example>"}]}}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let thread = client(&server.url()).thread_metadata("thr1").await.unwrap();
        assert_eq!(thread.messages.len(), 2);
        assert_eq!(
            thread.latest_message().and_then(|m| m.header("from")),
            Some("DJ <dj@radio.example>")
        );
    }

    #[tokio::test]
    async fn unauthorized_is_a_provider_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/me/profile")
            .with_status(401)
            .with_body("Invalid Credentials")
            .create_async()
            .await;

        assert!(client(&server.url()).profile().await.is_err());
    }
}
