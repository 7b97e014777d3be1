//! Sending pitches through a workspace's Gmail mailbox and polling their threads for replies.

use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use chrono::Utc;
use email_address::EmailAddress;
use integration_auth::oauth::providers::google;
use integration_auth::oauth::token::RefreshResult;
use integration_auth::oauth::Provider as _;
use log::*;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use service::config::Config;
use utoipa::ToSchema;

use super::adapter::IntegrationAdapter;
use super::result::SyncResult;
use super::store::Store;
use super::sync::{ConnectionStatus, IntegrationSync};
use crate::error::{Error, IntegrationErrorKind};
use crate::gateway::gmail::{GmailClient, Profile, Thread};
use crate::integration_name::IntegrationName;
use crate::sync_direction::SyncDirection;
use crate::{gmail_tracked_emails, pitches, Id};

const DEFAULT_SUBJECT: &str = "New Pitch";

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SendPitchParams {
    pub to: String,
    pub subject: Option<String>,
    pub body: String,
    #[schema(value_type = Option<Uuid>)]
    pub pitch_id: Option<Id>,
    #[schema(value_type = Option<Uuid>)]
    pub contact_id: Option<Id>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SentPitch {
    pub message_id: String,
    pub thread_id: String,
    /// Writes that failed after Gmail accepted the message. The send itself stands.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bookkeeping_errors: Vec<String>,
}

pub struct GmailAdapter<S: Store> {
    sync: IntegrationSync<S>,
    app_config: Config,
}

impl<S: Store> GmailAdapter<S> {
    pub fn new(store: S, workspace_id: Id, app_config: &Config) -> Self {
        Self {
            sync: IntegrationSync::new(store, workspace_id, IntegrationName::Gmail),
            app_config: app_config.clone(),
        }
    }

    fn client(&self) -> Result<GmailClient, Error> {
        let access_token = self
            .sync
            .loaded_config()?
            .credentials
            .access_token()
            .ok_or_else(|| {
                Error::integration(IntegrationErrorKind::MissingCredentials(
                    "No Gmail access token found in config".to_string(),
                ))
            })?;
        GmailClient::new(&self.app_config, access_token)
    }

    fn signature(&self) -> Option<String> {
        self.sync
            .config()
            .and_then(|config| config.settings.gmail())
            .and_then(|settings| settings.signature.clone())
            .filter(|signature| !signature.trim().is_empty())
    }

    async fn fetch_profile(&mut self) -> Result<Profile, Error> {
        self.ensure_valid_token().await?;
        self.client()?.profile().await
    }

    /// Sends one pitch email. With a `pitch_id` the message is tracked for replies and
    /// the pitch is marked sent.
    pub async fn send_pitch(&mut self, params: SendPitchParams) -> Result<SentPitch, Error> {
        self.sync.ensure_initialized()?;
        let to = params.to.trim().to_string();
        if !EmailAddress::is_valid(&to) {
            return Err(Error::invalid(&format!("Invalid recipient address: {to}")));
        }
        self.ensure_valid_token().await?;

        let subject = clean_subject(params.subject.as_deref());
        let raw = build_message(&to, &subject, &params.body, self.signature().as_deref());
        let sent = self.client()?.send_raw(&raw).await?;
        let thread_id = sent.thread_id.unwrap_or_else(|| sent.id.clone());
        let mut bookkeeping_errors = Vec::new();

        // Gmail has delivered the message; nothing below may turn this into a failed send.
        if let Some(pitch_id) = params.pitch_id {
            let now = Utc::now();
            if let Err(err) = self.sync.store().mark_pitch_sent(pitch_id, now).await {
                warn!("Pitch {pitch_id} was sent but could not be marked sent: {err}");
                bookkeeping_errors.push(format!(
                    "Pitch {pitch_id} was sent but not marked sent: {}",
                    err.message()
                ));
            }

            let tracked = self
                .sync
                .store()
                .track_email(gmail_tracked_emails::Model {
                    id: Id::new_v4(),
                    workspace_id: self.sync.workspace_id(),
                    connection_id: self.sync.config().map(|config| config.id),
                    pitch_id: Some(pitch_id),
                    contact_id: params.contact_id,
                    gmail_message_id: sent.id.clone(),
                    gmail_thread_id: thread_id.clone(),
                    to_email: to.clone(),
                    subject: subject.clone(),
                    sent_at: now.into(),
                    replied_at: None,
                    bounced: false,
                    last_checked_at: None,
                    created_at: now.into(),
                })
                .await;
            if let Err(err) = tracked {
                warn!("Pitch {pitch_id} was sent but its reply tracking was not saved: {err}");
                bookkeeping_errors.push(format!(
                    "Pitch {pitch_id} was sent but reply tracking was not saved: {}",
                    err.message()
                ));
            }
        }

        Ok(SentPitch {
            message_id: sent.id,
            thread_id,
            bookkeeping_errors,
        })
    }

    /// Status of the stored connection plus the mailbox address when Gmail answers.
    pub async fn connection_status(&mut self) -> Result<ConnectionStatus, Error> {
        self.sync.load_config().await?;
        let mut status = self.sync.connection_status();
        if self.sync.config().is_none() {
            return Ok(status);
        }

        match self.fetch_profile().await {
            Ok(profile) => status.account = profile.email_address,
            Err(err) => {
                warn!("Gmail profile lookup failed: {err}");
                status.connected = false;
                status.error_message = Some(err.message());
            }
        }
        Ok(status)
    }

    async fn exchange_refresh_token(
        &self,
        refresh_token: &SecretString,
    ) -> Result<RefreshResult, Error> {
        let credentials = &self.sync.loaded_config()?.credentials;
        let client_id = credentials
            .client_id()
            .or_else(|| self.app_config.google_client_id())
            .unwrap_or_default();
        let client_secret = credentials
            .client_secret()
            .or_else(|| self.app_config.google_client_secret().map(SecretString::new))
            .unwrap_or_else(|| SecretString::new(String::new()));

        let provider = google::Provider::new(client_id, client_secret)?
            .with_token_url(self.app_config.google_token_url());
        Ok(provider.refresh_token(refresh_token).await?)
    }
}

/// A reply is a later message in the thread written by the original recipient.
fn has_reply(thread: &Thread, recipient: &str) -> bool {
    if thread.messages.len() < 2 {
        return false;
    }
    let recipient = recipient.to_lowercase();
    thread
        .latest_message()
        .and_then(|message| message.header("From"))
        .is_some_and(|from| from.to_lowercase().contains(&recipient))
}

fn clean_subject(subject: Option<&str>) -> String {
    let subject: String = subject
        .unwrap_or_default()
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .collect();
    match subject.trim() {
        "" => DEFAULT_SUBJECT.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// RFC 2047 encoded-word for non-ASCII subjects.
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value))
    }
}

fn html_body(body: &str, signature: Option<&str>) -> String {
    let body = body.replace("\r\n", "\n");
    let paragraphs: Vec<String> = body
        .trim()
        .split("\n\n")
        .map(|paragraph| format!("<p>{}</p>", paragraph.replace('\n', "<br>")))
        .collect();

    let signature = signature
        .map(|signature| {
            format!(
                "<br><br><p style=\"font-size: 14px; color: #666;\">{}</p>",
                signature.replace("\r\n", "\n").replace('\n', "<br>")
            )
        })
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head>\
         <body style=\"font-family: sans-serif; line-height: 1.6; color: #333;\">{}{}</body></html>",
        paragraphs.join(""),
        signature
    )
}

/// The complete message, base64url-encoded for the Gmail send endpoint.
fn build_message(to: &str, subject: &str, body: &str, signature: Option<&str>) -> String {
    let message = [
        format!("To: {to}"),
        format!("Subject: {}", encode_header(subject)),
        "Content-Type: text/html; charset=utf-8".to_string(),
        "MIME-Version: 1.0".to_string(),
        String::new(),
        html_body(body, signature),
    ]
    .join("\r\n");

    URL_SAFE_NO_PAD.encode(message)
}

#[async_trait]
impl<S: Store> IntegrationAdapter for GmailAdapter<S> {
    type Record = pitches::Model;
    type Store = S;

    fn integration_name(&self) -> IntegrationName {
        IntegrationName::Gmail
    }

    fn sync(&self) -> &IntegrationSync<S> {
        &self.sync
    }

    fn sync_mut(&mut self) -> &mut IntegrationSync<S> {
        &mut self.sync
    }

    async fn validate_credentials(&mut self) -> bool {
        if self.sync.config().is_none() {
            if let Err(err) = self.sync.load_config().await {
                warn!("Could not load Gmail config: {err}");
                return false;
            }
        }
        if self.sync.config().is_none() {
            return false;
        }

        match self.fetch_profile().await {
            Ok(profile) => profile.email_address.is_some(),
            Err(err) => {
                warn!("Gmail credential validation failed: {err}");
                false
            }
        }
    }

    async fn sync_to_external(&mut self, pitches: Vec<pitches::Model>) -> Result<SyncResult, Error> {
        self.sync.ensure_initialized()?;
        let mut result = SyncResult::start(SyncDirection::ToExternal);
        let mut bookkeeping_errors = Vec::new();

        for pitch in pitches {
            let Some(to) = pitch.to_email.clone().filter(|to| !to.trim().is_empty()) else {
                result.record_failure(format!("Pitch {} has no contact email", pitch.id));
                continue;
            };

            let params = SendPitchParams {
                to,
                subject: pitch.subject.clone(),
                body: pitch.body.clone(),
                pitch_id: Some(pitch.id),
                contact_id: pitch.contact_id,
            };
            match self.send_pitch(params).await {
                Ok(sent) => {
                    result.created();
                    bookkeeping_errors.extend(sent.bookkeeping_errors);
                }
                Err(err) => {
                    warn!("Error sending pitch {}: {err}", pitch.id);
                    result.record_failure(format!(
                        "Failed to send pitch {}: {}",
                        pitch.id,
                        err.message()
                    ));
                }
            }
        }

        if !bookkeeping_errors.is_empty() {
            result = result.with_metadata("bookkeeping_errors", bookkeeping_errors);
        }
        Ok(result.finish())
    }

    async fn sync_from_external(&mut self) -> Result<SyncResult, Error> {
        self.sync.ensure_initialized()?;
        let mut result = SyncResult::start(SyncDirection::FromExternal);
        let started_at = result.started_at;
        let failed = |err: Error| {
            SyncResult::failed(SyncDirection::FromExternal, started_at, err.message())
        };

        let tracked = match self
            .sync
            .store()
            .tracked_emails_awaiting_reply(self.sync.workspace_id())
            .await
        {
            Ok(tracked) => tracked,
            Err(err) => return Ok(failed(err)),
        };
        if tracked.is_empty() {
            return Ok(result
                .finish()
                .with_metadata("message", "No tracked emails to check"));
        }

        if let Err(err) = self.ensure_valid_token().await {
            return Ok(failed(err));
        }
        let client = match self.client() {
            Ok(client) => client,
            Err(err) => return Ok(failed(err)),
        };

        let mut replies_found = 0;
        for email in tracked {
            let now = Utc::now();
            let checked = match client.thread_metadata(&email.gmail_thread_id).await {
                Ok(thread) if has_reply(&thread, &email.to_email) => {
                    let store = self.sync.store();
                    let marked = store.mark_tracked_email_replied(email.id, now).await;
                    match (marked, email.pitch_id) {
                        (Ok(()), Some(pitch_id)) => store
                            .mark_pitch_replied(pitch_id, now)
                            .await
                            .map(|_| true),
                        (marked, _) => marked.map(|_| true),
                    }
                }
                Ok(_) => self
                    .sync
                    .store()
                    .touch_tracked_email(email.id, now)
                    .await
                    .map(|_| false),
                Err(err) => Err(err),
            };

            match checked {
                Ok(true) => {
                    replies_found += 1;
                    result.updated();
                }
                Ok(false) => result.unchanged(),
                Err(err) => {
                    warn!("Error checking Gmail thread {}: {err}", email.gmail_thread_id);
                    result.record_failure(format!(
                        "Error checking thread {}: {}",
                        email.gmail_thread_id,
                        err.message()
                    ));
                }
            }
        }

        if replies_found > 0 {
            info!(
                "Found {replies_found} Gmail replies for workspace {}",
                self.sync.workspace_id()
            );
        }
        Ok(result.finish().with_metadata("replies_found", replies_found))
    }

    async fn refresh_oauth_token(&mut self) -> Result<SecretString, Error> {
        let refresh_token = self.sync.begin_token_refresh().await?;
        match self.exchange_refresh_token(&refresh_token).await {
            Ok(refreshed) => self.sync.complete_token_refresh(refreshed).await,
            Err(err) => {
                self.sync.fail_token_refresh(&err).await;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainErrorKind;
    use crate::integration::config::{Credentials, IntegrationConfig};
    use crate::integration::store::memory::MemoryStore;
    use crate::integration::sync::{
        ACTION_OAUTH_REFRESH_ATTEMPT, ACTION_OAUTH_REFRESH_FAILURE, ACTION_OAUTH_REFRESH_SUCCESS,
    };
    use crate::pitch_status::PitchStatus;
    use mockito::{Matcher, Server, ServerGuard};
    use secrecy::ExposeSecret;
    use serde_json::{json, Value};

    fn app_config(server: &ServerGuard) -> Config {
        Config::default()
            .set_gmail_base_url(&server.url())
            .set_google_token_url(&format!("{}/token", server.url()))
            .set_google_client_credentials("client-id", "client-secret")
    }

    fn connection(workspace_id: Id, credentials: Value) -> crate::integration_connections::Model {
        let mut config = IntegrationConfig::new(workspace_id, IntegrationName::Gmail);
        config.credentials = Credentials::from_json(credentials);
        config.to_model().unwrap()
    }

    fn fresh_credentials() -> Value {
        json!({
            "access_token": "ya29.valid",
            "refresh_token": "1//refresh",
            "token_expires_at": (Utc::now() + chrono::Duration::hours(1)).to_rfc3339()
        })
    }

    async fn adapter(server: &ServerGuard) -> (GmailAdapter<MemoryStore>, Id) {
        let workspace_id = Id::new_v4();
        let mut adapter = GmailAdapter::new(
            MemoryStore::with_connection(connection(workspace_id, fresh_credentials())),
            workspace_id,
            &app_config(server),
        );
        adapter.initialize().await.unwrap();
        (adapter, workspace_id)
    }

    fn pitch(workspace_id: Id, to_email: Option<&str>) -> pitches::Model {
        let now = Utc::now().fixed_offset();
        pitches::Model {
            id: Id::new_v4(),
            workspace_id,
            contact_id: None,
            to_email: to_email.map(str::to_string),
            subject: Some("New single".to_string()),
            body: "Hi there".to_string(),
            status: PitchStatus::Draft,
            sent_at: None,
            replied_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn tracked(workspace_id: Id, pitch_id: Id, thread_id: &str) -> gmail_tracked_emails::Model {
        let now = Utc::now().fixed_offset();
        gmail_tracked_emails::Model {
            id: Id::new_v4(),
            workspace_id,
            connection_id: None,
            pitch_id: Some(pitch_id),
            contact_id: None,
            gmail_message_id: format!("msg-{thread_id}"),
            gmail_thread_id: thread_id.to_string(),
            to_email: "dj@radio.example".to_string(),
            subject: "New single".to_string(),
            sent_at: now,
            replied_at: None,
            bounced: false,
            last_checked_at: None,
            created_at: now,
        }
    }

    fn decoded(raw: &str) -> String {
        String::from_utf8(URL_SAFE_NO_PAD.decode(raw).unwrap()).unwrap()
    }

    #[test]
    fn message_has_headers_and_html_paragraphs() {
        let message = decoded(&build_message(
            "dj@radio.example",
            "New single",
            "Hello\n\nListen here\nThanks",
            Some("Sam\nLabel"),
        ));

        assert!(message.starts_with("To: dj@radio.example\r\nSubject: New single\r\n"));
        assert!(message.contains("Content-Type: text/html; charset=utf-8\r\nMIME-Version: 1.0\r\n\r\n"));
        assert!(message.contains("<p>Hello</p><p>Listen here<br>Thanks</p>"));
        assert!(message.contains("Sam<br>Label"));
    }

    #[test]
    fn non_ascii_subject_is_encoded_and_line_breaks_are_stripped() {
        assert_eq!(clean_subject(Some("Hi\r\nBcc: x@y.z")), "HiBcc: x@y.z");
        assert_eq!(clean_subject(None), DEFAULT_SUBJECT);
        assert_eq!(clean_subject(Some("  ")), DEFAULT_SUBJECT);

        let message = decoded(&build_message("a@b.example", "Café", "x", None));
        assert!(message.contains(&format!("Subject: =?UTF-8?B?{}?=", STANDARD.encode("Café"))));
    }

    #[tokio::test]
    async fn send_pitch_tracks_the_email_and_marks_the_pitch_sent() {
        let mut server = Server::new_async().await;
        let (mut adapter, workspace_id) = adapter(&server).await;
        let pitch = pitch(workspace_id, Some("dj@radio.example"));
        adapter.sync().store().pitches.lock().unwrap().push(pitch.clone());
        let send = server
            .mock("POST", "/users/me/messages/send")
            .match_header("authorization", "Bearer ya29.valid")
            .with_status(200)
            .with_body(json!({"id": "msg1", "threadId": "thr1"}).to_string())
            .create_async()
            .await;

        let sent = adapter
            .send_pitch(SendPitchParams {
                to: "dj@radio.example".to_string(),
                subject: pitch.subject.clone(),
                body: pitch.body.clone(),
                pitch_id: Some(pitch.id),
                contact_id: None,
            })
            .await
            .unwrap();

        send.assert_async().await;
        assert_eq!(sent.message_id, "msg1");
        assert_eq!(sent.thread_id, "thr1");
        assert!(sent.bookkeeping_errors.is_empty());
        let tracked = adapter.sync().store().tracked.lock().unwrap().clone();
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].gmail_thread_id, "thr1");
        assert_eq!(tracked[0].pitch_id, Some(pitch.id));
        let stored = adapter.sync().store().pitches.lock().unwrap()[0].clone();
        assert_eq!(stored.status, PitchStatus::Sent);
        assert!(stored.sent_at.is_some());
    }

    #[tokio::test]
    async fn delivered_pitch_counts_as_created_when_marking_it_sent_fails() {
        let mut server = Server::new_async().await;
        let (mut adapter, workspace_id) = adapter(&server).await;
        // Listed for sending but missing from the pitches table, so marking it sent fails.
        let pitch = pitch(workspace_id, Some("dj@radio.example"));
        let send = server
            .mock("POST", "/users/me/messages/send")
            .with_status(200)
            .with_body(json!({"id": "msg1", "threadId": "thr1"}).to_string())
            .expect(1)
            .create_async()
            .await;

        let result = adapter.sync_to_external(vec![pitch.clone()]).await.unwrap();

        send.assert_async().await;
        assert!(result.success);
        assert_eq!(result.records_created, 1);
        assert_eq!(result.records_failed, 0);
        assert!(result.errors.is_empty());
        assert_eq!(result.metadata["bookkeeping_errors"].as_array().unwrap().len(), 1);
        let tracked = adapter.sync().store().tracked.lock().unwrap().clone();
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].pitch_id, Some(pitch.id));
    }

    #[tokio::test]
    async fn send_pitch_rejects_an_invalid_recipient() {
        let server = Server::new_async().await;
        let (mut adapter, _) = adapter(&server).await;

        let err = adapter
            .send_pitch(SendPitchParams {
                to: "not-an-email".to_string(),
                subject: None,
                body: "x".to_string(),
                pitch_id: None,
                contact_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err.error_kind, DomainErrorKind::Internal(_)));
    }

    #[tokio::test]
    async fn pitch_without_email_is_a_per_record_failure() {
        let server = Server::new_async().await;
        let (mut adapter, workspace_id) = adapter(&server).await;
        let pitch = pitch(workspace_id, None);

        let result = adapter.sync_to_external(vec![pitch.clone()]).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.records_failed, 1);
        assert_eq!(result.errors, vec![format!("Pitch {} has no contact email", pitch.id)]);
    }

    #[tokio::test]
    async fn polling_with_nothing_tracked_is_an_empty_success() {
        let server = Server::new_async().await;
        let (mut adapter, _) = adapter(&server).await;

        let result = adapter.sync_from_external().await.unwrap();
        assert!(result.success);
        assert_eq!(result.records_processed, 0);
        assert_eq!(result.metadata["message"], "No tracked emails to check");
    }

    #[tokio::test]
    async fn polling_detects_replies_from_the_recipient() {
        let mut server = Server::new_async().await;
        let (mut adapter, workspace_id) = adapter(&server).await;
        let replied_pitch = pitch(workspace_id, Some("dj@radio.example"));
        let quiet_pitch = pitch(workspace_id, Some("dj@radio.example"));
        {
            let store = adapter.sync().store();
            store.pitches.lock().unwrap().push(replied_pitch.clone());
            store.pitches.lock().unwrap().push(quiet_pitch.clone());
            store.tracked.lock().unwrap().push(tracked(workspace_id, replied_pitch.id, "thrA"));
            store.tracked.lock().unwrap().push(tracked(workspace_id, quiet_pitch.id, "thrB"));
        }
        let _replied = server
            .mock("GET", "/users/me/threads/thrA")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({"id": "thrA", "messages": [
                    {"id": "m1", "payload": {"headers": [{"name": "From", "value": "me@label.example"}]}},
                    {"id": "m2", "payload": {"headers": [{"name": "From", "value": "Sam <DJ@radio.example>"}]}}
                ]})
                .to_string(),
            )
            .create_async()
            .await;
        let _quiet = server
            .mock("GET", "/users/me/threads/thrB")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({"id": "thrB", "messages": [
                    {"id": "m3", "payload": {"headers": [{"name": "From", "value": "me@label.example"}]}}
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let result = adapter.sync_from_external().await.unwrap();

        assert!(result.success);
        assert_eq!(result.records_processed, 2);
        assert_eq!(result.records_updated, 1);
        assert_eq!(result.metadata["replies_found"], 1);

        let store = adapter.sync().store();
        let pitches = store.pitches.lock().unwrap().clone();
        assert_eq!(pitches[0].status, PitchStatus::Replied);
        assert_eq!(pitches[1].status, PitchStatus::Draft);
        let tracked = store.tracked.lock().unwrap().clone();
        assert!(tracked[0].replied_at.is_some());
        assert!(tracked[1].replied_at.is_none());
        assert!(tracked[1].last_checked_at.is_some());
    }

    #[tokio::test]
    async fn initialize_refreshes_an_expiring_token() {
        let mut server = Server::new_async().await;
        let token = server
            .mock("POST", "/token")
            .match_body(Matcher::UrlEncoded("refresh_token".into(), "1//refresh".into()))
            .with_status(200)
            .with_body(
                json!({"access_token": "ya29.fresh", "expires_in": 3599, "token_type": "Bearer"})
                    .to_string(),
            )
            .create_async()
            .await;
        let workspace_id = Id::new_v4();
        let credentials = json!({
            "access_token": "ya29.stale",
            "refresh_token": "1//refresh",
            "token_expires_at": (Utc::now() + chrono::Duration::minutes(2)).to_rfc3339()
        });
        let mut adapter = GmailAdapter::new(
            MemoryStore::with_connection(connection(workspace_id, credentials)),
            workspace_id,
            &app_config(&server),
        );

        adapter.initialize().await.unwrap();

        token.assert_async().await;
        let stored = Credentials::from_json(adapter.sync().store().connection().credentials);
        assert_eq!(stored.access_token().unwrap().expose_secret(), "ya29.fresh");
        assert_eq!(stored.refresh_token().unwrap().expose_secret(), "1//refresh");
        assert_eq!(
            adapter.sync().store().actions(),
            vec![ACTION_OAUTH_REFRESH_ATTEMPT, ACTION_OAUTH_REFRESH_SUCCESS]
        );
    }

    #[tokio::test]
    async fn failed_refresh_is_logged_and_blocks_initialize() {
        let mut server = Server::new_async().await;
        let _token = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;
        let workspace_id = Id::new_v4();
        let credentials = json!({
            "access_token": "ya29.stale",
            "refresh_token": "1//revoked",
            "token_expires_at": "2000-01-01T00:00:00Z"
        });
        let mut adapter = GmailAdapter::new(
            MemoryStore::with_connection(connection(workspace_id, credentials)),
            workspace_id,
            &app_config(&server),
        );

        assert!(adapter.initialize().await.is_err());
        assert!(!adapter.sync().is_initialized());
        assert_eq!(
            adapter.sync().store().actions(),
            vec![ACTION_OAUTH_REFRESH_ATTEMPT, ACTION_OAUTH_REFRESH_FAILURE]
        );
    }

    #[tokio::test]
    async fn connection_status_reports_the_mailbox() {
        let mut server = Server::new_async().await;
        let (mut adapter, _) = adapter(&server).await;
        let _profile = server
            .mock("GET", "/users/me/profile")
            .with_status(200)
            .with_body(json!({"emailAddress": "promo@label.example"}).to_string())
            .create_async()
            .await;

        let status = adapter.connection_status().await.unwrap();
        assert!(status.connected);
        assert_eq!(status.account.as_deref(), Some("promo@label.example"));
    }

    #[tokio::test]
    async fn connection_status_without_a_connection_is_disconnected() {
        let server = Server::new_async().await;
        let mut adapter =
            GmailAdapter::new(MemoryStore::default(), Id::new_v4(), &app_config(&server));

        let status = adapter.connection_status().await.unwrap();
        assert!(!status.connected);
        assert_eq!(status.status, None);
    }
}
