//! Airtable REST client for one base and table.

use std::time::Duration;

use integration_auth::api_key::{ApiKeyAuth, ServiceProvider};
use integration_auth::http::{AuthenticatedClient, AuthenticatedClientBuilder};
use log::*;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use service::config::Config;

use super::{decode, network_error, provider_error};
use crate::error::Error;

const PROVIDER: &str = "Airtable";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AirtableRecord {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ListRecordsResponse {
    records: Vec<AirtableRecord>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Serialize)]
struct RecordFields<'a> {
    fields: &'a Map<String, Value>,
}

pub struct AirtableClient {
    http: AuthenticatedClient,
    table_path: String,
}

impl AirtableClient {
    pub fn new(
        config: &Config,
        api_key: SecretString,
        base_id: &str,
        table_name: &str,
    ) -> Result<Self, Error> {
        let http = AuthenticatedClientBuilder::new(config.airtable_base_url())
            .with_auth(Box::new(ApiKeyAuth::new(ServiceProvider::Airtable, api_key)))
            .with_timeout(Duration::from_secs(config.http_timeout_secs))
            .with_user_agent(super::user_agent())
            .build()?;

        Ok(Self {
            http,
            table_path: format!(
                "{}/{}",
                urlencoding::encode(base_id),
                urlencoding::encode(table_name)
            ),
        })
    }

    async fn list_page(
        &self,
        view: Option<&str>,
        max_records: Option<u32>,
        offset: Option<&str>,
    ) -> Result<ListRecordsResponse, Error> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(view) = view {
            query.push(("view", view.to_string()));
        }
        if let Some(max_records) = max_records {
            query.push(("maxRecords", max_records.to_string()));
        }
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        let response = self
            .http
            .get(&self.table_path)
            .query(&query)
            .send()
            .await
            .map_err(|e| network_error(PROVIDER, e))?;

        if response.status().is_success() {
            decode(PROVIDER, response).await
        } else {
            Err(provider_error(PROVIDER, response).await)
        }
    }

    /// Lists a single record; used to check the token and table are usable.
    pub async fn check_access(&self) -> Result<(), Error> {
        self.list_page(None, Some(1), None).await.map(|_| ())
    }

    /// Every record visible in `view`, following `offset` pagination.
    pub async fn list_all(&self, view: &str) -> Result<Vec<AirtableRecord>, Error> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let page = self
                .list_page(Some(view), None, offset.as_deref())
                .await?;
            records.extend(page.records);
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        debug!("Fetched {} Airtable records from {}", records.len(), self.table_path);
        Ok(records)
    }

    pub async fn create_record(&self, fields: &Map<String, Value>) -> Result<AirtableRecord, Error> {
        let response = self
            .http
            .post(&self.table_path)
            .json(&RecordFields { fields })
            .send()
            .await
            .map_err(|e| network_error(PROVIDER, e))?;

        if response.status().is_success() {
            decode(PROVIDER, response).await
        } else {
            Err(provider_error(PROVIDER, response).await)
        }
    }

    /// Partial update; columns not in `fields` are left as they are.
    pub async fn update_record(
        &self,
        record_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<AirtableRecord, Error> {
        let response = self
            .http
            .patch(&format!("{}/{}", self.table_path, urlencoding::encode(record_id)))
            .json(&RecordFields { fields })
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
