use async_trait::async_trait;
use chrono::Utc;
use log::*;
use secrecy::SecretString;
use serde_json::{json, Map};

use super::result::SyncResult;
use super::store::Store;
use super::sync::IntegrationSync;
use crate::error::Error;
use crate::integration_name::IntegrationName;
use crate::integration_status::IntegrationStatus;
use crate::sync_direction::SyncDirection;

/// The contract every provider adapter fulfils.
///
/// Adapters own an [`IntegrationSync`] and expose it through `sync`/`sync_mut`;
/// the provided methods drive the shared lifecycle on top of it.
#[async_trait]
pub trait IntegrationAdapter: Send + Sync {
    /// Local record type pushed to the provider.
    type Record: Send + 'static;
    type Store: Store;

    fn integration_name(&self) -> IntegrationName;

    fn sync(&self) -> &IntegrationSync<Self::Store>;

    fn sync_mut(&mut self) -> &mut IntegrationSync<Self::Store>;

    /// One lightweight provider round-trip. Never errors; failures are logged and
    /// reported as `false`.
    async fn validate_credentials(&mut self) -> bool;

    /// Pushes local records out. Requires `initialize`.
    async fn sync_to_external(&mut self, records: Vec<Self::Record>)
        -> Result<SyncResult, Error>;

    /// Pulls provider records in. Requires `initialize`.
    async fn sync_from_external(&mut self) -> Result<SyncResult, Error>;

    /// Exchanges the stored refresh token for a new access token and persists it.
    async fn refresh_oauth_token(&mut self) -> Result<SecretString, Error>;

    /// Loads the config, refreshes a soon-to-expire token, then marks the adapter ready.
    async fn initialize(&mut self) -> Result<(), Error> {
        self.sync_mut().load_for_initialize().await?;
        self.ensure_valid_token().await?;
        self.sync_mut().mark_initialized();
        debug!(
            "Initialized {} for workspace {}",
            self.integration_name(),
            self.sync().workspace_id()
        );
        Ok(())
    }

    async fn ensure_valid_token(&mut self) -> Result<(), Error> {
        if self.sync().token_needs_refresh(Utc::now()) {
            self.refresh_oauth_token().await?;
        }
        Ok(())
    }

    async fn enable(&mut self) -> Result<(), Error> {
        self.sync_mut().enable().await
    }

    async fn disable(&mut self) -> Result<(), Error> {
        self.sync_mut().disable().await
    }

    fn status(&self) -> Option<IntegrationStatus> {
        self.sync().status()
    }
}

/// Runs one sync in `direction`, persists the run and applies the error escalation
/// policy when it did not fully succeed. Bidirectional runs pull before they push.
pub async fn run_sync<A: IntegrationAdapter>(
    adapter: &mut A,
    direction: SyncDirection,
    records: Vec<A::Record>,
) -> Result<SyncResult, Error> {
    adapter.sync().ensure_initialized()?;

    let result = match direction {
        SyncDirection::ToExternal => adapter.sync_to_external(records).await?,
        SyncDirection::FromExternal => adapter.sync_from_external().await?,
        SyncDirection::Bidirectional => {
            let pulled = adapter.sync_from_external().await?;
            let pushed = adapter.sync_to_external(records).await?;
            pulled.merge(pushed)
        }
    };

    info!(
        "{} sync ({}) for workspace {}: processed {}, created {}, updated {}, failed {}",
        adapter.integration_name(),
        result.direction,
        adapter.sync().workspace_id(),
        result.records_processed,
        result.records_created,
        result.records_updated,
        result.records_failed
    );

    let logged = adapter.sync_mut().log_sync_activity(&result).await;

    if !result.success {
        let mut context = Map::new();
        context.insert("direction".to_string(), json!(result.direction));
        context.insert("records_failed".to_string(), json!(result.records_failed));
        adapter
            .sync_mut()
            .handle_sync_error(&result.error_summary(), context)
            .await?;
    }

    logged?;
    Ok(result)
}
