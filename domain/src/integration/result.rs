use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::integration_sync_logs;
use crate::sync_direction::SyncDirection;
use crate::Id;

/// Outcome of one sync invocation. Per-record failures are collected in `errors`
/// and never abort the batch.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SyncResult {
    pub success: bool,
    pub direction: SyncDirection,
    pub records_processed: u32,
    pub records_created: u32,
    pub records_updated: u32,
    pub records_failed: u32,
    pub errors: Vec<String>,
    #[schema(value_type = String, format = DateTime)]
    pub started_at: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
    #[schema(value_type = Object)]
    pub metadata: Map<String, Value>,
}

impl SyncResult {
    pub fn start(direction: SyncDirection) -> Self {
        let now = Utc::now();
        Self {
            success: true,
            direction,
            records_processed: 0,
            records_created: 0,
            records_updated: 0,
            records_failed: 0,
            errors: Vec::new(),
            started_at: now,
            completed_at: now,
            duration_ms: 0,
            metadata: Map::new(),
        }
    }

    /// A finished, successful run that touched nothing.
    pub fn empty(direction: SyncDirection) -> Self {
        Self::start(direction).finish()
    }

    /// A run that failed as a whole before or while fetching records.
    pub fn failed(direction: SyncDirection, started_at: DateTime<Utc>, message: String) -> Self {
        let mut result = Self::start(direction);
        result.started_at = started_at;
        result.errors.push(message);
        let mut result = result.finish();
        result.success = false;
        result
    }

    pub fn created(&mut self) {
        self.records_processed += 1;
        self.records_created += 1;
    }

    pub fn updated(&mut self) {
        self.records_processed += 1;
        self.records_updated += 1;
    }

    pub fn record_failure(&mut self, message: String) {
        self.records_processed += 1;
        self.records_failed += 1;
        self.errors.push(message);
    }

    /// A processed record that needed no change, e.g. a thread without a reply.
    pub fn unchanged(&mut self) {
        self.records_processed += 1;
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Stamps completion time and derives `success` from the error list.
    pub fn finish(mut self) -> Self {
        self.completed_at = Utc::now();
        self.duration_ms = (self.completed_at - self.started_at).num_milliseconds();
        self.success = self.errors.is_empty();
        self
    }

    /// Combines a pull and a push into one bidirectional result.
    pub fn merge(self, other: SyncResult) -> SyncResult {
        let mut metadata = self.metadata;
        metadata.extend(other.metadata);
        let mut errors = self.errors;
        errors.extend(other.errors);
        let started_at = self.started_at.min(other.started_at);
        let completed_at = self.completed_at.max(other.completed_at);

        SyncResult {
            success: self.success && other.success,
            direction: SyncDirection::Bidirectional,
            records_processed: self.records_processed + other.records_processed,
            records_created: self.records_created + other.records_created,
            records_updated: self.records_updated + other.records_updated,
            records_failed: self.records_failed + other.records_failed,
            errors,
            started_at,
            completed_at,
            duration_ms: (completed_at - started_at).num_milliseconds(),
            metadata,
        }
    }

    /// One-line description of what went wrong, used for the connection's error message.
    pub fn error_summary(&self) -> String {
        match self.errors.as_slice() {
            [] => "Sync failed".to_string(),
            [only] => only.clone(),
            [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
        }
    }

    pub(crate) fn to_log(&self, connection_id: Id) -> integration_sync_logs::Model {
        integration_sync_logs::Model {
            id: Id::new_v4(),
            connection_id,
            direction: self.direction,
            records_created: self.records_created as i32,
            records_updated: self.records_updated as i32,
            records_failed: self.records_failed as i32,
            errors: Value::from(self.errors.clone()),
            duration_ms: self.duration_ms,
            started_at: self.started_at.into(),
            completed_at: self.completed_at.into(),
        }
    }
}
