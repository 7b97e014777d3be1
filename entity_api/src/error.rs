//! Error types for entity API
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

use sea_orm::error::{DbErr, SqlErr};

/// Errors while reading or writing core_db rows.
///
/// `error_kind` separates problems with the data itself (missing row, duplicate
/// email, bad password) from problems reaching the database (`SystemError`).
#[derive(Debug, PartialEq)]
pub struct Error {
    // Underlying error emitted from seaORM internals
    pub source: Option<DbErr>,
    pub error_kind: EntityApiErrorKind,
}

#[derive(Debug, PartialEq, Serialize)]
pub enum EntityApiErrorKind {
    RecordNotFound,
    // An update matched no row, e.g. revoking another workspace's key
    RecordNotUpdated,
    // Password did not verify for the user
    RecordUnauthenticated,
    // Unique constraint violation, e.g. a second contact with the same email
    DuplicateRecord,
    ValidationError,
    // Connection, pool or statement execution failures
    SystemError,
    Other,
}

impl Error {
    pub fn not_found() -> Self {
        Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Entity API Error ({:?}): {source}", self.error_kind),
            None => write!(f, "Entity API Error ({:?})", self.error_kind),
        }
    }
}

impl StdError for Error {}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        let error_kind = match (&err, err.sql_err()) {
            (_, Some(SqlErr::UniqueConstraintViolation(_))) => EntityApiErrorKind::DuplicateRecord,
            (DbErr::RecordNotFound(_), _) => EntityApiErrorKind::RecordNotFound,
            (DbErr::RecordNotUpdated, _) => EntityApiErrorKind::RecordNotUpdated,
            (DbErr::Type(_) | DbErr::Json(_) | DbErr::TryIntoErr { .. }, _) => {
                EntityApiErrorKind::ValidationError
            }
            _ => EntityApiErrorKind::SystemError,
        };

        Error {
            source: Some(err),
            error_kind,
        }
    }
}
