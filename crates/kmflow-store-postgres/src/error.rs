// Copyright 2026 KMFlow Engineering

//! Error types for the PostgreSQL relational store.

use thiserror::Error;

/// Errors that can occur against the relational system-of-record.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// PostgreSQL connection or query error.
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// JSON (de)serialization error, used for the `ConflictObject`,
    /// `ProcessElement`, and audit event JSONB columns.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A caller-supplied table or column identifier was not a safe SQL
    /// identifier.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The row a caller expected to find was absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// An `UPDATE`/`DELETE` was attempted against the append-only audit
    /// log, rejected by the store layer ahead of the database.
    #[error("audit log is append-only: {0}")]
    AuditLogImmutable(String),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Mirrors the teacher's `impl From<PostgresError> for dashflow::Error`:
/// component-local store errors fold into the engine's top-level error at
/// the boundary, so call sites elsewhere in the workspace can use `?`
/// without depending on this crate's error type directly.
impl From<StoreError> for kmflow_core::Error {
    fn from(err: StoreError) -> Self {
        kmflow_core::Error::Store(err.to_string())
    }
}

/// Validate a PostgreSQL identifier (table or column name) supplied at
/// runtime, since this crate interpolates table names for its
/// per-engagement partitioning scheme and must never let one reach the
/// query string unchecked.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StoreError::InvalidIdentifier("identifier cannot be empty".to_string()));
    }
    if name.len() > 63 {
        return Err(StoreError::InvalidIdentifier(format!(
            "identifier '{name}' exceeds maximum length of 63 characters"
        )));
    }
    let mut chars = name.chars();
    let first = chars.next().expect("non-empty checked above");
    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(StoreError::InvalidIdentifier(format!(
            "identifier '{name}' must start with a letter or underscore"
        )));
    }
    for c in chars {
        if !c.is_ascii_alphanumeric() && c != '_' {
            return Err(StoreError::InvalidIdentifier(format!(
                "identifier '{name}' contains invalid character '{c}'"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_identifiers_pass() {
        assert!(validate_identifier("kmflow_evidence").is_ok());
        assert!(validate_identifier("_private").is_ok());
    }

    #[test]
    fn empty_identifier_is_rejected() {
        assert!(matches!(validate_identifier(""), Err(StoreError::InvalidIdentifier(_))));
    }

    #[test]
    fn identifier_starting_with_digit_is_rejected() {
        assert!(matches!(validate_identifier("1table"), Err(StoreError::InvalidIdentifier(_))));
    }

    #[test]
    fn identifier_with_sql_injection_attempt_is_rejected() {
        assert!(validate_identifier("x; DROP TABLE evidence; --").is_err());
    }

    #[test]
    fn store_error_converts_into_engine_error() {
        let err = StoreError::NotFound("engagement e1".to_string());
        let engine_err: kmflow_core::Error = err.into();
        assert!(matches!(engine_err, kmflow_core::Error::Store(_)));
    }
}
