//! Error types for gateway operations

use thiserror::Error;

/// Errors that can occur during gateway operations
///
/// Storage-engine failures are caught at the boundary of each operation and
/// mapped into one of these kinds, with the original `sqlx` error attached as
/// the source where one exists.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Schema, table, or row target does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Schema access refused for the requesting principal
    ///
    /// Distinct from [`GatewayError::NotFound`]: the caller learns that the
    /// schema is outside its permitted set, not that it is absent.
    #[error("Access denied to schema '{0}'")]
    Denied(String),

    /// Malformed input: bad identifier, unknown column, missing primary key
    /// reference, invalid length or limit
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown abstract column type name
    #[error("Unsupported column type: {0}")]
    UnsupportedType(String),

    /// Table has no column usable for filtering
    #[error("Schema error: {0}")]
    Schema(String),

    /// Storage-engine failure during insert, update, create, or drop
    #[error("Write failed: {message}")]
    Write {
        message: String,
        #[source]
        source: sqlx::Error,
    },

    /// The metadata query itself failed
    #[error("Catalog query failed: {message}")]
    Catalog {
        message: String,
        #[source]
        source: sqlx::Error,
    },

    /// Could not reach the database
    #[error("Connection error: {0}")]
    Connection(String),
}

impl GatewayError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn denied(schema: impl Into<String>) -> Self {
        Self::Denied(schema.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unsupported_type(name: impl Into<String>) -> Self {
        Self::UnsupportedType(name.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn write(msg: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Write {
            message: msg.into(),
            source,
        }
    }

    pub fn catalog(msg: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Catalog {
            message: msg.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
