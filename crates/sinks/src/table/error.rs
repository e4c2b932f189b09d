//! Table sink errors

use tablelog_protocol::ProtocolError;

/// Errors reported by a table store client
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Table could not be created or reached
    #[error("table '{table}' unavailable: {reason}")]
    TableUnavailable { table: String, reason: String },

    /// Store refused a whole transaction
    #[error("transaction rejected for partition '{partition_key}': {reason}")]
    TransactionRejected {
        partition_key: String,
        reason: String,
    },

    /// Store refused a single entity
    #[error("entity '{partition_key}/{row_key}' rejected: {reason}")]
    EntityRejected {
        partition_key: String,
        row_key: String,
        reason: String,
    },

    /// Network or protocol failure talking to the store
    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors from the table sink
#[derive(Debug, thiserror::Error)]
pub enum TableSinkError {
    /// Event could not be encoded (template rendering failed)
    #[error("failed to encode event: {0}")]
    Encode(#[from] ProtocolError),

    /// Destination table could not be provisioned
    #[error("failed to provision table: {0}")]
    Provision(#[source] StoreError),

    /// A partition transaction was not accepted
    #[error("failed to submit {count} records for partition '{partition_key}': {source}")]
    Submit {
        partition_key: String,
        count: usize,
        #[source]
        source: StoreError,
    },

    /// A single-record write was not accepted
    #[error("failed to write record: {0}")]
    Write(#[source] StoreError),
}

/// Result type for table sink operations
pub type Result<T> = std::result::Result<T, TableSinkError>;
