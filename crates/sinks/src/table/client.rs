//! Table store client interface
//!
//! The sink only needs three operations from the store: make sure the table
//! exists, submit an atomic single-partition transaction, and upsert one
//! entity. [`InMemoryTableClient`] implements them in process and enforces
//! the limits a real store would.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::crop::{MAX_STRING_BYTES, utf16_byte_len};
use super::entity::{MAX_DATA_COLUMNS, TableEntity};
use super::error::StoreError;
use super::keys::MAX_KEY_LEN;

/// Actions allowed in one transaction
pub const MAX_TRANSACTION_ACTIONS: usize = 100;

/// Write action applied to one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableActionKind {
    /// Insert if absent, merge columns if present
    UpsertMerge,
}

/// One entity write inside a transaction
#[derive(Debug, Clone, PartialEq)]
pub struct TableAction {
    pub kind: TableActionKind,
    pub entity: TableEntity,
}

impl TableAction {
    /// Upsert-merge `entity`
    pub fn upsert_merge(entity: TableEntity) -> Self {
        Self {
            kind: TableActionKind::UpsertMerge,
            entity,
        }
    }
}

/// Client for a key/value table store
#[async_trait]
pub trait TableClient: Send + Sync {
    /// Destination table name
    fn table_name(&self) -> &str;

    /// Create the table if needed; `Ok(true)` when it was created now
    async fn ensure_table_exists(&self) -> Result<bool, StoreError>;

    /// Apply all actions atomically
    ///
    /// Every entity must carry `partition_key`; the store rejects the whole
    /// transaction otherwise, and when it holds more than
    /// [`MAX_TRANSACTION_ACTIONS`] actions.
    async fn submit_transaction(
        &self,
        partition_key: &str,
        actions: Vec<TableAction>,
    ) -> Result<(), StoreError>;

    /// Upsert-merge a single entity outside any transaction
    async fn upsert_entity(&self, entity: TableEntity) -> Result<(), StoreError>;
}

// =============================================================================
// In-memory store
// =============================================================================

/// Record of one accepted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransaction {
    pub partition_key: String,
    pub row_keys: Vec<String>,
}

#[derive(Debug, Default)]
struct StoreState {
    table_created: bool,
    rows: BTreeMap<(String, String), TableEntity>,
    transactions: Vec<SubmittedTransaction>,
    create_failure: Option<String>,
    pending_submit_failure: Option<String>,
}

/// In-process table store
///
/// Rows are keyed by `(partition_key, row_key)` and iterate in key order.
/// Failures can be injected to exercise the sink's error paths.
#[derive(Debug)]
pub struct InMemoryTableClient {
    table_name: String,
    state: Mutex<StoreState>,
}

impl InMemoryTableClient {
    /// Create an empty store for `table_name`
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Make every table creation attempt fail with `reason`
    pub fn fail_table_creation(&self, reason: impl Into<String>) {
        self.state.lock().create_failure = Some(reason.into());
    }

    /// Make the next transaction fail with `reason`
    pub fn fail_next_submit(&self, reason: impl Into<String>) {
        self.state.lock().pending_submit_failure = Some(reason.into());
    }

    /// Whether the table has been created
    pub fn table_created(&self) -> bool {
        self.state.lock().table_created
    }

    /// Accepted transactions in submission order
    pub fn transactions(&self) -> Vec<SubmittedTransaction> {
        self.state.lock().transactions.clone()
    }

    /// All stored entities in key order
    pub fn entities(&self) -> Vec<TableEntity> {
        self.state.lock().rows.values().cloned().collect()
    }

    /// Look up one entity
    pub fn get(&self, partition_key: &str, row_key: &str) -> Option<TableEntity> {
        self.state
            .lock()
            .rows
            .get(&(partition_key.to_string(), row_key.to_string()))
            .cloned()
    }

    /// Number of stored entities
    pub fn len(&self) -> usize {
        self.state.lock().rows.len()
    }

    /// Whether the store holds no entities
    pub fn is_empty(&self) -> bool {
        self.state.lock().rows.is_empty()
    }

    fn upsert(state: &mut StoreState, entity: TableEntity) {
        let key = (entity.partition_key().to_string(), entity.row_key().to_string());
        match state.rows.get_mut(&key) {
            Some(existing) => existing.merge(entity),
            None => {
                state.rows.insert(key, entity);
            }
        }
    }
}

#[async_trait]
impl TableClient for InMemoryTableClient {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn ensure_table_exists(&self) -> Result<bool, StoreError> {
        let mut state = self.state.lock();
        if let Some(ref reason) = state.create_failure {
            return Err(StoreError::TableUnavailable {
                table: self.table_name.clone(),
                reason: reason.clone(),
            });
        }

        let created = !state.table_created;
        state.table_created = true;
        Ok(created)
    }

    async fn submit_transaction(
        &self,
        partition_key: &str,
        actions: Vec<TableAction>,
    ) -> Result<(), StoreError> {
        let rejected = |reason: String| StoreError::TransactionRejected {
            partition_key: partition_key.to_string(),
            reason,
        };

        if actions.is_empty() {
            return Err(rejected("transaction is empty".into()));
        }
        if actions.len() > MAX_TRANSACTION_ACTIONS {
            return Err(rejected(format!(
                "{} actions exceed the limit of {MAX_TRANSACTION_ACTIONS}",
                actions.len()
            )));
        }

        let mut row_keys = HashSet::with_capacity(actions.len());
        for action in &actions {
            let entity = &action.entity;
            if entity.partition_key() != partition_key {
                return Err(rejected(format!(
                    "entity '{}' belongs to partition '{}'",
                    entity.row_key(),
                    entity.partition_key()
                )));
            }
            if !row_keys.insert(entity.row_key()) {
                return Err(rejected(format!(
                    "row key '{}' appears more than once",
                    entity.row_key()
                )));
            }
            validate_entity(entity)?;
        }

        let mut state = self.state.lock();
        if let Some(reason) = state.pending_submit_failure.take() {
            return Err(StoreError::Transport(reason));
        }

        let row_keys = actions
            .iter()
            .map(|a| a.entity.row_key().to_string())
            .collect();
        for action in actions {
            match action.kind {
                TableActionKind::UpsertMerge => Self::upsert(&mut state, action.entity),
            }
        }
        state.transactions.push(SubmittedTransaction {
            partition_key: partition_key.to_string(),
            row_keys,
        });

        Ok(())
    }

    async fn upsert_entity(&self, entity: TableEntity) -> Result<(), StoreError> {
        validate_entity(&entity)?;

        let mut state = self.state.lock();
        if let Some(reason) = state.pending_submit_failure.take() {
            return Err(StoreError::Transport(reason));
        }
        Self::upsert(&mut state, entity);
        Ok(())
    }
}

/// Check the limits the store places on a single entity
fn validate_entity(entity: &TableEntity) -> Result<(), StoreError> {
    let rejected = |reason: String| StoreError::EntityRejected {
        partition_key: entity.partition_key().to_string(),
        row_key: entity.row_key().to_string(),
        reason,
    };

    for (label, key) in [("partition", entity.partition_key()), ("row", entity.row_key())] {
        if key.is_empty() {
            return Err(rejected(format!("{label} key is empty")));
        }
        if key.encode_utf16().count() > MAX_KEY_LEN {
            return Err(rejected(format!("{label} key exceeds {MAX_KEY_LEN} characters")));
        }
    }

    if entity.column_count() > MAX_DATA_COLUMNS {
        return Err(rejected(format!(
            "{} columns exceed the limit of {MAX_DATA_COLUMNS}",
            entity.column_count()
        )));
    }

    for (name, value) in entity.columns() {
        if let Some(s) = value.as_str()
            && utf16_byte_len(s) > MAX_STRING_BYTES
        {
            return Err(rejected(format!(
                "column '{name}' exceeds {MAX_STRING_BYTES} bytes"
            )));
        }
    }

    Ok(())
}
