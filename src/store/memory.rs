//! In-process record store.
//!
//! Backs `--backend memory` dry runs and the loader's tests. Every call is
//! appended to a journal that a [`MemoryInspector`] can read after the store
//! itself has been closed.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::{CollectionHandle, CollectionTable, RecordStore};
use crate::collection::Collection;
use crate::error::StoreError;
use crate::records::RecordBatch;

/// Store operation kind, used for journal entries and injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StoreOperation {
    DeleteAll,
    BulkInsert,
}

/// One journaled call against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    DeleteAll(Collection),
    /// Collection plus number of records carried by the call.
    BulkInsert(Collection, usize),
    Close,
}

#[derive(Debug, Clone)]
struct StoredRow {
    id: String,
    reference: Option<String>,
    data: Value,
}

#[derive(Debug, Default)]
struct MemoryState {
    rows: BTreeMap<Collection, Vec<StoredRow>>,
    calls: Vec<StoreCall>,
    failures: BTreeSet<(Collection, StoreOperation)>,
    strict: bool,
}

type SharedState = Arc<Mutex<MemoryState>>;

fn lock(state: &SharedState) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
    state
        .lock()
        .map_err(|_| StoreError::Query("memory store lock poisoned".to_string()))
}

/// Record store held entirely in memory.
pub struct MemoryStore {
    state: SharedState,
    table: CollectionTable,
}

impl MemoryStore {
    /// Store exposing every collection.
    pub fn new() -> Self {
        Self::with_collections(&Collection::ALL)
    }

    /// Store exposing only `collections`; others resolve as unsupported.
    pub fn with_collections(collections: &[Collection]) -> Self {
        let state: SharedState = Arc::default();
        let mut table = CollectionTable::new();
        for &collection in collections {
            table.register(MemoryCollection {
                collection,
                state: Arc::clone(&state),
            });
        }
        Self { state, table }
    }

    /// Enforce primary-key uniqueness and record references, like a
    /// database with foreign keys in restrict mode.
    pub fn strict(self) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.strict = true;
        }
        self
    }

    /// Make one operation on one collection fail with a query error.
    pub fn fail_on(self, collection: Collection, operation: StoreOperation) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.failures.insert((collection, operation));
        }
        self
    }

    /// Pre-load rows without journaling, e.g. to model leftovers from a
    /// previous run.
    pub fn preload(self, batch: &RecordBatch) -> Self {
        if let Ok(mut state) = self.state.lock() {
            let rows = stored_rows(batch);
            state
                .rows
                .entry(batch.collection())
                .or_default()
                .extend(rows);
        }
        self
    }

    /// Read-only view that outlives the store.
    pub fn inspector(&self) -> MemoryInspector {
        MemoryInspector {
            state: Arc::clone(&self.state),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn collections(&self) -> &CollectionTable {
        &self.table
    }

    async fn close(self: Box<Self>) -> Result<(), StoreError> {
        lock(&self.state)?.calls.push(StoreCall::Close);
        Ok(())
    }
}

struct MemoryCollection {
    collection: Collection,
    state: SharedState,
}

#[async_trait]
impl CollectionHandle for MemoryCollection {
    fn collection(&self) -> Collection {
        self.collection
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut state = lock(&self.state)?;
        state.calls.push(StoreCall::DeleteAll(self.collection));
        state.check_injected(self.collection, StoreOperation::DeleteAll)?;
        if state.strict {
            state.check_no_dependents(self.collection)?;
        }
        let removed = state
            .rows
            .remove(&self.collection)
            .map(|rows| rows.len())
            .unwrap_or(0);
        Ok(removed as u64)
    }

    async fn bulk_insert(&self, batch: &RecordBatch) -> Result<u64, StoreError> {
        let mut state = lock(&self.state)?;
        state
            .calls
            .push(StoreCall::BulkInsert(self.collection, batch.len()));
        state.check_injected(self.collection, StoreOperation::BulkInsert)?;
        if batch.collection() != self.collection {
            return Err(StoreError::Query(format!(
                "{} rows sent to {} collection",
                batch.collection(),
                self.collection
            )));
        }
        let rows = stored_rows(batch);
        if state.strict {
            state.check_insertable(self.collection, &rows)?;
        }
        // The whole batch lands or none of it does.
        let inserted = rows.len();
        state.rows.entry(self.collection).or_default().extend(rows);
        Ok(inserted as u64)
    }
}

impl MemoryState {
    fn check_injected(
        &self,
        collection: Collection,
        operation: StoreOperation,
    ) -> Result<(), StoreError> {
        if self.failures.contains(&(collection, operation)) {
            return Err(StoreError::Query(format!(
                "injected {operation:?} failure on {collection}"
            )));
        }
        Ok(())
    }

    fn check_no_dependents(&self, collection: Collection) -> Result<(), StoreError> {
        for (child, rows) in &self.rows {
            if child.references() == Some(collection) && !rows.is_empty() {
                return Err(StoreError::Constraint(format!(
                    "{} rows still reference {collection}",
                    child
                )));
            }
        }
        Ok(())
    }

    fn check_insertable(
        &self,
        collection: Collection,
        rows: &[StoredRow],
    ) -> Result<(), StoreError> {
        let existing = self.rows.get(&collection);
        let mut seen: BTreeSet<&str> = existing
            .map(|rows| rows.iter().map(|r| r.id.as_str()).collect())
            .unwrap_or_default();
        for row in rows {
            if !seen.insert(row.id.as_str()) {
                return Err(StoreError::Constraint(format!(
                    "duplicate id `{}` in {collection}",
                    row.id
                )));
            }
        }

        let Some(parent) = collection.references() else {
            return Ok(());
        };
        let parent_ids: BTreeSet<&str> = self
            .rows
            .get(&parent)
            .map(|rows| rows.iter().map(|r| r.id.as_str()).collect())
            .unwrap_or_default();
        for row in rows {
            if let Some(reference) = &row.reference {
                if !parent_ids.contains(reference.as_str()) {
                    return Err(StoreError::Constraint(format!(
                        "{collection} row `{}` references missing {parent} `{reference}`",
                        row.id
                    )));
                }
            }
        }
        Ok(())
    }
}

fn stored_rows(batch: &RecordBatch) -> Vec<StoredRow> {
    let ids = batch.ids();
    let references = batch.reference_ids();
    batch
        .to_json_rows()
        .into_iter()
        .enumerate()
        .map(|(i, data)| StoredRow {
            id: ids.get(i).map(|id| id.to_string()).unwrap_or_default(),
            reference: references.get(i).map(|r| r.to_string()),
            data,
        })
        .collect()
}

/// Observer for a [`MemoryStore`]'s rows and call journal.
#[derive(Clone)]
pub struct MemoryInspector {
    state: SharedState,
}

impl MemoryInspector {
    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state
            .lock()
            .map(|state| state.calls.clone())
            .unwrap_or_default()
    }

    /// Calls that touched `collection`.
    pub fn calls_for(&self, collection: Collection) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|call| match call {
                StoreCall::DeleteAll(c) | StoreCall::BulkInsert(c, _) => *c == collection,
                StoreCall::Close => false,
            })
            .collect()
    }

    /// Current rows of `collection` as JSON objects.
    pub fn rows(&self, collection: Collection) -> Vec<Value> {
        self.state
            .lock()
            .ok()
            .and_then(|state| {
                state
                    .rows
                    .get(&collection)
                    .map(|rows| rows.iter().map(|r| r.data.clone()).collect())
            })
            .unwrap_or_default()
    }

    pub fn close_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, StoreCall::Close))
            .count()
    }
}
