//! Record-store seam used by the fixture loader.
//!
//! A store exposes one [`CollectionHandle`] per collection it can write,
//! collected in a [`CollectionTable`] built once when the store opens. The
//! loader never looks collections up any other way.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::collection::Collection;
use crate::config::{Backend, DatabaseConfig};
use crate::error::{ConfigError, ResolveError, SeedError, StoreError};
use crate::records::RecordBatch;

pub use memory::{MemoryInspector, MemoryStore, StoreCall, StoreOperation};
#[cfg(feature = "postgres")]
pub use postgres::{PgSettings, PgStore};

// ---------------------------------------------------------------------------
// Handle traits
// ---------------------------------------------------------------------------

/// Write access to one collection.
#[async_trait]
pub trait CollectionHandle: Send + Sync {
    fn collection(&self) -> Collection;

    /// Remove every row. Returns the number of rows removed.
    async fn delete_all(&self) -> Result<u64, StoreError>;

    /// Insert the whole batch in one store call. Returns rows inserted.
    async fn bulk_insert(&self, batch: &RecordBatch) -> Result<u64, StoreError>;
}

/// An open connection to a record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend name for log lines.
    fn backend(&self) -> &'static str;

    /// Handles this store exposes.
    fn collections(&self) -> &CollectionTable;

    /// Release the connection. Consumes the store so it runs at most once.
    async fn close(self: Box<Self>) -> Result<(), StoreError>;

    /// Resolve a fixture/collection name to its handle.
    fn resolve(&self, name: &str) -> Result<&dyn CollectionHandle, ResolveError> {
        let collection = Collection::from_name(name)?;
        self.collections().get(collection)
    }
}

// ---------------------------------------------------------------------------
// Collection table
// ---------------------------------------------------------------------------

/// Fixed mapping from collection to handle.
#[derive(Default)]
pub struct CollectionTable {
    handles: BTreeMap<Collection, Box<dyn CollectionHandle>>,
}

impl CollectionTable {
    pub fn new() -> Self {
        Self {
            handles: BTreeMap::new(),
        }
    }

    /// Register a handle, replacing any earlier one for the same collection.
    pub fn register(&mut self, handle: impl CollectionHandle + 'static) {
        self.handles.insert(handle.collection(), Box::new(handle));
    }

    pub fn get(&self, collection: Collection) -> Result<&dyn CollectionHandle, ResolveError> {
        self.handles
            .get(&collection)
            .map(|handle| handle.as_ref())
            .ok_or(ResolveError::Unsupported(collection))
    }

    pub fn contains(&self, collection: Collection) -> bool {
        self.handles.contains_key(&collection)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Opening
// ---------------------------------------------------------------------------

/// Open the configured backend.
pub async fn open_store(config: &DatabaseConfig) -> Result<Box<dyn RecordStore>, SeedError> {
    match config.backend {
        Backend::Memory => Ok(Box::new(MemoryStore::new())),
        Backend::Postgres => open_postgres(config).await,
    }
}

#[cfg(feature = "postgres")]
async fn open_postgres(config: &DatabaseConfig) -> Result<Box<dyn RecordStore>, SeedError> {
    let url = config.url.clone().ok_or_else(|| {
        ConfigError::Invalid(
            "database url is not set (use database.url, STOCKROOM_DATABASE_URL, or --database-url)"
                .to_string(),
        )
    })?;
    let settings = PgSettings {
        url,
        schema: config.schema.clone(),
        max_connections: config.max_connections,
    };
    Ok(Box::new(PgStore::connect(&settings).await?))
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(_config: &DatabaseConfig) -> Result<Box<dyn RecordStore>, SeedError> {
    Err(ConfigError::Invalid(
        "this build has no postgres backend (rebuild with `--features postgres` or use `--backend memory`)"
            .to_string(),
    )
    .into())
}
