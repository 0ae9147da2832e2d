//! Fixture loader.
//!
//! A run has two strictly sequential phases over the same file list:
//!
//! 1. clear every resolvable collection (`delete_all`), then
//! 2. read each fixture file and insert all of its rows in one call.
//!
//! Every per-entry failure is logged and the entry skipped; nothing is
//! retried or rolled back. [`Seeder::run_and_close`] owns the store and
//! closes it after the run on every path.

mod fixture;
mod report;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::collection::{collection_stem, Collection, DEFAULT_LOAD_ORDER};
use crate::error::{FixtureError, ResolveError};
use crate::records::RecordBatch;
use crate::store::RecordStore;

pub use fixture::{parse_fixture, read_fixture};
pub use report::{DeleteEntry, DeleteOutcome, InsertEntry, InsertOutcome, SeedReport, SkipReason};

/// Order in which the delete phase walks the file list.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeleteOrder {
    /// Same order as loading.
    #[default]
    Forward,
    /// Dependents first, so restrict-mode references never block a delete.
    Reverse,
}

impl std::str::FromStr for DeleteOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(Self::Forward),
            "reverse" => Ok(Self::Reverse),
            other => Err(format!(
                "unknown delete order `{other}` (expected forward or reverse)"
            )),
        }
    }
}

/// What to load and from where.
#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub data_dir: PathBuf,
    /// Fixture file names relative to `data_dir`, in load order.
    pub files: Vec<String>,
    pub delete_order: DeleteOrder,
}

impl SeedPlan {
    /// Default load order over `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            files: DEFAULT_LOAD_ORDER.iter().map(|f| f.to_string()).collect(),
            delete_order: DeleteOrder::Forward,
        }
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_delete_order(mut self, order: DeleteOrder) -> Self {
        self.delete_order = order;
        self
    }

    /// Files in the order the delete phase visits them.
    pub fn delete_sequence(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self.files.iter().map(String::as_str).collect();
        if self.delete_order == DeleteOrder::Reverse {
            files.reverse();
        }
        files
    }
}

/// Runs one seeding pass against a store it owns.
pub struct Seeder {
    store: Box<dyn RecordStore>,
}

impl Seeder {
    pub fn new(store: Box<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Run both phases, then release the store exactly once.
    pub async fn run_and_close(self, plan: &SeedPlan) -> SeedReport {
        let report = run(self.store.as_ref(), plan).await;
        let backend = self.store.backend();
        match self.store.close().await {
            Ok(()) => debug!(backend, "record store closed"),
            Err(e) => error!("Error closing {backend} record store: {e}"),
        }
        report
    }
}

/// Clear then load every file in `plan`. The store is left open.
pub async fn run(store: &dyn RecordStore, plan: &SeedPlan) -> SeedReport {
    let mut report = SeedReport::default();
    info!(
        backend = store.backend(),
        data_dir = %plan.data_dir.display(),
        files = plan.files.len(),
        "seeding record store"
    );
    delete_phase(store, plan, &mut report).await;
    insert_phase(store, plan, &mut report).await;
    info!("Data seeding completed.");
    debug!("{}", report.summary());
    report
}

async fn delete_phase(store: &dyn RecordStore, plan: &SeedPlan, report: &mut SeedReport) {
    for file in plan.delete_sequence() {
        let name = collection_stem(file);
        let handle = match store.resolve(&name) {
            Ok(handle) => handle,
            Err(e) => {
                error!("Collection {name} not found or does not support delete-all: {e}");
                report.delete_skipped(&name, SkipReason::Unresolved, e.to_string());
                continue;
            }
        };
        match handle.delete_all().await {
            Ok(rows) => {
                info!("Cleared data from {name}");
                debug!(collection = %name, rows, "rows removed");
                report.cleared(&name, rows);
            }
            Err(e) => {
                error!("Error clearing data from {name}: {e}");
                report.delete_skipped(&name, SkipReason::Store, e.to_string());
            }
        }
    }
}

async fn insert_phase(store: &dyn RecordStore, plan: &SeedPlan, report: &mut SeedReport) {
    for file in &plan.files {
        match load_file(store, &plan.data_dir, file).await {
            Ok(rows) => report.seeded(file, rows),
            Err((reason, message)) => report.insert_skipped(file, reason, message),
        }
    }
}

/// Load one fixture file. Logs its own outcome.
async fn load_file(
    store: &dyn RecordStore,
    data_dir: &Path,
    file: &str,
) -> Result<u64, (SkipReason, String)> {
    let path = data_dir.join(file);
    let rows = read_fixture(&path)
        .await
        .map_err(|e| log_fixture_error(file, &path, e))?;

    let name = collection_stem(file);
    let collection = Collection::from_name(&name).map_err(|e| log_unresolved(&name, e))?;

    let batch = RecordBatch::decode(collection, rows).map_err(|e| {
        error!("File {file} does not match the {name} row shape: {e}");
        (SkipReason::Schema, e.to_string())
    })?;

    let handle = store
        .collections()
        .get(collection)
        .map_err(|e| log_unresolved(&name, e))?;

    debug!(collection = %collection, records = batch.len(), "bulk insert");
    match handle.bulk_insert(&batch).await {
        Ok(inserted) => {
            if inserted != batch.len() as u64 {
                warn!(
                    collection = %collection,
                    sent = batch.len(),
                    inserted,
                    "store inserted a different number of rows than sent"
                );
            }
            info!("Seeded {name} with data from {file}");
            Ok(inserted)
        }
        Err(e) => {
            error!("Error seeding {name}: {e}");
            Err((SkipReason::Store, e.to_string()))
        }
    }
}

fn log_fixture_error(file: &str, path: &Path, e: FixtureError) -> (SkipReason, String) {
    let reason = match &e {
        FixtureError::NotFound(_) => {
            error!("File not found: {}", path.display());
            SkipReason::FileNotFound
        }
        FixtureError::Io(err) => {
            error!("Could not read file {file}: {err}");
            SkipReason::Unreadable
        }
        FixtureError::InvalidJson(err) => {
            error!("Invalid JSON in file {file}: {err}");
            SkipReason::InvalidJson
        }
        FixtureError::NotArray => {
            error!("File {file} does not contain a valid array.");
            SkipReason::NotArray
        }
        FixtureError::Schema { .. } => {
            error!("File {file} does not match its row shape: {e}");
            SkipReason::Schema
        }
    };
    (reason, e.to_string())
}

fn log_unresolved(name: &str, e: ResolveError) -> (SkipReason, String) {
    error!("Collection {name} not found or does not support bulk insert: {e}");
    (SkipReason::Unresolved, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::{MemoryStore, StoreCall, StoreOperation};
    use crate::testsupport::{LogCapture, TestTempDir};

    const PRODUCTS: &str = r#"[{"productId":"p1","name":"Widget","price":9.99}]"#;
    const SALES: &str = r#"[
        {"saleId":"s1","productId":"p1","timestamp":"2024-01-01T00:00:00Z","quantity":1,"unitPrice":9.99,"totalAmount":9.99},
        {"saleId":"s2","productId":"p1","timestamp":"2024-01-02T00:00:00Z","quantity":2,"unitPrice":9.99,"totalAmount":19.98}
    ]"#;

    fn batch(collection: Collection, text: &str) -> RecordBatch {
        RecordBatch::decode(collection, parse_fixture(text).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn deletes_every_collection_before_any_insert() {
        let dir = TestTempDir::new("seed-phases");
        dir.write_text("products.json", PRODUCTS);
        dir.write_text("sales.json", SALES);
        let store = MemoryStore::new();
        let inspector = store.inspector();

        run(&store, &SeedPlan::new(dir.path())).await;

        let calls = inspector.calls();
        let first_insert = calls
            .iter()
            .position(|c| matches!(c, StoreCall::BulkInsert(..)))
            .unwrap();
        let deletes: Vec<_> = calls
            .iter()
            .filter(|c| matches!(c, StoreCall::DeleteAll(_)))
            .collect();
        assert_eq!(deletes.len(), Collection::ALL.len());
        assert_eq!(first_insert, Collection::ALL.len());
    }

    #[tokio::test]
    async fn valid_file_is_inserted_in_one_call() {
        let dir = TestTempDir::new("seed-one-call");
        dir.write_text("products.json", PRODUCTS);
        dir.write_text("sales.json", SALES);
        let store = MemoryStore::new();
        let inspector = store.inspector();

        let report = run(&store, &SeedPlan::new(dir.path())).await;

        assert_eq!(
            inspector.calls_for(Collection::Sales),
            vec![
                StoreCall::DeleteAll(Collection::Sales),
                StoreCall::BulkInsert(Collection::Sales, 2),
            ]
        );
        assert_eq!(report.seeded_files(), vec!["products.json", "sales.json"]);
        assert_eq!(inspector.rows(Collection::Sales).len(), 2);
    }

    #[tokio::test]
    async fn non_array_and_malformed_files_are_skipped() {
        let dir = TestTempDir::new("seed-format");
        dir.write_text("users.json", r#"{"a":1}"#);
        dir.write_text("expenses.json", "[{");
        let store = MemoryStore::new();
        let inspector = store.inspector();

        let plan = SeedPlan::new(dir.path()).with_files(["users.json", "expenses.json"]);
        let report = run(&store, &plan).await;

        assert_eq!(report.skipped_for(SkipReason::NotArray), vec!["users.json"]);
        assert_eq!(report.skipped_for(SkipReason::InvalidJson), vec!["expenses.json"]);
        assert!(!inspector
            .calls()
            .iter()
            .any(|c| matches!(c, StoreCall::BulkInsert(..))));
    }

    #[tokio::test]
    async fn unreadable_file_is_skipped_without_insert() {
        let dir = TestTempDir::new("seed-unreadable");
        std::fs::create_dir(dir.child("users.json")).unwrap();
        dir.write_text("products.json", "[]");
        let store = MemoryStore::new();
        let inspector = store.inspector();
        let logs = LogCapture::start();

        let plan = SeedPlan::new(dir.path()).with_files(["users.json", "products.json"]);
        let report = run(&store, &plan).await;

        assert_eq!(report.skipped_for(SkipReason::Unreadable), vec!["users.json"]);
        assert_eq!(logs.count("Could not read file users.json"), 1);
        assert_eq!(logs.count("File not found"), 0);
        assert_eq!(
            inspector.calls_for(Collection::Users),
            vec![StoreCall::DeleteAll(Collection::Users)]
        );
        assert_eq!(report.seeded_files(), vec!["products.json"]);
    }

    #[tokio::test]
    async fn each_missing_file_logs_once() {
        let dir = TestTempDir::new("seed-missing");
        dir.write_text("users.json", "[]");
        let store = MemoryStore::new();
        let inspector = store.inspector();
        let logs = LogCapture::start();

        let plan =
            SeedPlan::new(dir.path()).with_files(["products.json", "users.json", "sales.json"]);
        run(&store, &plan).await;

        assert_eq!(logs.count("File not found"), 2);
        assert_eq!(logs.count("products.json"), 1);
        assert_eq!(logs.count("Cleared data from"), 3);
        assert_eq!(logs.count("Seeded users with data from users.json"), 1);
        assert_eq!(logs.count("Data seeding completed."), 1);
        assert_eq!(
            inspector.calls_for(Collection::Products),
            vec![StoreCall::DeleteAll(Collection::Products)]
        );
    }

    #[tokio::test]
    async fn shape_mismatch_skips_file_without_insert() {
        let dir = TestTempDir::new("seed-schema");
        dir.write_text("users.json", r#"[{"userId":"u1","name":"Ada"}]"#);
        let store = MemoryStore::new();
        let inspector = store.inspector();

        let plan = SeedPlan::new(dir.path()).with_files(["users.json"]);
        let report = run(&store, &plan).await;

        assert_eq!(report.skipped_for(SkipReason::Schema), vec!["users.json"]);
        assert_eq!(
            inspector.calls(),
            vec![StoreCall::DeleteAll(Collection::Users)]
        );
    }

    #[tokio::test]
    async fn unknown_and_unsupported_names_do_not_stop_the_run() {
        let dir = TestTempDir::new("seed-resolve");
        dir.write_text("inventory.json", "[]");
        dir.write_text("sales.json", SALES);
        dir.write_text("users.json", r#"[{"userId":"u1","name":"Ada","email":"a@b.c"}]"#);
        let store = MemoryStore::with_collections(&[Collection::Users]);
        let inspector = store.inspector();

        let plan =
            SeedPlan::new(dir.path()).with_files(["inventory.json", "sales.json", "users.json"]);
        let report = run(&store, &plan).await;

        assert_eq!(report.failed_deletes(), vec!["inventory", "sales"]);
        assert_eq!(
            report.skipped_for(SkipReason::Unresolved),
            vec!["inventory.json", "sales.json"]
        );
        assert_eq!(report.seeded_files(), vec!["users.json"]);
        assert_eq!(inspector.rows(Collection::Users).len(), 1);
    }

    #[tokio::test]
    async fn delete_failure_does_not_abort_remaining_deletes() {
        let dir = TestTempDir::new("seed-delete-fail");
        let store = MemoryStore::new().fail_on(Collection::Products, StoreOperation::DeleteAll);
        let inspector = store.inspector();

        let report = run(&store, &SeedPlan::new(dir.path())).await;

        assert_eq!(report.failed_deletes(), vec!["products"]);
        let deletes = inspector
            .calls()
            .iter()
            .filter(|c| matches!(c, StoreCall::DeleteAll(_)))
            .count();
        assert_eq!(deletes, Collection::ALL.len());
    }

    #[tokio::test]
    async fn insert_failure_skips_only_that_file() {
        let dir = TestTempDir::new("seed-insert-fail");
        dir.write_text("products.json", PRODUCTS);
        dir.write_text("users.json", r#"[{"userId":"u1","name":"Ada","email":"a@b.c"}]"#);
        let store = MemoryStore::new().fail_on(Collection::Products, StoreOperation::BulkInsert);
        let inspector = store.inspector();

        let report = run(&store, &SeedPlan::new(dir.path())).await;

        assert_eq!(report.skipped_for(SkipReason::Store), vec!["products.json"]);
        assert_eq!(report.seeded_files(), vec!["users.json"]);
        assert!(inspector.rows(Collection::Products).is_empty());
    }

    #[tokio::test]
    async fn forward_delete_order_trips_restrict_references() {
        let dir = TestTempDir::new("seed-forward-strict");
        dir.write_text("products.json", PRODUCTS);
        dir.write_text("sales.json", SALES);
        let leftovers = MemoryStore::new()
            .strict()
            .preload(&batch(Collection::Products, PRODUCTS))
            .preload(&batch(Collection::Sales, SALES));

        let plan = SeedPlan::new(dir.path()).with_files(["products.json", "sales.json"]);
        let report = run(&leftovers, &plan).await;

        // products is still referenced when its delete runs, and its stale
        // row then collides with the fresh insert.
        assert_eq!(report.failed_deletes(), vec!["products"]);
        assert_eq!(report.skipped_for(SkipReason::Store), vec!["products.json"]);
    }

    #[tokio::test]
    async fn reverse_delete_order_clears_dependents_first() {
        let dir = TestTempDir::new("seed-reverse-strict");
        dir.write_text("products.json", PRODUCTS);
        dir.write_text("sales.json", SALES);
        let store = MemoryStore::new()
            .strict()
            .preload(&batch(Collection::Products, PRODUCTS))
            .preload(&batch(Collection::Sales, SALES));

        let plan = SeedPlan::new(dir.path())
            .with_files(["products.json", "sales.json"])
            .with_delete_order(DeleteOrder::Reverse);
        let report = run(&store, &plan).await;

        assert!(report.failed_deletes().is_empty());
        assert_eq!(report.seeded_files(), vec!["products.json", "sales.json"]);
    }

    #[tokio::test]
    async fn run_and_close_closes_exactly_once() {
        let dir = TestTempDir::new("seed-close");
        let store = MemoryStore::new();
        let inspector = store.inspector();

        Seeder::new(Box::new(store))
            .run_and_close(&SeedPlan::new(dir.path()))
            .await;

        assert_eq!(inspector.close_count(), 1);
        assert_eq!(inspector.calls().last(), Some(&StoreCall::Close));
    }

    #[test]
    fn delete_order_parses_case_insensitively() {
        assert_eq!("Reverse".parse::<DeleteOrder>().unwrap(), DeleteOrder::Reverse);
        assert!("sideways".parse::<DeleteOrder>().is_err());
        let plan = SeedPlan::new("data")
            .with_files(["a.json", "b.json"])
            .with_delete_order(DeleteOrder::Reverse);
        assert_eq!(plan.delete_sequence(), vec!["b.json", "a.json"]);
    }

    #[test]
    fn store_error_message_survives_into_report() {
        let mut report = SeedReport::default();
        report.insert_skipped(
            "sales.json",
            SkipReason::Store,
            StoreError::Constraint("fk".into()).to_string(),
        );
        assert!(matches!(
            &report.inserts[0].outcome,
            InsertOutcome::Skipped { message, .. } if message == "constraint violation: fk"
        ));
    }
}
