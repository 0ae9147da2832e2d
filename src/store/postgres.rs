//! Postgres record store over a sqlx connection pool.
//!
//! Tables and columns follow the application's schema: quoted PascalCase
//! table names and quoted camelCase column names.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use super::{CollectionHandle, CollectionTable, RecordStore};
use crate::collection::Collection;
use crate::error::StoreError;
use crate::records::{
    Expense, ExpenseByCategory, ExpenseSummary, Product, Purchase, PurchaseSummary, RecordBatch,
    Sale, SalesSummary, User,
};

/// Connection settings for [`PgStore::connect`].
#[derive(Debug, Clone)]
pub struct PgSettings {
    pub url: String,
    pub schema: String,
    pub max_connections: u32,
}

/// Record store backed by a Postgres pool.
pub struct PgStore {
    pool: PgPool,
    table: CollectionTable,
}

impl PgStore {
    /// Open the pool and build one handle per collection.
    pub async fn connect(settings: &PgSettings) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections.max(1))
            .connect(&settings.url)
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;
        Ok(Self::from_pool(pool, &settings.schema))
    }

    pub fn from_pool(pool: PgPool, schema: &str) -> Self {
        let mut table = CollectionTable::new();
        for collection in Collection::ALL {
            table.register(PgCollection {
                collection,
                qualified: qualified_table(schema, collection),
                pool: pool.clone(),
            });
        }
        Self { pool, table }
    }
}

#[async_trait]
impl RecordStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    fn collections(&self) -> &CollectionTable {
        &self.table
    }

    async fn close(self: Box<Self>) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}

struct PgCollection {
    collection: Collection,
    qualified: String,
    pool: PgPool,
}

#[async_trait]
impl CollectionHandle for PgCollection {
    fn collection(&self) -> Collection {
        self.collection
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let sql = format!("DELETE FROM {}", self.qualified);
        debug!(%sql, "clearing table");
        let result = sqlx::query(&sql).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn bulk_insert(&self, batch: &RecordBatch) -> Result<u64, StoreError> {
        if batch.collection() != self.collection {
            return Err(StoreError::Query(format!(
                "{} rows sent to {} table",
                batch.collection(),
                self.qualified
            )));
        }
        match batch {
            RecordBatch::Products(rows) => self.insert_rows(rows).await,
            RecordBatch::ExpenseSummary(rows) => self.insert_rows(rows).await,
            RecordBatch::Sales(rows) => self.insert_rows(rows).await,
            RecordBatch::SalesSummary(rows) => self.insert_rows(rows).await,
            RecordBatch::Purchases(rows) => self.insert_rows(rows).await,
            RecordBatch::PurchaseSummary(rows) => self.insert_rows(rows).await,
            RecordBatch::Users(rows) => self.insert_rows(rows).await,
            RecordBatch::Expenses(rows) => self.insert_rows(rows).await,
            RecordBatch::ExpenseByCategory(rows) => self.insert_rows(rows).await,
        }
    }
}

impl PgCollection {
    /// Multi-row `INSERT`s sized under the bind limit, committed together so
    /// a file lands whole or not at all.
    async fn insert_rows<R: InsertRow>(&self, rows: &[R]) -> Result<u64, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let chunk_size = rows_per_statement(R::COLUMNS.len());
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for chunk in rows.chunks(chunk_size) {
            let mut builder =
                QueryBuilder::<Postgres>::new(insert_prefix(&self.qualified, R::COLUMNS));
            builder.push_values(chunk, |mut separated, row| {
                for value in row.values() {
                    match value {
                        BindValue::Text(v) => separated.push_bind(v),
                        BindValue::Float(v) => separated.push_bind(v),
                        BindValue::OptFloat(v) => separated.push_bind(v),
                        BindValue::Int(v) => separated.push_bind(v),
                        BindValue::OptInt(v) => separated.push_bind(v),
                        BindValue::BigInt(v) => separated.push_bind(v),
                        BindValue::Timestamp(v) => separated.push_bind(v),
                    };
                }
            });
            let result = builder.build().execute(&mut *tx).await?;
            inserted += result.rows_affected();
        }
        tx.commit().await?;
        if rows.len() > chunk_size {
            debug!(rows = rows.len(), chunk_size, table = %self.qualified, "inserted in chunks");
        }
        Ok(inserted)
    }
}

/// Postgres rejects statements with more bind parameters than this.
const MAX_BIND_PARAMS: usize = 65_535;

fn rows_per_statement(columns: usize) -> usize {
    (MAX_BIND_PARAMS / columns.max(1)).max(1)
}

fn qualified_table(schema: &str, collection: Collection) -> String {
    let schema = schema.trim();
    if schema.is_empty() {
        format!("\"{}\"", collection.table_name())
    } else {
        format!("\"{schema}\".\"{}\"", collection.table_name())
    }
}

fn insert_prefix(qualified: &str, columns: &[&str]) -> String {
    let columns = columns
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {qualified} ({columns}) ")
}

/// One bound column value.
enum BindValue {
    Text(String),
    Float(f64),
    OptFloat(Option<f64>),
    Int(i32),
    OptInt(Option<i32>),
    BigInt(i64),
    Timestamp(DateTime<Utc>),
}

/// Column list and bind order for one row type.
trait InsertRow: Sync {
    const COLUMNS: &'static [&'static str];

    /// Values in `COLUMNS` order.
    fn values(&self) -> Vec<BindValue>;
}

impl InsertRow for Product {
    const COLUMNS: &'static [&'static str] =
        &["productId", "name", "price", "rating", "stockQuantity"];

    fn values(&self) -> Vec<BindValue> {
        vec![
            BindValue::Text(self.product_id.clone()),
            BindValue::Text(self.name.clone()),
            BindValue::Float(self.price),
            BindValue::OptFloat(self.rating),
            BindValue::OptInt(self.stock_quantity),
        ]
    }
}

impl InsertRow for User {
    const COLUMNS: &'static [&'static str] = &["userId", "name", "email"];

    fn values(&self) -> Vec<BindValue> {
        vec![
            BindValue::Text(self.user_id.clone()),
            BindValue::Text(self.name.clone()),
            BindValue::Text(self.email.clone()),
        ]
    }
}

impl InsertRow for Sale {
    const COLUMNS: &'static [&'static str] = &[
        "saleId",
        "productId",
        "timestamp",
        "quantity",
        "unitPrice",
        "totalAmount",
    ];

    fn values(&self) -> Vec<BindValue> {
        vec![
            BindValue::Text(self.sale_id.clone()),
            BindValue::Text(self.product_id.clone()),
            BindValue::Timestamp(self.timestamp),
            BindValue::Int(self.quantity),
            BindValue::Float(self.unit_price),
            BindValue::Float(self.total_amount),
        ]
    }
}

impl InsertRow for Purchase {
    const COLUMNS: &'static [&'static str] = &[
        "purchaseId",
        "productId",
        "timestamp",
        "quantity",
        "unitCost",
        "totalCost",
    ];

    fn values(&self) -> Vec<BindValue> {
        vec![
            BindValue::Text(self.purchase_id.clone()),
            BindValue::Text(self.product_id.clone()),
            BindValue::Timestamp(self.timestamp),
            BindValue::Int(self.quantity),
            BindValue::Float(self.unit_cost),
            BindValue::Float(self.total_cost),
        ]
    }
}

impl InsertRow for Expense {
    const COLUMNS: &'static [&'static str] = &["expenseId", "category", "amount", "timestamp"];

    fn values(&self) -> Vec<BindValue> {
        vec![
            BindValue::Text(self.expense_id.clone()),
            BindValue::Text(self.category.clone()),
            BindValue::Float(self.amount),
            BindValue::Timestamp(self.timestamp),
        ]
    }
}

impl InsertRow for SalesSummary {
    const COLUMNS: &'static [&'static str] =
        &["salesSummaryId", "totalValue", "changePercentage", "date"];

    fn values(&self) -> Vec<BindValue> {
        vec![
            BindValue::Text(self.sales_summary_id.clone()),
            BindValue::Float(self.total_value),
            BindValue::OptFloat(self.change_percentage),
            BindValue::Timestamp(self.date),
        ]
    }
}

impl InsertRow for PurchaseSummary {
    const COLUMNS: &'static [&'static str] =
        &["purchaseSummaryId", "totalPurchased", "changePercentage", "date"];

    fn values(&self) -> Vec<BindValue> {
        vec![
            BindValue::Text(self.purchase_summary_id.clone()),
            BindValue::Float(self.total_purchased),
            BindValue::OptFloat(self.change_percentage),
            BindValue::Timestamp(self.date),
        ]
    }
}

impl InsertRow for ExpenseSummary {
    const COLUMNS: &'static [&'static str] = &["expenseSummaryId", "totalExpenses", "date"];

    fn values(&self) -> Vec<BindValue> {
        vec![
            BindValue::Text(self.expense_summary_id.clone()),
            BindValue::Float(self.total_expenses),
            BindValue::Timestamp(self.date),
        ]
    }
}

impl InsertRow for ExpenseByCategory {
    const COLUMNS: &'static [&'static str] = &[
        "expenseByCategoryId",
        "expenseSummaryId",
        "category",
        "amount",
        "date",
    ];

    fn values(&self) -> Vec<BindValue> {
        vec![
            BindValue::Text(self.expense_by_category_id.clone()),
            BindValue::Text(self.expense_summary_id.clone()),
            BindValue::Text(self.category.clone()),
            BindValue::BigInt(self.amount),
            BindValue::Timestamp(self.date),
        ]
    }
}
