//! Live Postgres regression test.
//!
//! `#[ignore]`d and never run by default. Creates a throwaway schema with the
//! inventory tables, seeds it twice from fixture files, and drops it again.
//!
//! Run explicitly:
//! `STOCKROOM_TEST_DATABASE_URL=postgres://... cargo test --test postgres_regression -- --ignored --nocapture`

#![cfg(feature = "postgres")]

use std::time::{SystemTime, UNIX_EPOCH};

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use stockroom::seed::{SeedPlan, Seeder, SkipReason};
use stockroom::store::PgStore;

const TABLES: &[&str] = &[
    r#"CREATE TABLE "{schema}"."Products" (
        "productId" TEXT PRIMARY KEY,
        "name" TEXT NOT NULL,
        "price" DOUBLE PRECISION NOT NULL,
        "rating" DOUBLE PRECISION,
        "stockQuantity" INTEGER
    )"#,
    r#"CREATE TABLE "{schema}"."Users" (
        "userId" TEXT PRIMARY KEY,
        "name" TEXT NOT NULL,
        "email" TEXT NOT NULL
    )"#,
    r#"CREATE TABLE "{schema}"."Sales" (
        "saleId" TEXT PRIMARY KEY,
        "productId" TEXT NOT NULL REFERENCES "{schema}"."Products" ("productId"),
        "timestamp" TIMESTAMPTZ NOT NULL,
        "quantity" INTEGER NOT NULL,
        "unitPrice" DOUBLE PRECISION NOT NULL,
        "totalAmount" DOUBLE PRECISION NOT NULL
    )"#,
    r#"CREATE TABLE "{schema}"."Purchases" (
        "purchaseId" TEXT PRIMARY KEY,
        "productId" TEXT NOT NULL REFERENCES "{schema}"."Products" ("productId"),
        "timestamp" TIMESTAMPTZ NOT NULL,
        "quantity" INTEGER NOT NULL,
        "unitCost" DOUBLE PRECISION NOT NULL,
        "totalCost" DOUBLE PRECISION NOT NULL
    )"#,
    r#"CREATE TABLE "{schema}"."Expenses" (
        "expenseId" TEXT PRIMARY KEY,
        "category" TEXT NOT NULL,
        "amount" DOUBLE PRECISION NOT NULL,
        "timestamp" TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE "{schema}"."SalesSummary" (
        "salesSummaryId" TEXT PRIMARY KEY,
        "totalValue" DOUBLE PRECISION NOT NULL,
        "changePercentage" DOUBLE PRECISION,
        "date" TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE "{schema}"."PurchaseSummary" (
        "purchaseSummaryId" TEXT PRIMARY KEY,
        "totalPurchased" DOUBLE PRECISION NOT NULL,
        "changePercentage" DOUBLE PRECISION,
        "date" TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE "{schema}"."ExpenseSummary" (
        "expenseSummaryId" TEXT PRIMARY KEY,
        "totalExpenses" DOUBLE PRECISION NOT NULL,
        "date" TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE "{schema}"."ExpenseByCategory" (
        "expenseByCategoryId" TEXT PRIMARY KEY,
        "expenseSummaryId" TEXT NOT NULL REFERENCES "{schema}"."ExpenseSummary" ("expenseSummaryId"),
        "category" TEXT NOT NULL,
        "amount" BIGINT NOT NULL,
        "date" TIMESTAMPTZ NOT NULL
    )"#,
];

const PRODUCTS: &str = r#"[
  {"productId": "p1", "name": "Widget", "price": 9.5, "rating": 4.2, "stockQuantity": 10},
  {"productId": "p2", "name": "Gadget", "price": 3.25}
]"#;

const SALES: &str = r#"[
  {"saleId": "s1", "productId": "p1", "timestamp": "2024-03-01T10:00:00Z", "quantity": 2, "unitPrice": 9.5, "totalAmount": 19.0}
]"#;

#[tokio::test]
#[ignore = "needs a live Postgres; set STOCKROOM_TEST_DATABASE_URL and run explicitly"]
async fn seeds_a_fresh_schema_and_reseeds_it() {
    let url = std::env::var("STOCKROOM_TEST_DATABASE_URL")
        .expect("STOCKROOM_TEST_DATABASE_URL must be set");
    // Each seeding run closes its own pool; checks go through this one.
    let admin = connect(&url).await;
    let schema = format!(
        "stockroom_it_{}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis()
    );
    create_schema(&admin, &schema).await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("products.json"), PRODUCTS).unwrap();
    std::fs::write(dir.path().join("sales.json"), SALES).unwrap();
    let plan = SeedPlan::new(dir.path()).with_files(["products.json", "sales.json"]);

    let first = Seeder::new(Box::new(PgStore::from_pool(connect(&url).await, &schema)))
        .run_and_close(&plan)
        .await;
    assert_eq!(first.seeded_files(), vec!["products.json", "sales.json"]);
    assert_eq!(count(&admin, &schema, "Products").await, 2);
    assert_eq!(count(&admin, &schema, "Sales").await, 1);

    // Forward order clears Products while Sales still references it.
    let second = Seeder::new(Box::new(PgStore::from_pool(connect(&url).await, &schema)))
        .run_and_close(&plan)
        .await;
    assert_eq!(second.failed_deletes(), vec!["products"]);
    assert_eq!(second.skipped_for(SkipReason::Store), vec!["products.json"]);
    assert_eq!(count(&admin, &schema, "Sales").await, 1);

    sqlx::query(&format!(r#"DROP SCHEMA "{schema}" CASCADE"#))
        .execute(&admin)
        .await
        .expect("drop schema");
}

async fn connect(url: &str) -> PgPool {
    PgPoolOptions::new()
        .max_connections(2)
        .connect(url)
        .await
        .expect("connect")
}

async fn create_schema(pool: &PgPool, schema: &str) {
    sqlx::query(&format!(r#"CREATE SCHEMA "{schema}""#))
        .execute(pool)
        .await
        .expect("create schema");
    for ddl in TABLES {
        sqlx::query(&ddl.replace("{schema}", schema))
            .execute(pool)
            .await
            .expect("create table");
    }
}

async fn count(pool: &PgPool, schema: &str, table: &str) -> i64 {
    let row = sqlx::query(&format!(r#"SELECT COUNT(*) AS n FROM "{schema}"."{table}""#))
        .fetch_one(pool)
        .await
        .expect("count");
    row.get::<i64, _>("n")
}
