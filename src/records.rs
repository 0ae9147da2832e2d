//! Typed row shapes for every collection.
//!
//! Fixture arrays are decoded record by record into these structs before any
//! store call. Unknown fields are rejected so a typo fails the file instead
//! of being dropped silently.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collection::Collection;
use crate::error::FixtureError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub stock_quantity: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Sale {
    pub sale_id: String,
    pub product_id: String,
    pub timestamp: DateTime<Utc>,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Purchase {
    pub purchase_id: String,
    pub product_id: String,
    pub timestamp: DateTime<Utc>,
    pub quantity: i32,
    pub unit_cost: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Expense {
    pub expense_id: String,
    pub category: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SalesSummary {
    pub sales_summary_id: String,
    pub total_value: f64,
    #[serde(default)]
    pub change_percentage: Option<f64>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PurchaseSummary {
    pub purchase_summary_id: String,
    pub total_purchased: f64,
    #[serde(default)]
    pub change_percentage: Option<f64>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExpenseSummary {
    pub expense_summary_id: String,
    pub total_expenses: f64,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExpenseByCategory {
    pub expense_by_category_id: String,
    pub expense_summary_id: String,
    pub category: String,
    pub amount: i64,
    pub date: DateTime<Utc>,
}

/// All rows from one fixture file, typed by collection.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBatch {
    Products(Vec<Product>),
    ExpenseSummary(Vec<ExpenseSummary>),
    Sales(Vec<Sale>),
    SalesSummary(Vec<SalesSummary>),
    Purchases(Vec<Purchase>),
    PurchaseSummary(Vec<PurchaseSummary>),
    Users(Vec<User>),
    Expenses(Vec<Expense>),
    ExpenseByCategory(Vec<ExpenseByCategory>),
}

impl RecordBatch {
    /// Decode untyped fixture elements into the collection's row type.
    ///
    /// Stops at the first record that does not fit and reports its index.
    pub fn decode(collection: Collection, rows: Vec<Value>) -> Result<Self, FixtureError> {
        Ok(match collection {
            Collection::Products => Self::Products(decode_rows(rows)?),
            Collection::ExpenseSummary => Self::ExpenseSummary(decode_rows(rows)?),
            Collection::Sales => Self::Sales(decode_rows(rows)?),
            Collection::SalesSummary => Self::SalesSummary(decode_rows(rows)?),
            Collection::Purchases => Self::Purchases(decode_rows(rows)?),
            Collection::PurchaseSummary => Self::PurchaseSummary(decode_rows(rows)?),
            Collection::Users => Self::Users(decode_rows(rows)?),
            Collection::Expenses => Self::Expenses(decode_rows(rows)?),
            Collection::ExpenseByCategory => Self::ExpenseByCategory(decode_rows(rows)?),
        })
    }

    pub fn collection(&self) -> Collection {
        match self {
            Self::Products(_) => Collection::Products,
            Self::ExpenseSummary(_) => Collection::ExpenseSummary,
            Self::Sales(_) => Collection::Sales,
            Self::SalesSummary(_) => Collection::SalesSummary,
            Self::Purchases(_) => Collection::Purchases,
            Self::PurchaseSummary(_) => Collection::PurchaseSummary,
            Self::Users(_) => Collection::Users,
            Self::Expenses(_) => Collection::Expenses,
            Self::ExpenseByCategory(_) => Collection::ExpenseByCategory,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Products(rows) => rows.len(),
            Self::ExpenseSummary(rows) => rows.len(),
            Self::Sales(rows) => rows.len(),
            Self::SalesSummary(rows) => rows.len(),
            Self::Purchases(rows) => rows.len(),
            Self::PurchaseSummary(rows) => rows.len(),
            Self::Users(rows) => rows.len(),
            Self::Expenses(rows) => rows.len(),
            Self::ExpenseByCategory(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-encode rows as JSON objects with their wire field names.
    pub fn to_json_rows(&self) -> Vec<Value> {
        match self {
            Self::Products(rows) => encode_rows(rows),
            Self::ExpenseSummary(rows) => encode_rows(rows),
            Self::Sales(rows) => encode_rows(rows),
            Self::SalesSummary(rows) => encode_rows(rows),
            Self::Purchases(rows) => encode_rows(rows),
            Self::PurchaseSummary(rows) => encode_rows(rows),
            Self::Users(rows) => encode_rows(rows),
            Self::Expenses(rows) => encode_rows(rows),
            Self::ExpenseByCategory(rows) => encode_rows(rows),
        }
    }

    /// Primary key of each row, in order.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Self::Products(rows) => rows.iter().map(|r| r.product_id.as_str()).collect(),
            Self::ExpenseSummary(rows) => {
                rows.iter().map(|r| r.expense_summary_id.as_str()).collect()
            }
            Self::Sales(rows) => rows.iter().map(|r| r.sale_id.as_str()).collect(),
            Self::SalesSummary(rows) => rows.iter().map(|r| r.sales_summary_id.as_str()).collect(),
            Self::Purchases(rows) => rows.iter().map(|r| r.purchase_id.as_str()).collect(),
            Self::PurchaseSummary(rows) => {
                rows.iter().map(|r| r.purchase_summary_id.as_str()).collect()
            }
            Self::Users(rows) => rows.iter().map(|r| r.user_id.as_str()).collect(),
            Self::Expenses(rows) => rows.iter().map(|r| r.expense_id.as_str()).collect(),
            Self::ExpenseByCategory(rows) => rows
                .iter()
                .map(|r| r.expense_by_category_id.as_str())
                .collect(),
        }
    }

    /// Foreign keys into [`Collection::references`], one per row.
    pub fn reference_ids(&self) -> Vec<&str> {
        match self {
            Self::Sales(rows) => rows.iter().map(|r| r.product_id.as_str()).collect(),
            Self::Purchases(rows) => rows.iter().map(|r| r.product_id.as_str()).collect(),
            Self::ExpenseByCategory(rows) => {
                rows.iter().map(|r| r.expense_summary_id.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, FixtureError> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::from_value(row).map_err(|e| FixtureError::Schema {
                index,
                message: e.to_string(),
            })
        })
        .collect()
}

fn encode_rows<T: Serialize>(rows: &[T]) -> Vec<Value> {
    // Row structs only hold strings, numbers and timestamps; encoding cannot fail.
    rows.iter()
        .filter_map(|row| serde_json::to_value(row).ok())
        .collect()
}
