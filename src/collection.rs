//! Closed set of seedable collections and name resolution.
//!
//! Fixture files are named after the collection they fill (`sales.json` ->
//! `sales`). Names match case-insensitively, so `SalesSummary.json` and
//! `salessummary.json` both resolve to [`Collection::SalesSummary`].

use std::fmt;
use std::path::Path;

use crate::error::ResolveError;

/// One collection (table) in the inventory record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Products,
    ExpenseSummary,
    Sales,
    SalesSummary,
    Purchases,
    PurchaseSummary,
    Users,
    Expenses,
    ExpenseByCategory,
}

/// Fixture files in the order they are cleared and loaded.
///
/// Referenced rows come first: `products` before `sales`/`purchases`,
/// `expenseSummary` before `expenseByCategory`.
pub const DEFAULT_LOAD_ORDER: [&str; 9] = [
    "products.json",
    "expenseSummary.json",
    "sales.json",
    "salesSummary.json",
    "purchases.json",
    "purchaseSummary.json",
    "users.json",
    "expenses.json",
    "expenseByCategory.json",
];

impl Collection {
    /// Every collection, in default load order.
    pub const ALL: [Collection; 9] = [
        Self::Products,
        Self::ExpenseSummary,
        Self::Sales,
        Self::SalesSummary,
        Self::Purchases,
        Self::PurchaseSummary,
        Self::Users,
        Self::Expenses,
        Self::ExpenseByCategory,
    ];

    /// Canonical camelCase name, also the fixture file stem.
    pub fn name(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::ExpenseSummary => "expenseSummary",
            Self::Sales => "sales",
            Self::SalesSummary => "salesSummary",
            Self::Purchases => "purchases",
            Self::PurchaseSummary => "purchaseSummary",
            Self::Users => "users",
            Self::Expenses => "expenses",
            Self::ExpenseByCategory => "expenseByCategory",
        }
    }

    /// Table name as created by the application's schema.
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Products => "Products",
            Self::ExpenseSummary => "ExpenseSummary",
            Self::Sales => "Sales",
            Self::SalesSummary => "SalesSummary",
            Self::Purchases => "Purchases",
            Self::PurchaseSummary => "PurchaseSummary",
            Self::Users => "Users",
            Self::Expenses => "Expenses",
            Self::ExpenseByCategory => "ExpenseByCategory",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.json", self.name())
    }

    /// Collection whose rows this one points at, if any.
    pub fn references(self) -> Option<Collection> {
        match self {
            Self::Sales | Self::Purchases => Some(Self::Products),
            Self::ExpenseByCategory => Some(Self::ExpenseSummary),
            _ => None,
        }
    }

    /// Resolve a collection by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Result<Collection, ResolveError> {
        let trimmed = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ResolveError::Unknown(trimmed.to_string()))
    }

    /// Resolve from a fixture file name or path (`data/sales.json` -> `Sales`).
    pub fn from_file_name(file_name: &str) -> Result<Collection, ResolveError> {
        Self::from_name(&collection_stem(file_name))
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// File base name without directory or extension.
pub fn collection_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string())
}
