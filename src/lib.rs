//! Stockroom: inventory fixture seeding and light/dark theme generation.
//!
//! Two independent tools share this crate:
//!
//! - [`seed`] clears every collection of an inventory record store and
//!   reloads it from per-collection JSON fixture files.
//! - [`theme`] derives a light and a dark palette from one base color table
//!   and renders them as class-scoped CSS custom properties.
//!
//! # Quick start
//!
//! ```no_run
//! use stockroom::seed::{SeedPlan, Seeder};
//! use stockroom::store::MemoryStore;
//!
//! # async fn example() {
//! let store = MemoryStore::new();
//! let report = Seeder::new(Box::new(store))
//!     .run_and_close(&SeedPlan::new("seedData"))
//!     .await;
//! println!("{}", report.summary());
//! # }
//! ```

pub mod build_info;
pub mod collection;
pub mod config;
pub mod error;
pub mod records;
pub mod seed;
pub mod store;
#[cfg(test)]
pub mod testsupport;
pub mod theme;
