//! Domain models for costlens.
//!
//! This module contains the core data structures representing cost line
//! items, the tables that hold them, billing periods, and categorized
//! rollups.
//!
//! ## Submodules
//!
//! - [`schema`] - Column resolution and schema validation
//! - [`table`] - Line items and cost tables
//! - [`period`] - Date ranges, granularity and cost metrics
//! - [`rollup`] - Categorized `(category, subtype, cost)` summaries

mod period;
mod rollup;
mod schema;
mod table;

// Re-export everything at the models level
pub use period::{CostMetric, DateRange, Granularity, TimePeriod};
pub use rollup::{OTHER_CATEGORY, PeriodRollup, Rollup, RollupRow, UNCLASSIFIED_CATEGORY};
pub use schema::{Column, Schema};
pub use table::{CostRow, CostTable, LineItem, MAX_COST};
