// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # costlens Core
//!
//! Core types, models, and report transforms for costlens.
//!
//! This crate provides the foundational abstractions used across all other
//! costlens crates, including:
//!
//! - Domain models (line items, cost tables, rollups, date ranges)
//! - Error types
//! - Slug generation for service identifiers
//! - Pivot and top-N cost report transforms
//!
//! ## Key Types
//!
//! ### Table Types
//! - [`Column`] - A recognized column of a cost table
//! - [`Schema`] - Validated column layout of a cost table
//! - [`LineItem`] - One billed usage record
//! - [`CostTable`] - Ordered rows of line items with stable row indices
//!
//! ### Period Types
//! - [`DateRange`] - Half-open date interval used by Cost Explorer
//! - [`Granularity`] - Daily or monthly buckets
//! - [`CostMetric`] - Which Cost Explorer metric was requested
//!
//! ### Rollup Types
//! - [`Rollup`] - `(category, subtype, cost)` summary of one service
//! - [`RollupRow`] - A single rollup row
//! - [`PeriodRollup`] - A rollup scoped to one billing period

pub mod error;
pub mod models;
pub mod report;
pub mod slug;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Table types
    Column,
    CostRow,
    CostTable,
    LineItem,
    MAX_COST,
    Schema,
    // Period types
    CostMetric,
    DateRange,
    Granularity,
    TimePeriod,
    // Rollup types
    OTHER_CATEGORY,
    PeriodRollup,
    Rollup,
    RollupRow,
    UNCLASSIFIED_CATEGORY,
};

pub use report::{
    CostReport, Dimension, OTHER_ROW, Pivot, PivotRow, Selector, SummaryRow, TOTAL_ROW, cost_report,
    filter_preserve_dates, pivot, summarize_by,
};
pub use slug::slugify;
