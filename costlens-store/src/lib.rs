// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # costlens Store
//!
//! Everything costlens reads from or writes to disk.
//!
//! This crate provides:
//!
//! - **Settings**: User preferences with JSON persistence
//! - **FileDataSource**: Cost tables loaded from a data directory
//! - **Explorer**: Saved Cost Explorer responses flattened into tables
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use costlens_store::{FileDataSource, SettingsStore};
//!
//! let settings = SettingsStore::load_default().await?.get().await;
//! let source = FileDataSource::load(settings.data_dir()).await?;
//! let costs = source.service_costs()?;
//! ```

pub mod error;
pub mod explorer;
pub mod file_source;
pub mod persistence;
pub mod settings;

pub use error::StoreError;
pub use explorer::{CostAndUsagePage, Group, MetricValue, Period, ResultByTime, load_pages, table_from_pages};
pub use file_source::{DEFAULT_TAG_COLUMN, FileDataSource, SERVICE_COSTS_TABLE, load_table};
pub use persistence::{
    default_config_dir, default_data_dir, default_settings_path, ensure_dir, load_json,
    load_json_or_default, save_json,
};
pub use settings::{LogLevel, Settings, SettingsStore};
