//! Cost tables read from a directory of JSON files.
//!
//! Each `*.json` file holds one table in the records or split layout and is
//! keyed by its lowercase file stem. `costs.json` is the per-service table;
//! per-service usage tables are named after the service slug or
//! abbreviation, e.g. `s3.json` or `ec2-other.json`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use costlens_core::{CostTable, slugify};
use costlens_services::ServicePlugin;
use tracing::{debug, error, info};

use crate::error::StoreError;

/// Name of the per-service cost table.
pub const SERVICE_COSTS_TABLE: &str = "costs";

/// Tag column listed by [`FileDataSource::tags`].
pub const DEFAULT_TAG_COLUMN: &str = "Tag";

/// Cost tables loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct FileDataSource {
    dir: PathBuf,
    tables: BTreeMap<String, CostTable>,
}

impl FileDataSource {
    /// Loads every table in `dir`.
    ///
    /// Files that cannot be read or parsed are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoDataDir`] if `dir` is not a directory.
    pub async fn load(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        if !tokio::fs::metadata(&dir).await.is_ok_and(|m| m.is_dir()) {
            return Err(StoreError::NoDataDir(dir));
        }

        let mut tables = BTreeMap::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match load_table(&path).await {
                Ok(table) => {
                    debug!(file = %path.display(), rows = table.len(), "Loaded cost table");
                    tables.insert(stem.to_lowercase(), table);
                }
                Err(e) => error!(file = %path.display(), error = %e, "Skipping unreadable cost table"),
            }
        }

        info!(dir = %dir.display(), tables = tables.len(), "Loaded data directory");
        Ok(Self { dir, tables })
    }

    /// Builds a source from in-memory tables.
    pub fn from_tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = (S, CostTable)>,
        S: Into<String>,
    {
        Self {
            dir: PathBuf::new(),
            tables: tables
                .into_iter()
                .map(|(name, table)| (name.into().to_lowercase(), table))
                .collect(),
        }
    }

    /// Returns the directory the tables came from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the table names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Returns a table by name.
    pub fn table(&self, name: &str) -> Option<&CostTable> {
        self.tables.get(&name.to_lowercase())
    }

    /// Returns the per-service cost table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingTable`] if `costs.json` was not loaded.
    pub fn service_costs(&self) -> Result<&CostTable, StoreError> {
        self.table(SERVICE_COSTS_TABLE).ok_or_else(|| StoreError::MissingTable {
            name: SERVICE_COSTS_TABLE.to_string(),
            dir: self.dir.clone(),
        })
    }

    /// Returns the usage table for a service, or an empty table if there is
    /// none.
    pub fn usage_costs(&self, plugin: &dyn ServicePlugin) -> CostTable {
        let keys = [
            plugin.shortname().to_string(),
            slugify(plugin.abbreviation()),
            plugin.abbreviation().to_lowercase(),
        ];
        keys.iter()
            .find_map(|key| self.tables.get(key))
            .cloned()
            .unwrap_or_else(|| {
                debug!(service = plugin.shortname(), "No usage table, using an empty one");
                CostTable::default()
            })
    }

    /// Returns the distinct values of the `Tag` column of the service table.
    pub fn tags(&self) -> Vec<String> {
        self.tag_values(DEFAULT_TAG_COLUMN)
    }

    /// Returns the distinct values of a tag column of the service table.
    pub fn tag_values(&self, key: &str) -> Vec<String> {
        self.table(SERVICE_COSTS_TABLE)
            .map(|t| t.tag_values(key))
            .unwrap_or_default()
    }
}

/// Reads one cost table from a JSON file in the records or split layout.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not JSON, or does not
/// hold a valid cost table.
pub async fn load_table(path: &Path) -> Result<CostTable, StoreError> {
    let content = tokio::fs::read_to_string(path).await?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    Ok(CostTable::from_json(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use costlens_services::{S3Plugin, ServiceKind};
    use tempfile::TempDir;

    const COSTS: &str = r#"[
        {"StartDate": "2024-01-01", "EndDate": "2024-02-01", "Service": "Amazon Simple Storage Service",
         "Region": "us-east-1", "Usage_type": "TimedStorage-ByteHrs", "Cost": 12.5, "Tag": "web"},
        {"StartDate": "2024-01-01", "EndDate": "2024-02-01", "Service": "AWS Lambda",
         "Region": "us-east-1", "Usage_type": "Lambda-GB-Second", "Cost": 1.0, "Tag": "api"}
    ]"#;

    const S3: &str = r#"{"columns": ["StartDate", "EndDate", "Service", "Usage_type", "Cost"],
        "data": [["2024-01-01", "2024-02-01", "S3", "Requests-Tier1", 2.5]]}"#;

    async fn data_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("costs.json"), COSTS).await.unwrap();
        tokio::fs::write(dir.path().join("S3.json"), S3).await.unwrap();
        tokio::fs::write(dir.path().join("broken.json"), "{").await.unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), "ignored").await.unwrap();
        dir
    }

    #[tokio::test]
    async fn test_load_directory() {
        let dir = data_dir().await;
        let source = FileDataSource::load(dir.path()).await.unwrap();

        assert_eq!(source.names(), vec!["costs", "s3"]);
        assert_eq!(source.service_costs().unwrap().len(), 2);
        assert_eq!(source.tags(), vec!["api".to_string(), "web".to_string()]);
    }

    #[tokio::test]
    async fn test_usage_costs_by_abbreviation_or_empty() {
        let dir = data_dir().await;
        let source = FileDataSource::load(dir.path()).await.unwrap();

        assert_eq!(source.usage_costs(&S3Plugin::new()).len(), 1);
        assert!(source.usage_costs(ServiceKind::Rds.plugin().as_ref()).is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_and_table() {
        let dir = TempDir::new().unwrap();
        let err = FileDataSource::load(dir.path().join("absent")).await.unwrap_err();
        assert!(matches!(err, StoreError::NoDataDir(_)));

        let source = FileDataSource::load(dir.path()).await.unwrap();
        assert!(matches!(source.service_costs(), Err(StoreError::MissingTable { .. })));
        assert!(source.tags().is_empty());
    }

    #[tokio::test]
    async fn test_load_single_table() {
        let dir = data_dir().await;
        let table = load_table(&dir.path().join("S3.json")).await.unwrap();
        assert_eq!(table.len(), 1);

        let err = load_table(&dir.path().join("broken.json")).await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
