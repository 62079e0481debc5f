//! Column resolution and schema validation.
//!
//! Cost tables arrive with loosely spelled headers (`Usage_type`,
//! `UsageType`, `usage type`). Every header is resolved to a [`Column`] once,
//! when the [`Schema`] is built, so that a missing column is reported before
//! any row is read.

use std::fmt;

use crate::error::CoreError;

// ============================================================================
// Column
// ============================================================================

/// A recognized column of a cost table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Column {
    /// First day of the billing period.
    StartDate,
    /// Day after the last day of the billing period.
    EndDate,
    /// Cost Explorer service name.
    Service,
    /// Cost Explorer usage type.
    UsageType,
    /// AWS region code.
    Region,
    /// Billed amount.
    Cost,
    /// Any other column, treated as a tag.
    Tag(String),
}

impl Column {
    /// Columns every cost table must carry.
    pub fn required() -> [Column; 5] {
        [
            Column::StartDate,
            Column::EndDate,
            Column::Service,
            Column::UsageType,
            Column::Cost,
        ]
    }

    /// Resolves a header name to a column.
    ///
    /// Matching ignores case, underscores, hyphens and spaces. Headers that
    /// match no built-in column become [`Column::Tag`] with the header
    /// (trimmed) as the key.
    pub fn resolve(header: &str) -> Column {
        let normalized: String = header
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "startdate" | "start" => Column::StartDate,
            "enddate" | "end" => Column::EndDate,
            "service" => Column::Service,
            "usagetype" | "usage" => Column::UsageType,
            "region" => Column::Region,
            "cost" | "amount" => Column::Cost,
            _ => Column::Tag(header.trim().to_string()),
        }
    }

    /// Returns the canonical header name.
    pub fn name(&self) -> &str {
        match self {
            Column::StartDate => "StartDate",
            Column::EndDate => "EndDate",
            Column::Service => "Service",
            Column::UsageType => "Usage_type",
            Column::Region => "Region",
            Column::Cost => "Cost",
            Column::Tag(key) => key,
        }
    }

    /// Returns true if this column is a tag column.
    pub fn is_tag(&self) -> bool {
        matches!(self, Column::Tag(_))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Validated column layout of a cost table.
///
/// A schema always contains every [`Column::required`] column. Column order
/// follows the input headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Builds a schema from raw header names.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Schema`] naming the first required column that no
    /// header resolves to, or [`CoreError::InvalidData`] when two headers
    /// resolve to the same column.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self, CoreError> {
        let mut columns: Vec<Column> = Vec::with_capacity(headers.len());

        for header in headers {
            let column = Column::resolve(header.as_ref());
            if columns.contains(&column) {
                return Err(CoreError::InvalidData(format!(
                    "Duplicate column: {}",
                    header.as_ref()
                )));
            }
            columns.push(column);
        }

        for required in Column::required() {
            if !columns.contains(&required) {
                return Err(CoreError::missing_column(required.name()));
            }
        }

        Ok(Self { columns })
    }

    /// The standard layout: required columns plus `Region`.
    pub fn standard() -> Self {
        Self {
            columns: vec![
                Column::StartDate,
                Column::EndDate,
                Column::Service,
                Column::UsageType,
                Column::Region,
                Column::Cost,
            ],
        }
    }

    /// The standard layout followed by the given tag columns.
    pub fn with_tags<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Self::standard();
        for key in keys {
            schema.add(Column::Tag(key.into()));
        }
        schema
    }

    /// Returns the columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns true if the schema has the column.
    pub fn has(&self, column: &Column) -> bool {
        self.columns.contains(column)
    }

    /// Returns the position of a column.
    pub fn position(&self, column: &Column) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Returns the tag keys in column order.
    pub fn tag_keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().filter_map(|c| match c {
            Column::Tag(key) => Some(key.as_str()),
            _ => None,
        })
    }

    /// Returns the header names in order.
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    /// Appends a column if it is not present yet.
    pub fn add(&mut self, column: Column) {
        if !self.has(&column) {
            self.columns.push(column);
        }
    }

    /// Returns a schema containing the columns of both, `self` first.
    pub fn union(&self, other: &Schema) -> Schema {
        let mut merged = self.clone();
        for column in &other.columns {
            merged.add(column.clone());
        }
        merged
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_header_spellings() {
        assert_eq!(Column::resolve("Usage_type"), Column::UsageType);
        assert_eq!(Column::resolve("UsageType"), Column::UsageType);
        assert_eq!(Column::resolve("usage type"), Column::UsageType);
        assert_eq!(Column::resolve("StartDate"), Column::StartDate);
        assert_eq!(Column::resolve("start_date"), Column::StartDate);
        assert_eq!(Column::resolve("Amount"), Column::Cost);
        assert_eq!(Column::resolve(" Team "), Column::Tag("Team".to_string()));
    }

    #[test]
    fn test_from_headers_accepts_original_layout() {
        let schema =
            Schema::from_headers(&["StartDate", "EndDate", "Tag", "Service", "Region", "Cost", "Usage_type"])
                .unwrap();
        assert!(schema.has(&Column::Region));
        assert_eq!(schema.tag_keys().collect::<Vec<_>>(), vec!["Tag"]);
    }

    #[test]
    fn test_from_headers_names_missing_column() {
        let err = Schema::from_headers(&["StartDate", "EndDate", "Service", "Cost"]).unwrap_err();
        assert!(err.is_schema_error());
        assert_eq!(err.to_string(), "Missing required column: Usage_type");
    }

    #[test]
    fn test_from_headers_rejects_duplicates() {
        let err = Schema::from_headers(&[
            "StartDate", "EndDate", "Service", "UsageType", "Usage_type", "Cost",
        ])
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidData(_)));
    }

    #[test]
    fn test_union_keeps_order() {
        let a = Schema::with_tags(["team"]);
        let b = Schema::with_tags(["env", "team"]);
        let merged = a.union(&b);
        assert_eq!(merged.tag_keys().collect::<Vec<_>>(), vec!["team", "env"]);
    }
}
