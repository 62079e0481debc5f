//! Line items and cost tables.
//!
//! This module contains the row types every other part of costlens works on:
//! - [`LineItem`] - One billed usage record
//! - [`CostRow`] - A line item with its stable row index
//! - [`CostTable`] - Ordered rows sharing one [`Schema`]

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::period::DateRange;
use super::schema::{Column, Schema};
use crate::error::CoreError;

// ============================================================================
// Line Item
// ============================================================================

/// Largest absolute amount a line item may carry (10^15).
///
/// Sums over fewer than 10^13 rows stay inside `Decimal`'s range.
pub const MAX_COST: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// One billed usage record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLineItem")]
pub struct LineItem {
    /// Cost Explorer service name (e.g. "Amazon Simple Storage Service").
    pub service: String,
    /// Cost Explorer usage type (e.g. "USE1-TimedStorage-ByteHrs").
    pub usage_type: String,
    /// Region code, when the table was grouped by region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// First day of the billing period.
    pub start_date: NaiveDate,
    /// Day after the last day of the billing period.
    pub end_date: NaiveDate,
    /// Billed amount. Credits and refunds are negative.
    pub cost: Decimal,
    /// Tag values keyed by tag column.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl LineItem {
    /// Creates a line item.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDateRange`] unless `start_date < end_date`
    /// and [`CoreError::AmountOutOfRange`] if `|cost|` exceeds [`MAX_COST`].
    pub fn new(
        service: impl Into<String>,
        usage_type: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        cost: Decimal,
    ) -> Result<Self, CoreError> {
        if start_date >= end_date {
            return Err(CoreError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }
        if cost.abs() > MAX_COST {
            return Err(CoreError::AmountOutOfRange { amount: cost });
        }

        Ok(Self {
            service: service.into(),
            usage_type: usage_type.into(),
            region: None,
            start_date,
            end_date,
            cost,
            tags: BTreeMap::new(),
        })
    }

    /// Sets the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Adds a tag value.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Returns the billing period as a pair.
    pub fn period(&self) -> (NaiveDate, NaiveDate) {
        (self.start_date, self.end_date)
    }

    /// Returns the tag value for a key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Unchecked wire form of [`LineItem`].
#[derive(Deserialize)]
struct RawLineItem {
    service: String,
    usage_type: String,
    #[serde(default)]
    region: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    cost: Decimal,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

impl TryFrom<RawLineItem> for LineItem {
    type Error = CoreError;

    fn try_from(raw: RawLineItem) -> Result<Self, Self::Error> {
        let mut item = Self::new(raw.service, raw.usage_type, raw.start_date, raw.end_date, raw.cost)?;
        item.region = raw.region;
        item.tags = raw.tags;
        Ok(item)
    }
}

// ============================================================================
// Cost Row
// ============================================================================

/// A line item together with its row index.
///
/// The index is assigned when a table is first built and is carried through
/// every filter, so two tables derived from the same source can be compared
/// row by row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostRow {
    /// Position of the row in the table it was first built from.
    pub index: usize,
    /// The line item.
    pub item: LineItem,
}

// ============================================================================
// Cost Table
// ============================================================================

/// Ordered rows of line items sharing one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostTable {
    schema: Schema,
    rows: Vec<CostRow>,
    next_index: usize,
}

impl CostTable {
    /// Creates an empty table with the given schema.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
            next_index: 0,
        }
    }

    /// Creates a table from line items, indexing rows from zero.
    ///
    /// The schema is the standard layout plus every tag key seen.
    pub fn from_items<I: IntoIterator<Item = LineItem>>(items: I) -> Self {
        let mut table = Self::new(Schema::standard());
        for item in items {
            table.push(item);
        }
        table
    }

    /// Builds a table from headers and rows of JSON cells.
    ///
    /// This is the pandas `orient="split"` layout.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Schema`] if a required column is missing and
    /// [`CoreError::InvalidValue`] if a cell cannot be parsed.
    pub fn from_columns<S: AsRef<str>>(headers: &[S], data: &[Vec<Value>]) -> Result<Self, CoreError> {
        let schema = Schema::from_headers(headers)?;
        let mut table = Self::new(schema.clone());

        for (row, cells) in data.iter().enumerate() {
            if cells.len() != schema.columns().len() {
                return Err(CoreError::InvalidValue {
                    row,
                    column: "*".to_string(),
                    message: format!(
                        "expected {} cells, found {}",
                        schema.columns().len(),
                        cells.len()
                    ),
                });
            }
            let item = parse_row(&schema, row, |i| cells.get(i))?;
            table.push(item);
        }

        debug!(rows = table.len(), columns = schema.columns().len(), "Parsed split table");
        Ok(table)
    }

    /// Builds a table from JSON objects keyed by header.
    ///
    /// This is the pandas `orient="records"` layout. The header set is the
    /// union of all record keys; a key absent from one record reads as null.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Schema`] if a required column is missing and
    /// [`CoreError::InvalidValue`] if a cell cannot be parsed.
    pub fn from_records(records: &[Map<String, Value>]) -> Result<Self, CoreError> {
        if records.is_empty() {
            return Ok(Self::new(Schema::standard()));
        }

        let mut headers: Vec<&str> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !headers.contains(&key.as_str()) {
                    headers.push(key);
                }
            }
        }

        let schema = Schema::from_headers(&headers)?;
        let mut table = Self::new(schema.clone());

        for (row, record) in records.iter().enumerate() {
            let item = parse_row(&schema, row, |i| record.get(headers[i]))?;
            table.push(item);
        }

        debug!(rows = table.len(), columns = headers.len(), "Parsed records table");
        Ok(table)
    }

    /// Builds a table from either JSON layout.
    ///
    /// Arrays are read as records; objects with `columns` and `data` are
    /// read as split tables.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidData`] for any other JSON shape, plus the
    /// errors of [`CostTable::from_records`] and [`CostTable::from_columns`].
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        match value {
            Value::Array(items) => {
                let records = items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| {
                        v.as_object().cloned().ok_or_else(|| {
                            CoreError::InvalidData(format!("Record {i} is not an object"))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Self::from_records(&records)
            }
            Value::Object(obj) => {
                let headers: Vec<String> = obj
                    .get("columns")
                    .and_then(Value::as_array)
                    .ok_or_else(|| CoreError::InvalidData("Missing \"columns\" array".to_string()))?
                    .iter()
                    .map(|h| h.as_str().map(str::to_string).unwrap_or_else(|| h.to_string()))
                    .collect();
                let data: Vec<Vec<Value>> = obj
                    .get("data")
                    .and_then(Value::as_array)
                    .ok_or_else(|| CoreError::InvalidData("Missing \"data\" array".to_string()))?
                    .iter()
                    .map(|row| row.as_array().cloned().unwrap_or_default())
                    .collect();
                Self::from_columns(&headers, &data)
            }
            _ => Err(CoreError::InvalidData(
                "Expected a records array or a split object".to_string(),
            )),
        }
    }

    /// Serializes the table in the split layout accepted by [`CostTable::from_json`].
    pub fn to_json(&self) -> Value {
        let columns: Vec<Value> = self.schema.names().into_iter().map(Value::String).collect();
        let data: Vec<Value> = self
            .rows
            .iter()
            .map(|row| {
                Value::Array(
                    self.schema
                        .columns()
                        .iter()
                        .map(|column| cell_value(&row.item, column))
                        .collect(),
                )
            })
            .collect();

        serde_json::json!({ "columns": columns, "data": data })
    }

    /// Appends a line item, assigning the next row index.
    pub fn push(&mut self, item: LineItem) {
        if item.region.is_some() {
            self.schema.add(Column::Region);
        }
        for key in item.tags.keys() {
            self.schema.add(Column::Tag(key.clone()));
        }
        self.rows.push(CostRow {
            index: self.next_index,
            item,
        });
        self.next_index += 1;
    }

    /// Appends every row of `other`, re-indexing them after the existing rows.
    ///
    /// Used to stitch paginated responses into one table.
    pub fn concat(&mut self, other: CostTable) {
        self.schema = self.schema.union(&other.schema);
        for row in other.rows {
            self.rows.push(CostRow {
                index: self.next_index,
                item: row.item,
            });
            self.next_index += 1;
        }
    }

    /// Returns the schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the rows.
    pub fn rows(&self) -> &[CostRow] {
        &self.rows
    }

    /// Iterates over the line items.
    pub fn items(&self) -> impl Iterator<Item = &LineItem> {
        self.rows.iter().map(|r| &r.item)
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the sum of all costs.
    ///
    /// Every amount is within [`MAX_COST`], so the sum cannot overflow.
    pub fn total_cost(&self) -> Decimal {
        self.items().map(|i| i.cost).sum()
    }

    /// Returns a new table with the line items matching `predicate`.
    ///
    /// Row indices and the schema are preserved.
    #[must_use]
    pub fn filter<F>(&self, predicate: F) -> CostTable
    where
        F: Fn(&LineItem) -> bool,
    {
        self.filter_rows(|row| predicate(&row.item))
    }

    /// Returns a new table with the rows matching `predicate`.
    #[must_use]
    pub fn filter_rows<F>(&self, predicate: F) -> CostTable
    where
        F: Fn(&CostRow) -> bool,
    {
        CostTable {
            schema: self.schema.clone(),
            rows: self.rows.iter().filter(|r| predicate(r)).cloned().collect(),
            next_index: self.next_index,
        }
    }

    /// Returns the rows whose billing period starts inside `range`.
    #[must_use]
    pub fn within(&self, range: &DateRange) -> CostTable {
        self.filter(|item| range.contains(item.start_date))
    }

    /// Returns the distinct billing periods in ascending order.
    pub fn periods(&self) -> Vec<(NaiveDate, NaiveDate)> {
        self.items()
            .map(LineItem::period)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Splits the table into one table per billing period, ascending.
    pub fn split_by_period(&self) -> Vec<((NaiveDate, NaiveDate), CostTable)> {
        self.periods()
            .into_iter()
            .map(|period| (period, self.filter(|item| item.period() == period)))
            .collect()
    }

    /// Returns the distinct values of a tag, sorted.
    pub fn tag_values(&self, key: &str) -> Vec<String> {
        self.items()
            .filter_map(|item| item.tag(key))
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl Default for CostTable {
    fn default() -> Self {
        Self::new(Schema::standard())
    }
}

impl FromIterator<LineItem> for CostTable {
    fn from_iter<T: IntoIterator<Item = LineItem>>(iter: T) -> Self {
        Self::from_items(iter)
    }
}

// ============================================================================
// Cell Parsing
// ============================================================================

fn parse_row<'a, F>(schema: &Schema, row: usize, cell: F) -> Result<LineItem, CoreError>
where
    F: Fn(usize) -> Option<&'a Value>,
{
    let mut service = None;
    let mut usage_type = None;
    let mut region = None;
    let mut start_date = None;
    let mut end_date = None;
    let mut cost = None;
    let mut tags = BTreeMap::new();

    for (i, column) in schema.columns().iter().enumerate() {
        let value = cell(i).unwrap_or(&Value::Null);
        match column {
            Column::StartDate => start_date = Some(parse_date(value, row, column)?),
            Column::EndDate => end_date = Some(parse_date(value, row, column)?),
            Column::Service => service = Some(required_text(value, row, column)?),
            Column::UsageType => usage_type = Some(required_text(value, row, column)?),
            Column::Region => region = parse_text(value).filter(|r| !r.is_empty()),
            Column::Cost => cost = Some(parse_cost(value, row, column)?),
            Column::Tag(key) => {
                if let Some(text) = parse_text(value) {
                    tags.insert(key.clone(), text);
                }
            }
        }
    }

    // Schema validation guarantees every required column was visited.
    let (Some(service), Some(usage_type), Some(start), Some(end), Some(cost)) =
        (service, usage_type, start_date, end_date, cost)
    else {
        return Err(CoreError::InvalidData(format!("Row {row} is incomplete")));
    };

    let mut item = LineItem::new(service, usage_type, start, end, cost)?;
    item.region = region;
    item.tags = tags;
    Ok(item)
}

fn parse_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

fn required_text(value: &Value, row: usize, column: &Column) -> Result<String, CoreError> {
    parse_text(value).ok_or_else(|| invalid(row, column, "missing value"))
}

fn parse_date(value: &Value, row: usize, column: &Column) -> Result<NaiveDate, CoreError> {
    let text = value
        .as_str()
        .ok_or_else(|| invalid(row, column, "expected a date string"))?
        .trim();

    // Accept "2024-01-01T00:00:00" and "2024-01-01 00:00:00" by keeping the date part.
    let date_part = text.get(..10).unwrap_or(text);

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| invalid(row, column, &format!("invalid date {text:?}: {e}")))
}

fn parse_cost(value: &Value, row: usize, column: &Column) -> Result<Decimal, CoreError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        Value::Null => return Err(invalid(row, column, "missing value")),
        other => return Err(invalid(row, column, &format!("expected a number, found {other}"))),
    };

    let amount = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| invalid(row, column, &format!("invalid amount {text:?}: {e}")))?;

    if amount.abs() > MAX_COST {
        return Err(invalid(row, column, &format!("amount {text} exceeds {MAX_COST}")));
    }
    Ok(amount)
}

fn invalid(row: usize, column: &Column, message: &str) -> CoreError {
    CoreError::InvalidValue {
        row,
        column: column.name().to_string(),
        message: message.to_string(),
    }
}

fn cell_value(item: &LineItem, column: &Column) -> Value {
    match column {
        Column::StartDate => Value::String(item.start_date.to_string()),
        Column::EndDate => Value::String(item.end_date.to_string()),
        Column::Service => Value::String(item.service.clone()),
        Column::UsageType => Value::String(item.usage_type.clone()),
        Column::Region => item.region.clone().map_or(Value::Null, Value::String),
        Column::Cost => Value::String(item.cost.to_string()),
        Column::Tag(key) => item.tag(key).map_or(Value::Null, |v| Value::String(v.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn item(usage: &str, cost: Decimal) -> LineItem {
        LineItem::new("S3", usage, date("2024-01-01"), date("2024-02-01"), cost).unwrap()
    }

    #[test]
    fn test_line_item_rejects_empty_interval() {
        let err = LineItem::new("S3", "x", date("2024-01-01"), date("2024-01-01"), dec!(1)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_from_records_parses_original_layout() {
        let value = json!([
            {"StartDate": "2024-01-01", "EndDate": "2024-02-01", "Service": "EC2 - Other",
             "Usage_type": "USE1-EBS:VolumeUsage.gp3", "Region": "us-east-1", "Cost": 10.25, "Tag": "web"},
            {"StartDate": "2024-01-01", "EndDate": "2024-02-01", "Service": "EC2 - Other",
             "Usage_type": "USE1-NatGateway-Hours", "Region": "", "Cost": "-1.5", "Tag": ""}
        ]);
        let table = CostTable::from_json(&value).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].item.cost, dec!(10.25));
        assert_eq!(table.rows()[0].item.region.as_deref(), Some("us-east-1"));
        assert_eq!(table.rows()[1].item.region, None);
        // Credits are kept as negative amounts.
        assert_eq!(table.rows()[1].item.cost, dec!(-1.5));
        assert_eq!(table.tag_values("Tag"), vec!["".to_string(), "web".to_string()]);
        assert_eq!(table.total_cost(), dec!(8.75));
    }

    #[test]
    fn test_from_columns_missing_required_column() {
        let value = json!({
            "columns": ["StartDate", "EndDate", "Usage_type", "Cost"],
            "data": [["2024-01-01", "2024-02-01", "BoxUsage", 1.0]]
        });
        let err = CostTable::from_json(&value).unwrap_err();
        assert!(err.is_schema_error());
        assert!(err.to_string().contains("Service"));
    }

    #[test]
    fn test_from_columns_bad_cell_names_row_and_column() {
        let value = json!({
            "columns": ["StartDate", "EndDate", "Service", "Usage_type", "Cost"],
            "data": [["2024-01-01", "2024-02-01", "S3", "Requests-Tier1", "n/a"]]
        });
        match CostTable::from_json(&value).unwrap_err() {
            CoreError::InvalidValue { row, column, .. } => {
                assert_eq!(row, 0);
                assert_eq!(column, "Cost");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_datetime_strings_are_truncated_to_dates() {
        let value = json!([{
            "StartDate": "2024-01-01T00:00:00", "EndDate": "2024-01-02 00:00:00",
            "Service": "S3", "UsageType": "Requests-Tier2", "Cost": 1e-3
        }]);
        let table = CostTable::from_json(&value).unwrap();
        assert_eq!(table.rows()[0].item.end_date, date("2024-01-02"));
        assert_eq!(table.rows()[0].item.cost, dec!(0.001));
    }

    #[test]
    fn test_empty_records_give_empty_table_with_schema() {
        let table = CostTable::from_json(&json!([])).unwrap();
        assert!(table.is_empty());
        assert!(table.schema().has(&Column::Cost));
    }

    #[test]
    fn test_filter_preserves_indices_and_schema() {
        let table = CostTable::from_items([
            item("TimedStorage-ByteHrs", dec!(10)),
            item("Requests-Tier1", dec!(2.5)),
            item("Requests-Tier2", dec!(1)),
        ]);
        let filtered = table.filter(|i| i.usage_type.starts_with("Requests"));
        let indices: Vec<_> = filtered.rows().iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(filtered.schema(), table.schema());

        let none = table.filter(|_| false);
        assert!(none.is_empty());
        assert_eq!(none.schema(), table.schema());
    }

    #[test]
    fn test_concat_reindexes_pages() {
        let mut first = CostTable::from_items([item("a", dec!(1)), item("b", dec!(2))]);
        let second = CostTable::from_items([item("c", dec!(3)).with_tag("team", "x")]);
        first.concat(second);

        let indices: Vec<_> = first.rows().iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(first.schema().has(&Column::Tag("team".to_string())));
        assert_eq!(first.total_cost(), dec!(6));
    }

    #[test]
    fn test_periods_and_split() {
        let jan = item("a", dec!(1));
        let mut feb = item("b", dec!(2));
        feb.start_date = date("2024-02-01");
        feb.end_date = date("2024-03-01");
        let table = CostTable::from_items([feb, jan]);

        let periods = table.periods();
        assert_eq!(periods[0].0, date("2024-01-01"));
        assert_eq!(periods[1].0, date("2024-02-01"));

        let split = table.split_by_period();
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].1.total_cost(), dec!(1));
    }

    #[test]
    fn test_within_keeps_periods_starting_in_range() {
        let jan = item("a", dec!(1));
        let mut feb = item("b", dec!(2));
        feb.start_date = date("2024-02-01");
        feb.end_date = date("2024-03-01");
        let table = CostTable::from_items([jan, feb]);

        let range = DateRange::new(date("2024-01-15"), date("2024-02-10")).unwrap();
        let kept = table.within(&range);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.rows()[0].index, 1);
    }

    #[test]
    fn test_to_json_is_readable_back() {
        let table = CostTable::from_items([
            item("Requests-Tier1", dec!(2.50)).with_region("us-east-1").with_tag("team", "data"),
        ]);
        let parsed = CostTable::from_json(&table.to_json()).unwrap();
        assert_eq!(parsed.rows()[0].item, table.rows()[0].item);
    }
}
