//! Cost Explorer `GetCostAndUsage` responses.
//!
//! Responses are read from saved JSON pages (one page per `NextPageToken`
//! round trip) and flattened into a [`CostTable`]. No requests are made
//! here.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use costlens_core::{CoreError, CostMetric, CostTable, Dimension, LineItem};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::persistence::load_json;

// ============================================================================
// Response Types
// ============================================================================

/// One page of a `GetCostAndUsage` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CostAndUsagePage {
    /// Results per time bucket.
    #[serde(default)]
    pub results_by_time: Vec<ResultByTime>,
    /// Token of the next page, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Results of one time bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultByTime {
    /// Bucket interval.
    pub time_period: Period,
    /// Ungrouped totals, present when the query has no `GroupBy`.
    #[serde(default)]
    pub total: BTreeMap<String, MetricValue>,
    /// Grouped amounts.
    #[serde(default)]
    pub groups: Vec<Group>,
    /// Whether the bucket is still open.
    #[serde(default)]
    pub estimated: bool,
}

/// `TimePeriod` of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Period {
    /// Start date, `YYYY-MM-DD`.
    pub start: String,
    /// End date, exclusive.
    pub end: String,
}

/// One group of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Group {
    /// Group key values, in `GroupBy` order.
    pub keys: Vec<String>,
    /// Amount per requested metric.
    pub metrics: BTreeMap<String, MetricValue>,
}

/// An amount with its unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricValue {
    /// Decimal amount as a string.
    pub amount: String,
    /// Currency, e.g. `USD`.
    #[serde(default)]
    pub unit: String,
}

// ============================================================================
// Loading
// ============================================================================

/// Reads response pages from files, in order.
///
/// A file may hold a single page or an array of pages.
///
/// # Errors
///
/// Returns an error if a file cannot be read or is not a response page.
pub async fn load_pages<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<CostAndUsagePage>, StoreError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PageFile {
        Many(Vec<CostAndUsagePage>),
        One(CostAndUsagePage),
    }

    let mut pages = Vec::new();
    for path in paths {
        match load_json::<PageFile>(path.as_ref()).await? {
            PageFile::Many(many) => pages.extend(many),
            PageFile::One(page) => pages.push(page),
        }
    }

    if let Some(token) = pages.last().and_then(|p| p.next_page_token.as_deref()) {
        warn!(token, "Last page has a NextPageToken; the response may be incomplete");
    }
    debug!(pages = pages.len(), "Loaded Cost Explorer pages");
    Ok(pages)
}

// ============================================================================
// Flattening
// ============================================================================

/// Flattens response pages into one table.
///
/// `group_by` lists the `GroupBy` keys of the query in order (at most two).
/// Tag values lose their `key$` prefix. When the query was not grouped by
/// service, every row gets `service`; when it was not grouped by usage type,
/// the usage type is empty.
///
/// # Errors
///
/// Returns [`CoreError::Schema`] if the service is neither grouped by nor
/// given, and [`CoreError::InvalidData`] for malformed groups or amounts.
pub fn table_from_pages(
    pages: &[CostAndUsagePage],
    group_by: &[Dimension],
    metric: CostMetric,
    service: Option<&str>,
) -> Result<CostTable, CoreError> {
    if group_by.len() > 2 {
        return Err(CoreError::InvalidData(format!(
            "Cost Explorer groups by at most two keys, got {}",
            group_by.len()
        )));
    }
    if !group_by.contains(&Dimension::Service) && service.is_none() {
        return Err(CoreError::missing_column("Service"));
    }

    let mut table = CostTable::default();
    for page in pages {
        let mut items = Vec::new();
        for result in &page.results_by_time {
            let start = parse_date(&result.time_period.start)?;
            let end = parse_date(&result.time_period.end)?;

            if group_by.is_empty() {
                if let Some(value) = result.total.get(metric.as_str()) {
                    let item = LineItem::new(service.unwrap_or_default(), "", start, end, parse_amount(value)?)?;
                    items.push(item);
                }
                continue;
            }

            for group in &result.groups {
                items.push(group_item(group, group_by, metric, service, start, end)?);
            }
        }
        table.concat(CostTable::from_items(items));
    }

    debug!(rows = table.len(), metric = %metric, "Flattened Cost Explorer pages");
    Ok(table)
}

fn group_item(
    group: &Group,
    group_by: &[Dimension],
    metric: CostMetric,
    service: Option<&str>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<LineItem, CoreError> {
    if group.keys.len() != group_by.len() {
        return Err(CoreError::InvalidData(format!(
            "Group has {} keys, expected {}",
            group.keys.len(),
            group_by.len()
        )));
    }

    let value = group
        .metrics
        .get(metric.as_str())
        .ok_or_else(|| CoreError::InvalidData(format!("Group is missing metric {metric}")))?;

    let mut item = LineItem::new(service.unwrap_or_default(), "", start, end, parse_amount(value)?)?;
    for (dim, key) in group_by.iter().zip(&group.keys) {
        match dim {
            Dimension::Service => item.service.clone_from(key),
            Dimension::UsageType => item.usage_type.clone_from(key),
            Dimension::Region => item.region = Some(key.clone()),
            Dimension::Tag(tag) => {
                let prefix = format!("{tag}$");
                let value = key.strip_prefix(&prefix).unwrap_or(key);
                item.tags.insert(tag.clone(), value.to_string());
            }
        }
    }
    Ok(item)
}

fn parse_date(value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| CoreError::InvalidData(format!("Invalid date {value:?}: {e}")))
}

fn parse_amount(value: &MetricValue) -> Result<Decimal, CoreError> {
    Decimal::from_str(&value.amount)
        .or_else(|_| Decimal::from_scientific(&value.amount))
        .map_err(|e| CoreError::InvalidData(format!("Invalid amount {:?}: {e}", value.amount)))
}
