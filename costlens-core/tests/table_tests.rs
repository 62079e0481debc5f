//! Integration tests for cost tables and reports.

use chrono::NaiveDate;
use costlens_core::{
    Column, CoreError, CostTable, DateRange, Dimension, LineItem, MAX_COST, Selector, cost_report, slugify,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn monthly(usage: &str, start: &str, end: &str, cost: Decimal) -> LineItem {
    LineItem::new("S3", usage, date(start), date(end), cost).unwrap()
}

#[test]
fn test_split_layout_to_report() {
    let value = json!({
        "columns": ["StartDate", "EndDate", "Service", "Usage_type", "Region", "Cost"],
        "data": [
            ["2024-01-01", "2024-02-01", "Amazon Simple Storage Service", "TimedStorage-ByteHrs", "us-east-1", "10.00"],
            ["2024-01-01", "2024-02-01", "Amazon Elastic Compute Cloud", "BoxUsage:t3.micro", "us-west-2", 7.5],
            ["2024-02-01", "2024-03-01", "Amazon Simple Storage Service", "TimedStorage-ByteHrs", "us-east-1", 11]
        ]
    });

    let table = CostTable::from_json(&value).unwrap();
    assert_eq!(table.total_cost(), dec!(28.5));

    let report = cost_report(&table, &Dimension::Region, &Selector::All).unwrap();
    assert_eq!(report.columns.len(), 2);
    assert_eq!(report.rows[0].label, "us-east-1");
    assert_eq!(report.total.values, vec![dec!(17.5), dec!(11)]);
}

#[test]
fn test_missing_column_is_schema_error() {
    let value = json!([{"StartDate": "2024-01-01", "EndDate": "2024-02-01", "Service": "S3", "Cost": 1}]);
    let err = CostTable::from_json(&value).unwrap_err();
    assert!(err.is_schema_error());
}

#[test]
fn test_slugify_is_stable_for_service_names() {
    assert_eq!(slugify("EC2 - Other"), slugify("EC2 - Other"));
    assert_eq!(slugify("Amazon Elastic File System"), "amazon-elastic-file-system");
}

#[test]
fn test_concat_continues_indices_after_filtered_pages() {
    let first = CostTable::from_items([
        monthly("a", "2024-01-01", "2024-02-01", dec!(1)),
        monthly("b", "2024-01-01", "2024-02-01", dec!(2)),
        monthly("c", "2024-01-01", "2024-02-01", dec!(3)),
    ]);
    // Filtering keeps the original indices 0 and 2 but not the row count.
    let mut kept = first.filter(|item| item.usage_type != "b");

    let second = CostTable::from_items([
        monthly("d", "2024-02-01", "2024-03-01", dec!(4)).with_region("eu-west-1"),
        monthly("e", "2024-02-01", "2024-03-01", dec!(5)),
    ]);
    kept.concat(second);

    let indices: Vec<usize> = kept.rows().iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![0, 2, 3, 4]);
    assert!(kept.schema().has(&Column::Region));
    assert_eq!(kept.total_cost(), dec!(13));

    kept.push(monthly("f", "2024-02-01", "2024-03-01", dec!(6)));
    assert_eq!(kept.rows().last().unwrap().index, 5);
}

#[test]
fn test_within_range_boundaries() {
    let table = CostTable::from_items([
        monthly("dec", "2023-12-01", "2024-01-01", dec!(1)),
        monthly("jan", "2024-01-01", "2024-02-01", dec!(2)),
        monthly("feb", "2024-02-01", "2024-03-01", dec!(4)),
        monthly("mar", "2024-03-01", "2024-04-01", dec!(8)),
    ]);

    // Start is inclusive, end exclusive.
    let range = DateRange::new(date("2024-01-01"), date("2024-03-01")).unwrap();
    let kept = table.within(&range);
    let usages: Vec<&str> = kept.items().map(|i| i.usage_type.as_str()).collect();
    assert_eq!(usages, vec!["jan", "feb"]);

    // A period that starts on the last day in range is kept even though it
    // runs past the end.
    let range = DateRange::new(date("2024-02-15"), date("2024-03-02")).unwrap();
    let kept = table.within(&range);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept.rows()[0].index, 3);

    let range = DateRange::new(date("2025-01-01"), date("2025-02-01")).unwrap();
    assert!(table.within(&range).is_empty());
}

#[test]
fn test_amounts_beyond_limit_are_rejected() {
    let huge = (MAX_COST + dec!(1)).to_string();
    let value = json!([
        {"StartDate": "2024-01-01", "EndDate": "2024-02-01", "Service": "S3", "Usage_type": "a", "Cost": huge},
        {"StartDate": "2024-01-01", "EndDate": "2024-02-01", "Service": "S3", "Usage_type": "b", "Cost": huge}
    ]);
    match CostTable::from_json(&value).unwrap_err() {
        CoreError::InvalidValue { row, column, .. } => {
            assert_eq!(row, 0);
            assert_eq!(column, "Cost");
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = LineItem::new("S3", "a", date("2024-01-01"), date("2024-02-01"), -MAX_COST - dec!(1)).unwrap_err();
    assert!(matches!(err, CoreError::AmountOutOfRange { .. }));
}

#[test]
fn test_totals_at_limit_do_not_overflow() {
    let table = CostTable::from_items(
        (0..1000).map(|i| monthly(&format!("u{i}"), "2024-01-01", "2024-02-01", MAX_COST)),
    );
    assert_eq!(table.total_cost(), MAX_COST * dec!(1000));
}

#[test]
fn test_deserialized_line_item_is_validated() {
    let ok: LineItem = serde_json::from_value(json!({
        "service": "S3", "usage_type": "Requests-Tier1",
        "start_date": "2024-01-01", "end_date": "2024-02-01", "cost": "2.50",
        "tags": {"team": "data"}
    }))
    .unwrap();
    assert_eq!(ok.cost, dec!(2.50));
    assert_eq!(ok.tag("team"), Some("data"));
    assert_eq!(ok.region, None);

    let reversed = serde_json::from_value::<LineItem>(json!({
        "service": "S3", "usage_type": "Requests-Tier1",
        "start_date": "2024-02-01", "end_date": "2024-01-01", "cost": "2.50"
    }));
    let err = reversed.unwrap_err().to_string();
    assert!(err.contains("Invalid date range"), "{err}");
}
