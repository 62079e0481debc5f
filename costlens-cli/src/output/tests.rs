//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

use chrono::NaiveDate;
use costlens_core::{CostTable, LineItem};
use costlens_services::{S3Plugin, ServicePlugin};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{Breakdown, Categorized};

fn s3_table() -> CostTable {
    let row = |month: u32, usage: &str, region: &str, cost: Decimal| {
        let start = NaiveDate::from_ymd_opt(2024, month, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, month + 1, 1).unwrap();
        LineItem::new("Amazon Simple Storage Service", usage, start, end, cost)
            .unwrap()
            .with_region(region)
    };
    CostTable::from_items([
        row(1, "TimedStorage-ByteHrs", "us-east-1", dec!(10.00)),
        row(1, "Requests-Tier1", "us-east-1", dec!(2.50)),
        row(2, "TimedStorage-ByteHrs", "eu-west-1", dec!(1200.00)),
    ])
}

fn categorized(by_period: bool) -> Categorized {
    let plugin = S3Plugin::new();
    let table = s3_table();
    let breakdown = if by_period {
        Breakdown::ByPeriod(plugin.categorize_usage_by_period(&table))
    } else {
        Breakdown::Whole(plugin.categorize_usage(&table))
    };
    Categorized {
        name: plugin.name().to_string(),
        shortname: plugin.shortname().to_string(),
        abbreviation: plugin.abbreviation().to_string(),
        breakdown,
    }
}

#[cfg(test)]
mod text_formatter_tests {
    use super::super::text::TextFormatter;
    use super::*;
    use costlens_core::{Dimension, Selector, cost_report, summarize_by};
    use std::path::Path;

    #[test]
    fn test_format_services_header() {
        let formatter = TextFormatter::new(false);
        let header = formatter.format_services_header();

        assert!(header.contains("Service"));
        assert!(header.contains("Slug"));
        assert!(header.contains("Categories"));
    }

    #[test]
    fn test_format_service_line_lists_categories_once() {
        let formatter = TextFormatter::new(false);
        let line = formatter.format_service_line(&S3Plugin::new());

        assert!(line.contains("amazon-simple-storage-service"));
        assert!(line.contains("Storage, Requests, Data Transfer"));
    }

    #[test]
    fn test_format_whole_rollup() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_categorized(&categorized(false));

        assert!(output.starts_with("S3 (amazon-simple-storage-service)"));
        assert!(output.contains("Storage"));
        assert!(output.contains("Standard"));
        assert!(output.contains("$1,210.00"));
        assert!(output.contains("$2.50"));
        assert!(output.contains("$1,212.50"));
    }

    #[test]
    fn test_format_period_rollups() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_categorized(&categorized(true));

        assert!(output.contains("2024-01-01 .. 2024-02-01"));
        assert!(output.contains("2024-02-01 .. 2024-03-01"));
        // February has no requests but still lists the category.
        assert!(output.contains("$0.00"));
    }

    #[test]
    fn test_format_empty_rollup() {
        let formatter = TextFormatter::new(false);
        let mut result = categorized(false);
        result.breakdown = Breakdown::Whole(costlens_core::Rollup::new());

        assert!(formatter.format_categorized(&result).contains("No usage rows"));
    }

    #[test]
    fn test_format_report() {
        let formatter = TextFormatter::new(false);
        let report = cost_report(&s3_table(), &Dimension::Region, &Selector::Top(1)).unwrap();
        let output = formatter.format_report(&report);
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("Region"));
        assert!(lines[0].contains("2024-01-01"));
        assert!(lines[0].contains("2024-02-01"));
        assert!(lines[2].starts_with("eu-west-1"));
        assert!(lines.last().unwrap().starts_with("Total"));
        assert!(output.contains("$1,212.50") || output.contains("$12.50"));
    }

    #[test]
    fn test_format_summary() {
        let formatter = TextFormatter::new(false);
        let rows = summarize_by(&s3_table(), &[Dimension::UsageType], None);
        let output = formatter.format_summary(&Dimension::UsageType, &rows);

        assert!(output.contains("Requests-Tier1"));
        assert!(output.lines().last().unwrap().contains("$1,212.50"));
    }

    #[test]
    fn test_format_conversion() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_conversion(Path::new("costs.json"), 2, &s3_table());

        assert!(output.contains("2 page(s) into 3 rows over 2 period(s)"));
        assert!(output.ends_with("Wrote costs.json"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::JsonFormatter;
    use super::*;
    use costlens_core::{Dimension, Selector, cost_report};
    use costlens_services::ServiceRegistry;

    #[test]
    fn test_format_compact_json() {
        let formatter = JsonFormatter::new(false);

        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();

        assert_eq!(output, r#"{"key":"value"}"#);
    }

    #[test]
    fn test_single_service_is_object() {
        let formatter = JsonFormatter::new(false);
        let output = formatter.format_categorized(&[categorized(false)]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["shortname"], "amazon-simple-storage-service");
        assert_eq!(parsed["total"], "1212.50");
        assert_eq!(parsed["rows"][0]["category"], "Storage");
        assert_eq!(parsed["unclassified"], false);
        assert!(parsed.get("periods").is_none());
    }

    #[test]
    fn test_several_services_are_array() {
        let formatter = JsonFormatter::new(false);
        let output = formatter
            .format_categorized(&[categorized(false), categorized(true)])
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        let items = parsed.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["periods"].as_array().unwrap().len(), 2);
        assert_eq!(items[1]["periods"][0]["start"], "2024-01-01");
    }

    #[test]
    fn test_format_report() {
        let formatter = JsonFormatter::new(false);
        let report = cost_report(&s3_table(), &Dimension::Region, &Selector::All).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&formatter.format_report(&report).unwrap()).unwrap();

        assert_eq!(parsed["dimension"], "Region");
        assert_eq!(parsed["columns"], serde_json::json!(["2024-01-01", "2024-02-01"]));
        assert_eq!(parsed["total"]["label"], "Total");
        assert_eq!(parsed["total"]["total"], "1212.50");
    }

    #[test]
    fn test_format_services() {
        let formatter = JsonFormatter::new(false);
        let registry = ServiceRegistry::with_builtin();
        let plugins: Vec<_> = registry.all().collect();
        let parsed: serde_json::Value = serde_json::from_str(&formatter.format_services(&plugins).unwrap()).unwrap();

        let items = parsed.as_array().unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0]["abbreviation"], "S3");
        assert_eq!(items[2]["name"], "EC2 - Other");
    }
}
