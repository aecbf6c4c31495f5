//! Plain-text rendering of query results and errors.
//!
//! Formatting is pure and deterministic: identical inputs produce
//! byte-identical output, so tests can assert whole strings.

use chrono::SecondsFormat;

use ds_protocol::{DashboardRecord, QueryError};

/// Render a record list. Empty input gets the fixed no-results literal.
pub fn dashboard_list(records: &[DashboardRecord]) -> String {
    if records.is_empty() {
        return "No dashboards found.".to_string();
    }

    let mut lines = vec![format!("Found {} dashboard(s):\n", records.len())];
    for (i, record) in records.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, record.title));
        if let Some(folder) = &record.folder_title {
            lines.push(format!("   Folder: {folder}"));
        }
        lines.push(format!("   Last updated: {}", updated_stamp(record)));
        if !record.tags.is_empty() {
            lines.push(format!("   Tags: {}", record.tags.join(", ")));
        }
        lines.push(String::new());
    }
    lines.join("\n").trim().to_string()
}

/// Fixed literal for a filter that matched nothing.
pub fn empty_filter(term: &str) -> String {
    format!("No dashboards match your criteria: '{term}'")
}

/// Render a metrics-path error: message plus optional suggestion line.
pub fn query_error(error: &QueryError) -> String {
    match &error.suggestion {
        Some(suggestion) => format!("Error: {}\nSuggestion: {suggestion}", error.message),
        None => format!("Error: {}", error.message),
    }
}

fn updated_stamp(record: &DashboardRecord) -> String {
    match &record.updated {
        Some(ts) => ts.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => "unknown".to_string(),
    }
}
