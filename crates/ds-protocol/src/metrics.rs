use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryErrorKind};

/// Absolute UTC window. Invariant: start <= end, checked at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, QueryError> {
        if start > end {
            return Err(QueryError::new(
                QueryErrorKind::InvalidTimeRange,
                format!("time range start {start} is after end {end}"),
            ));
        }
        Ok(Self { start, end })
    }
}

/// How datapoints are aggregated by the remote metrics tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Avg,
    Max,
    Min,
    Sum,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Avg => "avg",
            Aggregation::Max => "max",
            Aggregation::Min => "min",
            Aggregation::Sum => "sum",
        }
    }
}

/// A parsed metrics question, immutable once built.
///
/// The metric name is canonicalized (trimmed, lowercased, spaces to
/// underscores) so "CPU Usage" and "cpu_usage" are the same query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsQuery {
    pub metric_name: String,
    pub time_range: TimeRange,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub filters: HashMap<String, String>,
    /// Extraction confidence in [0, 1], clamped at construction.
    pub confidence: f64,
}

impl MetricsQuery {
    pub fn new(metric_name: impl Into<String>, time_range: TimeRange) -> Result<Self, QueryError> {
        let metric_name = canonical_metric_name(&metric_name.into());
        if metric_name.is_empty() {
            return Err(QueryError::new(
                QueryErrorKind::InvalidQuery,
                "metric name cannot be empty",
            ));
        }
        Ok(Self {
            metric_name,
            time_range,
            aggregation: Aggregation::default(),
            filters: HashMap::new(),
            confidence: 1.0,
        })
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_filters(mut self, filters: HashMap<String, String>) -> Self {
        self.filters = filters;
        self
    }

    /// Argument object for the remote metrics tool.
    pub fn to_tool_args(&self) -> serde_json::Value {
        serde_json::json!({
            "metric_name": self.metric_name,
            "start_time": self.time_range.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            "end_time": self.time_range.end.to_rfc3339_opts(SecondsFormat::Secs, true),
            "aggregation": self.aggregation.as_str(),
            "filters": self.filters,
        })
    }
}

fn canonical_metric_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// One measurement. Invariant: value is finite (no NaN, no infinities).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl DataPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Result<Self, QueryError> {
        if !value.is_finite() {
            return Err(QueryError::new(
                QueryErrorKind::InvalidQuery,
                format!("Data point value must be finite, got {value}"),
            ));
        }
        Ok(Self { timestamp, value })
    }
}

/// Minimal statistics over a datapoint sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub sum: f64,
    pub count: usize,
}

impl AggregationStats {
    /// None for an empty sequence. Deterministic: the same points always
    /// produce the same statistics.
    pub fn compute(points: &[DataPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut values: Vec<f64> = points.iter().map(|p| p.value).collect();
        values.sort_by(f64::total_cmp);
        let count = values.len();
        let sum: f64 = values.iter().sum();
        let mean = sum / count as f64;
        let median = if count % 2 == 1 {
            values[count / 2]
        } else {
            (values[count / 2 - 1] + values[count / 2]) / 2.0
        };
        Some(Self {
            min: values[0],
            max: values[count - 1],
            mean,
            median,
            sum,
            count,
        })
    }
}

/// Result of one metrics query.
///
/// Datapoints are sorted ascending by timestamp at construction, never
/// assumed sorted from the source. When no statistics are supplied and
/// the sequence is non-empty, minimal statistics are derived here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsQueryResult {
    pub metric_name: String,
    pub unit: String,
    pub time_range: TimeRange,
    pub datapoints: Vec<DataPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation_applied: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<AggregationStats>,
    pub datapoint_count: usize,
    pub is_empty: bool,
}

impl MetricsQueryResult {
    pub fn new(
        metric_name: impl Into<String>,
        unit: impl Into<String>,
        time_range: TimeRange,
        mut datapoints: Vec<DataPoint>,
        aggregation_applied: Option<String>,
        statistics: Option<AggregationStats>,
    ) -> Self {
        datapoints.sort_by_key(|p| p.timestamp);
        let statistics = statistics.or_else(|| AggregationStats::compute(&datapoints));
        let datapoint_count = datapoints.len();
        Self {
            metric_name: metric_name.into(),
            unit: unit.into(),
            time_range,
            datapoints,
            aggregation_applied,
            statistics,
            datapoint_count,
            is_empty: datapoint_count == 0,
        }
    }

    /// Four-line text summary, or the fixed no-data message when empty.
    pub fn summary(&self) -> String {
        match (&self.statistics, self.is_empty) {
            (Some(stats), false) => format!(
                "{} - {} data points\n  Range: {:.2} to {:.2} {}\n  Average: {:.2} {}\n  Time: {} to {}",
                self.metric_name,
                self.datapoint_count,
                stats.min,
                stats.max,
                self.unit,
                stats.mean,
                self.unit,
                self.time_range.start.to_rfc3339_opts(SecondsFormat::Secs, true),
                self.time_range.end.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            _ => format!(
                "No data available for {} in the specified time range.",
                self.metric_name
            ),
        }
    }
}
