//! Payload normalization: heterogeneous tool output to typed records.
//!
//! The inventory service's tools have returned several shapes over time:
//! a bare list, a `{"dashboards": [...]}` or `{"results": [...]}` wrapper,
//! a single object standing for one record, or any of those JSON-encoded
//! as a string. Everything funnels through [`record_batch`], which never
//! fails: malformed entries are skipped with a warning and the rest of
//! the batch survives.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use ds_protocol::{DashboardRecord, DataPoint};

use crate::error::{GatewayError, GatewayResult};

/// Normalize a raw tool payload into dashboard records.
pub fn record_batch(payload: &Value) -> Vec<DashboardRecord> {
    let decoded;
    let mut payload = match payload {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(value) => {
                decoded = value;
                &decoded
            }
            Err(error) => {
                tracing::warn!(error = %error, "could not parse tool payload as JSON");
                return Vec::new();
            }
        },
        other => other,
    };

    if payload.is_null() {
        return Vec::new();
    }

    // Unwrap historical wrapper keys, "dashboards" before "results".
    if let Value::Object(map) = payload
        && let Some(inner) = map.get("dashboards").or_else(|| map.get("results"))
    {
        payload = inner;
    }

    let items: &[Value] = match payload {
        Value::Array(items) => items,
        single => std::slice::from_ref(single),
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match parse_record(item) {
            Ok(record) => records.push(record),
            Err(error) => {
                tracing::warn!(error = %error, "skipping malformed dashboard entry");
            }
        }
    }
    records
}

/// Normalize one raw entry. Fails only when the entry is not an object
/// or carries neither an id nor a uid; every other field has a default.
pub fn parse_record(item: &Value) -> GatewayResult<DashboardRecord> {
    let Value::Object(map) = item else {
        return Err(GatewayError::Data(format!(
            "dashboard entry is not an object: {item}"
        )));
    };

    // The id has arrived both as a number and a string.
    let id = match map.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };
    let uid = string_field(map, &["uid"]).unwrap_or_default();

    if id.is_empty() && uid.is_empty() {
        return Err(GatewayError::Data(
            "dashboard entry has neither id nor uid".to_string(),
        ));
    }

    let title = string_field(map, &["title"]).unwrap_or_else(|| "Untitled".to_string());
    let updated =
        string_field(map, &["updated", "updatedAt"]).and_then(|raw| parse_timestamp(&raw));
    let folder_title = string_field(map, &["folderTitle", "folder_title", "folderName"]);
    let tags = map
        .get("tags")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    let org_id = int_field(map, &["orgId", "org_id"]).unwrap_or(1);
    let starred = bool_field(map, &["isStarred", "starred"]).unwrap_or(false);

    Ok(DashboardRecord {
        id,
        uid,
        title,
        updated,
        folder_title,
        tags,
        org_id,
        starred,
    })
}

/// Parse the datapoint list of a metrics reply. Strict on purpose: one
/// bad point fails the whole reply, since a silently half-parsed series
/// would corrupt the derived statistics.
pub fn datapoints(payload: &Value) -> GatewayResult<Vec<DataPoint>> {
    let Some(items) = payload.as_array() else {
        return Err(GatewayError::Data(format!(
            "datapoints is not a list: {payload}"
        )));
    };
    let mut points = Vec::with_capacity(items.len());
    for item in items {
        points.push(parse_datapoint(item)?);
    }
    Ok(points)
}

fn parse_datapoint(item: &Value) -> GatewayResult<DataPoint> {
    let Value::Object(map) = item else {
        return Err(GatewayError::Data(format!(
            "datapoint is not an object: {item}"
        )));
    };

    let timestamp = match map.get("timestamp") {
        Some(Value::String(raw)) => parse_timestamp(raw).ok_or_else(|| {
            GatewayError::Data(format!("unparseable datapoint timestamp: {raw}"))
        })?,
        Some(Value::Number(n)) => {
            let secs = n.as_i64().ok_or_else(|| {
                GatewayError::Data(format!("datapoint timestamp is not epoch seconds: {n}"))
            })?;
            DateTime::from_timestamp(secs, 0).ok_or_else(|| {
                GatewayError::Data(format!("datapoint epoch out of range: {secs}"))
            })?
        }
        _ => {
            return Err(GatewayError::Data(format!(
                "datapoint missing timestamp: {item}"
            )));
        }
    };

    let value = map
        .get("value")
        .and_then(Value::as_f64)
        .ok_or_else(|| GatewayError::Data(format!("datapoint missing numeric value: {item}")))?;

    DataPoint::new(timestamp, value).map_err(|e| GatewayError::Data(e.to_string()))
}

fn string_field(map: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str).map(String::from))
}

fn int_field(map: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| map.get(*key).and_then(Value::as_i64))
}

fn bool_field(map: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<bool> {
    keys.iter()
        .find_map(|key| map.get(*key).and_then(Value::as_bool))
}

/// Accepts RFC 3339 (offset or `Z`) or a bare `YYYY-MM-DDTHH:MM:SS`.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
