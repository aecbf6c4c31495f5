//! Prompt templates for the chat model.
//!
//! Placeholders (`{question}`, `{current_time}`, `{relative_expr}`) are
//! spliced by the message builders below, never by callers.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::chat::ChatMessage;

/// Constrains the model to dashboard retrieval and elicits an explicit
/// refusal for anything else. The refusal wording is what the scope guard
/// looks for.
pub const SCOPE_PROMPT: &str = r#"You are an assistant that helps engineers retrieve information about Grafana dashboards.

YOUR CAPABILITIES:
- List all available dashboards in the organization
- Search/filter dashboards by name or tags
- Retrieve dashboard metadata (title, last updated, tags, folder)

YOUR CONSTRAINTS:
- You CANNOT analyze metrics, detect anomalies, or explain metric behavior
- You CANNOT make recommendations or provide predictions
- You CANNOT modify dashboards or create new ones
- You only retrieve and display data exactly as stored in Grafana

TASK:
1. Understand what the user is asking
2. Determine if the request is within your capabilities
3. If YES: reply with a short confirmation of what you would retrieve
4. If NO: explain that you cannot help with that and what you can do instead

Return ONLY the response for the user (no reasoning, no markdown formatting)."#;

/// Instruction for the delegated classification strategy. The reply is
/// parsed for the SEARCH:/OUT_OF_SCOPE: sentinels; anything else lists.
pub const CLASSIFY_PROMPT: &str = r#"You classify questions about Grafana dashboards.

If the user wants dashboards filtered by name, folder, or tag, reply with exactly:
SEARCH: <keyword>
Use one or two short keywords. Separate alternatives with | when the user names several.

If the question is not about Grafana dashboards at all, reply with exactly:
OUT_OF_SCOPE: <one short reason>

For any other dashboard question (listing, counting, availability), reply with exactly:
LIST"#;

const METRICS_PARSE_PROMPT: &str = r#"You are a metrics query parser. Extract the metric name and time range from a user question.

Known metrics (with aliases):
- cpu_usage: ["cpu", "cpu usage", "cpu load", "cpu utilization", "processor usage"]
- memory_usage: ["memory", "memory usage", "memory utilization", "RAM", "ram usage"]
- request_latency: ["latency", "request latency", "response time", "lag"]
- disk_usage: ["disk", "disk usage", "disk space", "storage"]
- network_throughput: ["network", "throughput", "bandwidth", "network traffic"]

User Question: {question}

Respond with ONLY a JSON object (no markdown, no explanations), with exactly these fields:
- metric_name: Canonical metric name from the list above (string, lowercase with underscores)
- relative_time_range: How far back to look (string like "last 1 hour", "yesterday", "past 7 days")

Examples:
- "Show CPU usage for the last hour" -> {"metric_name": "cpu_usage", "relative_time_range": "last 1 hour"}
- "Memory utilization yesterday" -> {"metric_name": "memory_usage", "relative_time_range": "yesterday"}
- "Request latency today" -> {"metric_name": "request_latency", "relative_time_range": "today"}

JSON:"#;

const TIME_RANGE_PROMPT: &str = r#"You are a time range converter. Convert a relative time expression to an absolute ISO datetime range.

Current Time: {current_time}
Relative Expression: {relative_expr}

Respond with ONLY a JSON object (no markdown, no explanations), with exactly these fields:
- start_time: ISO 8601 datetime string (UTC)
- end_time: ISO 8601 datetime string (UTC)

Examples:
- Current: 2026-01-21 14:30:00 UTC, Expression: "last 1 hour" -> {"start_time": "2026-01-21T13:30:00Z", "end_time": "2026-01-21T14:30:00Z"}
- Current: 2026-01-21 14:30:00 UTC, Expression: "today" -> {"start_time": "2026-01-21T00:00:00Z", "end_time": "2026-01-21T23:59:59Z"}
- Current: 2026-01-21 14:30:00 UTC, Expression: "yesterday" -> {"start_time": "2026-01-20T00:00:00Z", "end_time": "2026-01-20T23:59:59Z"}
- Current: 2026-01-21 14:30:00 UTC, Expression: "past 7 days" -> {"start_time": "2026-01-14T14:30:00Z", "end_time": "2026-01-21T14:30:00Z"}

JSON:"#;

/// Messages for the scope judgment call.
pub fn scope_messages(query: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SCOPE_PROMPT),
        ChatMessage::user(query),
    ]
}

/// Messages for the delegated classification call.
pub fn classify_messages(query: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(CLASSIFY_PROMPT),
        ChatMessage::user(query),
    ]
}

/// Message for metric-name and time-range extraction.
pub fn metrics_parse_messages(question: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(
        METRICS_PARSE_PROMPT.replace("{question}", question),
    )]
}

/// Message for relative-to-absolute time conversion.
pub fn time_range_messages(expression: &str, now: DateTime<Utc>) -> Vec<ChatMessage> {
    let current_time = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    vec![ChatMessage::user(
        TIME_RANGE_PROMPT
            .replace("{current_time}", &current_time)
            .replace("{relative_expr}", expression),
    )]
}
