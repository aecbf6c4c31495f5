//! Intent classification for dashboard queries.
//!
//! Two interchangeable strategies behind one trait: fixed keyword sets
//! (no model call) and delegation to the chat model with sentinel-prefixed
//! replies. Classification never fails; unrecognized input degrades to
//! [`Intent::Unknown`].

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;

use ds_protocol::Intent;

use crate::chat::ChatModel;
use crate::prompts;

/// Phrases that ask for the full inventory. Checked before the filter set,
/// so a query containing both resolves to List.
const LIST_KEYWORDS: &[&str] = &[
    "show all",
    "list",
    "give me",
    "what dashboards",
    "all dashboards",
];

/// Phrases that introduce a filter condition.
const FILTER_KEYWORDS: &[&str] = &["with", "where", "filter", "search", "matching", "related"];

/// Vocabulary that marks a query as dashboard-related.
const CONTEXT_KEYWORDS: &[&str] = &[
    "dashboard",
    "updated",
    "last",
    "created",
    "database",
    "service",
    "api",
    "performance",
    "health",
];

/// Question words that ask about dashboard details.
const INFO_KEYWORDS: &[&str] = &["when", "what", "tell me", "info", "about", "time", "update"];

/// Phrases that mark a model reply as a refusal.
const OUT_OF_SCOPE_PHRASES: &[&str] = &[
    "cannot",
    "can't",
    "not able to",
    "not able",
    "out of scope",
    "i cannot",
    "i can't",
];

static SINGLE_QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'([^']+)'").unwrap());
static DOUBLE_QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]+)""#).unwrap());

/// Maps a raw query to an [`Intent`].
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, query: &str) -> Intent;

    /// Strategy identifier, for logging.
    fn strategy_name(&self) -> &str;
}

/// Keyword-set classifier. First matching set wins.
pub struct HeuristicClassifier;

#[async_trait]
impl IntentClassifier for HeuristicClassifier {
    async fn classify(&self, query: &str) -> Intent {
        let lower = query.to_lowercase();

        if contains_any(&lower, LIST_KEYWORDS) {
            return Intent::List;
        }
        if contains_any(&lower, FILTER_KEYWORDS) {
            return Intent::Filter {
                term: extract_filter_term(query),
            };
        }
        // Info questions must carry dashboard vocabulary, or "what time
        // is it" would land here.
        if contains_any(&lower, CONTEXT_KEYWORDS) && contains_any(&lower, INFO_KEYWORDS) {
            return Intent::GetInfo;
        }
        Intent::Unknown
    }

    fn strategy_name(&self) -> &str {
        "heuristic"
    }
}

/// Delegating classifier. Sends the query with a constraining instruction
/// and parses the reply for sentinel prefixes.
pub struct LlmClassifier {
    model: Arc<dyn ChatModel>,
}

impl LlmClassifier {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl IntentClassifier for LlmClassifier {
    async fn classify(&self, query: &str) -> Intent {
        match self.model.invoke(&prompts::classify_messages(query)).await {
            Ok(reply) => parse_classify_reply(&reply),
            Err(error) => {
                tracing::warn!(error = %error, "classification call failed");
                Intent::Unknown
            }
        }
    }

    fn strategy_name(&self) -> &str {
        "llm"
    }
}

/// Sentinel parsing for delegated classification. An unrecognized reply
/// lists everything rather than failing.
pub fn parse_classify_reply(reply: &str) -> Intent {
    let reply = reply.trim();
    if let Some(term) = reply.strip_prefix("SEARCH:") {
        let term = term.trim();
        if term.is_empty() {
            return Intent::List;
        }
        return Intent::Filter {
            term: term.to_string(),
        };
    }
    if reply.starts_with("OUT_OF_SCOPE:") {
        return Intent::OutOfScope;
    }
    Intent::List
}

/// Substring test on the lowercased reply. False positives on unrelated
/// uses of "cannot" are an accepted limitation.
pub fn is_out_of_scope(reply: &str) -> bool {
    let lower = reply.to_lowercase();
    OUT_OF_SCOPE_PHRASES.iter().any(|p| lower.contains(p))
}

/// Pull the search term out of a filter query.
///
/// Priority order: content of the first matched quote pair, then the words
/// after "with" (minus an "in the name"/"in name" suffix), then the last
/// one or two words, then the whole trimmed query.
pub fn extract_filter_term(query: &str) -> String {
    if let Some(captures) = SINGLE_QUOTED.captures(query) {
        return captures[1].to_string();
    }
    if let Some(captures) = DOUBLE_QUOTED.captures(query) {
        return captures[1].to_string();
    }

    let lower = query.to_lowercase();
    if let Some((_, rest)) = lower.split_once("with") {
        let term = rest.trim();
        let term = term.strip_suffix("in the name").unwrap_or(term);
        let term = term.strip_suffix("in name").unwrap_or(term);
        return term.trim().to_string();
    }

    let words: Vec<&str> = query.split_whitespace().collect();
    if words.len() > 2 {
        return words[words.len() - 2..]
            .join(" ")
            .trim_matches(|c| c == '\'' || c == '"')
            .to_string();
    }
    query.trim().to_string()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatError, MockChatModel};

    async fn heuristic(query: &str) -> Intent {
        HeuristicClassifier.classify(query).await
    }

    // ── Heuristic: list ─────────────────────────────────────────

    #[tokio::test]
    async fn classify_show_all() {
        assert_eq!(heuristic("Show all dashboards").await, Intent::List);
    }

    #[tokio::test]
    async fn classify_what_dashboards() {
        assert_eq!(
            heuristic("What dashboards are available?").await,
            Intent::List
        );
    }

    #[tokio::test]
    async fn list_wins_over_filter() {
        // Contains both "list" and "with"; the list set is checked first.
        assert_eq!(
            heuristic("List dashboards with prod in the name").await,
            Intent::List
        );
    }

    // ── Heuristic: filter ───────────────────────────────────────

    #[tokio::test]
    async fn classify_filter_with_term() {
        assert_eq!(
            heuristic("Show dashboards with prod in the name").await,
            Intent::Filter {
                term: "prod".to_string()
            }
        );
    }

    #[tokio::test]
    async fn classify_filter_quoted() {
        assert_eq!(
            heuristic("show dashboards with \"prod api\" in the name").await,
            Intent::Filter {
                term: "prod api".to_string()
            }
        );
    }

    // ── Heuristic: get_info ─────────────────────────────────────

    #[tokio::test]
    async fn classify_info_question() {
        assert_eq!(
            heuristic("When was the API dashboard updated?").await,
            Intent::GetInfo
        );
    }

    #[tokio::test]
    async fn info_words_alone_are_not_enough() {
        assert_eq!(heuristic("what time is it").await, Intent::Unknown);
    }

    // ── Heuristic: unknown ──────────────────────────────────────

    #[tokio::test]
    async fn classify_unrelated_text() {
        assert_eq!(heuristic("hello there").await, Intent::Unknown);
        assert_eq!(heuristic("deploy the application").await, Intent::Unknown);
    }

    // ── Term extraction ─────────────────────────────────────────

    #[test]
    fn extract_single_quoted() {
        assert_eq!(
            extract_filter_term("show dashboards with 'db perf' in name"),
            "db perf"
        );
    }

    #[test]
    fn extract_double_quoted() {
        assert_eq!(
            extract_filter_term("find dashboards matching \"prod api\""),
            "prod api"
        );
    }

    #[test]
    fn extract_unmatched_quote_falls_through() {
        // A lone quote is not a pair; the "with" split takes over.
        assert_eq!(
            extract_filter_term("dashboards with prod' in the name"),
            "prod'"
        );
    }

    #[test]
    fn extract_with_suffix_stripped() {
        assert_eq!(
            extract_filter_term("Show dashboards with Prod in the name"),
            "prod"
        );
        assert_eq!(extract_filter_term("dashboards with db in name"), "db");
    }

    #[test]
    fn extract_last_two_words() {
        assert_eq!(
            extract_filter_term("search dashboards production cluster"),
            "production cluster"
        );
    }

    #[test]
    fn extract_whole_short_query() {
        assert_eq!(extract_filter_term("search prod"), "search prod");
    }

    // ── Scope guard ─────────────────────────────────────────────

    #[test]
    fn refusals_trip_the_guard() {
        assert!(is_out_of_scope("I cannot analyze metrics for you."));
        assert!(is_out_of_scope("Sorry, that request is OUT OF SCOPE."));
        assert!(is_out_of_scope("I'm not able to help with weather."));
    }

    #[test]
    fn helpful_replies_pass() {
        assert!(!is_out_of_scope("I would retrieve all dashboards."));
        assert!(!is_out_of_scope("OK"));
    }

    // ── Sentinel parsing ────────────────────────────────────────

    #[test]
    fn parse_search_sentinel() {
        assert_eq!(
            parse_classify_reply("SEARCH: prod"),
            Intent::Filter {
                term: "prod".to_string()
            }
        );
        assert_eq!(
            parse_classify_reply("SEARCH: db|data"),
            Intent::Filter {
                term: "db|data".to_string()
            }
        );
    }

    #[test]
    fn parse_empty_search_lists() {
        assert_eq!(parse_classify_reply("SEARCH:"), Intent::List);
        assert_eq!(parse_classify_reply("SEARCH:   "), Intent::List);
    }

    #[test]
    fn parse_out_of_scope_sentinel() {
        assert_eq!(
            parse_classify_reply("OUT_OF_SCOPE: asks about the weather"),
            Intent::OutOfScope
        );
    }

    #[test]
    fn parse_anything_else_lists() {
        assert_eq!(parse_classify_reply("LIST"), Intent::List);
        assert_eq!(parse_classify_reply("here are the dashboards"), Intent::List);
    }

    // ── Delegating strategy ─────────────────────────────────────

    #[tokio::test]
    async fn llm_classifier_parses_reply() {
        let model = Arc::new(MockChatModel::new());
        model.queue_reply("SEARCH: prod");

        let classifier = LlmClassifier::new(model.clone());
        assert_eq!(
            classifier.classify("find prod dashboards").await,
            Intent::Filter {
                term: "prod".to_string()
            }
        );
        assert!(model.prompts()[0].contains("find prod dashboards"));
    }

    #[tokio::test]
    async fn llm_classifier_degrades_to_unknown_on_error() {
        let model = Arc::new(MockChatModel::new());
        model.queue_error(ChatError::Transport("down".to_string()));

        let classifier = LlmClassifier::new(model);
        assert_eq!(classifier.classify("anything").await, Intent::Unknown);
    }
}
