//! Query orchestration: scope guard, then classify, retrieve, format.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use uuid::Uuid;

use ds_gateway::{DashboardGateway, GatewayError};
use ds_protocol::{DashboardRecord, ErrorCode, Intent, QueryOutcome};

use crate::chat::ChatModel;
use crate::classify::{self, IntentClassifier};
use crate::format;
use crate::prompts;

/// What to do with queries the classifier could not place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownIntentPolicy {
    /// When in doubt, list everything.
    List,
    /// Reject with guidance instead of guessing.
    Guidance,
}

/// Drives a dashboard query end to end. Every path terminates in a
/// [`QueryOutcome`], including model failures and timeouts.
pub struct QueryOrchestrator {
    model: Arc<dyn ChatModel>,
    classifier: Arc<dyn IntentClassifier>,
    gateway: Arc<DashboardGateway>,
    unknown_policy: UnknownIntentPolicy,
    timeout: Duration,
}

impl QueryOrchestrator {
    pub fn new(
        model: Arc<dyn ChatModel>,
        classifier: Arc<dyn IntentClassifier>,
        gateway: Arc<DashboardGateway>,
        unknown_policy: UnknownIntentPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            model,
            classifier,
            gateway,
            unknown_policy,
            timeout,
        }
    }

    /// Answer one query. Never panics, never returns an error: failure
    /// modes are encoded in the outcome itself.
    pub async fn ask(&self, query: &str) -> QueryOutcome {
        let query = query.trim();
        if query.is_empty() {
            tracing::warn!("empty query rejected");
            return QueryOutcome::invalid(ErrorCode::EmptyQuery);
        }

        let query_id = Uuid::now_v7();
        tracing::info!(%query_id, query = %log_snippet(query), "query received");

        let outcome = match tokio::time::timeout(self.timeout, self.run(query)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!(%query_id, "query timed out");
                QueryOutcome::error(ErrorCode::Timeout)
            }
        };

        tracing::info!(%query_id, status = outcome.status.as_str(), "query finished");
        outcome
    }

    async fn run(&self, query: &str) -> QueryOutcome {
        // The scope guard runs before classification so a refusal keeps
        // the model's own wording instead of a canned message.
        let scope_reply = match self.model.invoke(&prompts::scope_messages(query)).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, "scope check failed");
                return QueryOutcome::error(ErrorCode::InternalError);
            }
        };
        if classify::is_out_of_scope(&scope_reply) {
            tracing::info!("query declined as out of scope");
            return QueryOutcome::out_of_scope(scope_reply);
        }

        let intent = self.classifier.classify(query).await;
        tracing::info!(
            intent = intent.name(),
            strategy = self.classifier.strategy_name(),
            "intent classified"
        );

        match intent {
            Intent::List => self.list(Intent::List).await,
            Intent::Unknown => match self.unknown_policy {
                UnknownIntentPolicy::List => self.list(Intent::Unknown).await,
                UnknownIntentPolicy::Guidance => {
                    QueryOutcome::invalid(ErrorCode::InvalidQuery).with_intent(Intent::Unknown)
                }
            },
            Intent::Filter { term } => self.filter(term).await,
            Intent::GetInfo => self.get_info(query).await,
            // A delegated classifier can flag scope on its own; the scope
            // reply already passed the guard, so fall back to the fixed
            // message rather than echoing it.
            Intent::OutOfScope => {
                QueryOutcome::out_of_scope(ErrorCode::OutOfScope.user_message())
            }
        }
    }

    async fn list(&self, intent: Intent) -> QueryOutcome {
        match self.gateway.list_dashboards().await {
            Ok(records) => success(records, intent),
            Err(error) => gateway_failure(error, intent),
        }
    }

    async fn filter(&self, term: String) -> QueryOutcome {
        let result = if term.contains('|') {
            self.gateway.search_multi(&term).await
        } else {
            self.gateway.search_dashboards(&term).await
        };
        let intent = Intent::Filter { term: term.clone() };
        match result {
            Ok(records) if records.is_empty() => {
                QueryOutcome::success(format::empty_filter(&term), intent, records)
            }
            Ok(records) => success(records, intent),
            Err(error) => gateway_failure(error, intent),
        }
    }

    /// Info questions retrieve the dashboards they mention; the listing
    /// itself carries the update timestamps the user asked about.
    async fn get_info(&self, query: &str) -> QueryOutcome {
        let term = classify::extract_filter_term(query);
        let result = if term.is_empty() {
            self.gateway.list_dashboards().await
        } else {
            self.gateway.search_dashboards(&term).await
        };
        match result {
            Ok(records) => success(records, Intent::GetInfo),
            Err(error) => gateway_failure(error, Intent::GetInfo),
        }
    }
}

fn success(records: Vec<DashboardRecord>, intent: Intent) -> QueryOutcome {
    QueryOutcome::success(format::dashboard_list(&records), intent, records)
}

fn gateway_failure(error: GatewayError, intent: Intent) -> QueryOutcome {
    tracing::error!(error = %error, intent = intent.name(), "dashboard retrieval failed");
    QueryOutcome::error(error.error_code()).with_intent(intent)
}

fn log_snippet(query: &str) -> String {
    query.chars().take(100).collect()
}
