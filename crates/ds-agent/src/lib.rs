//! Natural-language query agent over the dashboard inventory.
//!
//! The orchestrator answers dashboard questions (scope guard, intent
//! classification, retrieval, deterministic formatting) and the metrics
//! pipeline answers quantitative questions (parse, execute, format).
//! Chat model access is behind the [`chat::ChatModel`] trait so tests
//! and the two supported providers plug in interchangeably.

pub mod chat;
pub mod classify;
pub mod config;
pub mod format;
pub mod metrics;
pub mod orchestrator;
pub mod prompts;
pub mod timerange;

// Re-export key types for convenience
pub use chat::{build_chat_model, ChatModel, LlmConfig, MockChatModel};
pub use classify::{HeuristicClassifier, IntentClassifier, LlmClassifier};
pub use config::{AgentConfig, ClassifierStrategy};
pub use metrics::MetricsPipeline;
pub use orchestrator::{QueryOrchestrator, UnknownIntentPolicy};
pub use timerange::TimeRangeResolver;
