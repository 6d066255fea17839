//! chatrospect-core: deterministic analytics for two-person chat logs
//!
//! This crate turns a chat export into per-participant metrics: message
//! totals, reply latency, frequent words and emojis, and ghosting intervals.
//! Subjective judgments from an external annotator can be attached to the
//! report but never feed into the measured numbers.

pub mod annotation;
pub mod config;
pub mod error;
pub mod ghosting;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod participants;
pub mod report;
pub mod tokenize;

pub use annotation::{AnnotationProvider, NoAnnotations, SubjectiveAnnotation};
pub use config::{AnalysisConfig, Config};
pub use error::Error;
pub use error::Result;
pub use metrics::{MetricsEngine, MetricsOutcome};
pub use models::{ChatMessage, GhostingEnd, GhostingEvent, PerRole, Report, Role};
pub use normalize::InputFormat;
pub use participants::ParticipantMap;
pub use report::{AnalysisReport, analyze_with};

/// Application name used for config directories and paths.
pub const APP_NAME: &str = "chatrospect";

/// Returns the environment variable prefix for this application.
pub fn env_prefix() -> String {
    "CHATROSPECT".to_string()
}

/// Compute the deterministic report for a message list.
pub fn analyze(messages: &[ChatMessage], config: &AnalysisConfig) -> Report {
    MetricsEngine::new(config).analyze(messages).report
}
