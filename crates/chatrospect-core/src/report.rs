//! Assembling the final analysis report.
//!
//! The deterministic [`Report`] is always present. Subjective annotations are
//! attached when a provider returns them and are kept strictly separate, so a
//! missing or failing provider never changes the measured numbers.

use serde::Serialize;

use crate::annotation::{AnnotationProvider, SubjectiveAnnotation};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::metrics::{MetricsEngine, MetricsOutcome};
use crate::models::{ChatMessage, Report};
use crate::participants::ParticipantMap;

/// Version of the deterministic metrics shape.
pub const METRICS_VERSION: u32 = 1;

/// Metrics plus optional subjective annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub metrics_version: u32,
    pub participants: ParticipantMap,
    pub metrics: Report,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<SubjectiveAnnotation>,
}

/// Combine an engine run with an optional annotation.
pub fn assemble(
    outcome: MetricsOutcome,
    annotations: Option<SubjectiveAnnotation>,
) -> AnalysisReport {
    AnalysisReport {
        metrics_version: METRICS_VERSION,
        participants: outcome.participants,
        metrics: outcome.report,
        annotations,
    }
}

/// Run the engine and ask `provider` for annotations.
///
/// Provider failures are logged and leave `annotations` empty.
pub fn analyze_with(
    messages: &[ChatMessage],
    config: &AnalysisConfig,
    transcript: &str,
    provider: &dyn AnnotationProvider,
) -> Result<AnalysisReport> {
    config.validate()?;
    let outcome = MetricsEngine::new(config).analyze(messages);

    let annotations = match provider.annotate(transcript) {
        Ok(annotations) => annotations,
        Err(e) => {
            tracing::warn!(error = %e, "annotation provider failed; reporting metrics only");
            None
        }
    };

    tracing::info!(
        messages = messages.len(),
        annotated = annotations.is_some(),
        "analysis complete"
    );
    Ok(assemble(outcome, annotations))
}
