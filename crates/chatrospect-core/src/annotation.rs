//! Subjective annotations produced outside the deterministic engine.
//!
//! A hosted language model reports judgments such as sentiment or toxicity
//! using its own `userA`/`userB` labels. [`LlmAnnotation`] is that wire shape;
//! [`SubjectiveAnnotation`] is the typed form the report carries. The
//! conversion between them is the only place the two vocabularies meet:
//! `userA` maps to the primary role and `userB` to the secondary role.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::PerRole;

/// Version of the [`SubjectiveAnnotation`] shape.
pub const ANNOTATION_SCHEMA_VERSION: u32 = 1;

/// Source of subjective annotations for a transcript.
///
/// Implementations own their transport, timeouts and retries; the engine
/// never calls them.
pub trait AnnotationProvider: Send + Sync {
    fn annotate(&self, transcript: &str) -> Result<Option<SubjectiveAnnotation>>;
}

/// Provider used when no annotation service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnnotations;

impl AnnotationProvider for NoAnnotations {
    fn annotate(&self, _transcript: &str) -> Result<Option<SubjectiveAnnotation>> {
        Ok(None)
    }
}

/// Provider returning an annotation obtained ahead of time, e.g. a model
/// response saved next to the chat export.
#[derive(Debug, Clone)]
pub struct PrecomputedAnnotations(pub SubjectiveAnnotation);

impl AnnotationProvider for PrecomputedAnnotations {
    fn annotate(&self, _transcript: &str) -> Result<Option<SubjectiveAnnotation>> {
        Ok(Some(self.0.clone()))
    }
}

/// A quoted message picked out by the annotator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HighlightedMessage {
    pub sender: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
}

/// Toxicity scores (0 to 10).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToxicityScores {
    pub overall: f64,
    pub primary: f64,
    pub secondary: f64,
}

/// Sarcasm assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SarcasmAssessment {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// A ghosting guess made by the annotator. Reported alongside, never in
/// place of, the measured ghosting events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EstimatedGhosting {
    pub ghosted_user: String,
    pub start_date: String,
    pub end_date: String,
    pub duration_days: f64,
}

/// Typed subjective annotations, keyed by role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubjectiveAnnotation {
    pub schema_version: u32,
    pub compliment_count: PerRole<u32>,
    pub interest_level: PerRole<f64>,
    pub mentions_of_exes: PerRole<u32>,
    pub insult_count: PerRole<u32>,
    pub one_sided_conversation_score: f64,
    pub double_text_no_reply_count: PerRole<u32>,
    pub overall_sentiment: PerRole<String>,
    pub positivity_negativity_ratio: PerRole<String>,
    pub toxicity_score: ToxicityScores,
    pub longest_message: Option<HighlightedMessage>,
    pub most_emotional_message: Option<HighlightedMessage>,
    pub quote_of_the_year: Option<String>,
    pub most_used_phrases: Option<PerRole<Vec<String>>>,
    pub ghost_probability_score: Option<f64>,
    pub relationship_summary: Option<String>,
    pub compatibility_score: Option<f64>,
    pub conversation_health_score: Option<f64>,
    pub sarcasm: Option<SarcasmAssessment>,
    pub estimated_ghosting: Vec<EstimatedGhosting>,
}

impl Default for SubjectiveAnnotation {
    fn default() -> Self {
        Self {
            schema_version: ANNOTATION_SCHEMA_VERSION,
            compliment_count: PerRole::default(),
            interest_level: PerRole::default(),
            mentions_of_exes: PerRole::default(),
            insult_count: PerRole::default(),
            one_sided_conversation_score: 0.0,
            double_text_no_reply_count: PerRole::default(),
            overall_sentiment: PerRole::default(),
            positivity_negativity_ratio: PerRole::default(),
            toxicity_score: ToxicityScores::default(),
            longest_message: None,
            most_emotional_message: None,
            quote_of_the_year: None,
            most_used_phrases: None,
            ghost_probability_score: None,
            relationship_summary: None,
            compatibility_score: None,
            conversation_health_score: None,
            sarcasm: None,
            estimated_ghosting: Vec::new(),
        }
    }
}

/// A `userA`/`userB` pair as the model emits it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserPair<T> {
    #[serde(rename = "userA")]
    pub user_a: T,
    #[serde(rename = "userB")]
    pub user_b: T,
}

impl<T> From<UserPair<T>> for PerRole<T> {
    fn from(pair: UserPair<T>) -> Self {
        PerRole::new(pair.user_a, pair.user_b)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmToxicity {
    pub overall: f64,
    #[serde(rename = "userA")]
    pub user_a: f64,
    #[serde(rename = "userB")]
    pub user_b: f64,
}

/// The hosted model's response shape. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmAnnotation {
    pub compliment_count: UserPair<u32>,
    pub ghosting_events: Vec<EstimatedGhosting>,
    pub interest_level: UserPair<f64>,
    pub mentions_of_exes: UserPair<u32>,
    pub insult_count: UserPair<u32>,
    pub one_sided_conversation_score: f64,
    pub double_text_no_reply_count: UserPair<u32>,
    pub overall_sentiment: UserPair<String>,
    pub positivity_negativity_ratio: UserPair<String>,
    pub toxicity_score: LlmToxicity,
    pub longest_message: Option<HighlightedMessage>,
    pub most_emotional_message: Option<HighlightedMessage>,
    pub quote_of_the_year: Option<String>,
    pub most_used_phrases: Option<UserPair<Vec<String>>>,
    pub ghost_probability_score: Option<f64>,
    pub ai_relationship_summary: Option<String>,
    pub compatibility_score: Option<f64>,
    pub conversation_health_score: Option<f64>,
    pub sarcasm_detection: Option<SarcasmAssessment>,
}

impl From<LlmAnnotation> for SubjectiveAnnotation {
    fn from(wire: LlmAnnotation) -> Self {
        Self {
            schema_version: ANNOTATION_SCHEMA_VERSION,
            compliment_count: wire.compliment_count.into(),
            interest_level: PerRole::from(wire.interest_level).map(|v| v.clamp(0.0, 100.0)),
            mentions_of_exes: wire.mentions_of_exes.into(),
            insult_count: wire.insult_count.into(),
            one_sided_conversation_score: wire.one_sided_conversation_score.clamp(0.0, 10.0),
            double_text_no_reply_count: wire.double_text_no_reply_count.into(),
            overall_sentiment: wire.overall_sentiment.into(),
            positivity_negativity_ratio: wire.positivity_negativity_ratio.into(),
            toxicity_score: ToxicityScores {
                overall: wire.toxicity_score.overall.clamp(0.0, 10.0),
                primary: wire.toxicity_score.user_a.clamp(0.0, 10.0),
                secondary: wire.toxicity_score.user_b.clamp(0.0, 10.0),
            },
            longest_message: wire.longest_message.map(relabel_sender),
            most_emotional_message: wire.most_emotional_message.map(relabel_sender),
            quote_of_the_year: wire.quote_of_the_year.filter(|q| !is_not_available(q)),
            most_used_phrases: wire.most_used_phrases.map(PerRole::from),
            ghost_probability_score: wire.ghost_probability_score.map(|v| v.clamp(0.0, 100.0)),
            relationship_summary: wire.ai_relationship_summary,
            compatibility_score: wire.compatibility_score.map(|v| v.clamp(0.0, 100.0)),
            conversation_health_score: wire.conversation_health_score.map(|v| v.clamp(0.0, 10.0)),
            sarcasm: wire.sarcasm_detection,
            estimated_ghosting: wire
                .ghosting_events
                .into_iter()
                .map(|mut event| {
                    event.ghosted_user = role_label(&event.ghosted_user);
                    event
                })
                .collect(),
        }
    }
}

/// Decode a raw model response into the typed annotation.
pub fn from_llm_json(value: serde_json::Value) -> Result<SubjectiveAnnotation> {
    if !value.is_object() {
        return Err(Error::Annotation(
            "annotation payload must be a JSON object".to_string(),
        ));
    }
    let wire: LlmAnnotation = serde_json::from_value(value)?;
    Ok(wire.into())
}

fn relabel_sender(mut message: HighlightedMessage) -> HighlightedMessage {
    message.sender = role_label(&message.sender);
    message
}

/// Translate the model's "User A"/"User B" wording into role names.
fn role_label(label: &str) -> String {
    let squashed: String = label
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    match squashed.as_str() {
        "usera" => "primary".to_string(),
        "userb" => "secondary".to_string(),
        _ => label.to_string(),
    }
}

fn is_not_available(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("n/a") || value.trim().is_empty()
}
