//! The deterministic metrics engine.
//!
//! One run resolves the participants, orders the messages chronologically
//! and makes a single pass that feeds a run-scoped [`MetricsAccumulator`].
//! Nothing survives between runs, so an engine can be shared freely.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::ghosting::GhostingDetector;
use crate::models::{ChatMessage, PerRole, Report, Role, WordCount};
use crate::participants::{self, ParticipantMap};
use crate::tokenize::{self, StopWords};

/// Reusable, immutable engine settings.
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    stop_words: StopWords,
    top_words: usize,
    top_emojis: usize,
    ghosting_threshold: Duration,
}

/// Result of one engine run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsOutcome {
    pub participants: ParticipantMap,
    pub report: Report,
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl MetricsEngine {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            stop_words: StopWords::with_extra(&config.extra_stop_words),
            top_words: config.top_words,
            top_emojis: config.top_emojis,
            ghosting_threshold: config.ghosting_threshold(),
        }
    }

    /// Compute the report for one chat log. Never fails.
    pub fn analyze(&self, messages: &[ChatMessage]) -> MetricsOutcome {
        let participants = participants::resolve(messages);
        let mut acc = MetricsAccumulator::new(self.ghosting_threshold);
        let mut untimed = 0usize;

        for (message, timestamp) in chronological(messages) {
            let Some(role) = participants.role_of(&message.sender) else {
                continue;
            };
            if timestamp.is_none() {
                untimed += 1;
            }
            acc.record(role, timestamp, message, &self.stop_words);
        }

        if untimed > 0 {
            tracing::warn!(
                count = untimed,
                "messages without a parseable timestamp were left out of latency and ghosting"
            );
        }

        let present = PerRole::new(
            participants.primary.is_some(),
            participants.secondary.is_some(),
        );
        let report = acc.finish(present, self.top_words, self.top_emojis);
        tracing::debug!(
            primary = report.total_messages.primary,
            secondary = report.total_messages.secondary,
            ghosting = report.ghosting_events.len(),
            "metrics computed"
        );

        MetricsOutcome {
            participants,
            report,
        }
    }
}

type Timed<'a> = (&'a ChatMessage, Option<DateTime<Utc>>);

/// Pair every message with its parsed timestamp and order the log by time.
///
/// Untimed messages inherit the sort key of the closest timed message before
/// them, so they stay next to their neighbours; leading untimed messages sort
/// first. The sort is stable, so equal keys keep input order.
fn chronological(messages: &[ChatMessage]) -> Vec<Timed<'_>> {
    let mut carried: Option<DateTime<Utc>> = None;
    let mut keyed: Vec<(Option<DateTime<Utc>>, Timed<'_>)> = messages
        .iter()
        .map(|message| {
            let timestamp = message.parsed_timestamp();
            if timestamp.is_some() {
                carried = timestamp;
            }
            (carried, (message, timestamp))
        })
        .collect();

    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, timed)| timed).collect()
}

/// Per-run mutable state; owned by one [`MetricsEngine::analyze`] call.
#[derive(Debug)]
pub struct MetricsAccumulator {
    roles: PerRole<RoleTally>,
    last_timestamp: Option<DateTime<Utc>>,
    last_role: Option<Role>,
    ghosting: GhostingDetector,
}

#[derive(Debug, Default)]
struct RoleTally {
    messages: usize,
    latencies: Vec<f64>,
    words: FrequencyTable,
    emojis: FrequencyTable,
}

impl MetricsAccumulator {
    pub fn new(ghosting_threshold: Duration) -> Self {
        Self {
            roles: PerRole::default(),
            last_timestamp: None,
            last_role: None,
            ghosting: GhostingDetector::new(ghosting_threshold),
        }
    }

    /// Fold one attributed message into the running totals.
    ///
    /// Untimed messages still count toward totals, words and emojis.
    pub fn record(
        &mut self,
        role: Role,
        timestamp: Option<DateTime<Utc>>,
        message: &ChatMessage,
        stop_words: &StopWords,
    ) {
        let tally = self.roles.get_mut(role);
        tally.messages += 1;
        for word in tokenize::tokenize(&message.text, stop_words) {
            tally.words.increment(word);
        }
        for emoji in tokenize::extract_emojis(&message.text) {
            tally.emojis.increment(emoji);
        }

        let Some(at) = timestamp else {
            return;
        };

        if let (Some(last_at), Some(last_role)) = (self.last_timestamp, self.last_role) {
            if last_role != role && last_at <= at {
                let seconds = latency_seconds(at - last_at);
                self.roles.get_mut(role).latencies.push(seconds);
            }
        }
        self.last_timestamp = Some(at);
        self.last_role = Some(role);

        self.ghosting.observe(role, at);
    }

    /// Reduce the accumulated state to a report.
    pub fn finish(self, present: PerRole<bool>, top_words: usize, top_emojis: usize) -> Report {
        let ghosting_events = self.ghosting.finish(present);
        let tallies = self.roles;

        Report {
            total_messages: PerRole::new(tallies.primary.messages, tallies.secondary.messages),
            average_response_time: PerRole::new(
                mean(&tallies.primary.latencies),
                mean(&tallies.secondary.latencies),
            ),
            frequent_words: PerRole::new(
                word_counts(&tallies.primary.words, top_words),
                word_counts(&tallies.secondary.words, top_words),
            ),
            frequent_emojis: PerRole::new(
                tallies.primary.emojis.top_keys(top_emojis),
                tallies.secondary.emojis.top_keys(top_emojis),
            ),
            ghosting_events,
        }
    }
}

#[expect(clippy::cast_precision_loss)]
fn latency_seconds(delta: Duration) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}

#[expect(clippy::cast_precision_loss)]
fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

fn word_counts(table: &FrequencyTable, n: usize) -> Vec<WordCount> {
    table
        .top(n)
        .into_iter()
        .map(|(word, count)| WordCount {
            word: word.to_string(),
            count,
        })
        .collect()
}

/// Insertion-ordered counter; ranking ties keep first-insertion order.
#[derive(Debug, Default, Clone)]
pub struct FrequencyTable {
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl FrequencyTable {
    pub fn increment(&mut self, key: String) {
        if let Some(&idx) = self.index.get(&key) {
            self.entries[idx].1 += 1;
        } else {
            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, 1));
        }
    }

    pub fn get(&self, key: &str) -> usize {
        self.index.get(key).map_or(0, |&idx| self.entries[idx].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `n` most frequent entries, highest count first.
    pub fn top(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .entries
            .iter()
            .map(|(key, count)| (key.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    pub fn top_keys(&self, n: usize) -> Vec<String> {
        self.top(n)
            .into_iter()
            .map(|(key, _)| key.to_string())
            .collect()
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
