//! Silence-gap ("ghosting") detection.
//!
//! A participant ghosts the other when a message from the other side goes
//! unanswered for longer than the threshold. The wait is measured from the
//! first unanswered message; the reported interval starts at the silent
//! participant's last activity and ends when they write again, or is
//! `Ongoing` when the log ends first.

use chrono::{DateTime, Duration, Utc};

use crate::models::{GhostingEnd, GhostingEvent, PerRole, Role};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Streaming detector fed with timed messages in chronological order.
#[derive(Debug, Clone)]
pub struct GhostingDetector {
    threshold: Duration,
    last_sent: PerRole<Option<DateTime<Utc>>>,
    /// First message from the other side still waiting for this role's reply.
    awaiting_reply: PerRole<Option<DateTime<Utc>>>,
    log_end: Option<DateTime<Utc>>,
    events: Vec<GhostingEvent>,
}

impl GhostingDetector {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            last_sent: PerRole::default(),
            awaiting_reply: PerRole::default(),
            log_end: None,
            events: Vec::new(),
        }
    }

    /// Record a message sent by `role` at `at`.
    pub fn observe(&mut self, role: Role, at: DateTime<Utc>) {
        if let Some(waiting_since) = self.awaiting_reply.get_mut(role).take() {
            if at - waiting_since > self.threshold {
                let start = self.last_sent.get(role).unwrap_or(waiting_since);
                self.push_event(role, start, GhostingEnd::At(at), at);
            }
        }

        let other = role.other();
        self.awaiting_reply.get_mut(other).get_or_insert(at);
        *self.last_sent.get_mut(role) = Some(at);
        self.log_end = Some(self.log_end.map_or(at, |end| end.max(at)));
    }

    /// Close open silences and return all events ordered by start.
    ///
    /// Only roles with a resolved sender can be silent; a log with a single
    /// participant never reports ghosting.
    pub fn finish(mut self, present: PerRole<bool>) -> Vec<GhostingEvent> {
        if let Some(log_end) = self.log_end {
            for role in [Role::Primary, Role::Secondary] {
                if !*present.get(role) {
                    continue;
                }
                if let Some(waiting_since) = *self.awaiting_reply.get(role) {
                    if log_end - waiting_since > self.threshold {
                        let start = self.last_sent.get(role).unwrap_or(waiting_since);
                        self.push_event(role, start, GhostingEnd::Ongoing, log_end);
                    }
                }
            }
        }

        // Stable: events sharing a start keep detection order.
        self.events.sort_by_key(|event| event.start_timestamp);
        self.events
    }

    fn push_event(
        &mut self,
        silent: Role,
        start: DateTime<Utc>,
        end: GhostingEnd,
        measured_to: DateTime<Utc>,
    ) {
        let event = GhostingEvent {
            ghosted_role: silent.other(),
            silent_role: silent,
            start_timestamp: start,
            end_timestamp: end,
            duration_days: duration_days(measured_to - start),
        };
        tracing::debug!(
            silent = %event.silent_role,
            start = %event.start_timestamp,
            days = event.duration_days,
            "ghosting detected"
        );
        self.events.push(event);
    }
}

#[expect(clippy::cast_precision_loss)]
fn duration_days(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
}

#[cfg(test)]
#[path = "ghosting_tests.rs"]
mod tests;
