//! Resolution of the two primary participants from raw sender strings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{ChatMessage, Role};

/// Mapping from sender labels to canonical roles.
///
/// The most frequent sender is `primary`, the runner-up `secondary`. Either
/// may be absent for logs with fewer than two senders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantMap {
    pub primary: Option<String>,
    pub secondary: Option<String>,
}

impl ParticipantMap {
    /// Role of a sender, or `None` for senders beyond the top two.
    pub fn role_of(&self, sender: &str) -> Option<Role> {
        if self.primary.as_deref() == Some(sender) {
            Some(Role::Primary)
        } else if self.secondary.as_deref() == Some(sender) {
            Some(Role::Secondary)
        } else {
            None
        }
    }

    /// Sender label behind a role.
    pub fn label(&self, role: Role) -> Option<&str> {
        match role {
            Role::Primary => self.primary.as_deref(),
            Role::Secondary => self.secondary.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none()
    }
}

/// Rank senders by message count and keep the top two.
///
/// Ties keep first-seen order. Blank sender strings cannot be attributed and
/// are not ranked.
pub fn resolve(messages: &[ChatMessage]) -> ParticipantMap {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for message in messages {
        let sender = message.sender.as_str();
        if sender.trim().is_empty() {
            continue;
        }
        match seen.get(sender) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                seen.insert(sender, counts.len());
                counts.push((sender, 1));
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let mut ranked = counts.into_iter().map(|(sender, _)| sender.to_string());
    let map = ParticipantMap {
        primary: ranked.next(),
        secondary: ranked.next(),
    };
    tracing::debug!(
        primary = ?map.primary,
        secondary = ?map.secondary,
        ignored = ranked.count(),
        "resolved participants"
    );
    map
}
