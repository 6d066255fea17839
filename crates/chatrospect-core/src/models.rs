//! Domain models shared by the normalizer, the metrics engine and the report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A normalized chat message as handed to the metrics engine.
///
/// The timestamp is kept as text; the engine parses it and treats an
/// unparseable value as "untimed" instead of failing. When decoding, a null
/// or non-string timestamp or text is accepted: scalars are stringified,
/// anything else becomes empty. Only `sender` must be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: String,
    #[serde(deserialize_with = "lenient_string")]
    pub sender: String,
    #[serde(default, alias = "message", deserialize_with = "lenient_string")]
    pub text: String,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(text)) => text,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        Some(_) | None => String::new(),
    })
}

impl ChatMessage {
    pub fn new(
        timestamp: impl Into<String>,
        sender: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            sender: sender.into(),
            text: text.into(),
        }
    }

    /// Parsed timestamp, if the text is a recognizable point in time.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

/// Parse a timestamp string to UTC.
///
/// RFC 3339 is tried first; anything else goes through `dateparser`, with
/// zone-less values read as UTC. Values without a full calendar date are
/// rejected: `dateparser` would fill in today's date or year.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if !has_full_date(value) {
        return None;
    }
    dateparser::parse_with_timezone(value, &Utc).ok()
}

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Year, month and day all present: either three numeric fields joined by
/// `-`, `/` or `.`, or a month name next to a four-digit year.
fn has_full_date(value: &str) -> bool {
    let tokens: Vec<&str> = value
        .split(|c: char| c.is_whitespace() || c == ',' || c == 'T')
        .filter(|t| !t.is_empty())
        .collect();

    let numeric = tokens.iter().any(|token| {
        ['-', '/', '.'].iter().any(|sep| {
            let fields: Vec<&str> = token.split(*sep).take(3).collect();
            fields.len() == 3
                && fields
                    .iter()
                    .all(|f| !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()))
        })
    });
    if numeric {
        return true;
    }

    let month = tokens.iter().any(|token| {
        let lower = token.to_ascii_lowercase();
        lower.len() >= 3
            && lower.chars().all(|c| c.is_ascii_alphabetic())
            && MONTHS.iter().any(|m| lower.starts_with(m))
    });
    let year = tokens
        .iter()
        .any(|token| token.len() == 4 && token.chars().all(|c| c.is_ascii_digit()));
    month && year
}

/// Canonical participant roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Primary,
    Secondary,
}

impl Role {
    /// The other participant.
    pub fn other(self) -> Self {
        match self {
            Role::Primary => Role::Secondary,
            Role::Secondary => Role::Primary,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Primary => write!(f, "primary"),
            Role::Secondary => write!(f, "secondary"),
        }
    }
}

/// A value held once per role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerRole<T> {
    pub primary: T,
    pub secondary: T,
}

impl<T> PerRole<T> {
    pub fn new(primary: T, secondary: T) -> Self {
        Self { primary, secondary }
    }

    pub fn get(&self, role: Role) -> &T {
        match role {
            Role::Primary => &self.primary,
            Role::Secondary => &self.secondary,
        }
    }

    pub fn get_mut(&mut self, role: Role) -> &mut T {
        match role {
            Role::Primary => &mut self.primary,
            Role::Secondary => &mut self.secondary,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> PerRole<U> {
        PerRole {
            primary: f(self.primary),
            secondary: f(self.secondary),
        }
    }
}

/// A ranked vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Where a ghosting interval ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostingEnd {
    /// The silent participant wrote again at this instant.
    At(DateTime<Utc>),
    /// The log ends before the silence is broken.
    Ongoing,
}

const ONGOING: &str = "Ongoing";

impl Serialize for GhostingEnd {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GhostingEnd::At(dt) => dt.serialize(serializer),
            GhostingEnd::Ongoing => serializer.serialize_str(ONGOING),
        }
    }
}

impl<'de> Deserialize<'de> for GhostingEnd {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.eq_ignore_ascii_case(ONGOING) {
            return Ok(GhostingEnd::Ongoing);
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| GhostingEnd::At(dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}

/// A silence interval longer than the ghosting threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GhostingEvent {
    /// The participant left waiting for a reply.
    pub ghosted_role: Role,
    /// The participant that went quiet.
    pub silent_role: Role,
    /// End of the silent participant's last activity.
    pub start_timestamp: DateTime<Utc>,
    pub end_timestamp: GhostingEnd,
    pub duration_days: f64,
}

/// Deterministic metrics for one chat log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub total_messages: PerRole<usize>,
    /// Mean reply latency in seconds.
    pub average_response_time: PerRole<f64>,
    pub frequent_words: PerRole<Vec<WordCount>>,
    pub frequent_emojis: PerRole<Vec<String>>,
    pub ghosting_events: Vec<GhostingEvent>,
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
