//! Turning raw chat exports into [`ChatMessage`] sequences.
//!
//! Two inputs are understood:
//!
//! - **JSON**: an array of `{timestamp, sender, text|message}` records, or an
//!   object wrapping that array under `messages`.
//! - **Plain text** exports, one message per line:
//!   - `[2024-01-01, 10:00:00] Alice: text`
//!   - `1/2/24, 10:00 PM - Alice: text`
//!   - `2024-01-01 10:00 Alice: text`
//!
//! Text lines that don't open a new message continue the previous one.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::Deserialize;

use crate::config::NormalizerConfig;
use crate::error::{Error, Result};
use crate::models::ChatMessage;

/// How to interpret raw input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputFormat {
    /// JSON when the input is a well-formed JSON document, text otherwise.
    #[default]
    Auto,
    Json,
    Text,
}

/// Normalize raw input into messages.
pub fn normalize(
    input: &str,
    format: InputFormat,
    config: &NormalizerConfig,
) -> Result<Vec<ChatMessage>> {
    let format = match format {
        InputFormat::Auto => detect_format(input),
        other => other,
    };
    let messages = match format {
        InputFormat::Json => parse_json(input)?,
        _ => parse_transcript(input, config),
    };
    tracing::debug!(count = messages.len(), ?format, "normalized chat log");
    Ok(messages)
}

fn detect_format(input: &str) -> InputFormat {
    let opens_like_json = matches!(input.trim_start().chars().next(), Some('[' | '{'));
    // Bracketed transcripts also open with '[', so require well-formed JSON.
    if opens_like_json && serde_json::from_str::<serde::de::IgnoredAny>(input).is_ok() {
        InputFormat::Json
    } else {
        InputFormat::Text
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonLog {
    Bare(Vec<ChatMessage>),
    Wrapped { messages: Vec<ChatMessage> },
}

/// Decode a JSON message list.
///
/// Anything that isn't a list of message records is rejected as a whole.
pub fn parse_json(input: &str) -> Result<Vec<ChatMessage>> {
    let value: serde_json::Value = serde_json::from_str(input)
        .map_err(|e| Error::InvalidInput(format!("chat log is not valid JSON: {e}")))?;
    match serde_json::from_value::<JsonLog>(value) {
        Ok(JsonLog::Bare(messages) | JsonLog::Wrapped { messages }) => Ok(messages),
        Err(_) => Err(Error::InvalidInput(
            "expected an array of {timestamp, sender, text} records".to_string(),
        )),
    }
}

/// Parse a plain-text export. Never fails; unrecognized lines are either
/// continuations or dropped.
pub fn parse_transcript(input: &str, config: &NormalizerConfig) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = Vec::new();
    let mut dropped = 0usize;

    for line in input.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line, config) {
            LineKind::Message(message) => messages.push(message),
            LineKind::System => dropped += 1,
            LineKind::Continuation => match messages.last_mut() {
                Some(last) => {
                    last.text.push('\n');
                    last.text.push_str(line);
                }
                None => dropped += 1,
            },
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, "skipped lines that carry no message");
    }
    messages
}

enum LineKind {
    Message(ChatMessage),
    /// Timestamped line without a `sender:` part (join notices, etc.).
    System,
    Continuation,
}

fn parse_line(line: &str, config: &NormalizerConfig) -> LineKind {
    let trimmed = line.trim_start_matches('\u{200e}').trim_start();

    // [timestamp] Sender: text. Brackets that don't hold a timestamp ("[1]",
    // "[note]") are ordinary text and continue the previous message.
    if let Some((stamp, body)) = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.split_once(']'))
    {
        if let Some(at) = parse_export_timestamp(stamp, config) {
            return split_sender(body, format_timestamp(at));
        }
    }

    // timestamp - Sender: text
    if let Some((stamp, body)) = trimmed.split_once(" - ") {
        if let Some(at) = parse_export_timestamp(stamp, config) {
            return split_sender(body, format_timestamp(at));
        }
    }

    // timestamp Sender: text, with a one- or two-token timestamp.
    let tokens: Vec<&str> = trimmed.splitn(3, ' ').collect();
    if tokens.len() == 3 {
        let two = format!("{} {}", tokens[0], tokens[1]);
        if let Some(at) = parse_export_timestamp(&two, config) {
            return split_sender(tokens[2], format_timestamp(at));
        }
    }
    if let Some((first, body)) = trimmed.split_once(' ') {
        if let Some(at) = parse_export_timestamp(first, config) {
            return split_sender(body, format_timestamp(at));
        }
    }

    LineKind::Continuation
}

fn split_sender(body: &str, timestamp: String) -> LineKind {
    match body.split_once(':') {
        Some((sender, text)) if !sender.trim().is_empty() => LineKind::Message(ChatMessage {
            timestamp,
            sender: sender.trim().to_string(),
            text: text.trim().to_string(),
        }),
        _ => LineKind::System,
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Read the timestamp formats chat exports commonly use, as UTC.
pub fn parse_export_timestamp(raw: &str, config: &NormalizerConfig) -> Option<DateTime<Utc>> {
    let cleaned = raw
        .replace(['\u{202f}', '\u{a0}'], " ")
        .replace(',', "")
        .trim()
        .to_string();
    if cleaned.is_empty() || !cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&cleaned) {
        return Some(dt.with_timezone(&Utc));
    }

    date_formats(config.day_first)
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&cleaned, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn date_formats(day_first: bool) -> Vec<String> {
    const ISO: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    // Two-digit years first: %Y would happily read "24" as year 24.
    const TIMES: &[&str] = &["%I:%M:%S %p", "%I:%M %p", "%H:%M:%S", "%H:%M"];
    let dates: &[&str] = if day_first {
        &["%d/%m/%y", "%d/%m/%Y", "%d.%m.%y", "%d.%m.%Y"]
    } else {
        &["%m/%d/%y", "%m/%d/%Y", "%d.%m.%y", "%d.%m.%Y"]
    };

    let mut formats: Vec<String> = ISO.iter().map(|f| (*f).to_string()).collect();
    for date in dates {
        for time in TIMES {
            formats.push(format!("{date} {time}"));
        }
    }
    formats
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
