//! Word tokenization, stop-word filtering and emoji extraction.

use std::collections::HashSet;

/// Built-in stop words: common English function words, pronouns, chat
/// filler and apostrophe-stripped contractions.
const BUILTIN_STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will",
    "just", "don", "should", "now", "im", "u", "like", "ur", "ok", "dont", "cant", "wont",
    "didnt", "doesnt", "isnt", "wasnt", "arent", "thats", "youre", "ive", "ill", "id",
    "lets", "theyre", "whats",
];

/// Resolved stop-word set: built-in defaults plus configured extras.
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<String>,
}

impl Default for StopWords {
    fn default() -> Self {
        Self::with_extra(&[])
    }
}

impl StopWords {
    /// Build from the defaults plus extra words (matched case-insensitively).
    pub fn with_extra(extra: &[String]) -> Self {
        let mut words: HashSet<String> =
            BUILTIN_STOP_WORDS.iter().map(|s| (*s).to_string()).collect();
        words.extend(extra.iter().map(|w| w.trim().to_lowercase()));
        Self { words }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Split a message into lowercase word tokens, dropping stop words.
///
/// Characters that are neither word characters (alphanumeric or `_`) nor
/// whitespace are removed before splitting, so `"don't!"` becomes `"dont"`.
pub fn tokenize(text: &str, stop_words: &StopWords) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| is_word_char(*c) || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|word| !stop_words.contains(word))
        .map(str::to_string)
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Extract emoji symbols from a message, one entry per matching code point.
///
/// Detection is range based. Modifier and joiner sequences are not grouped:
/// a ZWJ family yields its component symbols, skin-tone modifiers and
/// variation selectors are dropped.
pub fn extract_emojis(text: &str) -> Vec<String> {
    text.chars()
        .filter(|c| is_emoji(*c))
        .map(String::from)
        .collect()
}

/// Whether a code point falls in one of the common emoji ranges.
pub fn is_emoji(c: char) -> bool {
    matches!(
        u32::from(c),
        0x00A9 | 0x00AE
            // double/interrobang exclamation
            | 0x203C | 0x2049
            // letterlike symbols through misc symbols and arrows; this also
            // takes in plain arrows, math operators and box drawing
            | 0x2100..=0x2BFF
            | 0x3030 | 0x303D | 0x3297 | 0x3299
            // supplementary-plane pictographs, minus skin-tone modifiers
            | 0x1F000..=0x1F3FA
            | 0x1F400..=0x1FBFF
    )
}
