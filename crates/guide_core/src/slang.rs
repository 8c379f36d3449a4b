//! Slang interpreter - bidirectional slang/standard translation, code-mix
//! detection, cultural annotation.
//!
//! The term table is built once from the KnowledgeBase. Substitution is
//! case-insensitive and substring-level, so a term can match inside an
//! unrelated longer word; that matches the knowledge document's short,
//! distinctive vocabulary and is a known limitation.

use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::knowledge::{KnowledgeBase, SlangEntry};

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").unwrap());
static ASCII_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-zA-Z]+\b").unwrap());

/// Function words annotated inline during mixed interpretation
const MIXED_PATTERNS: &[(&str, &str)] = &[
    ("bhai", "brother/friend"),
    ("scene", "plan/situation"),
    ("kya", "what"),
    ("hai", "is/are"),
];

/// Local-language patterns that mark code-mixed input
const LOCAL_PATTERNS: &[&str] = &["kya", "hai", "ka", "ke", "ko"];

/// Fixed phrases swapped in when translating toward local speech
const LOCAL_FLAVOR: &[(&str, &str)] = &[
    ("how are you", "kya scene hai bhai"),
    ("what's up", "kya scene hai"),
    ("okay", "chalta hai"),
    ("no problem", "koi scene nahi"),
    ("let's go", "chalo bhai"),
];

/// One cultural note per well-known term; first hit wins
const CULTURAL_CONTEXTS: &[(&str, &str)] = &[
    (
        "bhai",
        "Used universally in Mumbai to address anyone, regardless of relationship. Shows friendliness.",
    ),
    (
        "cutting",
        "Refers to half a cup of tea. Popular way to have tea at tapris (tea stalls).",
    ),
    (
        "scene",
        "Very common way to ask about plans or situations. Part of Mumbai youth slang.",
    ),
    (
        "bindaas",
        "Represents the carefree Mumbai attitude. Used to describe someone who's cool and relaxed.",
    ),
    (
        "jugaad",
        "Reflects the innovative problem-solving spirit of Mumbai locals.",
    ),
    (
        "timepass",
        "Essential concept in Mumbai culture - casual hanging out without specific purpose.",
    ),
];

const TOPIC_SUGGESTIONS: &[(&str, &[&str])] = &[
    ("food", &["tapri", "cutting", "vada pav", "bhel"]),
    ("transport", &["auto", "local"]),
    ("greeting", &["bhai", "scene"]),
    ("agreement", &["chalta hai", "bindaas"]),
    ("casual", &["timepass", "jugaad"]),
];

/// Translation direction for the public operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationDirection {
    ToStandard,
    ToLocal,
    Mixed,
}

impl std::str::FromStr for TranslationDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "to_standard" | "standard" => Ok(Self::ToStandard),
            "to_local" | "local" => Ok(Self::ToLocal),
            "mixed" => Ok(Self::Mixed),
            other => Err(format!("unknown translation direction '{}'", other)),
        }
    }
}

/// Result of one translation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlangTranslation {
    pub original_text: String,
    pub translated_text: String,
    /// (term, meaning) pairs in order of first occurrence
    pub slang_words_found: Vec<(String, String)>,
    pub confidence: f64,
    pub cultural_context: Option<String>,
}

/// Code-mix detection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlangDetection {
    pub is_mixed_language: bool,
    pub english_words: usize,
    pub slang_words: usize,
    pub local_patterns: usize,
    pub confidence: f64,
}

/// Interprets slang against a fixed term table
pub struct SlangInterpreter {
    entries: Vec<SlangEntry>,
}

impl SlangInterpreter {
    pub fn new(kb: &KnowledgeBase) -> Self {
        Self {
            entries: kb.slang.clone(),
        }
    }

    fn meaning_of(&self, term: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.term == term)
            .map(|e| e.meaning.as_str())
    }

    /// Replace every known slang term with its standard meaning.
    pub fn to_standard(&self, text: &str) -> SlangTranslation {
        let lower = text.to_lowercase();
        let mut found: Vec<(String, String)> = Vec::new();
        let mut translated = text.to_string();

        for word in WORD.find_iter(&lower).map(|m| m.as_str()) {
            if found.iter().any(|(t, _)| t == word) {
                continue;
            }
            if let Some(meaning) = self.meaning_of(word) {
                found.push((word.to_string(), meaning.to_string()));
                translated = replace_ci(&translated, word, meaning);
            }
        }

        let confidence = if found.is_empty() {
            0.0
        } else {
            (found.len() as f64 * 0.3 + 0.4).min(1.0)
        };
        let cultural_context = cultural_context_for(&found);

        SlangTranslation {
            original_text: text.to_string(),
            translated_text: translated,
            slang_words_found: found,
            confidence,
            cultural_context,
        }
    }

    /// Reverse lookup: swap standard meanings back to local terms, then add
    /// fixed local phrasing. Output is cosmetic, hence the confidence floor.
    pub fn to_local(&self, text: &str) -> SlangTranslation {
        let lower = text.to_lowercase();
        let mut found: Vec<(String, String)> = Vec::new();
        let mut translated = text.to_string();

        for entry in &self.entries {
            let meaning_lower = entry.meaning.to_lowercase();
            if lower.contains(&meaning_lower) && !found.iter().any(|(t, _)| *t == entry.term) {
                found.push((entry.term.clone(), meaning_lower.clone()));
                translated = replace_ci(&translated, &meaning_lower, &entry.term);
            }
        }

        for (phrase, local) in LOCAL_FLAVOR {
            translated = replace_word_ci(&translated, phrase, local);
        }

        let confidence = if found.is_empty() {
            0.2
        } else {
            (found.len() as f64 * 0.2 + 0.3).min(1.0)
        };

        SlangTranslation {
            original_text: text.to_string(),
            translated_text: translated,
            slang_words_found: found,
            confidence,
            cultural_context: None,
        }
    }

    /// Translate slang, then annotate local function words inline.
    pub fn interpret_mixed(&self, text: &str) -> SlangTranslation {
        let base = self.to_standard(text);
        let lower = text.to_lowercase();
        let mut interpreted = base.translated_text.clone();
        let mut found = base.slang_words_found.clone();

        for (word, meaning) in MIXED_PATTERNS {
            if word_present(&lower, word) {
                interpreted = replace_word_ci(&interpreted, word, &format!("({})", meaning));
                if !found.iter().any(|(t, _)| t == word) {
                    found.push((word.to_string(), meaning.to_string()));
                }
            }
        }

        SlangTranslation {
            original_text: text.to_string(),
            translated_text: interpreted,
            slang_words_found: found,
            confidence: base.confidence,
            cultural_context: base.cultural_context,
        }
    }

    /// Detect code-mixed input: any known slang term or local function word.
    pub fn detect_language_mix(&self, text: &str) -> SlangDetection {
        let lower = text.to_lowercase();

        let mut english_words: Vec<&str> = ASCII_WORD
            .find_iter(text)
            .map(|m| m.as_str())
            .collect();
        english_words.sort_unstable();
        english_words.dedup();

        let mut slang_words: Vec<&str> = Vec::new();
        for word in &english_words {
            let word_lower = word.to_lowercase();
            if self.meaning_of(&word_lower).is_some() && !slang_words.contains(word) {
                slang_words.push(word);
            }
        }

        let local_patterns = LOCAL_PATTERNS
            .iter()
            .filter(|p| word_present(&lower, p))
            .count();

        let slang_count = slang_words.len();
        let is_mixed = slang_count > 0 || local_patterns > 0;

        SlangDetection {
            is_mixed_language: is_mixed,
            english_words: english_words.len(),
            slang_words: slang_count,
            local_patterns,
            confidence: ((slang_count + local_patterns) as f64 * 0.2).min(1.0),
        }
    }

    /// Terms worth dropping into conversation about a topic
    pub fn suggestions_for_topic(&self, topic: &str) -> Vec<String> {
        let topic_lower = topic.to_lowercase();
        let mut suggestions = Vec::new();
        for (category, terms) in TOPIC_SUGGESTIONS {
            if topic_lower.contains(category) {
                suggestions.extend(terms.iter().map(|t| t.to_string()));
            }
        }
        suggestions.truncate(3);
        suggestions
    }
}

/// One explanatory sentence for the first recognized term, if any
fn cultural_context_for(found: &[(String, String)]) -> Option<String> {
    for (term, _) in found {
        if let Some((_, note)) = CULTURAL_CONTEXTS.iter().find(|(t, _)| t == term) {
            return Some(note.to_string());
        }
    }
    None
}

/// Case-insensitive substring replacement
fn replace_ci(text: &str, needle: &str, replacement: &str) -> String {
    let re = RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
        .expect("escaped needle is a valid pattern");
    re.replace_all(text, NoExpand(replacement)).into_owned()
}

/// Case-insensitive whole-word replacement
fn replace_word_ci(text: &str, needle: &str, replacement: &str) -> String {
    let re = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(needle)))
        .case_insensitive(true)
        .build()
        .expect("escaped needle is a valid pattern");
    re.replace_all(text, NoExpand(replacement)).into_owned()
}

fn word_present(text_lower: &str, word: &str) -> bool {
    Regex::new(&format!(r"\b{}\b", regex::escape(word)))
        .map(|re| re.is_match(text_lower))
        .unwrap_or(false)
}
