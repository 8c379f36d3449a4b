//! Query analyzer - intent classification and keyword/time/location
//! extraction.
//!
//! Intent rules are an ordered table; the first rule with any keyword
//! contained in the query wins. The ordering is part of the contract.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::knowledge::KnowledgeBase;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").unwrap());
static CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}):(\d{2})\s*(am|pm)?").unwrap());
static HOUR_TIME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{1,2})\s*(am|pm)").unwrap());

/// Classified purpose of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    FoodRecommendation,
    TransportQuery,
    SlangTranslation,
    CulturalAdvice,
    TimingQuery,
    WeatherQuery,
    FestivalQuery,
    SafetyQuery,
    PricingQuery,
    GeneralQuery,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::FoodRecommendation => "food_recommendation",
            Self::TransportQuery => "transport_query",
            Self::SlangTranslation => "slang_translation",
            Self::CulturalAdvice => "cultural_advice",
            Self::TimingQuery => "timing_query",
            Self::WeatherQuery => "weather_query",
            Self::FestivalQuery => "festival_query",
            Self::SafetyQuery => "safety_query",
            Self::PricingQuery => "pricing_query",
            Self::GeneralQuery => "general_query",
        };
        write!(f, "{}", s)
    }
}

/// Ordered intent rules; first match wins. Never collapse into a map.
const INTENT_RULES: &[(Intent, &[&str])] = &[
    (
        Intent::FoodRecommendation,
        &["eat", "food", "hungry", "restaurant", "street food", "vada pav", "bhel"],
    ),
    (
        Intent::TransportQuery,
        &["reach", "go to", "travel", "auto", "train", "bus", "traffic", "commute"],
    ),
    (
        Intent::SlangTranslation,
        &["meaning", "what does", "translate", "bhai", "scene"],
    ),
    (
        Intent::CulturalAdvice,
        &["wear", "appropriate", "etiquette", "culture", "okay to"],
    ),
    (
        Intent::TimingQuery,
        &["when", "time", "hours", "open", "close", "peak"],
    ),
    (
        Intent::WeatherQuery,
        &["weather", "rain", "monsoon", "hot", "cold"],
    ),
    (
        Intent::FestivalQuery,
        &["festival", "celebration", "ganesh", "diwali", "navratri"],
    ),
    (
        Intent::SafetyQuery,
        &["safe", "danger", "avoid", "careful", "security"],
    ),
    (
        Intent::PricingQuery,
        &["cost", "price", "expensive", "cheap", "budget"],
    ),
];

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "and", "or", "but", "in", "with", "to", "for",
    "of", "as", "by",
];

/// Ordered time-period buckets; first match wins
const TIME_PERIODS: &[(&str, &[&str])] = &[
    ("morning", &["morning", "am", "breakfast"]),
    ("afternoon", &["afternoon", "lunch", "noon"]),
    ("evening", &["evening", "dinner", "night"]),
    ("late_night", &["late night", "midnight", "late"]),
];

const RELATIVE_TIMES: &[&str] = &["now", "today", "tonight", "tomorrow", "later", "soon"];

/// Time references found in a query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeContext {
    pub specific_time: Option<String>,
    pub time_period: Option<String>,
    pub relative_time: Option<String>,
}

/// Per-query analysis, ephemeral
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub intent: Intent,
    pub keywords: Vec<String>,
    pub time_context: TimeContext,
    pub location_context: Vec<String>,
    pub contains_slang: bool,
}

/// Analyze a query against the knowledge base
pub fn analyze(query: &str, kb: &KnowledgeBase) -> QueryAnalysis {
    let lower = query.to_lowercase();
    QueryAnalysis {
        intent: detect_intent(&lower),
        keywords: extract_keywords(&lower),
        time_context: extract_time_context(&lower),
        location_context: extract_locations(&lower, kb),
        contains_slang: kb.slang.iter().any(|e| lower.contains(&e.term)),
    }
}

/// First intent whose keyword set has a hit; GeneralQuery otherwise
pub fn detect_intent(query_lower: &str) -> Intent {
    for (intent, keywords) in INTENT_RULES {
        if keywords.iter().any(|k| query_lower.contains(k)) {
            return *intent;
        }
    }
    Intent::GeneralQuery
}

/// Word tokens minus stop-words and short tokens
pub fn extract_keywords(query_lower: &str) -> Vec<String> {
    WORD.find_iter(query_lower)
        .map(|m| m.as_str().to_string())
        .filter(|w| !STOP_WORDS.contains(&w.as_str()) && w.len() > 2)
        .collect()
}

pub fn extract_time_context(query_lower: &str) -> TimeContext {
    let specific_time = CLOCK_TIME
        .find(query_lower)
        .or_else(|| HOUR_TIME.find(query_lower))
        .map(|m| m.as_str().to_string());

    let time_period = TIME_PERIODS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| query_lower.contains(k)))
        .map(|(period, _)| period.to_string());

    let relative_time = RELATIVE_TIMES
        .iter()
        .find(|t| query_lower.contains(*t))
        .map(|t| t.to_string());

    TimeContext {
        specific_time,
        time_period,
        relative_time,
    }
}

/// Known area names appearing as substrings of the query
fn extract_locations(query_lower: &str, kb: &KnowledgeBase) -> Vec<String> {
    kb.area_names()
        .iter()
        .filter(|area| query_lower.contains(&area.to_lowercase()))
        .map(|area| area.to_string())
        .collect()
}
