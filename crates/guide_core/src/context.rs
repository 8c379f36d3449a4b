//! Context store and retrieval.
//!
//! Two modes over the shared KnowledgeBase: category lookup (canonical data,
//! confidence 1.0) and free-text relevance search. Merged results are
//! de-duplicated by source section and capped to the top 5; category hits
//! come first and later components pick the first matching category
//! positionally.

use serde::{Deserialize, Serialize};

use crate::analyzer::Intent;
use crate::knowledge::{
    CityInfo, CultureInfo, FestivalInfo, FoodInfo, KnowledgeBase, SlangEntry, TransportInfo,
};

/// Closed set of knowledge categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextCategory {
    Slang,
    Food,
    Transport,
    Safety,
    Timing,
    Cost,
    Culture,
    Weather,
    Festivals,
}

impl std::fmt::Display for ContextCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Slang => "slang",
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Safety => "safety",
            Self::Timing => "timing",
            Self::Cost => "cost",
            Self::Culture => "culture",
            Self::Weather => "weather",
            Self::Festivals => "festivals",
        };
        write!(f, "{}", s)
    }
}

impl ContextCategory {
    /// The category whose canonical data answers the given intent
    pub fn for_intent(intent: Intent) -> Option<Self> {
        match intent {
            Intent::FoodRecommendation => Some(Self::Food),
            Intent::TransportQuery => Some(Self::Transport),
            Intent::SlangTranslation => Some(Self::Slang),
            Intent::CulturalAdvice => Some(Self::Culture),
            Intent::TimingQuery => Some(Self::Timing),
            Intent::WeatherQuery => Some(Self::Weather),
            Intent::FestivalQuery => Some(Self::Festivals),
            Intent::SafetyQuery => Some(Self::Safety),
            Intent::PricingQuery => Some(Self::Cost),
            Intent::GeneralQuery => None,
        }
    }
}

/// A typed copy of one knowledge section. Kept structured from parse time
/// onward; the text rendering exists only for lexical search and previews.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "data")]
pub enum DomainData {
    City(CityInfo),
    Slang(Vec<SlangEntry>),
    Food(FoodInfo),
    Transport(TransportInfo),
    Culture(CultureInfo),
    Weather(Vec<(String, String)>),
    Festivals(FestivalInfo),
    Pricing(Vec<(String, Vec<(String, String)>)>),
    Safety(Vec<String>),
    Timing(Vec<String>),
}

impl DomainData {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::City(c) => c.name.is_none() && c.local_name.is_none(),
            Self::Slang(s) => s.is_empty(),
            Self::Food(f) => f.is_empty(),
            Self::Transport(t) => t.is_empty(),
            Self::Culture(c) => c.is_empty(),
            Self::Weather(w) => w.is_empty(),
            Self::Festivals(f) => f.is_empty(),
            Self::Pricing(p) => p.is_empty(),
            Self::Safety(s) => s.is_empty(),
            Self::Timing(t) => t.is_empty(),
        }
    }

    /// Deterministic plain-text rendering for search and previews
    pub fn search_text(&self) -> String {
        match self {
            Self::City(c) => [c.name.as_deref(), c.local_name.as_deref()]
                .iter()
                .flatten()
                .copied()
                .collect::<Vec<_>>()
                .join(" "),
            Self::Slang(entries) => entries
                .iter()
                .map(|e| format!("{} {}", e.term, e.meaning))
                .collect::<Vec<_>>()
                .join(" "),
            Self::Food(f) => {
                let mut parts: Vec<String> = f
                    .timings
                    .iter()
                    .map(|(k, v)| format!("{} {}", k, v))
                    .collect();
                parts.extend(
                    f.areas
                        .iter()
                        .map(|(a, i)| format!("{} {} {}", a, i.foods, i.timing)),
                );
                parts.extend(f.hygiene_tips.iter().cloned());
                parts.join(" ")
            }
            Self::Transport(t) => t
                .modes
                .iter()
                .map(|(name, body)| format!("{} {}", name, body))
                .collect::<Vec<_>>()
                .join(" "),
            Self::Culture(c) => {
                let mut parts = c.dos.clone();
                parts.extend(c.donts.clone());
                parts.join(" ")
            }
            Self::Weather(w) => w
                .iter()
                .map(|(season, desc)| format!("{} {}", season, desc))
                .collect::<Vec<_>>()
                .join(" "),
            Self::Festivals(f) => f.notes.clone(),
            Self::Pricing(p) => p
                .iter()
                .map(|(category, items)| {
                    let items = items
                        .iter()
                        .map(|(item, price)| format!("{} {}", item, price))
                        .collect::<Vec<_>>()
                        .join(" ");
                    format!("{} {}", category, items)
                })
                .collect::<Vec<_>>()
                .join(" "),
            Self::Safety(s) => s.join(" "),
            Self::Timing(t) => t.join(" "),
        }
    }

    /// Truncated rendering for debug output
    pub fn preview(&self, max_chars: usize) -> String {
        let text = self.search_text();
        if text.chars().count() <= max_chars {
            text
        } else {
            let cut: String = text.chars().take(max_chars).collect();
            format!("{}...", cut)
        }
    }
}

/// One categorized, confidence-tagged fragment of the knowledge source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextItem {
    pub content: DomainData,
    pub category: ContextCategory,
    pub confidence: f64,
    pub source_section: String,
}

/// Fixed section list: (identifier, category, data extractor). Iteration
/// order here is the search order.
fn sections(kb: &KnowledgeBase) -> Vec<(&'static str, ContextCategory, DomainData)> {
    vec![
        ("city_info", ContextCategory::Culture, DomainData::City(kb.city.clone())),
        ("slang", ContextCategory::Slang, DomainData::Slang(kb.slang.clone())),
        ("food", ContextCategory::Food, DomainData::Food(kb.food.clone())),
        (
            "transport",
            ContextCategory::Transport,
            DomainData::Transport(kb.transport.clone()),
        ),
        (
            "culture",
            ContextCategory::Culture,
            DomainData::Culture(kb.culture.clone()),
        ),
        (
            "weather",
            ContextCategory::Weather,
            DomainData::Weather(kb.weather.clone()),
        ),
        (
            "festivals",
            ContextCategory::Festivals,
            DomainData::Festivals(kb.festivals.clone()),
        ),
        (
            "pricing",
            ContextCategory::Cost,
            DomainData::Pricing(kb.pricing.clone()),
        ),
        ("safety", ContextCategory::Safety, DomainData::Safety(kb.safety.clone())),
        (
            "timing_patterns",
            ContextCategory::Timing,
            DomainData::Timing(kb.timing_patterns.clone()),
        ),
    ]
}

/// Canonical section id for a category lookup
fn section_for_category(category: ContextCategory) -> &'static str {
    match category {
        ContextCategory::Slang => "slang",
        ContextCategory::Food => "food",
        ContextCategory::Transport => "transport",
        ContextCategory::Culture => "culture",
        ContextCategory::Weather => "weather",
        ContextCategory::Festivals => "festivals",
        ContextCategory::Cost => "pricing",
        ContextCategory::Safety => "safety",
        ContextCategory::Timing => "timing_patterns",
    }
}

/// Category lookup: the canonical data for that domain, confidence 1.0.
/// Empty domains are invisible and surface later as missing information.
pub fn by_category(kb: &KnowledgeBase, category: ContextCategory) -> Vec<ContextItem> {
    let wanted = section_for_category(category);
    sections(kb)
        .into_iter()
        .filter(|(id, _, data)| *id == wanted && !data.is_empty())
        .map(|(id, _, data)| ContextItem {
            content: data,
            category,
            confidence: 1.0,
            source_section: id.to_string(),
        })
        .collect()
}

/// Free-text search: relevance = |token intersection| / |query tokens|
pub fn search(kb: &KnowledgeBase, query: &str) -> Vec<ContextItem> {
    let query_lower = query.to_lowercase();
    let query_tokens: Vec<&str> = query_lower.split_whitespace().collect();

    let mut results: Vec<ContextItem> = sections(kb)
        .into_iter()
        .filter_map(|(id, category, data)| {
            let text = data.search_text().to_lowercase();
            let relevance = relevance_score(&text, &query_tokens);
            if relevance > 0.0 {
                Some(ContextItem {
                    content: data,
                    category,
                    confidence: relevance,
                    source_section: id.to_string(),
                })
            } else {
                None
            }
        })
        .collect();

    results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    results
}

fn relevance_score(content_lower: &str, query_tokens: &[&str]) -> f64 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let content_tokens: Vec<&str> = content_lower.split_whitespace().collect();
    let mut matched: Vec<&str> = Vec::new();
    for token in query_tokens {
        if content_tokens.contains(token) && !matched.contains(token) {
            matched.push(token);
        }
    }
    // Distinct query tokens, to mirror the set intersection
    let mut distinct = query_tokens.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    matched.len() as f64 / distinct.len() as f64
}

/// Merge category lookup and free-text search for a query: category hits
/// first, first occurrence per section wins, top 5 by confidence.
pub fn relevant_context(kb: &KnowledgeBase, query: &str, intent: Intent) -> Vec<ContextItem> {
    let mut combined = Vec::new();
    if let Some(category) = ContextCategory::for_intent(intent) {
        combined.extend(by_category(kb, category));
    }
    combined.extend(search(kb, query));

    let mut unique: Vec<ContextItem> = Vec::new();
    for item in combined {
        if !unique.iter().any(|u| u.source_section == item.source_section) {
            unique.push(item);
        }
    }

    unique.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    unique.truncate(5);
    unique
}
