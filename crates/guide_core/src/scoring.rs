//! Confidence scoring - the authoritative reliability estimate.
//!
//! Five fixed-weight factors over the query, retrieved context and draft
//! response. Computed independently of the reasoning engine's heuristic;
//! this score alone decides whether a clarifying question is attached.

use serde::{Deserialize, Serialize};

use crate::analyzer::{Intent, QueryAnalysis};
use crate::context::{ContextCategory, ContextItem};

const WEIGHT_CONTEXT_AVAILABILITY: f64 = 0.30;
const WEIGHT_QUERY_SPECIFICITY: f64 = 0.20;
const WEIGHT_CONTEXT_RELEVANCE: f64 = 0.25;
const WEIGHT_INFORMATION_COMPLETENESS: f64 = 0.15;
const WEIGHT_RESPONSE_QUALITY: f64 = 0.10;

/// Vocabulary that marks a response as locally grounded
const LOCAL_INDICATORS: &[&str] = &["local", "mumbai", "bhai", "tapri", "vada pav", "auto", "train"];

/// Vocabulary that marks a response as actionable
const ACTIONABLE_WORDS: &[&str] = &["recommend", "suggest", "try", "go to", "avoid", "consider"];

/// Five-band discretization of the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::VeryLow => "very_low",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very_high",
        };
        write!(f, "{}", s)
    }
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::VeryHigh
        } else if score >= 0.6 {
            Self::High
        } else if score >= 0.4 {
            Self::Medium
        } else if score >= 0.2 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }
}

/// Per-factor breakdown of the overall score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactorScores {
    pub context_availability: f64,
    pub query_specificity: f64,
    pub context_relevance: f64,
    pub information_completeness: f64,
    pub response_quality: f64,
}

impl FactorScores {
    /// Named factor values, for weak-factor reporting
    pub fn iter(&self) -> [(&'static str, f64); 5] {
        [
            ("context_availability", self.context_availability),
            ("query_specificity", self.query_specificity),
            ("context_relevance", self.context_relevance),
            ("information_completeness", self.information_completeness),
            ("response_quality", self.response_quality),
        ]
    }
}

/// Authoritative confidence for one response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceScore {
    pub overall_score: f64,
    pub level: ConfidenceLevel,
    pub factors: FactorScores,
    pub missing_information: Vec<String>,
    pub recommendation: String,
    pub should_ask_clarification: bool,
}

/// Per-intent category requirements for the completeness factor
fn completeness_requirements(
    intent: Intent,
) -> Option<(&'static [ContextCategory], &'static [ContextCategory])> {
    match intent {
        Intent::FoodRecommendation => Some((
            &[ContextCategory::Food],
            &[ContextCategory::Timing, ContextCategory::Cost],
        )),
        Intent::TransportQuery => Some((
            &[ContextCategory::Transport],
            &[ContextCategory::Timing, ContextCategory::Safety],
        )),
        Intent::SlangTranslation => Some((&[ContextCategory::Slang], &[ContextCategory::Culture])),
        Intent::CulturalAdvice => Some((&[ContextCategory::Culture], &[ContextCategory::Safety])),
        _ => None,
    }
}

const FOOD_QUESTIONS: &[&str] = &[
    "What time are you planning to eat?",
    "Which area of the city are you in?",
    "What's your budget range?",
    "Are you looking for street food or restaurant food?",
];
const TRANSPORT_QUESTIONS: &[&str] = &[
    "Where are you starting from and going to?",
    "What time do you need to travel?",
    "Do you prefer train, auto, or bus?",
    "Are you okay with crowded transport?",
];
const SLANG_QUESTIONS: &[&str] = &[
    "Which specific words or phrases need translation?",
    "Are you looking to understand or to speak like a local?",
];
const CULTURAL_QUESTIONS: &[&str] = &[
    "What specific situation or activity are you asking about?",
    "Are you visiting religious places or general areas?",
];

pub struct ConfidenceScorer {
    threshold: f64,
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self { threshold: 0.6 }
    }
}

impl ConfidenceScorer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Score a response given the query, its analysis, the retrieved
    /// context and the draft response text.
    pub fn calculate(
        &self,
        query: &str,
        context: &[ContextItem],
        analysis: &QueryAnalysis,
        response: &str,
    ) -> ConfidenceScore {
        let (completeness, missing_information) = score_completeness(analysis, context);
        let factors = FactorScores {
            context_availability: score_context_availability(context),
            query_specificity: score_query_specificity(query, analysis),
            context_relevance: score_context_relevance(context),
            information_completeness: completeness,
            response_quality: score_response_quality(response),
        };

        let overall_score = factors.context_availability * WEIGHT_CONTEXT_AVAILABILITY
            + factors.query_specificity * WEIGHT_QUERY_SPECIFICITY
            + factors.context_relevance * WEIGHT_CONTEXT_RELEVANCE
            + factors.information_completeness * WEIGHT_INFORMATION_COMPLETENESS
            + factors.response_quality * WEIGHT_RESPONSE_QUALITY;

        let recommendation = recommendation_text(overall_score, &factors, &missing_information);

        ConfidenceScore {
            overall_score,
            level: ConfidenceLevel::from_score(overall_score),
            factors,
            missing_information,
            recommendation,
            should_ask_clarification: overall_score < self.threshold,
        }
    }

    /// The clarifying question to attach to a low-confidence response.
    /// None when the score clears the threshold.
    pub fn clarifying_question(
        &self,
        score: &ConfidenceScore,
        analysis: &QueryAnalysis,
    ) -> Option<String> {
        if !score.should_ask_clarification {
            return None;
        }

        let questions: &[&str] = match analysis.intent {
            Intent::FoodRecommendation => FOOD_QUESTIONS,
            Intent::TransportQuery => TRANSPORT_QUESTIONS,
            Intent::SlangTranslation => SLANG_QUESTIONS,
            Intent::CulturalAdvice => CULTURAL_QUESTIONS,
            _ => {
                return Some(
                    "Could you provide more specific details about what you're looking for?"
                        .to_string(),
                )
            }
        };

        let missing = score.missing_information.join(" ").to_lowercase();
        let pick = if missing.contains("timing") {
            questions.iter().find(|q| q.to_lowercase().contains("time"))
        } else if missing.contains("location") {
            questions.iter().find(|q| {
                let lower = q.to_lowercase();
                lower.contains("where") || lower.contains("area")
            })
        } else {
            None
        };

        Some(pick.unwrap_or(&questions[0]).to_string())
    }

    /// Human-readable explanation of the score, for terminal display
    pub fn explanation(&self, score: &ConfidenceScore) -> String {
        let head = match score.level {
            ConfidenceLevel::VeryHigh => "I'm very confident in this response",
            ConfidenceLevel::High => "I'm quite confident in this response",
            ConfidenceLevel::Medium => "I have moderate confidence in this response",
            ConfidenceLevel::Low => "I have limited confidence in this response",
            ConfidenceLevel::VeryLow => "I have very low confidence in this response",
        };

        let mut clauses = Vec::new();
        if score.factors.context_availability < 0.5 {
            clauses.push("limited local context available".to_string());
        }
        if score.factors.context_relevance < 0.5 {
            clauses.push("context may not be directly relevant".to_string());
        }
        if !score.missing_information.is_empty() {
            clauses.push(format!(
                "missing information about {}",
                score.missing_information[..score.missing_information.len().min(2)].join(", ")
            ));
        }

        if clauses.is_empty() {
            format!("{}.", head)
        } else {
            format!("{} because {}", head, clauses.join(" and "))
        }
    }
}

fn score_context_availability(context: &[ContextItem]) -> f64 {
    if context.is_empty() {
        return 0.0;
    }
    let base = 0.3;
    let count_bonus = (context.len() as f64 * 0.1).min(0.5);
    let confidence_bonus =
        context.iter().take(3).map(|i| i.confidence).sum::<f64>() / 3.0 * 0.2;
    (base + count_bonus + confidence_bonus).min(1.0)
}

fn score_query_specificity(query: &str, analysis: &QueryAnalysis) -> f64 {
    let mut score: f64 = match query.split_whitespace().count() {
        3..=20 => 0.3,
        n if n > 20 => 0.2,
        _ => 0.1,
    };

    if analysis.intent != Intent::GeneralQuery {
        score += 0.3;
    }
    if analysis.time_context.specific_time.is_some() || analysis.time_context.time_period.is_some()
    {
        score += 0.2;
    }
    if !analysis.location_context.is_empty() {
        score += 0.2;
    }

    score.min(1.0)
}

fn score_context_relevance(context: &[ContextItem]) -> f64 {
    if context.is_empty() {
        return 0.0;
    }
    let top: Vec<f64> = context.iter().take(3).map(|i| i.confidence).collect();
    let avg = top.iter().sum::<f64>() / top.len() as f64;

    let mut categories: Vec<ContextCategory> = context.iter().map(|i| i.category).collect();
    categories.sort_by_key(|c| *c as u8);
    categories.dedup();
    let category_bonus = (categories.len() as f64 * 0.05).min(0.2);

    (avg + category_bonus).min(1.0)
}

fn score_completeness(analysis: &QueryAnalysis, context: &[ContextItem]) -> (f64, Vec<String>) {
    let mut missing = Vec::new();

    let Some((required, helpful)) = completeness_requirements(analysis.intent) else {
        // General and other intents: any context at all counts for half
        let score = if context.is_empty() { 0.0 } else { 0.5 };
        return (score, missing);
    };

    let available: Vec<ContextCategory> = context.iter().map(|i| i.category).collect();
    let mut score = 0.0;

    if required.iter().all(|c| available.contains(c)) {
        score += 0.6;
    } else {
        for category in required.iter().filter(|c| !available.contains(c)) {
            missing.push(format!("{} information", category));
        }
    }

    let helpful_present = helpful.iter().filter(|c| available.contains(c)).count();
    score += helpful_present as f64 / helpful.len() as f64 * 0.4;

    (score.min(1.0), missing)
}

fn score_response_quality(response: &str) -> f64 {
    if response.trim().is_empty() {
        return 0.0;
    }
    let response_lower = response.to_lowercase();

    let mut score = match response.split_whitespace().count() {
        10..=100 => 0.4,
        n if n > 100 => 0.3,
        _ => 0.2,
    };

    let local_mentions = LOCAL_INDICATORS
        .iter()
        .filter(|w| response_lower.contains(*w))
        .count();
    score += (local_mentions as f64 * 0.1).min(0.3);

    let actionable_mentions = ACTIONABLE_WORDS
        .iter()
        .filter(|w| response_lower.contains(*w))
        .count();
    score += (actionable_mentions as f64 * 0.1).min(0.3);

    score.min(1.0)
}

fn recommendation_text(score: f64, factors: &FactorScores, missing: &[String]) -> String {
    if score >= 0.8 {
        return "High confidence response. Information is comprehensive and reliable.".to_string();
    }
    if score >= 0.6 {
        return "Good confidence response. Minor information gaps may exist.".to_string();
    }
    if score >= 0.4 {
        let weak: Vec<&str> = factors
            .iter()
            .iter()
            .filter(|(_, v)| *v < 0.5)
            .map(|(name, _)| *name)
            .collect();

        let mut notes = Vec::new();
        if weak.contains(&"context_availability") {
            notes.push("Need more local context information".to_string());
        }
        if weak.contains(&"query_specificity") {
            notes.push("Query could be more specific".to_string());
        }
        if weak.contains(&"context_relevance") {
            notes.push("Available context may not be directly relevant".to_string());
        }
        if !missing.is_empty() {
            notes.push(format!(
                "Missing: {}",
                missing[..missing.len().min(3)].join(", ")
            ));
        }
        notes.truncate(2);
        return format!("Medium confidence. {}", notes.join(". "));
    }
    "Low confidence. Significant information gaps exist. Consider asking clarifying questions."
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::TimeContext;
    use crate::context::DomainData;
    use approx::assert_relative_eq;

    fn item(category: ContextCategory, confidence: f64, source: &str) -> ContextItem {
        ContextItem {
            content: DomainData::Safety(vec!["note".to_string()]),
            category,
            confidence,
            source_section: source.to_string(),
        }
    }

    fn analysis(intent: Intent) -> QueryAnalysis {
        QueryAnalysis {
            intent,
            keywords: vec!["food".to_string()],
            time_context: TimeContext::default(),
            location_context: Vec::new(),
            contains_slang: false,
        }
    }

    #[test]
    fn test_score_bounds_and_threshold_equivalence() {
        let scorer = ConfidenceScorer::default();
        let contexts = [
            vec![],
            vec![item(ContextCategory::Food, 1.0, "food")],
            vec![
                item(ContextCategory::Food, 1.0, "food"),
                item(ContextCategory::Timing, 0.8, "timing_patterns"),
                item(ContextCategory::Cost, 0.6, "pricing"),
                item(ContextCategory::Safety, 0.4, "safety"),
            ],
        ];
        let responses = ["", "short", "I'd recommend the local vada pav near the train station, go to the stalls early and try a cutting with it."];

        for context in &contexts {
            for response in &responses {
                for intent in [Intent::FoodRecommendation, Intent::GeneralQuery] {
                    let score =
                        scorer.calculate("where should I eat", context, &analysis(intent), response);
                    assert!((0.0..=1.0).contains(&score.overall_score));
                    assert_eq!(
                        score.should_ask_clarification,
                        score.overall_score < 0.6,
                        "threshold equivalence"
                    );
                }
            }
        }
    }

    #[test]
    fn test_context_availability_formula() {
        let context = vec![
            item(ContextCategory::Food, 1.0, "food"),
            item(ContextCategory::Timing, 0.5, "timing_patterns"),
        ];
        // 0.3 base + 0.2 count + (1.5 / 3) * 0.2
        assert_relative_eq!(score_context_availability(&context), 0.6);
        assert_eq!(score_context_availability(&[]), 0.0);
    }

    #[test]
    fn test_relevance_counts_distinct_categories() {
        let context = vec![
            item(ContextCategory::Food, 0.6, "food"),
            item(ContextCategory::Food, 0.6, "food2"),
            item(ContextCategory::Cost, 0.6, "pricing"),
        ];
        // mean 0.6 + 2 categories * 0.05
        assert_relative_eq!(score_context_relevance(&context), 0.7);
    }

    #[test]
    fn test_completeness_records_gap() {
        let (score, missing) = score_completeness(
            &analysis(Intent::FoodRecommendation),
            &[item(ContextCategory::Timing, 1.0, "timing_patterns")],
        );
        // No food category: only the helpful half, 1 of 2 helpful present
        assert_relative_eq!(score, 0.2);
        assert_eq!(missing, vec!["food information"]);
    }

    #[test]
    fn test_completeness_general_query() {
        let (score, _) = score_completeness(&analysis(Intent::GeneralQuery), &[]);
        assert_eq!(score, 0.0);
        let (score, _) = score_completeness(
            &analysis(Intent::GeneralQuery),
            &[item(ContextCategory::Food, 1.0, "food")],
        );
        assert_eq!(score, 0.5);
    }

    #[test]
    fn test_response_quality_vocabulary() {
        // 11 words (0.4) + "local"+"train" (0.2) + "recommend"+"try" (0.2)
        let response = "I recommend you try the local train before nine for a calmer ride";
        assert_relative_eq!(score_response_quality(response), 0.8);
        assert_eq!(score_response_quality("   "), 0.0);
    }

    #[test]
    fn test_clarifying_question_selection() {
        let scorer = ConfidenceScorer::default();
        let mut score = scorer.calculate("food", &[], &analysis(Intent::FoodRecommendation), "");
        assert!(score.should_ask_clarification);

        score.missing_information = vec!["Specific timing or location information".to_string()];
        let q = scorer
            .clarifying_question(&score, &analysis(Intent::FoodRecommendation))
            .unwrap();
        assert_eq!(q, "What time are you planning to eat?");

        score.missing_information = vec!["location details".to_string()];
        let q = scorer
            .clarifying_question(&score, &analysis(Intent::FoodRecommendation))
            .unwrap();
        assert_eq!(q, "Which area of the city are you in?");

        score.missing_information = Vec::new();
        let q = scorer
            .clarifying_question(&score, &analysis(Intent::SlangTranslation))
            .unwrap();
        assert_eq!(q, "Which specific words or phrases need translation?");
    }

    #[test]
    fn test_no_question_above_threshold() {
        let scorer = ConfidenceScorer::default();
        let mut score = scorer.calculate("food", &[], &analysis(Intent::FoodRecommendation), "");
        score.should_ask_clarification = false;
        assert!(scorer
            .clarifying_question(&score, &analysis(Intent::FoodRecommendation))
            .is_none());
    }
}
