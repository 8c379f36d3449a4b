//! Orchestrator - sequences the full query pipeline.
//!
//! Slang pre-processing, retrieval, reasoning, independent scoring,
//! contextual recommendations and clarification injection, in that order.
//! Every call terminates with a populated Response; the only fatal path in
//! the whole system is a missing knowledge document at construction time.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzer::{self, Intent, QueryAnalysis};
use crate::config::GuideConfig;
use crate::context::{self, ContextCategory};
use crate::error::Result;
use crate::knowledge::KnowledgeBase;
use crate::reasoning::{self, ReasoningResult};
use crate::recommend::{
    self, Recommendation, RecommendationKind, RecommendationRequest,
};
use crate::scoring::{ConfidenceScore, ConfidenceScorer};
use crate::slang::{SlangDetection, SlangInterpreter, SlangTranslation, TranslationDirection};

/// Score above which contextual recommendations are attached
const RECOMMENDATION_FLOOR: f64 = 0.3;

/// The final artifact for one query. Immutable, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub response_text: String,
    pub confidence_score: ConfidenceScore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slang_translation: Option<SlangTranslation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<Recommendation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cultural_context: Option<String>,
    pub sources_used: Vec<String>,
    pub reasoning_chain: Vec<String>,
}

/// Truncated view of one retrieved context item, for debug output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextPreview {
    pub category: ContextCategory,
    pub confidence: f64,
    pub source_section: String,
    pub preview: String,
}

/// Introspection snapshot of one query's processing stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugReport {
    pub analysis: QueryAnalysis,
    pub slang_detection: SlangDetection,
    pub context_previews: Vec<ContextPreview>,
    pub reasoning: ReasoningResult,
}

/// Summary of what the system currently knows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideStatus {
    pub city: Option<String>,
    pub sections_loaded: usize,
    pub slang_terms: usize,
    pub food_areas: usize,
}

/// The assembled guide: one knowledge base, one slang table, one scorer.
/// Read-only after construction; safe to share across concurrent queries.
pub struct GuideSystem {
    config: GuideConfig,
    kb: KnowledgeBase,
    interpreter: SlangInterpreter,
    scorer: ConfidenceScorer,
}

impl GuideSystem {
    /// Build the system from config. A missing knowledge document is fatal.
    pub fn new(config: GuideConfig) -> Result<Self> {
        let kb = KnowledgeBase::load(&config.knowledge_path)?;
        Ok(Self::from_knowledge(kb, config))
    }

    /// Build from an already-parsed knowledge base. Lets tests run several
    /// independent instances without touching the filesystem.
    pub fn from_knowledge(kb: KnowledgeBase, config: GuideConfig) -> Self {
        let interpreter = SlangInterpreter::new(&kb);
        let scorer = ConfidenceScorer::new(config.confidence_threshold);
        Self {
            config,
            kb,
            interpreter,
            scorer,
        }
    }

    /// Re-read the knowledge document and replace the knowledge base
    /// atomically: the new one is fully built before anything is swapped.
    pub fn reload(&mut self) -> Result<()> {
        let kb = KnowledgeBase::load(&self.config.knowledge_path)?;
        self.interpreter = SlangInterpreter::new(&kb);
        self.kb = kb;
        Ok(())
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn config(&self) -> &GuideConfig {
        &self.config
    }

    /// Answer one free-text query. Deterministic for a fixed knowledge base
    /// and timestamp; pass None to use the current local time.
    pub fn process_query(&self, text: &str, timestamp: Option<DateTime<Local>>) -> Response {
        let now = timestamp.unwrap_or_else(Local::now);

        // Slang pre-processing: reasoning runs on the translated text, except
        // for slang questions where the term being asked about must survive.
        let detection = self.interpreter.detect_language_mix(text);
        let raw_analysis = analyzer::analyze(text, &self.kb);
        let (processed, translation, mut analysis) =
            if detection.is_mixed_language && raw_analysis.intent != Intent::SlangTranslation {
                let translation = self.interpreter.interpret_mixed(text);
                let processed = translation.translated_text.clone();
                let analysis = analyzer::analyze(&processed, &self.kb);
                (processed, Some(translation), analysis)
            } else if detection.is_mixed_language {
                (
                    text.to_string(),
                    Some(self.interpreter.interpret_mixed(text)),
                    raw_analysis,
                )
            } else {
                (text.to_string(), None, raw_analysis)
            };
        if detection.is_mixed_language {
            analysis.contains_slang = true;
        }
        debug!("Query intent: {}", analysis.intent);

        let context = context::relevant_context(&self.kb, &processed, analysis.intent);
        let mut reasoning = reasoning::reason(&processed, &analysis, &context, now);
        if translation.is_some() {
            reasoning
                .reasoning_chain
                .insert(0, "Detected code-mixed input, translated before reasoning".to_string());
        }

        let score = self
            .scorer
            .calculate(&processed, &context, &analysis, &reasoning.response);

        let recommendations = self.contextual_recommendations(&analysis, &score, now);
        let cultural_context = translation
            .as_ref()
            .and_then(|t| t.cultural_context.clone());

        let mut response_text = format!(
            "{}{}",
            intent_prefix(analysis.intent),
            reasoning.response
        );
        if let Some(question) = self.scorer.clarifying_question(&score, &analysis) {
            response_text.push_str(&format!("\n\nTo give you a better answer: {}", question));
        }

        Response {
            response_text,
            confidence_score: score,
            slang_translation: translation,
            recommendations,
            cultural_context,
            sources_used: reasoning.sources_used.clone(),
            reasoning_chain: reasoning.reasoning_chain.clone(),
        }
    }

    /// Translate between local slang and standard language.
    pub fn translate_slang(&self, text: &str, direction: TranslationDirection) -> SlangTranslation {
        match direction {
            TranslationDirection::ToStandard => self.interpreter.to_standard(text),
            TranslationDirection::ToLocal => self.interpreter.to_local(text),
            TranslationDirection::Mixed => self.interpreter.interpret_mixed(text),
        }
    }

    /// Ranked suggestions for one request.
    pub fn get_recommendations(&self, request: &RecommendationRequest) -> Vec<Recommendation> {
        recommend::get_recommendations(&self.kb, request)
    }

    /// Recommendations adjusted for an ongoing festival.
    pub fn festival_recommendations(
        &self,
        request: &RecommendationRequest,
        festival_name: Option<&str>,
    ) -> Vec<Recommendation> {
        recommend::festival_aware_recommendations(&self.kb, request, festival_name)
    }

    /// Introspection over the pipeline stages, run on the raw query.
    pub fn debug_query_processing(&self, text: &str) -> DebugReport {
        let analysis = analyzer::analyze(text, &self.kb);
        let slang_detection = self.interpreter.detect_language_mix(text);
        let context = context::relevant_context(&self.kb, text, analysis.intent);

        let context_previews = context
            .iter()
            .take(3)
            .map(|item| ContextPreview {
                category: item.category,
                confidence: item.confidence,
                source_section: item.source_section.clone(),
                preview: item.content.preview(100),
            })
            .collect();

        let reasoning = reasoning::reason(text, &analysis, &context, Local::now());

        DebugReport {
            analysis,
            slang_detection,
            context_previews,
            reasoning,
        }
    }

    /// Cultural guidance for a topic, drawn from the do/don't lists.
    pub fn explain_cultural_context(&self, topic: &str) -> String {
        let topic_lower = topic.to_lowercase();
        let words: Vec<&str> = topic_lower
            .split_whitespace()
            .filter(|w| w.len() > 2)
            .collect();

        let mut lines = Vec::new();
        for do_item in &self.kb.culture.dos {
            let lower = do_item.to_lowercase();
            if words.iter().any(|w| lower.contains(w)) {
                lines.push(format!("Do: {}", do_item));
            }
        }
        for dont_item in &self.kb.culture.donts {
            let lower = dont_item.to_lowercase();
            if words.iter().any(|w| lower.contains(w)) {
                lines.push(format!("Don't: {}", dont_item));
            }
        }

        if lines.is_empty() {
            "No cultural guidance for that topic in the local context.".to_string()
        } else {
            lines.join(" ")
        }
    }

    /// Slang terms worth knowing for a conversation topic.
    pub fn slang_suggestions(&self, topic: &str) -> Vec<String> {
        self.interpreter.suggestions_for_topic(topic)
    }

    /// Human-readable explanation of a confidence score.
    pub fn explain_score(&self, score: &ConfidenceScore) -> String {
        self.scorer.explanation(score)
    }

    pub fn status(&self) -> GuideStatus {
        let kb = &self.kb;
        let sections_loaded = [
            kb.city.name.is_some() || kb.city.local_name.is_some(),
            !kb.slang.is_empty(),
            !kb.food.is_empty(),
            !kb.transport.is_empty(),
            !kb.culture.is_empty(),
            !kb.weather.is_empty(),
            !kb.festivals.is_empty(),
            !kb.pricing.is_empty(),
            !kb.safety.is_empty(),
            !kb.timing_patterns.is_empty(),
        ]
        .iter()
        .filter(|present| **present)
        .count();

        GuideStatus {
            city: kb.city.name.clone(),
            sections_loaded,
            slang_terms: kb.slang.len(),
            food_areas: kb.food.areas.len(),
        }
    }

    fn contextual_recommendations(
        &self,
        analysis: &QueryAnalysis,
        score: &ConfidenceScore,
        now: DateTime<Local>,
    ) -> Option<Vec<Recommendation>> {
        let kind = match analysis.intent {
            Intent::FoodRecommendation => RecommendationKind::Food,
            Intent::TransportQuery => RecommendationKind::Transport,
            _ => return None,
        };
        if score.overall_score <= RECOMMENDATION_FLOOR {
            return None;
        }

        let mut request = RecommendationRequest::new(kind, now);
        request.location = analysis.location_context.first().cloned();
        let recommendations = self.get_recommendations(&request);
        if recommendations.is_empty() {
            None
        } else {
            Some(recommendations)
        }
    }
}

fn intent_prefix(intent: Intent) -> &'static str {
    match intent {
        Intent::FoodRecommendation => "Food advice: ",
        Intent::TransportQuery => "Transport advice: ",
        Intent::SlangTranslation => "Slang help: ",
        Intent::CulturalAdvice => "Cultural note: ",
        Intent::TimingQuery => "Timing advice: ",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const DOC: &str = r#"## City Information
**City Name:** Mumbai
**Local Name:** Bambai

## Common Slang & Phrases
- **bhai** - brother/friend
- **cutting** - half cup of tea
- **scene** - plan/situation

## Local Food & Street Vendors
- **Morning:** Vada pav, poha
- **Evening:** Bhel puri, sev puri
- **Juhu Beach:** Bhel puri, pav bhaji (evening best)

## Transport Habits
### Local Trains
Fastest during peak but very crowded.

## Cultural Do's and Don'ts
### Do's
- Avoid revealing clothes at religious places
### Don'ts
- Don't point feet at people

## Local Pricing Expectations
### Street Food
- Vada pav: ₹15

## Safety Notes
- **Late night:** Stick to main roads

## Local Logic Patterns
- "after 7 pm roads are jammed"
"#;

    fn system() -> GuideSystem {
        GuideSystem::from_knowledge(KnowledgeBase::parse(DOC), GuideConfig::default())
    }

    fn at_hour(hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 14, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_slang_question_keeps_term_for_reasoning() {
        let s = system();
        let response = s.process_query("What does cutting mean?", Some(at_hour(12)));
        assert!(response.response_text.contains("'cutting' means 'half cup of tea'"));
        let translation = response.slang_translation.unwrap();
        assert_eq!(
            translation.slang_words_found,
            vec![("cutting".to_string(), "half cup of tea".to_string())]
        );
    }

    #[test]
    fn test_mixed_query_translated_before_reasoning() {
        let s = system();
        let response = s.process_query("Bhai, where should I eat tonight?", Some(at_hour(20)));
        // "bhai" triggers pre-processing; the food template still sees the
        // evening timing entry
        assert!(response.response_text.contains("Bhel puri, sev puri"));
        assert!(response
            .reasoning_chain
            .first()
            .unwrap()
            .contains("code-mixed"));
        assert!(response.cultural_context.is_some());
    }

    #[test]
    fn test_clarification_attached_below_threshold() {
        let s = GuideSystem::from_knowledge(KnowledgeBase::parse(""), GuideConfig::default());
        let response = s.process_query("where should I eat", Some(at_hour(12)));
        assert!(response.confidence_score.should_ask_clarification);
        assert!(response.response_text.contains("To give you a better answer:"));
    }

    #[test]
    fn test_recommendations_attached_for_food_intent() {
        let s = system();
        let response = s.process_query(
            "Where should I eat bhel puri at Juhu Beach this evening?",
            Some(at_hour(18)),
        );
        let recommendations = response.recommendations.expect("food intent above floor");
        assert!(!recommendations.is_empty());
    }

    #[test]
    fn test_no_recommendations_for_general_intent() {
        let s = system();
        let response = s.process_query("tell me about the city", Some(at_hour(12)));
        assert!(response.recommendations.is_none());
    }

    #[test]
    fn test_deterministic_for_fixed_timestamp() {
        let s = system();
        let a = s.process_query("where should I eat tonight", Some(at_hour(20)));
        let b = s.process_query("where should I eat tonight", Some(at_hour(20)));
        assert_eq!(a.response_text, b.response_text);
        assert_eq!(a.confidence_score.overall_score, b.confidence_score.overall_score);
        assert_eq!(a.reasoning_chain, b.reasoning_chain);
    }

    #[test]
    fn test_status_counts() {
        let status = system().status();
        assert_eq!(status.city.as_deref(), Some("Mumbai"));
        assert_eq!(status.slang_terms, 3);
        assert_eq!(status.food_areas, 1);
        assert_eq!(status.sections_loaded, 8);
    }

    #[test]
    fn test_debug_report_previews_capped() {
        let report = system().debug_query_processing("bhel puri at juhu beach in the evening");
        assert!(report.context_previews.len() <= 3);
        for preview in &report.context_previews {
            assert!(preview.preview.chars().count() <= 103);
        }
    }

    #[test]
    fn test_explain_cultural_context() {
        let s = system();
        let explanation = s.explain_cultural_context("pointing feet");
        assert!(explanation.contains("point feet"));
        assert!(s
            .explain_cultural_context("quantum physics")
            .contains("No cultural guidance"));
    }
}
