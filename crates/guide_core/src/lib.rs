//! Local guide core - answers free-text questions about a locale's culture,
//! food, transport, slang and safety, grounded exclusively in one knowledge
//! document, with a calibrated confidence score deciding whether to answer
//! outright or ask a clarifying question.
//!
//! The pipeline: parse the document into a typed [`KnowledgeBase`], retrieve
//! relevant context per query, classify intent, apply per-intent reasoning
//! templates, interpret code-mixed slang, score confidence independently,
//! and rank recommendations. [`GuideSystem`] sequences all of it.

pub mod analyzer;
pub mod config;
pub mod context;
pub mod error;
pub mod guide;
pub mod knowledge;
pub mod reasoning;
pub mod recommend;
pub mod scoring;
pub mod slang;

pub use analyzer::{Intent, QueryAnalysis, TimeContext};
pub use config::GuideConfig;
pub use context::{ContextCategory, ContextItem};
pub use error::{GuideError, Result};
pub use guide::{ContextPreview, DebugReport, GuideStatus, GuideSystem, Response};
pub use knowledge::KnowledgeBase;
pub use reasoning::ReasoningResult;
pub use recommend::{
    BudgetLevel, Recommendation, RecommendationKind, RecommendationRequest,
};
pub use scoring::{ConfidenceLevel, ConfidenceScore, ConfidenceScorer};
pub use slang::{SlangDetection, SlangTranslation, TranslationDirection};
