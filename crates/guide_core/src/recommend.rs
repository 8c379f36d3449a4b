//! Recommendation engine - ranked, context-aware suggestion lists.
//!
//! Combines time bucketing, peak-hour detection, location matching, budget
//! filtering and weather adjustment over the knowledge base. Prices are
//! read from the symbol+digits pattern; any other notation is an unparsed
//! price and is skipped rather than guessed at.

use chrono::{DateTime, Local, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::knowledge::KnowledgeBase;
use crate::reasoning::{is_peak_hour, time_period_for_hour};

static PRICE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"₹(\d+)").unwrap());

/// Confidence multiplier for outdoor suggestions in rain
const RAIN_OUTDOOR_PENALTY: f64 = 0.7;

/// Confidence multiplier applied alongside a festival caveat
const FESTIVAL_PENALTY: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Food,
    Transport,
    Activity,
    Safety,
}

impl std::str::FromStr for RecommendationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "transport" => Ok(Self::Transport),
            "activity" => Ok(Self::Activity),
            "safety" => Ok(Self::Safety),
            other => Err(format!("unknown recommendation type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLevel {
    Low,
    Medium,
    High,
}

impl BudgetLevel {
    /// Inclusive currency band for this level
    fn range(self) -> (u32, u32) {
        match self {
            Self::Low => (0, 50),
            Self::Medium => (50, 150),
            Self::High => (150, u32::MAX),
        }
    }
}

impl std::str::FromStr for BudgetLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown budget level '{}'", other)),
        }
    }
}

impl std::fmt::Display for BudgetLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// One ranked suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub reasoning: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing_advice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crowd_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_consideration: Option<String>,
}

impl Recommendation {
    fn new(title: &str, description: &str, reasoning: &str, confidence: f64) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            reasoning: reasoning.to_string(),
            confidence,
            timing_advice: None,
            budget_info: None,
            crowd_level: None,
            weather_consideration: None,
        }
    }

    fn missing(domain: &str) -> Self {
        Self::new(
            &format!("No {} Information", domain),
            &format!(
                "{} information is not present in the local context file.",
                domain
            ),
            &format!("Missing local {} data", domain.to_lowercase()),
            0.0,
        )
    }
}

/// Parameters for one recommendation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub kind: RecommendationKind,
    pub current_time: DateTime<Local>,
    pub location: Option<String>,
    pub budget_level: Option<BudgetLevel>,
    pub weather_condition: Option<String>,
    pub crowd_tolerance: Option<String>,
}

impl RecommendationRequest {
    pub fn new(kind: RecommendationKind, current_time: DateTime<Local>) -> Self {
        Self {
            kind,
            current_time,
            location: None,
            budget_level: None,
            weather_condition: None,
            crowd_tolerance: None,
        }
    }
}

/// Generate recommendations for a request
pub fn get_recommendations(kb: &KnowledgeBase, request: &RecommendationRequest) -> Vec<Recommendation> {
    match request.kind {
        RecommendationKind::Food => food_recommendations(kb, request),
        RecommendationKind::Transport => transport_recommendations(kb, request),
        RecommendationKind::Activity => activity_recommendations(request),
        RecommendationKind::Safety => safety_recommendations(kb, request),
    }
}

/// Recommendations with an ongoing festival taken into account: an advisory
/// first, and a confidence haircut plus availability caveat on the rest.
pub fn festival_aware_recommendations(
    kb: &KnowledgeBase,
    request: &RecommendationRequest,
    festival_name: Option<&str>,
) -> Vec<Recommendation> {
    if kb.festivals.is_empty() {
        return get_recommendations(kb, request);
    }

    let mut recommendations = Vec::new();
    if festival_name.is_some() || kb.festivals.notes.to_lowercase().contains("festival") {
        let mut advisory = Recommendation::new(
            "Festival Impact Advisory",
            "Expect 2x normal travel time, crowded areas, and special festival foods available.",
            "Festival period affects normal patterns",
            0.9,
        );
        advisory.timing_advice = Some("Plan extra travel time".to_string());
        advisory.crowd_level = Some("Very High".to_string());
        advisory.budget_info = Some("Festival pricing may apply".to_string());
        recommendations.push(advisory);
    }

    let mut regular = get_recommendations(kb, request);
    if let Some(name) = festival_name {
        for rec in &mut regular {
            rec.description.push_str(&format!(
                " (Note: {} celebrations may affect availability and crowds)",
                name
            ));
            rec.confidence *= FESTIVAL_PENALTY;
        }
    }
    recommendations.extend(regular);
    recommendations
}

fn food_recommendations(kb: &KnowledgeBase, request: &RecommendationRequest) -> Vec<Recommendation> {
    if kb.food.is_empty() {
        return vec![Recommendation::missing("Food")];
    }

    let hour = request.current_time.hour();
    let time_period = time_period_for_hour(hour);
    let mut recommendations = Vec::new();

    for (timing_key, foods) in &kb.food.timings {
        if timing_key.contains(time_period) {
            let mut rec = Recommendation::new(
                &format!("Perfect for {}", time_period),
                foods,
                &format!("Based on local timing patterns for {}", timing_key),
                0.9,
            );
            rec.timing_advice = Some(format!("Best time for these foods: {}", timing_key));
            recommendations.push(rec);
        }
    }

    if let Some(ref location) = request.location {
        let location_lower = location.to_lowercase();
        for (area, info) in &kb.food.areas {
            let area_lower = area.to_lowercase();
            if location_lower.contains(&area_lower) || area_lower.contains(&location_lower) {
                let mut rec = Recommendation::new(
                    &format!("Local Favorite at {}", area),
                    &info.foods,
                    "Popular area mentioned in local context",
                    0.8,
                );
                rec.timing_advice = Some(info.timing.clone());
                rec.crowd_level = Some(crowd_advice(&info.timing, hour));
                recommendations.push(rec);
            }
        }
    }

    if let Some(budget) = request.budget_level {
        if !kb.pricing.is_empty() {
            recommendations.extend(budget_recommendations(kb, budget));
        }
    }

    if let Some(ref weather) = request.weather_condition {
        adjust_for_weather(&mut recommendations, weather);
    }

    recommendations.truncate(5);
    recommendations
}

fn transport_recommendations(
    kb: &KnowledgeBase,
    request: &RecommendationRequest,
) -> Vec<Recommendation> {
    if kb.transport.is_empty() {
        return vec![Recommendation::missing("Transport")];
    }

    let hour = request.current_time.hour();
    let mut recommendations = Vec::new();

    if is_peak_hour(hour) {
        let mut rec = Recommendation::new(
            "Peak Hour Transport Strategy",
            "Local trains are fastest but extremely crowded. Auto-rickshaws will be slower due to traffic.",
            "Current time falls within peak hours (8-11 AM, 6-9 PM)",
            0.9,
        );
        rec.timing_advice = Some("Consider delaying travel by 30-60 minutes if possible".to_string());
        rec.crowd_level = Some("Very High".to_string());
        recommendations.push(rec);
    } else {
        let mut rec = Recommendation::new(
            "Off-Peak Travel Advantage",
            "Good time to travel - trains are manageable and roads are clearer.",
            "Current time is outside peak hours",
            0.8,
        );
        rec.timing_advice = Some("Optimal travel time".to_string());
        rec.crowd_level = Some("Moderate".to_string());
        recommendations.push(rec);
    }

    if kb.transport.mentions("train") {
        let mut rec = Recommendation::new(
            "Local Train Etiquette",
            "Stand on left, let people exit first. Ladies compartment in first 4 coaches.",
            "Based on local train culture and rules",
            1.0,
        );
        rec.timing_advice = Some("Peak: 8-11 AM, 6-9 PM (extremely crowded)".to_string());
        recommendations.push(rec);
    }

    let mut auto = Recommendation::new(
        "Auto-Rickshaw Tips",
        "Insist on meter during day. Night charges are 1.5x after midnight.",
        "Standard local auto-rickshaw practices",
        0.9,
    );
    auto.budget_info = Some("Meter rate + night surcharge if applicable".to_string());
    recommendations.push(auto);

    recommendations
}

fn activity_recommendations(request: &RecommendationRequest) -> Vec<Recommendation> {
    let hour = request.current_time.hour();
    let mut recommendations = Vec::new();

    if (16..=20).contains(&hour) {
        let mut rec = Recommendation::new(
            "Evening Street Food Tour",
            "Perfect time for Bhel Puri, Sev Puri, and Cutting Chai at local spots",
            "Evening is peak time for street food according to local patterns",
            0.8,
        );
        rec.timing_advice = Some("4-8 PM is ideal for street food".to_string());
        rec.crowd_level = Some("High but manageable".to_string());
        recommendations.push(rec);
    }

    if let Some(ref weather) = request.weather_condition {
        if weather.to_lowercase().contains("rain") {
            let mut rec = Recommendation::new(
                "Monsoon Activity Adjustment",
                "Indoor activities recommended. If going out, carry umbrella and avoid low-lying areas.",
                "Monsoon weather requires special precautions in local context",
                0.9,
            );
            rec.weather_consideration = Some("Heavy rains and flooding possible".to_string());
            recommendations.push(rec);
        }
    }

    recommendations
}

fn safety_recommendations(kb: &KnowledgeBase, request: &RecommendationRequest) -> Vec<Recommendation> {
    if kb.safety.is_empty() {
        return vec![Recommendation::missing("Safety")];
    }

    let hour = request.current_time.hour();
    let mut recommendations = Vec::new();

    if hour >= 22 || hour <= 5 {
        let mut rec = Recommendation::new(
            "Late Night Safety",
            "Stick to main roads and well-lit areas. Use trusted transport options.",
            "Late night hours require extra caution",
            0.9,
        );
        rec.timing_advice = Some("Extra caution needed during late night hours".to_string());
        recommendations.push(rec);
    }

    for note in &kb.safety {
        if let Some((situation, advice)) = note.split_once(':') {
            recommendations.push(Recommendation::new(
                &format!("Safety: {}", situation.trim()),
                advice.trim(),
                "Based on local safety guidelines",
                0.8,
            ));
        }
    }

    recommendations
}

/// Crowd level advice from an area's timing note and the current hour
fn crowd_advice(timing_info: &str, hour: u32) -> String {
    let timing_lower = timing_info.to_lowercase();
    if timing_lower.contains("evening") && (16..=20).contains(&hour) {
        "High - Peak evening crowd".to_string()
    } else if timing_lower.contains("morning") && (8..=10).contains(&hour) {
        "High - Morning rush".to_string()
    } else if is_peak_hour(hour) {
        "Moderate to High".to_string()
    } else {
        "Low to Moderate".to_string()
    }
}

/// Price string to currency units; None for any other notation
fn parse_price(price: &str) -> Option<u32> {
    PRICE
        .captures(price)
        .and_then(|c| c[1].parse::<u32>().ok())
}

fn budget_recommendations(kb: &KnowledgeBase, budget: BudgetLevel) -> Vec<Recommendation> {
    let (min, max) = budget.range();
    let mut recommendations = Vec::new();

    for (category, items) in &kb.pricing {
        let suitable: Vec<String> = items
            .iter()
            .filter_map(|(item, price_str)| {
                let price = parse_price(price_str)?;
                if price >= min && price <= max {
                    Some(format!("{} ({})", item, price_str))
                } else {
                    None
                }
            })
            .collect();

        if !suitable.is_empty() {
            let mut rec = Recommendation::new(
                &format!("Budget-Friendly {}", title_case(category)),
                &suitable.join(", "),
                &format!("Items matching {} budget range", budget),
                0.7,
            );
            rec.budget_info = Some(format!("Within {} budget range", budget));
            recommendations.push(rec);
        }
    }

    recommendations
}

fn adjust_for_weather(recommendations: &mut [Recommendation], weather: &str) {
    let weather_lower = weather.to_lowercase();
    for rec in recommendations.iter_mut() {
        if weather_lower.contains("rain") {
            rec.weather_consideration =
                Some("Monsoon: Check for covered areas, carry umbrella".to_string());
            if rec.description.to_lowercase().contains("outdoor") {
                rec.confidence *= RAIN_OUTDOOR_PENALTY;
            }
        } else if weather_lower.contains("hot") {
            rec.weather_consideration =
                Some("Hot weather: Stay hydrated, prefer AC venues".to_string());
        }
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::parse(
            r#"## Local Food & Street Vendors
- **Morning:** Vada pav, poha
- **Evening:** Bhel puri, outdoor chaat stalls
- **Juhu Beach:** Bhel puri (evening best)

## Transport Habits
### Local Trains
Fastest during peak.

## Festivals & Events
Ganesh Chaturthi is the biggest festival of the year.

## Local Pricing Expectations
### Street Food
- Vada pav: ₹30
- Thali: ₹200
- Mystery dish: priced on request

## Safety Notes
- **Crowds:** Watch your belongings
"#,
        )
    }

    fn request(kind: RecommendationKind, hour: u32) -> RecommendationRequest {
        RecommendationRequest::new(
            kind,
            Local.with_ymd_and_hms(2024, 3, 14, hour, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_transport_peak_vs_off_peak() {
        let peak = get_recommendations(&kb(), &request(RecommendationKind::Transport, 9));
        assert_eq!(peak[0].title, "Peak Hour Transport Strategy");
        assert_eq!(peak[0].crowd_level.as_deref(), Some("Very High"));

        let off = get_recommendations(&kb(), &request(RecommendationKind::Transport, 14));
        assert_eq!(off[0].title, "Off-Peak Travel Advantage");
        assert_eq!(off[0].crowd_level.as_deref(), Some("Moderate"));
    }

    #[test]
    fn test_budget_filter_low_band() {
        let mut req = request(RecommendationKind::Food, 12);
        req.budget_level = Some(BudgetLevel::Low);
        let recs = get_recommendations(&kb(), &req);
        let budget_rec = recs
            .iter()
            .find(|r| r.title == "Budget-Friendly Street Food")
            .unwrap();
        assert!(budget_rec.description.contains("Vada pav"));
        assert!(!budget_rec.description.contains("Thali"));
        // The unparseable price never qualifies
        assert!(!budget_rec.description.contains("Mystery dish"));
    }

    #[test]
    fn test_rain_penalizes_outdoor_food() {
        let mut req = request(RecommendationKind::Food, 18);
        req.weather_condition = Some("heavy rain".to_string());
        let recs = get_recommendations(&kb(), &req);
        let outdoor = recs
            .iter()
            .find(|r| r.description.contains("outdoor"))
            .unwrap();
        assert!((outdoor.confidence - 0.9 * RAIN_OUTDOOR_PENALTY).abs() < 1e-9);
        assert!(outdoor.weather_consideration.as_deref().unwrap().contains("umbrella"));
    }

    #[test]
    fn test_food_cap_at_five() {
        let mut req = request(RecommendationKind::Food, 18);
        req.location = Some("Juhu Beach".to_string());
        req.budget_level = Some(BudgetLevel::High);
        let recs = get_recommendations(&kb(), &req);
        assert!(recs.len() <= 5);
    }

    #[test]
    fn test_missing_food_data() {
        let empty = KnowledgeBase::parse("");
        let recs = get_recommendations(&empty, &request(RecommendationKind::Food, 12));
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].confidence, 0.0);
        assert!(recs[0].description.contains("not present"));
    }

    #[test]
    fn test_safety_notes_and_late_night() {
        let recs = get_recommendations(&kb(), &request(RecommendationKind::Safety, 23));
        assert_eq!(recs[0].title, "Late Night Safety");
        assert!(recs.iter().any(|r| r.title == "Safety: Crowds"));
    }

    #[test]
    fn test_festival_penalty_and_advisory() {
        let req = request(RecommendationKind::Transport, 14);
        let recs = festival_aware_recommendations(&kb(), &req, Some("Ganesh Chaturthi"));
        assert_eq!(recs[0].title, "Festival Impact Advisory");
        let off_peak = recs
            .iter()
            .find(|r| r.title == "Off-Peak Travel Advantage")
            .unwrap();
        assert!((off_peak.confidence - 0.8 * FESTIVAL_PENALTY).abs() < 1e-9);
        assert!(off_peak.description.contains("Ganesh Chaturthi celebrations"));
    }

    #[test]
    fn test_evening_activity_window() {
        let recs = get_recommendations(&kb(), &request(RecommendationKind::Activity, 18));
        assert_eq!(recs[0].title, "Evening Street Food Tour");
        assert!(get_recommendations(&kb(), &request(RecommendationKind::Activity, 11)).is_empty());
    }
}
