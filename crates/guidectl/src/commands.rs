//! Command implementations and terminal rendering for guidectl.

use anyhow::Result;
use chrono::Local;
use console::style;
use guide_core::{
    BudgetLevel, ConfidenceLevel, GuideSystem, Recommendation, RecommendationKind,
    RecommendationRequest, Response, TranslationDirection,
};

/// Ask one question and print the full response.
pub fn ask(guide: &GuideSystem, query: &str) -> Result<()> {
    let response = guide.process_query(query, None);
    print_response(guide, &response);
    Ok(())
}

pub fn translate(guide: &GuideSystem, text: &str, direction: TranslationDirection) -> Result<()> {
    let translation = guide.translate_slang(text, direction);

    println!("{}", style(&translation.translated_text).bold());
    if !translation.slang_words_found.is_empty() {
        println!();
        for (term, meaning) in &translation.slang_words_found {
            println!("  {} {} {}", style(term).cyan(), style("->").dim(), meaning);
        }
    }
    if let Some(ref context) = translation.cultural_context {
        println!("\n{} {}", style("Cultural note:").yellow(), context);
    }
    println!(
        "\n{}",
        style(format!("confidence {:.2}", translation.confidence)).dim()
    );
    Ok(())
}

pub fn recommend(
    guide: &GuideSystem,
    kind: RecommendationKind,
    location: Option<String>,
    budget: Option<BudgetLevel>,
    weather: Option<String>,
    festival: Option<String>,
) -> Result<()> {
    let mut request = RecommendationRequest::new(kind, Local::now());
    request.location = location;
    request.budget_level = budget;
    request.weather_condition = weather;

    let recommendations = match festival.as_deref() {
        Some(name) => guide.festival_recommendations(&request, Some(name)),
        None => guide.get_recommendations(&request),
    };

    if recommendations.is_empty() {
        println!("No recommendations for this time and filters.");
        return Ok(());
    }
    for rec in &recommendations {
        print_recommendation(rec);
    }
    Ok(())
}

pub fn debug(guide: &GuideSystem, query: &str) -> Result<()> {
    let report = guide.debug_query_processing(query);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn status(guide: &GuideSystem) -> Result<()> {
    let status = guide.status();
    println!("{}", style("guidectl status").cyan().bold());
    print_kv("city", status.city.as_deref().unwrap_or("unknown"));
    print_kv("sections", &status.sections_loaded.to_string());
    print_kv("slang terms", &status.slang_terms.to_string());
    print_kv("food areas", &status.food_areas.to_string());
    print_kv(
        "threshold",
        &format!("{:.2}", guide.config().confidence_threshold),
    );
    Ok(())
}

/// Scripted walkthrough over the loaded knowledge, for first-run exploration.
pub fn demo(guide: &GuideSystem) -> Result<()> {
    let queries = [
        "What does cutting mean?",
        "Bhai, where should I eat tonight?",
        "How do I reach the station during peak hours?",
        "Is it okay to wear shorts at temples?",
        "kya scene hai for the weekend?",
    ];

    for query in queries {
        println!("{} {}", style(">").green().bold(), style(query).bold());
        let response = guide.process_query(query, None);
        print_response(guide, &response);
        println!();
    }

    println!(
        "{} {}",
        style(">").green().bold(),
        style("Slang worth knowing for food talk").bold()
    );
    for term in guide.slang_suggestions("food") {
        println!("  - {}", term);
    }
    Ok(())
}

/// Render one Response the way a human wants to read it.
pub fn print_response(guide: &GuideSystem, response: &Response) {
    println!("{}", response.response_text);

    if let Some(ref translation) = response.slang_translation {
        if !translation.slang_words_found.is_empty() {
            println!();
            for (term, meaning) in &translation.slang_words_found {
                println!("  {} {} {}", style(term).cyan(), style("->").dim(), meaning);
            }
        }
    }

    if let Some(ref context) = response.cultural_context {
        println!("\n{} {}", style("Cultural note:").yellow(), context);
    }

    if let Some(ref recommendations) = response.recommendations {
        println!("\n{}", style("Suggestions").cyan().bold());
        for rec in recommendations.iter().take(3) {
            print_recommendation(rec);
        }
    }

    let score = &response.confidence_score;
    println!(
        "\n{} {}",
        confidence_badge(score.level),
        style(format!("({:.2})", score.overall_score)).dim()
    );
    println!("{}", style(guide.explain_score(score)).dim());
    if !response.sources_used.is_empty() {
        println!(
            "{}",
            style(format!("sources: {}", response.sources_used.join(", "))).dim()
        );
    }
}

fn print_recommendation(rec: &Recommendation) {
    println!(
        "  {} {}",
        style(&rec.title).bold(),
        style(format!("({:.2})", rec.confidence)).dim()
    );
    println!("    {}", rec.description);
    if let Some(ref timing) = rec.timing_advice {
        println!("    {} {}", style("timing:").dim(), timing);
    }
    if let Some(ref budget) = rec.budget_info {
        println!("    {} {}", style("budget:").dim(), budget);
    }
    if let Some(ref crowd) = rec.crowd_level {
        println!("    {} {}", style("crowd:").dim(), crowd);
    }
    if let Some(ref weather) = rec.weather_consideration {
        println!("    {} {}", style("weather:").dim(), weather);
    }
}

/// Colored label for a confidence band
pub fn confidence_badge(level: ConfidenceLevel) -> String {
    match level {
        ConfidenceLevel::VeryHigh | ConfidenceLevel::High => {
            style(level.to_string()).green().to_string()
        }
        ConfidenceLevel::Medium => style(level.to_string()).yellow().to_string(),
        ConfidenceLevel::Low | ConfidenceLevel::VeryLow => {
            style(level.to_string()).red().to_string()
        }
    }
}

fn print_kv(key: &str, value: &str) {
    println!("  {:<12} {}", style(key).dim(), value);
}
