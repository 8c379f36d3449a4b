//! Knowledge document parser.
//!
//! Turns the heading-delimited knowledge document into a typed KnowledgeBase.
//! Each section has its own sub-grammar; a malformed or missing section
//! degrades to an empty structure and is reported later as missing
//! information, never as a per-query error.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{info, warn};

use crate::error::{GuideError, Result};

static BOLD_LABEL_DASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"- \*\*(.+?)\*\* - (.+)").unwrap());
static BOLD_LABEL_COLON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"- \*\*(.+?):\*\* (.+)").unwrap());
static AREA_WITH_TIMING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"- \*\*(.+?):\*\* (.+?) \((.+?)\)").unwrap());
static CITY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*City Name:\*\* (.+)").unwrap());
static LOCAL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Local Name:\*\* (.+)").unwrap());
static PRICE_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"- (.+?): (.+)").unwrap());
static QUOTED_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"- "(.+?)""#).unwrap());

/// Basic city identity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CityInfo {
    pub name: Option<String>,
    pub local_name: Option<String>,
}

/// One slang term with its standard-language meaning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlangEntry {
    pub term: String,
    pub meaning: String,
}

/// A food area with what it serves and when
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaInfo {
    pub foods: String,
    pub timing: String,
}

/// Food timings, areas and hygiene tips
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodInfo {
    /// Time-of-day label -> foods, in document order
    pub timings: Vec<(String, String)>,
    /// Area name -> what/when, in document order
    pub areas: Vec<(String, AreaInfo)>,
    pub hygiene_tips: Vec<String>,
}

impl FoodInfo {
    pub fn is_empty(&self) -> bool {
        self.timings.is_empty() && self.areas.is_empty() && self.hygiene_tips.is_empty()
    }

    pub fn area(&self, name: &str) -> Option<&AreaInfo> {
        self.areas.iter().find(|(a, _)| a == name).map(|(_, i)| i)
    }
}

/// Transport subsections keyed by snake_case name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransportInfo {
    pub modes: Vec<(String, String)>,
}

impl TransportInfo {
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Whether any subsection name or body mentions the given word
    pub fn mentions(&self, word: &str) -> bool {
        self.modes
            .iter()
            .any(|(name, body)| name.contains(word) || body.to_lowercase().contains(word))
    }
}

/// Cultural do and don't lists
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CultureInfo {
    pub dos: Vec<String>,
    pub donts: Vec<String>,
}

impl CultureInfo {
    pub fn is_empty(&self) -> bool {
        self.dos.is_empty() && self.donts.is_empty()
    }
}

/// Festival section kept as free-form notes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FestivalInfo {
    pub notes: String,
}

impl FestivalInfo {
    pub fn is_empty(&self) -> bool {
        self.notes.trim().is_empty()
    }
}

/// The parsed knowledge document. Built once at startup, read-only
/// thereafter; reload swaps in a whole new instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub city: CityInfo,
    pub slang: Vec<SlangEntry>,
    pub food: FoodInfo,
    pub transport: TransportInfo,
    pub culture: CultureInfo,
    /// Season name -> description, in document order
    pub weather: Vec<(String, String)>,
    pub festivals: FestivalInfo,
    /// Price category -> (item, price string), in document order
    pub pricing: Vec<(String, Vec<(String, String)>)>,
    /// "Situation: advice" lines
    pub safety: Vec<String>,
    /// Quoted local logic patterns, in document order
    pub timing_patterns: Vec<String>,
}

impl KnowledgeBase {
    /// Load and parse the knowledge document. A missing document is the
    /// single fatal initialization failure.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Err(GuideError::Initialization(format!(
                "knowledge document not found at {}",
                path
            )));
        }
        let content = fs::read_to_string(path)?;
        let kb = Self::parse(&content);
        info!(
            "Knowledge loaded: {} slang terms, {} food areas, {} safety notes",
            kb.slang.len(),
            kb.food.areas.len(),
            kb.safety.len()
        );
        Ok(kb)
    }

    /// Parse raw document text. Never fails; unparseable sections come back
    /// empty.
    pub fn parse(content: &str) -> Self {
        let sections = split_sections(content);

        let mut kb = KnowledgeBase {
            city: parse_city_info(section(&sections, "City Information")),
            slang: parse_slang(section(&sections, "Common Slang & Phrases")),
            food: parse_food(section(&sections, "Local Food & Street Vendors")),
            transport: parse_transport(section(&sections, "Transport Habits")),
            culture: parse_culture(section(&sections, "Cultural Do's and Don'ts")),
            weather: parse_weather(section(&sections, "Weather Patterns")),
            festivals: parse_festivals(section(&sections, "Festivals & Events")),
            pricing: parse_pricing(section(&sections, "Local Pricing Expectations")),
            safety: parse_safety(section(&sections, "Safety Notes")),
            timing_patterns: parse_timing_patterns(section(&sections, "Local Logic Patterns")),
        };

        for (name, empty) in [
            ("slang", kb.slang.is_empty()),
            ("food", kb.food.is_empty()),
            ("transport", kb.transport.is_empty()),
            ("culture", kb.culture.is_empty()),
            ("safety", kb.safety.is_empty()),
        ] {
            if empty {
                warn!("Knowledge section '{}' is empty or malformed", name);
            }
        }

        // First definition of a term wins
        let mut seen = Vec::new();
        kb.slang.retain(|e| {
            if seen.contains(&e.term) {
                false
            } else {
                seen.push(e.term.clone());
                true
            }
        });
        kb
    }

    /// Slang meaning lookup by lowercased term
    pub fn slang_meaning(&self, term: &str) -> Option<&str> {
        self.slang
            .iter()
            .find(|e| e.term == term)
            .map(|e| e.meaning.as_str())
    }

    /// Area names known to the knowledge base, in document order
    pub fn area_names(&self) -> Vec<&str> {
        self.food.areas.iter().map(|(a, _)| a.as_str()).collect()
    }
}

/// Split on "## " headings; text before the first heading is dropped.
fn split_sections(content: &str) -> Vec<(String, String)> {
    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in content.lines() {
        if let Some(title) = line.strip_prefix("## ") {
            if let Some((name, body)) = current.take() {
                sections.push((name, body.join("\n")));
            }
            current = Some((title.trim().to_string(), Vec::new()));
        } else if let Some((_, ref mut body)) = current {
            body.push(line);
        }
    }
    if let Some((name, body)) = current {
        sections.push((name, body.join("\n")));
    }

    sections
}

fn section<'a>(sections: &'a [(String, String)], name: &str) -> Option<&'a str> {
    sections
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, body)| body.as_str())
}

fn parse_city_info(body: Option<&str>) -> CityInfo {
    let Some(body) = body else {
        return CityInfo::default();
    };
    CityInfo {
        name: CITY_NAME
            .captures(body)
            .map(|c| c[1].trim().to_string()),
        local_name: LOCAL_NAME
            .captures(body)
            .map(|c| c[1].trim().to_string()),
    }
}

fn parse_slang(body: Option<&str>) -> Vec<SlangEntry> {
    let Some(body) = body else {
        return Vec::new();
    };
    BOLD_LABEL_DASH
        .captures_iter(body)
        .map(|c| SlangEntry {
            term: c[1].to_lowercase(),
            meaning: c[2].trim().to_string(),
        })
        .collect()
}

fn parse_food(body: Option<&str>) -> FoodInfo {
    let Some(body) = body else {
        return FoodInfo::default();
    };
    let mut food = FoodInfo::default();

    // Every bold-label bullet is a timing entry; bullets carrying a trailing
    // "(timing)" additionally describe an area.
    for c in BOLD_LABEL_COLON.captures_iter(body) {
        food.timings
            .push((c[1].to_lowercase(), c[2].trim().to_string()));
    }
    for c in AREA_WITH_TIMING.captures_iter(body) {
        food.areas.push((
            c[1].to_string(),
            AreaInfo {
                foods: c[2].trim().to_string(),
                timing: c[3].trim().to_string(),
            },
        ));
    }

    if let Some(hygiene) = subsection(body, "Hygiene") {
        food.hygiene_tips = bullet_lines(hygiene);
    }

    food
}

fn parse_transport(body: Option<&str>) -> TransportInfo {
    let Some(body) = body else {
        return TransportInfo::default();
    };
    let mut modes = Vec::new();
    for chunk in body.split("### ").skip(1) {
        let mut lines = chunk.lines();
        let Some(name) = lines.next() else { continue };
        let name = name.trim().to_lowercase().replace(' ', "_");
        let rest: Vec<&str> = lines.collect();
        modes.push((name, rest.join("\n").trim().to_string()));
    }
    TransportInfo { modes }
}

fn parse_culture(body: Option<&str>) -> CultureInfo {
    let Some(body) = body else {
        return CultureInfo::default();
    };
    CultureInfo {
        dos: subsection(body, "Do's").map(bullet_lines).unwrap_or_default(),
        donts: subsection(body, "Don'ts")
            .map(bullet_lines)
            .unwrap_or_default(),
    }
}

fn parse_weather(body: Option<&str>) -> Vec<(String, String)> {
    let Some(body) = body else {
        return Vec::new();
    };
    body.split("### ")
        .skip(1)
        .filter_map(|chunk| {
            let mut lines = chunk.lines();
            let season = lines.next()?.trim().to_lowercase();
            let description = lines.collect::<Vec<_>>().join("\n").trim().to_string();
            Some((season, description))
        })
        .collect()
}

fn parse_festivals(body: Option<&str>) -> FestivalInfo {
    FestivalInfo {
        notes: body.unwrap_or_default().trim().to_string(),
    }
}

fn parse_pricing(body: Option<&str>) -> Vec<(String, Vec<(String, String)>)> {
    let Some(body) = body else {
        return Vec::new();
    };
    body.split("### ")
        .skip(1)
        .filter_map(|chunk| {
            let mut lines = chunk.lines();
            let category = lines.next()?.trim().to_lowercase();
            let rest = lines.collect::<Vec<_>>().join("\n");
            let items: Vec<(String, String)> = PRICE_ITEM
                .captures_iter(&rest)
                .map(|c| (c[1].trim().to_string(), c[2].trim().to_string()))
                .collect();
            Some((category, items))
        })
        .collect()
}

fn parse_safety(body: Option<&str>) -> Vec<String> {
    let Some(body) = body else {
        return Vec::new();
    };
    BOLD_LABEL_COLON
        .captures_iter(body)
        .map(|c| format!("{}: {}", &c[1], c[2].trim()))
        .collect()
}

fn parse_timing_patterns(body: Option<&str>) -> Vec<String> {
    let Some(body) = body else {
        return Vec::new();
    };
    QUOTED_PATTERN
        .captures_iter(body)
        .map(|c| c[1].to_string())
        .collect()
}

/// Text of a "### Name" subsection, up to the next subsection.
fn subsection<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    let marker = format!("### {}", name);
    let start = body.find(&marker)? + marker.len();
    let rest = &body[start..];
    match rest.find("### ") {
        Some(end) => Some(&rest[..end]),
        None => Some(rest),
    }
}

fn bullet_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|l| l.trim().starts_with('-'))
        .map(|l| l.trim().trim_start_matches('-').trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"# My City

## City Information
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

### Hygiene
- Look for crowded stalls

## Transport Habits
### Local Trains
Fastest during peak but very crowded.
### Auto Rickshaws
Meter rates during day.

## Cultural Do's and Don'ts
### Do's
- Remove shoes before entering homes
- Avoid revealing clothes at religious places
### Don'ts
- Don't point feet at people

## Weather Patterns
### Monsoon
Heavy rains June to September.

## Festivals & Events
Ganesh Chaturthi brings huge processions.

## Local Pricing Expectations
### Street Food
- Vada pav: ₹15
- Pav bhaji: ₹60

## Safety Notes
- **Late night:** Stick to main roads

## Local Logic Patterns
- "after 7 pm roads are jammed"
- "crowded stall means fresh food"
"#;

    #[test]
    fn test_parse_city_and_slang() {
        let kb = KnowledgeBase::parse(DOC);
        assert_eq!(kb.city.name.as_deref(), Some("Mumbai"));
        assert_eq!(kb.city.local_name.as_deref(), Some("Bambai"));
        assert_eq!(kb.slang.len(), 3);
        assert_eq!(kb.slang_meaning("cutting"), Some("half cup of tea"));
    }

    #[test]
    fn test_parse_food_timings_and_areas() {
        let kb = KnowledgeBase::parse(DOC);
        // Area bullet feeds the timing list too
        assert!(kb.food.timings.iter().any(|(k, _)| k == "morning"));
        assert!(kb.food.timings.iter().any(|(k, _)| k == "juhu beach"));
        let area = kb.food.area("Juhu Beach").unwrap();
        assert_eq!(area.foods, "Bhel puri, pav bhaji");
        assert_eq!(area.timing, "evening best");
        assert_eq!(kb.food.hygiene_tips, vec!["Look for crowded stalls"]);
    }

    #[test]
    fn test_parse_transport_and_culture() {
        let kb = KnowledgeBase::parse(DOC);
        assert_eq!(kb.transport.modes.len(), 2);
        assert_eq!(kb.transport.modes[0].0, "local_trains");
        assert!(kb.transport.mentions("train"));
        assert_eq!(kb.culture.dos.len(), 2);
        assert_eq!(kb.culture.donts, vec!["Don't point feet at people"]);
    }

    #[test]
    fn test_parse_pricing_safety_patterns() {
        let kb = KnowledgeBase::parse(DOC);
        assert_eq!(kb.pricing[0].0, "street food");
        assert_eq!(kb.pricing[0].1[0], ("Vada pav".to_string(), "₹15".to_string()));
        assert_eq!(kb.safety, vec!["Late night: Stick to main roads"]);
        assert_eq!(kb.timing_patterns.len(), 2);
        assert_eq!(kb.timing_patterns[0], "after 7 pm roads are jammed");
    }

    #[test]
    fn test_missing_sections_default_empty() {
        let kb = KnowledgeBase::parse("## City Information\n**City Name:** Pune\n");
        assert!(kb.slang.is_empty());
        assert!(kb.food.is_empty());
        assert!(kb.transport.is_empty());
        assert!(kb.culture.is_empty());
        assert!(kb.festivals.is_empty());
    }

    #[test]
    fn test_empty_document() {
        let kb = KnowledgeBase::parse("");
        assert!(kb.city.name.is_none());
        assert!(kb.slang.is_empty());
    }

    #[test]
    fn test_load_missing_document_is_fatal() {
        let err = KnowledgeBase::load("/nonexistent/knowledge.md").unwrap_err();
        assert!(matches!(err, GuideError::Initialization(_)));
    }
}
