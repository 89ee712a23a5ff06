//! Requirement slots collected from the teacher.
//!
//! Three slots are mandatory (topic, grade level, duration); everything else
//! is optional context that later steps may use. Slot values accumulate
//! across turns with a last-non-empty-wins policy.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::payload::{string_list, SchemaRef, StructuredPayload};

/// The three slots that must be filled before the pipeline can advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredSlot {
    Topic,
    GradeLevel,
    Duration,
}

impl RequiredSlot {
    /// Slots in the order they are reported to the user.
    pub const ALL: [RequiredSlot; 3] = [
        RequiredSlot::Topic,
        RequiredSlot::GradeLevel,
        RequiredSlot::Duration,
    ];

    /// Human-readable label used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            RequiredSlot::Topic => "topic",
            RequiredSlot::GradeLevel => "grade level",
            RequiredSlot::Duration => "duration",
        }
    }
}

impl fmt::Display for RequiredSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Inclusive age range of the students.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: u8,
    pub max: u8,
}

/// Boolean signals about the kind of project the teacher wants.
///
/// Indicators are sticky: once a turn reports one as true, later turns
/// cannot switch it back off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileIndicators {
    pub requires_experimentation: bool,
    pub involves_data_collection: bool,
    pub needs_mathematical_analysis: bool,
    pub includes_design_challenge: bool,
    pub uses_technology_tools: bool,
    pub community_connection_desired: bool,
    pub hands_on_emphasis: bool,
    pub research_intensive: bool,
    pub presentation_focused: bool,
    pub collaborative_emphasis: bool,
    pub resource_limitations_mentioned: bool,
    pub time_constraints_noted: bool,
    pub iterative_emphasis: bool,
    pub interdisciplinary_emphasis: bool,
}

impl ProfileIndicators {
    fn absorb(&mut self, other: &ProfileIndicators) {
        self.requires_experimentation |= other.requires_experimentation;
        self.involves_data_collection |= other.involves_data_collection;
        self.needs_mathematical_analysis |= other.needs_mathematical_analysis;
        self.includes_design_challenge |= other.includes_design_challenge;
        self.uses_technology_tools |= other.uses_technology_tools;
        self.community_connection_desired |= other.community_connection_desired;
        self.hands_on_emphasis |= other.hands_on_emphasis;
        self.research_intensive |= other.research_intensive;
        self.presentation_focused |= other.presentation_focused;
        self.collaborative_emphasis |= other.collaborative_emphasis;
        self.resource_limitations_mentioned |= other.resource_limitations_mentioned;
        self.time_constraints_noted |= other.time_constraints_noted;
        self.iterative_emphasis |= other.iterative_emphasis;
        self.interdisciplinary_emphasis |= other.interdisciplinary_emphasis;
    }
}

/// Slot-filling result for one turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDetails {
    /// Reply to show the teacher; streamed while it is generated.
    pub response: String,
    pub topic: Option<String>,
    #[serde(alias = "level")]
    pub grade_level: Option<String>,
    #[serde(alias = "duration")]
    pub duration_preference: Option<String>,
    pub class_profile: Option<String>,
    pub age_range: Option<AgeRange>,
    pub content_area_focus: Option<String>,
    pub end_product: Option<String>,
    #[serde(deserialize_with = "string_list")]
    pub learning_outcomes: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub standard_codes: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub class_interests: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub skills_to_develop: Vec<String>,
    #[serde(flatten)]
    pub indicators: ProfileIndicators,
}

impl ProjectDetails {
    /// Value of a mandatory slot, trimmed, if non-empty.
    pub fn slot(&self, slot: RequiredSlot) -> Option<&str> {
        let value = match slot {
            RequiredSlot::Topic => self.topic.as_deref(),
            RequiredSlot::GradeLevel => self.grade_level.as_deref(),
            RequiredSlot::Duration => self.duration_preference.as_deref(),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}

impl StructuredPayload for ProjectDetails {
    fn schema() -> SchemaRef {
        SchemaRef::ProjectDetails
    }

    // Any subset of slots is a legal answer; missing ones are asked for.
    fn check_invariants(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Accumulated requirements plus the derived completeness flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectedRequirements {
    details: ProjectDetails,
    complete: bool,
}

impl CollectedRequirements {
    /// Creates an empty requirement set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated slot values.
    pub fn details(&self) -> &ProjectDetails {
        &self.details
    }

    /// True iff topic, grade level and duration are all non-empty.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Mandatory slots that are still empty, in reporting order.
    pub fn missing(&self) -> Vec<RequiredSlot> {
        RequiredSlot::ALL
            .into_iter()
            .filter(|slot| self.details.slot(*slot).is_none())
            .collect()
    }

    /// Merges one turn's result. Known values are only replaced by
    /// non-empty ones.
    pub fn merge(&mut self, update: &ProjectDetails) {
        let d = &mut self.details;

        if !update.response.trim().is_empty() {
            d.response = update.response.clone();
        }
        merge_text(&mut d.topic, &update.topic);
        merge_text(&mut d.grade_level, &update.grade_level);
        merge_text(&mut d.duration_preference, &update.duration_preference);
        merge_text(&mut d.class_profile, &update.class_profile);
        merge_text(&mut d.content_area_focus, &update.content_area_focus);
        merge_text(&mut d.end_product, &update.end_product);
        if update.age_range.is_some() {
            d.age_range = update.age_range;
        }
        merge_list(&mut d.learning_outcomes, &update.learning_outcomes);
        merge_list(&mut d.standard_codes, &update.standard_codes);
        merge_list(&mut d.class_interests, &update.class_interests);
        merge_list(&mut d.skills_to_develop, &update.skills_to_develop);
        d.indicators.absorb(&update.indicators);

        self.refresh();
    }

    /// Fills an empty grade level from an explicit age mention in the
    /// teacher's own words. Returns the inferred grade, if any.
    pub fn infer_grade_from_text(&mut self, raw_input: &str) -> Option<String> {
        if self.details.slot(RequiredSlot::GradeLevel).is_some() {
            return None;
        }

        let age = match extract_age_range(raw_input) {
            Some(range) => {
                self.details.age_range.get_or_insert(range);
                Some(range.min)
            }
            None => extract_age(raw_input),
        }?;

        let grade = grade_for_age(age)?;
        self.details.grade_level = Some(grade.to_string());
        self.refresh();
        Some(grade.to_string())
    }

    fn refresh(&mut self) {
        self.complete = self.missing().is_empty();
    }
}

fn merge_text(current: &mut Option<String>, update: &Option<String>) {
    if let Some(value) = update {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            *current = Some(trimmed.to_string());
        }
    }
}

fn merge_list(current: &mut Vec<String>, update: &[String]) {
    let cleaned: Vec<String> = update
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if !cleaned.is_empty() {
        *current = cleaned;
    }
}

/// US grade for a student age (5 -> K ... 17 and 18 -> 12).
pub fn grade_for_age(age: u8) -> Option<&'static str> {
    const GRADES: [&str; 13] = [
        "K", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12",
    ];
    match age {
        5..=17 => Some(GRADES[(age - 5) as usize]),
        18 => Some("12"),
        _ => None,
    }
}

static AGE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(\d{1,2})\s*(?:years?|yrs?)\s*old\b",
        r"(?i)\b(\d{1,2})[- ]year[- ]olds?\b",
        r"(?i)\bage[sd]?\s*(?:of|is|:)?\s*(\d{1,2})\b",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static AGE_RANGE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bages?\s*(\d{1,2})\s*(?:-|–|—|to)\s*(\d{1,2})\b",
        r"(?i)\b(\d{1,2})\s*(?:-|–|—|to)\s*(\d{1,2})\s*(?:years?|yrs?)\s*old\b",
        r"(?i)\bbetween\s*(\d{1,2})\s*and\s*(\d{1,2})\s*(?:years?|yrs?)\b",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

fn extract_age(text: &str) -> Option<u8> {
    AGE_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn extract_age_range(text: &str) -> Option<AgeRange> {
    let caps = AGE_RANGE_PATTERNS.iter().find_map(|re| re.captures(text))?;
    let min: u8 = caps.get(1)?.as_str().parse().ok()?;
    let max: u8 = caps.get(2)?.as_str().parse().ok()?;
    Some(AgeRange {
        min: min.min(max),
        max: min.max(max),
    })
}
