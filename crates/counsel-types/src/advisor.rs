use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Stable string identifier of an advisor (e.g. `warren_buffett`).
///
/// Advisor ids are chosen by whoever seeds the registry and never change,
/// so unlike conversation ids they are not generated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvisorId(pub String);

impl AdvisorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdvisorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AdvisorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AdvisorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Personality profile attached to an advisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    pub traits: Vec<String>,
    pub communication_style: String,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            traits: vec![
                "analytical".to_string(),
                "thoughtful".to_string(),
                "experienced".to_string(),
            ],
            communication_style: "clear and methodical".to_string(),
        }
    }
}

/// A registered advisor.
///
/// Advisors are immutable once the registry has loaded them. `position`
/// is the registry order used to sort every turn's responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisor {
    pub id: AdvisorId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub personality: Personality,
    /// Expertise tags in declaration order.
    pub expertise: Vec<String>,
    #[serde(default)]
    pub position: u32,
}

impl Advisor {
    /// The response category this advisor's expertise selects.
    pub fn category(&self) -> ExpertiseCategory {
        ExpertiseCategory::classify(&self.expertise)
    }
}

/// Response framing chosen from an advisor's expertise tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpertiseCategory {
    ValueInvesting,
    Macroeconomics,
    PatternRecognition,
    LongTermPrinciples,
}

/// Ordered (category, accepted tags) rules, evaluated top-down.
///
/// The first rule with any matching tag wins; `LongTermPrinciples` is the
/// fallback and has no tags of its own.
pub const EXPERTISE_RULES: &[(ExpertiseCategory, &[&str])] = &[
    (ExpertiseCategory::ValueInvesting, &["value investing", "value"]),
    (ExpertiseCategory::Macroeconomics, &["macroeconomics", "macro"]),
    (
        ExpertiseCategory::PatternRecognition,
        &["pattern recognition", "pattern"],
    ),
];

impl ExpertiseCategory {
    /// Select the category for a set of expertise tags.
    ///
    /// Tag order is irrelevant: the rule order in [`EXPERTISE_RULES`] alone
    /// decides ties, so an advisor tagged both `macro` and `value` is always
    /// a value investor.
    pub fn classify(tags: &[String]) -> Self {
        let normalized: Vec<String> = tags.iter().map(|t| normalize_tag(t)).collect();

        EXPERTISE_RULES
            .iter()
            .find(|(_, accepted)| {
                normalized
                    .iter()
                    .any(|tag| accepted.iter().any(|a| a == tag))
            })
            .map(|(category, _)| *category)
            .unwrap_or(ExpertiseCategory::LongTermPrinciples)
    }
}

impl fmt::Display for ExpertiseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpertiseCategory::ValueInvesting => write!(f, "value_investing"),
            ExpertiseCategory::Macroeconomics => write!(f, "macroeconomics"),
            ExpertiseCategory::PatternRecognition => write!(f, "pattern_recognition"),
            ExpertiseCategory::LongTermPrinciples => write!(f, "long_term_principles"),
        }
    }
}

impl FromStr for ExpertiseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "value_investing" => Ok(ExpertiseCategory::ValueInvesting),
            "macroeconomics" => Ok(ExpertiseCategory::Macroeconomics),
            "pattern_recognition" => Ok(ExpertiseCategory::PatternRecognition),
            "long_term_principles" => Ok(ExpertiseCategory::LongTermPrinciples),
            other => Err(format!("invalid expertise category: '{other}'")),
        }
    }
}

/// Normalize an expertise tag for rule matching.
///
/// Lowercases, turns `-` and `_` into spaces, and collapses whitespace.
///
/// ```
/// use counsel_types::advisor::normalize_tag;
///
/// assert_eq!(normalize_tag("Value-Investing"), "value investing");
/// assert_eq!(normalize_tag("  pattern__recognition "), "pattern recognition");
/// ```
pub fn normalize_tag(tag: &str) -> String {
    tag.to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
