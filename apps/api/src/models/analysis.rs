//! Typed shapes of the structured results returned by the model.
//!
//! Prompts describe these shapes by example only, so provider output is
//! untrusted: every field defaults, text leaves accept `null` or any scalar,
//! and `ShapeCheck` enforces the few invariants callers rely on. Handlers
//! still return the raw JSON object.

use std::collections::BTreeMap;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Post-deserialization checks for a structured result.
pub trait ShapeCheck {
    fn check(&self) -> Result<(), String>;
}

fn scalar_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Text leaf: `null` becomes empty, numbers and booleans are stringified.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

/// List of text leaves. A lone scalar counts as a one-item list.
fn lenient_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(scalar_text)
            .collect(),
        other => vec![scalar_text(other)],
    })
}

/// List of records. `null` entries are skipped, and a `null` list is empty.
fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Vec<Value>>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
            .collect(),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn check_score(field: &str, score: Option<f64>) -> Result<(), String> {
    match score {
        Some(s) if !(0.0..=100.0).contains(&s) => {
            Err(format!("{field} must be between 0 and 100, got {s}"))
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionScore {
    pub score: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub feedback: String,
}

/// ATS compatibility report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AtsReport {
    pub score: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub breakdown: BTreeMap<String, SectionScore>,
    #[serde(deserialize_with = "lenient_strings")]
    pub strengths: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub improvements: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub missing_keywords: Vec<String>,
}

impl ShapeCheck for AtsReport {
    fn check(&self) -> Result<(), String> {
        check_score("score", self.score)?;
        for (section, entry) in &self.breakdown {
            check_score(&format!("breakdown.{section}.score"), entry.score)?;
        }
        Ok(())
    }
}

/// Job-description match report with optional rewrites of weak sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobMatchReport {
    pub match_score: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(deserialize_with = "lenient_strings")]
    pub matched_skills: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub missing_skills: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub suggestions: serde_json::Map<String, Value>,
}

impl ShapeCheck for JobMatchReport {
    fn check(&self) -> Result<(), String> {
        check_score("matchScore", self.match_score)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedSkill {
    #[serde(deserialize_with = "lenient_string")]
    pub domain: String,
    #[serde(deserialize_with = "lenient_strings")]
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedProject {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub link: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedExperience {
    #[serde(deserialize_with = "lenient_string")]
    pub role: String,
    #[serde(deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedEducation {
    #[serde(deserialize_with = "lenient_string")]
    pub institution: String,
    #[serde(deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: String,
    #[serde(deserialize_with = "lenient_string")]
    pub grade: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedAchievement {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
}

/// Resume fields extracted from an uploaded document, in the editor's shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedResume {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_strings")]
    pub links: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_items")]
    pub skills: Vec<ParsedSkill>,
    #[serde(deserialize_with = "lenient_items")]
    pub projects: Vec<ParsedProject>,
    #[serde(deserialize_with = "lenient_items")]
    pub experience: Vec<ParsedExperience>,
    #[serde(deserialize_with = "lenient_items")]
    pub education: Vec<ParsedEducation>,
    #[serde(deserialize_with = "lenient_items")]
    pub achievements: Vec<ParsedAchievement>,
}

impl ShapeCheck for ParsedResume {
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}
