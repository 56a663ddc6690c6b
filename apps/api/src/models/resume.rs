//! The structured resume document posted by the editor, normalized for prompt use.

use serde::Serialize;
use serde_json::Value;

use crate::analysis::sanitize::sanitize;

/// Writing style requested for generated or rewritten text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Style {
    #[default]
    Concise,
    Elaborative,
}

impl Style {
    /// Only the literal `"elaborative"` selects the elaborative tone.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some("elaborative") => Style::Elaborative,
            _ => Style::Concise,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Skill {
    pub domain: String,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Project {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Experience {
    pub role: String,
    pub company: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Achievement {
    pub title: String,
    pub description: String,
}

/// A resume with every leaf string already sanitized.
///
/// Built leniently: absent or non-array collections are empty and non-string
/// leaves become empty strings, so any JSON body yields a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResumeDocument {
    pub description: String,
    pub skills: Vec<Skill>,
    pub projects: Vec<Project>,
    pub experience: Vec<Experience>,
    pub achievements: Vec<Achievement>,
}

impl ResumeDocument {
    pub fn from_value(value: &Value) -> Self {
        Self {
            description: text(value, "description"),
            skills: items(value, "skills")
                .map(|s| Skill {
                    domain: text(s, "domain"),
                    languages: items(s, "languages").map(sanitize).collect(),
                })
                .collect(),
            projects: items(value, "projects")
                .map(|p| Project {
                    name: text(p, "name"),
                    description: text(p, "description"),
                })
                .collect(),
            experience: items(value, "experience")
                .map(|e| Experience {
                    role: text(e, "role"),
                    company: text(e, "company"),
                    description: text(e, "description"),
                })
                .collect(),
            achievements: items(value, "achievements")
                .map(|a| Achievement {
                    title: text(a, "title"),
                    description: text(a, "description"),
                })
                .collect(),
        }
    }
}

fn text(value: &Value, key: &str) -> String {
    value.get(key).map(sanitize).unwrap_or_default()
}

fn items<'a>(value: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    value.get(key).and_then(Value::as_array).into_iter().flatten()
}
