//! Heritage brand and timeline records.
//!
//! Both collections are read-only JSON files; these types describe what the
//! service needs to know about them and carry everything else through
//! untouched.

use serde::{Deserialize, Deserializer, Serialize};

/// One heritage-brand entry in the static catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    /// Unique identifier
    pub id: i64,

    pub name: String,

    pub category: String,

    pub description: String,

    /// Founding date as written in the catalog (e.g. "1669年")
    #[serde(deserialize_with = "string_or_number")]
    pub founded: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,

    /// Fields this service does not interpret (images, links, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Brand {
    /// Case-insensitive substring match on name, category, description or any
    /// keyword. `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.category.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self
                .keywords
                .iter()
                .flatten()
                .any(|kw| kw.to_lowercase().contains(needle))
    }
}

/// A timeline entry, passed through unmodified.
pub type TimelineEntry = serde_json::Value;

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Founded {
        Text(String),
        Year(serde_json::Number),
    }

    Ok(match Founded::deserialize(deserializer)? {
        Founded::Text(s) => s,
        Founded::Year(n) => n.to_string(),
    })
}
