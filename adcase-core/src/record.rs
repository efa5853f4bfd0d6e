use serde::{Deserialize, Serialize};

/// One advertising case study in the dataset.
///
/// Field names serialize in camelCase to match `campaigns.json`. Fields the
/// pipeline doesn't model are kept in `extra` and written back untouched,
/// so a whole-file rewrite never loses data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
    /// Stable unique key, assigned at ingestion and never changed.
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub brand: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub agency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Link to the external case study or video (possibly dead).
    #[serde(default)]
    pub outbound_url: String,

    /// Page the record was scraped from.
    #[serde(default)]
    pub source_url: String,

    /// Preview image (possibly empty, placeholder, or dead).
    #[serde(default)]
    pub thumbnail_url: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub format_hints: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub award_tier: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub award_category: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category_bucket: String,

    /// Everything else in the source object, preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CampaignRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_agency(mut self, agency: impl Into<String>) -> Self {
        self.agency = agency.into();
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_outbound_url(mut self, url: impl Into<String>) -> Self {
        self.outbound_url = url.into();
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    pub fn with_thumbnail_url(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = url.into();
        self
    }

    /// Identifying text used for matching: title, brand, agency and year.
    pub fn identity_text(&self) -> String {
        let year = self.year.map(|y| y.to_string()).unwrap_or_default();
        [
            self.title.trim(),
            self.brand.trim(),
            self.agency.trim(),
            year.as_str(),
        ]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Free-text query used by the search gatherers.
    ///
    /// Agency is left out: it rarely appears in video titles and tends to
    /// pull in the agency's other work.
    pub fn search_query(&self) -> String {
        let year = self.year.map(|y| y.to_string()).unwrap_or_default();
        [self.brand.trim(), self.title.trim(), year.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Case-insensitive topic membership.
    pub fn has_topic(&self, tag: &str) -> bool {
        contains_tag(&self.topics, tag)
    }

    /// Add a topic unless an equal one (ignoring case) is already present.
    /// Returns true if the topic was added.
    pub fn add_topic(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.has_topic(tag) {
            return false;
        }
        self.topics.push(tag.to_string());
        true
    }

    /// Remove case-insensitive duplicates and blanks from `topics` and
    /// `format_hints`, keeping the first spelling seen. Returns the number
    /// of entries removed.
    pub fn dedupe_tags(&mut self) -> usize {
        dedupe(&mut self.topics) + dedupe(&mut self.format_hints)
    }
}

fn contains_tag(tags: &[String], tag: &str) -> bool {
    let wanted = tag.trim().to_lowercase();
    tags.iter().any(|t| t.trim().to_lowercase() == wanted)
}

fn dedupe(tags: &mut Vec<String>) -> usize {
    let before = tags.len();
    let mut seen = std::collections::HashSet::new();
    tags.retain(|t| {
        let key = t.trim().to_lowercase();
        !key.is_empty() && seen.insert(key)
    });
    before - tags.len()
}

#[cfg(test)]
#[path = "tests/record_tests.rs"]
mod tests;
