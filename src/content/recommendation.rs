//! Curated recommendations and the status vocabulary shared with reviews

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::frontmatter::{datetime, string_or_vec};
use super::{ContentError, ContentKind, ContentMeta, Drafts, Entry, Repository};

/// How many featured items the home page shows
pub const FEATURED_LIMIT: usize = 6;

/// The author's relationship to a product
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecommendationStatus {
    /// Currently used
    Current,
    /// Used in the past
    Previous,
    /// Heard good things, never used
    Heard,
    /// Anything else found in a file, kept verbatim
    Unrecognized(String),
}

impl RecommendationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RecommendationStatus::Current => "current",
            RecommendationStatus::Previous => "previous",
            RecommendationStatus::Heard => "heard",
            RecommendationStatus::Unrecognized(raw) => raw,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecommendationStatus::Current => "Currently Used",
            RecommendationStatus::Previous => "Previously Used",
            RecommendationStatus::Heard => "Heard Good Things",
            RecommendationStatus::Unrecognized(_) => "Recommended",
        }
    }

    /// Featured ordering: current, then previous, then heard
    fn rank(&self) -> u8 {
        match self {
            RecommendationStatus::Current => 0,
            RecommendationStatus::Previous => 1,
            RecommendationStatus::Heard => 2,
            RecommendationStatus::Unrecognized(_) => 3,
        }
    }
}

impl From<String> for RecommendationStatus {
    fn from(raw: String) -> Self {
        match raw.trim() {
            "current" => RecommendationStatus::Current,
            "previous" => RecommendationStatus::Previous,
            "heard" => RecommendationStatus::Heard,
            _ => RecommendationStatus::Unrecognized(raw),
        }
    }
}

impl From<RecommendationStatus> for String {
    fn from(status: RecommendationStatus) -> Self {
        match status {
            RecommendationStatus::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RecommendationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillingPeriod {
    OneTime,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub value: f64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<BillingPeriod>,
}

impl Price {
    /// `Free`, `7 USD/month`, `49.99 USD one-time`
    pub fn display(&self) -> String {
        if self.value == 0.0 {
            return "Free".to_string();
        }
        let amount = if self.value.fract() == 0.0 {
            format!("{:.0}", self.value)
        } else {
            format!("{:.2}", self.value)
        };
        match self.period {
            Some(BillingPeriod::Monthly) => format!("{} {}/month", amount, self.currency),
            Some(BillingPeriod::Yearly) => format!("{} {}/year", amount, self.currency),
            Some(BillingPeriod::OneTime) => format!("{} {} one-time", amount, self.currency),
            None => format!("{} {}", amount, self.currency),
        }
    }
}

/// Front-matter of a recommendation; the slug doubles as its id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationMeta {
    pub name: String,

    #[serde(default)]
    pub short_description: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, deserialize_with = "string_or_vec")]
    pub pros: Vec<String>,

    #[serde(default, deserialize_with = "string_or_vec")]
    pub cons: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliate_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    #[serde(default, deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,

    pub category: String,

    pub status: RecommendationStatus,

    #[serde(default)]
    pub featured: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,

    /// Slugs of related recommendations
    #[serde(default, deserialize_with = "string_or_vec")]
    pub related_recommendations: Vec<String>,

    #[serde(with = "datetime")]
    pub updated_at: NaiveDateTime,
}

pub type Recommendation = Entry<RecommendationMeta>;

impl ContentMeta for RecommendationMeta {
    const KIND: ContentKind = ContentKind::Recommendation;

    fn title(&self) -> &str {
        &self.name
    }

    fn sort_date(&self) -> NaiveDateTime {
        self.updated_at
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }

    fn excerpt(&self) -> &str {
        &self.short_description
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.description]
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if let Some(price) = &self.price {
            if !price.value.is_finite() || price.value < 0.0 {
                return Err(format!("price must be a non-negative number, got {}", price.value));
            }
        }
        Ok(())
    }
}

impl Repository<RecommendationMeta> {
    pub fn by_status(
        &self,
        status: &RecommendationStatus,
        drafts: Drafts,
    ) -> Result<Vec<Recommendation>, ContentError> {
        Ok(self
            .list_all(drafts)?
            .into_iter()
            .filter(|r| &r.meta.status == status)
            .collect())
    }

    /// Featured items, current before previous before heard
    pub fn featured(&self, drafts: Drafts) -> Result<Vec<Recommendation>, ContentError> {
        let mut featured: Vec<_> = self
            .list_all(drafts)?
            .into_iter()
            .filter(|r| r.meta.featured)
            .collect();
        // stable: equal ranks keep the date order
        featured.sort_by_key(|r| r.meta.status.rank());
        featured.truncate(FEATURED_LIMIT);
        Ok(featured)
    }

    /// Resolve `relatedRecommendations`, dropping ids that do not exist
    pub fn related(&self, id: &str, drafts: Drafts) -> Result<Vec<Recommendation>, ContentError> {
        let Some(recommendation) = self.get_by_slug(id, drafts)? else {
            return Ok(Vec::new());
        };

        let mut related = Vec::new();
        for related_id in &recommendation.meta.related_recommendations {
            if let Some(found) = self.get_by_slug(related_id, drafts)? {
                related.push(found);
            }
        }
        Ok(related)
    }
}
