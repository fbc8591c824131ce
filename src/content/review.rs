//! Product reviews

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::frontmatter::{datetime, string_or_vec};
use super::recommendation::{RecommendationStatus, FEATURED_LIMIT};
use super::{ContentError, ContentKind, ContentMeta, Drafts, Entry, Repository};

pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewMeta {
    pub title: String,

    /// 0 to 5, one decimal
    pub rating: f64,

    pub product_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliate_url: Option<String>,

    #[serde(default, deserialize_with = "string_or_vec")]
    pub pros: Vec<String>,

    #[serde(default, deserialize_with = "string_or_vec")]
    pub cons: Vec<String>,

    #[serde(default)]
    pub verdict: String,

    #[serde(default)]
    pub excerpt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,

    #[serde(default, deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,

    pub category: String,

    #[serde(with = "datetime")]
    pub published_at: NaiveDateTime,

    #[serde(
        default,
        with = "datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<NaiveDateTime>,

    #[serde(default, deserialize_with = "string_or_vec")]
    pub related_recommendations: Vec<String>,

    #[serde(default)]
    pub is_recommended: bool,

    #[serde(default)]
    pub is_currently_used: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RecommendationStatus>,
}

pub type Review = Entry<ReviewMeta>;

impl ReviewMeta {
    pub fn stars(&self) -> StarRating {
        StarRating::new(self.rating)
    }

    pub fn is_current(&self) -> bool {
        self.is_currently_used || self.status == Some(RecommendationStatus::Current)
    }

    /// Last change, falling back to publication
    pub fn last_modified(&self) -> NaiveDateTime {
        self.updated_at.unwrap_or(self.published_at)
    }
}

impl ContentMeta for ReviewMeta {
    const KIND: ContentKind = ContentKind::Review;

    fn title(&self) -> &str {
        &self.title
    }

    fn sort_date(&self) -> NaiveDateTime {
        self.published_at
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }

    fn excerpt(&self) -> &str {
        &self.excerpt
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.product_name, &self.verdict]
    }

    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(format!("rating must be between 0 and 5, got {}", self.rating));
        }
        Ok(())
    }
}

/// Star display for a rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StarRating {
    pub full: u8,
    pub half: u8,
    pub empty: u8,
}

impl StarRating {
    pub fn new(rating: f64) -> Self {
        let rating = rating.clamp(0.0, MAX_RATING);
        let full = rating.floor() as u8;
        let half = u8::from(rating.fract() > 0.0);
        Self {
            full,
            half,
            empty: 5 - full - half,
        }
    }

    /// `4.5/5.0`
    pub fn label(rating: f64) -> String {
        format!("{:.1}/5.0", rating)
    }
}

impl Repository<ReviewMeta> {
    pub fn recommended(&self, drafts: Drafts) -> Result<Vec<Review>, ContentError> {
        self.filtered(drafts, |r| r.is_recommended)
    }

    pub fn currently_used(&self, drafts: Drafts) -> Result<Vec<Review>, ContentError> {
        self.filtered(drafts, ReviewMeta::is_current)
    }

    pub fn previously_used(&self, drafts: Drafts) -> Result<Vec<Review>, ContentError> {
        self.filtered(drafts, |r| r.status == Some(RecommendationStatus::Previous))
    }

    pub fn heard_about(&self, drafts: Drafts) -> Result<Vec<Review>, ContentError> {
        self.filtered(drafts, |r| r.status == Some(RecommendationStatus::Heard))
    }

    /// Recommended reviews for the home page, currently used first
    pub fn featured(&self, drafts: Drafts) -> Result<Vec<Review>, ContentError> {
        let mut featured = self.recommended(drafts)?;
        featured.sort_by_key(|r| !r.meta.is_current());
        featured.truncate(FEATURED_LIMIT);
        Ok(featured)
    }

    fn filtered(
        &self,
        drafts: Drafts,
        keep: impl Fn(&ReviewMeta) -> bool,
    ) -> Result<Vec<Review>, ContentError> {
        Ok(self
            .list_all(drafts)?
            .into_iter()
            .filter(|r| keep(&r.meta))
            .collect())
    }
}
