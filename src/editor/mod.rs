//! Content editor - composes front-matter and Markdown for a new item

use chrono::{Local, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::content::{
    render_frontmatter, BookmarkMeta, BookmarkType, ContentKind, ContentMeta, PostMeta, Price,
    ProjectMeta, ProjectStatus, RecommendationMeta, RecommendationStatus, ReviewMeta,
};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("{kind} needs a {field}")]
    MissingField {
        kind: ContentKind,
        field: &'static str,
    },

    #[error("invalid {kind}: {reason}")]
    Invalid { kind: ContentKind, reason: String },

    #[error("failed to serialize front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Flat form state shared by every content kind.
///
/// Fields a kind does not use are ignored when composing.
#[derive(Debug, Clone)]
pub struct ContentForm {
    pub kind: ContentKind,
    pub title: String,
    /// Derived from the title when empty
    pub slug: String,
    pub date: NaiveDateTime,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub content: String,
    /// Project slug a post belongs to
    pub project: String,
    pub rating: f64,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub verdict: String,
    pub product_name: String,
    /// Product URL; the link itself for bookmarks
    pub product_url: String,
    pub affiliate_url: String,
    /// current, previous or heard
    pub status: String,
    pub price: Option<Price>,
    pub category: String,
    pub featured: bool,
    pub bookmark_type: String,
}

impl ContentForm {
    /// Empty form dated today
    pub fn new(kind: ContentKind, title: impl Into<String>) -> Self {
        let today = Local::now().date_naive();
        Self {
            kind,
            title: title.into(),
            slug: String::new(),
            date: today.and_hms_opt(0, 0, 0).unwrap_or_default(),
            excerpt: String::new(),
            tags: Vec::new(),
            content: String::new(),
            project: String::new(),
            rating: 5.0,
            pros: Vec::new(),
            cons: Vec::new(),
            verdict: String::new(),
            product_name: String::new(),
            product_url: String::new(),
            affiliate_url: String::new(),
            status: "current".to_string(),
            price: None,
            category: String::new(),
            featured: false,
            bookmark_type: "article".to_string(),
        }
    }

    /// The explicit slug, or the title slugified.
    ///
    /// A trailing `.draft` is dropped; drafts are chosen by `file_name`.
    pub fn slug(&self) -> String {
        let explicit = self.slug.trim().trim_end_matches(".draft");
        if explicit.is_empty() {
            slugify(&self.title)
        } else {
            explicit.to_string()
        }
    }

    /// `<slug>.md`, or `<slug>.draft.md`
    pub fn file_name(&self, draft: bool) -> String {
        let slug = self.slug();
        let slug = if slug.is_empty() { "content".to_string() } else { slug };
        if draft {
            format!("{}.draft.md", slug)
        } else {
            format!("{}.md", slug)
        }
    }

    /// Front-matter block, a blank line, then the body
    pub fn compose(&self) -> Result<String, EditorError> {
        match self.kind {
            ContentKind::Post => self.render(&self.post_meta()),
            ContentKind::Review => self.render(&self.review_meta()?),
            ContentKind::Project => self.render(&self.project_meta()?),
            ContentKind::Recommendation => self.render(&self.recommendation_meta()?),
            ContentKind::Bookmark => self.render(&self.bookmark_meta()?),
        }
    }

    fn render<M: ContentMeta>(&self, meta: &M) -> Result<String, EditorError> {
        meta.validate().map_err(|reason| EditorError::Invalid {
            kind: M::KIND,
            reason,
        })?;
        Ok(render_frontmatter(meta, &self.content)?)
    }

    fn post_meta(&self) -> PostMeta {
        PostMeta {
            title: self.title.clone(),
            date: self.date,
            excerpt: self.excerpt.clone(),
            tags: self.tags.clone(),
            cover_image: None,
            project: non_empty(&self.project),
        }
    }

    fn review_meta(&self) -> Result<ReviewMeta, EditorError> {
        Ok(ReviewMeta {
            title: self.title.clone(),
            rating: self.rating,
            product_name: self.required(&self.product_name, "productName")?,
            product_url: non_empty(&self.product_url),
            affiliate_url: non_empty(&self.affiliate_url),
            pros: entries(&self.pros),
            cons: entries(&self.cons),
            verdict: self.verdict.clone(),
            excerpt: self.excerpt.clone(),
            cover_image: None,
            tags: self.tags.clone(),
            category: self.required(&self.category, "category")?,
            published_at: self.date,
            updated_at: None,
            related_recommendations: Vec::new(),
            is_recommended: false,
            is_currently_used: false,
            status: non_empty(&self.status).map(RecommendationStatus::from),
        })
    }

    fn project_meta(&self) -> Result<ProjectMeta, EditorError> {
        // the form offers the recommendation statuses
        let status = match self.status.trim() {
            "current" | "" => ProjectStatus::Ongoing,
            "previous" => ProjectStatus::Completed,
            other => ProjectStatus::from(other.to_string()),
        };
        Ok(ProjectMeta {
            title: self.title.clone(),
            description: String::new(),
            excerpt: self.excerpt.clone(),
            cover_image: None,
            posts: Vec::new(),
            tags: self.tags.clone(),
            category: self.required(&self.category, "category")?,
            status,
            published_at: self.date,
            updated_at: self.date,
            last_post_date: Some(self.date),
        })
    }

    fn recommendation_meta(&self) -> Result<RecommendationMeta, EditorError> {
        Ok(RecommendationMeta {
            name: self.title.clone(),
            short_description: self.excerpt.clone(),
            description: String::new(),
            pros: entries(&self.pros),
            cons: entries(&self.cons),
            url: non_empty(&self.product_url),
            affiliate_url: non_empty(&self.affiliate_url),
            logo: None,
            tags: self.tags.clone(),
            category: self.required(&self.category, "category")?,
            status: RecommendationStatus::from(self.required(&self.status, "status")?),
            featured: self.featured,
            price: self.price.clone(),
            related_recommendations: Vec::new(),
            updated_at: self.date,
        })
    }

    fn bookmark_meta(&self) -> Result<BookmarkMeta, EditorError> {
        Ok(BookmarkMeta {
            title: self.title.clone(),
            url: self.required(&self.product_url, "url")?,
            excerpt: self.excerpt.clone(),
            category: self.required(&self.category, "category")?,
            tags: self.tags.clone(),
            bookmark_type: BookmarkType::from(self.bookmark_type.clone()),
            screenshot: None,
            published_at: self.date,
            updated_at: None,
            featured: self.featured,
        })
    }

    fn required(&self, value: &str, field: &'static str) -> Result<String, EditorError> {
        non_empty(value).ok_or(EditorError::MissingField {
            kind: self.kind,
            field,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// List entries with blanks dropped
fn entries(values: &[String]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| non_empty(v))
        .collect()
}

/// Lowercase, drop non-word characters, join words with single dashes
pub fn slugify(title: &str) -> String {
    lazy_static! {
        static ref NON_WORD: Regex = Regex::new(r"[^\w\s-]").unwrap();
        static ref SEPARATORS: Regex = Regex::new(r"[\s_-]+").unwrap();
    }

    let lower = title.to_lowercase();
    let stripped = NON_WORD.replace_all(&lower, "");
    SEPARATORS
        .replace_all(stripped.trim(), "-")
        .trim_matches('-')
        .to_string()
}
