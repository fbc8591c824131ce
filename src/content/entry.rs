//! Shared content record shape

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::helpers::encode_segment;

/// The five kinds of content the site publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Review,
    Project,
    Recommendation,
    Bookmark,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        ContentKind::Post,
        ContentKind::Review,
        ContentKind::Project,
        ContentKind::Recommendation,
        ContentKind::Bookmark,
    ];

    /// Singular name
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::Review => "review",
            ContentKind::Project => "project",
            ContentKind::Recommendation => "recommendation",
            ContentKind::Bookmark => "bookmark",
        }
    }

    /// Directory under the content root
    pub fn dir_name(&self) -> &'static str {
        match self {
            ContentKind::Post => "posts",
            ContentKind::Review => "reviews",
            ContentKind::Project => "projects",
            ContentKind::Recommendation => "recommendations",
            ContentKind::Bookmark => "bookmarks",
        }
    }

    /// Public URL prefix for detail pages
    pub fn route(&self) -> &'static str {
        match self {
            ContentKind::Post => "/blog",
            ContentKind::Review => "/reviews",
            ContentKind::Project => "/projects",
            ContentKind::Recommendation => "/recommendations",
            ContentKind::Bookmark => "/bookmarks",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ContentKind::ALL
            .into_iter()
            .find(|k| k.as_str() == lower || k.dir_name() == lower)
            .ok_or_else(|| {
                format!(
                    "unknown content kind `{}` (expected post, review, project, recommendation or bookmark)",
                    s
                )
            })
    }
}

/// Whether draft-marked items take part in a read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Drafts {
    #[default]
    Exclude,
    Include,
}

impl Drafts {
    pub fn included(self) -> bool {
        self == Drafts::Include
    }
}

impl From<bool> for Drafts {
    fn from(include: bool) -> Self {
        if include {
            Drafts::Include
        } else {
            Drafts::Exclude
        }
    }
}

/// Typed front-matter schema of one content kind
pub trait ContentMeta: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: ContentKind;

    /// Display title (a recommendation's name)
    fn title(&self) -> &str;

    /// Key that listings sort on, newest first
    fn sort_date(&self) -> NaiveDateTime;

    fn tags(&self) -> &[String];

    fn category(&self) -> Option<&str> {
        None
    }

    fn excerpt(&self) -> &str {
        ""
    }

    /// Extra fields that free-text search looks at
    fn search_fields(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Checks that serde cannot express
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// One content item: slug, typed metadata and Markdown body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry<M> {
    pub slug: String,
    pub is_draft: bool,
    #[serde(flatten)]
    pub meta: M,
    pub content: String,
    /// File the entry was read from, or `memory:<kind>/<slug>`
    #[serde(skip)]
    pub source: PathBuf,
}

impl<M: ContentMeta> Entry<M> {
    /// An in-memory entry with an explicit slug
    pub fn new(slug: impl Into<String>, meta: M, content: impl Into<String>) -> Self {
        let slug = slug.into();
        let source = PathBuf::from(format!("memory:{}/{}", M::KIND.dir_name(), slug));
        Self {
            slug,
            is_draft: false,
            meta,
            content: content.into(),
            source,
        }
    }

    pub fn title(&self) -> &str {
        self.meta.title()
    }

    pub fn date(&self) -> NaiveDateTime {
        self.meta.sort_date()
    }

    pub fn category(&self) -> Option<&str> {
        self.meta.category()
    }

    pub fn tags(&self) -> &[String] {
        self.meta.tags()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t == tag)
    }

    /// Public path of the detail page, slug percent-encoded
    pub fn path(&self) -> String {
        format!("{}/{}", M::KIND.route(), encode_segment(&self.slug))
    }

    /// Case-insensitive substring search; `needle` must already be lowercase
    pub fn matches(&self, needle: &str) -> bool {
        let hit = |s: &str| s.to_lowercase().contains(needle);
        hit(self.title())
            || hit(self.meta.excerpt())
            || hit(&self.content)
            || self.tags().iter().any(|t| hit(t))
            || self.category().is_some_and(hit)
            || self.meta.search_fields().into_iter().any(hit)
    }
}
