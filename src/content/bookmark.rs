//! Bookmarked links

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::frontmatter::{datetime, string_or_vec};
use super::recommendation::FEATURED_LIMIT;
use super::{ContentError, ContentKind, ContentMeta, Drafts, Entry, Repository};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookmarkType {
    Tool,
    Article,
    Video,
    Library,
    Resource,
    Other,
    Unrecognized(String),
}

impl BookmarkType {
    pub fn as_str(&self) -> &str {
        match self {
            BookmarkType::Tool => "tool",
            BookmarkType::Article => "article",
            BookmarkType::Video => "video",
            BookmarkType::Library => "library",
            BookmarkType::Resource => "resource",
            BookmarkType::Other => "other",
            BookmarkType::Unrecognized(raw) => raw,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BookmarkType::Tool => "Tool",
            BookmarkType::Article => "Article",
            BookmarkType::Video => "Video",
            BookmarkType::Library => "Library",
            BookmarkType::Resource => "Resource",
            BookmarkType::Other | BookmarkType::Unrecognized(_) => "Other",
        }
    }
}

impl From<String> for BookmarkType {
    fn from(raw: String) -> Self {
        match raw.trim() {
            "tool" => BookmarkType::Tool,
            "article" => BookmarkType::Article,
            "video" => BookmarkType::Video,
            "library" => BookmarkType::Library,
            "resource" => BookmarkType::Resource,
            "other" => BookmarkType::Other,
            _ => BookmarkType::Unrecognized(raw),
        }
    }
}

impl From<BookmarkType> for String {
    fn from(kind: BookmarkType) -> Self {
        match kind {
            BookmarkType::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BookmarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkMeta {
    pub title: String,

    pub url: String,

    #[serde(default)]
    pub excerpt: String,

    pub category: String,

    #[serde(default, deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,

    pub bookmark_type: BookmarkType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,

    #[serde(with = "datetime")]
    pub published_at: NaiveDateTime,

    #[serde(
        default,
        with = "datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<NaiveDateTime>,

    #[serde(default)]
    pub featured: bool,
}

pub type Bookmark = Entry<BookmarkMeta>;

impl ContentMeta for BookmarkMeta {
    const KIND: ContentKind = ContentKind::Bookmark;

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
        vec![&self.url]
    }

    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.url.trim().is_empty() {
            return Err("url must not be empty".to_string());
        }
        Ok(())
    }
}

impl Repository<BookmarkMeta> {
    pub fn by_type(&self, kind: &BookmarkType, drafts: Drafts) -> Result<Vec<Bookmark>, ContentError> {
        Ok(self
            .list_all(drafts)?
            .into_iter()
            .filter(|b| &b.meta.bookmark_type == kind)
            .collect())
    }

    pub fn featured(&self, drafts: Drafts) -> Result<Vec<Bookmark>, ContentError> {
        Ok(self
            .list_all(drafts)?
            .into_iter()
            .filter(|b| b.meta.featured)
            .take(FEATURED_LIMIT)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark(slug: &str, kind: &str, featured: bool) -> Bookmark {
        let yaml = format!(
            "title: {}\nurl: https://example.com/{}\ncategory: Dev\nbookmarkType: {}\npublishedAt: 2024-02-01\nfeatured: {}",
            slug, slug, kind, featured
        );
        Entry::new(slug, serde_yaml::from_str(&yaml).unwrap(), "")
    }

    #[test]
    fn test_type_fallback() {
        let b = bookmark("x", "podcast", false);
        assert_eq!(b.meta.bookmark_type, BookmarkType::Unrecognized("podcast".to_string()));
        assert_eq!(b.meta.bookmark_type.label(), "Other");
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["bookmarkType"], "podcast");
    }

    #[test]
    fn test_url_required() {
        let res: Result<BookmarkMeta, _> = serde_yaml::from_str(
            "title: X\ncategory: Dev\nbookmarkType: tool\npublishedAt: 2024-02-01",
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_by_type_and_featured() {
        let repo = Repository::in_memory(vec![
            bookmark("ripgrep", "tool", true),
            bookmark("talk", "video", false),
            bookmark("fd", "tool", false),
        ])
        .unwrap();

        let tools = repo.by_type(&BookmarkType::Tool, Drafts::Exclude).unwrap();
        let slugs: Vec<_> = tools.iter().map(|b| b.slug.as_str()).collect();
        assert_eq!(slugs, vec!["fd", "ripgrep"]);

        let featured = repo.featured(Drafts::Exclude).unwrap();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].slug, "ripgrep");
    }

    #[test]
    fn test_search_matches_url() {
        let repo = Repository::in_memory(vec![bookmark("ripgrep", "tool", true)]).unwrap();
        assert_eq!(repo.search("example.com", Drafts::Exclude).unwrap().len(), 1);
    }
}
