//! Blog posts

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::frontmatter::{datetime, string_or_vec};
use super::{ContentError, ContentKind, ContentMeta, Drafts, Entry, Repository};

/// Front-matter of a blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    pub title: String,

    /// Publication date
    #[serde(with = "datetime")]
    pub date: NaiveDateTime,

    #[serde(default)]
    pub excerpt: String,

    #[serde(default, deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,

    /// Slug of the project this post belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

pub type Post = Entry<PostMeta>;

impl ContentMeta for PostMeta {
    const KIND: ContentKind = ContentKind::Post;

    fn title(&self) -> &str {
        &self.title
    }

    fn sort_date(&self) -> NaiveDateTime {
        self.date
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn excerpt(&self) -> &str {
        &self.excerpt
    }

    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        Ok(())
    }
}

impl Repository<PostMeta> {
    /// Posts that name `project` in their front-matter
    pub fn by_project(&self, project: &str, drafts: Drafts) -> Result<Vec<Post>, ContentError> {
        Ok(self
            .list_all(drafts)?
            .into_iter()
            .filter(|p| p.meta.project.as_deref() == Some(project))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(slug: &str, yaml: &str) -> Post {
        Entry::new(slug, serde_yaml::from_str(yaml).unwrap(), "")
    }

    #[test]
    fn test_defaults_for_optional_fields() {
        let meta: PostMeta = serde_yaml::from_str("title: Hello\ndate: 2024-01-01").unwrap();
        assert_eq!(meta.excerpt, "");
        assert!(meta.tags.is_empty());
        assert_eq!(meta.cover_image, None);
        assert_eq!(meta.project, None);
    }

    #[test]
    fn test_empty_title_rejected() {
        let meta: PostMeta = serde_yaml::from_str("title: ' '\ndate: 2024-01-01").unwrap();
        assert!(meta.validate().is_err());
    }

    #[test]
    fn test_serializes_camel_case() {
        let p = post(
            "hello",
            "title: Hello\ndate: 2024-01-01\ncoverImage: /img/cover.png",
        );
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["slug"], "hello");
        assert_eq!(json["isDraft"], false);
        assert_eq!(json["coverImage"], "/img/cover.png");
        assert_eq!(json["date"], "2024-01-01");
        assert_eq!(p.path(), "/blog/hello");
    }

    #[test]
    fn test_by_project() {
        let repo = Repository::in_memory(vec![
            post("one", "title: One\ndate: 2024-01-01\nproject: homelab-setup"),
            post("two", "title: Two\ndate: 2024-01-02"),
            post("three", "title: Three\ndate: 2024-01-03\nproject: homelab-setup"),
        ])
        .unwrap();

        let slugs: Vec<_> = repo
            .by_project("homelab-setup", Drafts::Exclude)
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["three", "one"]);
    }
}
