//! Projects: ordered series of posts

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::frontmatter::{datetime, string_or_vec};
use super::post::{Post, PostMeta};
use super::{ContentError, ContentKind, ContentMeta, Drafts, Entry, Repository};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProjectStatus {
    #[default]
    Ongoing,
    Completed,
    Unrecognized(String),
}

impl ProjectStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ProjectStatus::Ongoing => "ongoing",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Unrecognized(raw) => raw,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Ongoing => "Ongoing",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Unrecognized(_) => "Project",
        }
    }
}

impl From<String> for ProjectStatus {
    fn from(raw: String) -> Self {
        match raw.trim() {
            "ongoing" => ProjectStatus::Ongoing,
            "completed" => ProjectStatus::Completed,
            _ => ProjectStatus::Unrecognized(raw),
        }
    }
}

impl From<ProjectStatus> for String {
    fn from(status: ProjectStatus) -> Self {
        match status {
            ProjectStatus::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeta {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub excerpt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,

    /// Post slugs in reading order
    #[serde(default, deserialize_with = "string_or_vec")]
    pub posts: Vec<String>,

    #[serde(default, deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,

    pub category: String,

    #[serde(default)]
    pub status: ProjectStatus,

    #[serde(with = "datetime")]
    pub published_at: NaiveDateTime,

    #[serde(with = "datetime")]
    pub updated_at: NaiveDateTime,

    #[serde(
        default,
        with = "datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_post_date: Option<NaiveDateTime>,
}

pub type Project = Entry<ProjectMeta>;

impl ContentMeta for ProjectMeta {
    const KIND: ContentKind = ContentKind::Project;

    fn title(&self) -> &str {
        &self.title
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
        &self.excerpt
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.description]
    }

    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.updated_at < self.published_at {
            return Err("updatedAt is earlier than publishedAt".to_string());
        }
        Ok(())
    }
}

/// A post inside a project's reading order, with its neighbours
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingItem {
    pub position: usize,
    pub post: Post,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl Repository<ProjectMeta> {
    pub fn ongoing(&self, drafts: Drafts) -> Result<Vec<Project>, ContentError> {
        self.with_status(ProjectStatus::Ongoing, drafts)
    }

    pub fn completed(&self, drafts: Drafts) -> Result<Vec<Project>, ContentError> {
        self.with_status(ProjectStatus::Completed, drafts)
    }

    fn with_status(
        &self,
        status: ProjectStatus,
        drafts: Drafts,
    ) -> Result<Vec<Project>, ContentError> {
        Ok(self
            .list_all(drafts)?
            .into_iter()
            .filter(|p| p.meta.status == status)
            .collect())
    }
}

/// Resolve a project's post slugs against `posts`, skipping missing ones.
///
/// `prev`/`next` link neighbours within the resolved list.
pub fn reading_list(
    project: &Project,
    posts: &Repository<PostMeta>,
    drafts: Drafts,
) -> Result<Vec<ReadingItem>, ContentError> {
    let mut resolved = Vec::with_capacity(project.meta.posts.len());
    for slug in &project.meta.posts {
        match posts.get_by_slug(slug, drafts)? {
            Some(post) => resolved.push(post),
            None => tracing::debug!("Project {} lists unknown post {}", project.slug, slug),
        }
    }

    let slugs: Vec<String> = resolved.iter().map(|p| p.slug.clone()).collect();
    Ok(resolved
        .into_iter()
        .enumerate()
        .map(|(i, post)| ReadingItem {
            position: i + 1,
            post,
            prev: i.checked_sub(1).map(|j| slugs[j].clone()),
            next: slugs.get(i + 1).cloned(),
        })
        .collect())
}
