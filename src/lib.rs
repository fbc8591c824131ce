//! folio: a content engine for a personal blog and portfolio
//!
//! Posts, reviews, projects, recommendations and bookmarks are Markdown files
//! with a YAML front-matter header. This crate loads them into typed records,
//! renders them to HTML, produces the RSS feed and sitemap, and serves
//! everything as JSON through a small HTTP API.

pub mod chat;
pub mod commands;
pub mod config;
pub mod content;
pub mod editor;
pub mod feed;
pub mod helpers;
pub mod server;

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use content::{
    BookmarkMeta, ContentMeta, Drafts, MarkdownRenderer, PostMeta, ProjectMeta,
    RecommendationMeta, Repository, ReviewMeta,
};

/// The main application: configuration plus resolved directories
#[derive(Debug, Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content root with one directory per kind
    pub content_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Whether draft items are visible
    pub drafts: Drafts,
}

impl Folio {
    /// Load a site from a directory; a missing `_config.yml` means defaults
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let drafts = config.drafts();

        Self {
            config,
            base_dir,
            content_dir,
            public_dir,
            drafts,
        }
    }

    /// Override the draft policy, e.g. from a CLI flag
    pub fn with_drafts(mut self, drafts: Drafts) -> Self {
        self.drafts = drafts;
        self
    }

    /// Repository for any kind under the content root
    pub fn repository<M: ContentMeta>(&self) -> Repository<M> {
        Repository::files(&self.content_dir)
    }

    pub fn posts(&self) -> Repository<PostMeta> {
        self.repository()
    }

    pub fn reviews(&self) -> Repository<ReviewMeta> {
        self.repository()
    }

    pub fn projects(&self) -> Repository<ProjectMeta> {
        self.repository()
    }

    pub fn recommendations(&self) -> Repository<RecommendationMeta> {
        self.repository()
    }

    pub fn bookmarks(&self) -> Repository<BookmarkMeta> {
        self.repository()
    }

    pub fn renderer(&self) -> MarkdownRenderer {
        MarkdownRenderer::from_config(&self.config.highlight)
    }

    /// RSS 2.0 feed of all visible posts
    pub fn rss(&self, built_at: DateTime<Utc>) -> Result<String> {
        let posts = self.posts().list_all(self.drafts)?;
        feed::RssChannel::from_config(&self.config).render(&posts, built_at)
    }

    /// Sitemap over the static pages, posts, projects and reviews
    pub fn sitemap(&self, now: DateTime<Utc>) -> Result<String> {
        let posts = self.posts().list_all(self.drafts)?;
        let projects = self.projects().list_all(self.drafts)?;
        let reviews = self.reviews().list_all(self.drafts)?;
        let urls = feed::sitemap::collect(
            self.config.base_url(),
            now.naive_utc(),
            &posts,
            &projects,
            &reviews,
        );
        feed::sitemap::render(&urls)
    }

    pub fn robots(&self) -> String {
        feed::robots::render(self.config.base_url(), &self.config.robots)
    }

    /// Write the feed, sitemap and robots.txt
    pub fn generate(&self) -> Result<Vec<PathBuf>> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
