//! Content module - typed content kinds, loading and rendering

mod bookmark;
mod entry;
mod error;
mod frontmatter;
mod markdown;
mod post;
mod project;
mod recommendation;
mod repository;
mod review;

pub use bookmark::{Bookmark, BookmarkMeta, BookmarkType};
pub use entry::{ContentKind, ContentMeta, Drafts, Entry};
pub use error::ContentError;
pub use frontmatter::{format_date_value, parse_date_string, render as render_frontmatter, FrontMatter};
pub use markdown::{MarkdownRenderer, PLACEHOLDER_IMAGE};
pub use post::{Post, PostMeta};
pub use project::{reading_list, Project, ProjectMeta, ProjectStatus, ReadingItem};
pub use recommendation::{
    BillingPeriod, Price, Recommendation, RecommendationMeta, RecommendationStatus,
    FEATURED_LIMIT,
};
pub use repository::{ensure_layout, parse_file_name, FileStore, MemoryStore, Repository, SourceName, Store};
pub use review::{Review, ReviewMeta, StarRating};
