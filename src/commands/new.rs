//! Create a new content file through the editor

use anyhow::{bail, Result};
use std::fs;
use std::path::PathBuf;

use crate::content::ContentKind;
use crate::editor::ContentForm;
use crate::Folio;

/// What `folio new` was asked to create
#[derive(Debug, Clone)]
pub struct NewContent {
    pub kind: ContentKind,
    pub title: String,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub excerpt: Option<String>,
    /// Product name for reviews, link for bookmarks
    pub product: Option<String>,
    pub url: Option<String>,
    pub draft: bool,
}

impl NewContent {
    pub fn new(kind: ContentKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            slug: None,
            category: None,
            tags: Vec::new(),
            excerpt: None,
            product: None,
            url: None,
            draft: false,
        }
    }

    fn form(&self) -> ContentForm {
        let mut form = ContentForm::new(self.kind, self.title.clone());
        form.slug = self.slug.clone().unwrap_or_default();
        form.category = self.category.clone().unwrap_or_default();
        form.tags = self.tags.clone();
        form.excerpt = self.excerpt.clone().unwrap_or_default();
        form.product_name = self.product.clone().unwrap_or_else(|| self.title.clone());
        form.product_url = self.url.clone().unwrap_or_default();
        form
    }
}

/// Compose the file and write it; never overwrites
pub fn create(folio: &Folio, request: &NewContent) -> Result<PathBuf> {
    let form = request.form();
    let text = form.compose()?;

    let target_dir = folio.content_dir.join(request.kind.dir_name());
    fs::create_dir_all(&target_dir)?;

    // A draft and a published file may not share a slug
    for existing in [form.file_name(false), form.file_name(true)] {
        let path = target_dir.join(existing);
        if path.exists() {
            bail!("File already exists: {:?}", path);
        }
    }

    let file_path = target_dir.join(form.file_name(request.draft));

    fs::write(&file_path, text)?;
    tracing::info!("Created {} {:?}", request.kind, file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{BookmarkMeta, Drafts, ReviewMeta};
    use tempfile::TempDir;

    #[test]
    fn test_create_post_and_refuse_overwrite() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        let request = NewContent::new(ContentKind::Post, "My New Post");

        let path = create(&folio, &request).unwrap();
        assert_eq!(path, folio.content_dir.join("posts/my-new-post.md"));

        let post = folio
            .posts()
            .get_by_slug("my-new-post", Drafts::Exclude)
            .unwrap()
            .unwrap();
        assert_eq!(post.title(), "My New Post");

        assert!(create(&folio, &request).is_err());
    }

    #[test]
    fn test_create_draft_review() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        let mut request = NewContent::new(ContentKind::Review, "Kindle Paperwhite");
        request.category = Some("Hardware".to_string());
        request.draft = true;

        let path = create(&folio, &request).unwrap();
        assert!(path.ends_with("reviews/kindle-paperwhite.draft.md"));

        let reviews = folio.repository::<ReviewMeta>();
        assert!(reviews.get_by_slug("kindle-paperwhite", Drafts::Exclude).unwrap().is_none());
        let review = reviews
            .get_by_slug("kindle-paperwhite", Drafts::Include)
            .unwrap()
            .unwrap();
        assert!(review.is_draft);
        assert_eq!(review.meta.product_name, "Kindle Paperwhite");
    }

    #[test]
    fn test_refuse_draft_next_to_published() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        let mut request = NewContent::new(ContentKind::Post, "Twice");
        create(&folio, &request).unwrap();

        request.draft = true;
        assert!(create(&folio, &request).is_err());
        assert!(!folio.content_dir.join("posts/twice.draft.md").exists());
        assert_eq!(folio.posts().list_all(Drafts::Include).unwrap().len(), 1);
    }

    #[test]
    fn test_draft_marker_in_slug_is_stripped() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        let mut request = NewContent::new(ContentKind::Post, "Sneaky");
        request.slug = Some("sneaky.draft".to_string());

        let path = create(&folio, &request).unwrap();
        assert_eq!(path, folio.content_dir.join("posts/sneaky.md"));
        let post = folio.posts().get_by_slug("sneaky", Drafts::Exclude).unwrap().unwrap();
        assert!(!post.is_draft);
    }

    #[test]
    fn test_bookmark_needs_url() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        let mut request = NewContent::new(ContentKind::Bookmark, "ripgrep");
        request.category = Some("Tools".to_string());
        assert!(create(&folio, &request).is_err());

        request.url = Some("https://github.com/BurntSushi/ripgrep".to_string());
        create(&folio, &request).unwrap();
        let bookmark = folio
            .repository::<BookmarkMeta>()
            .get_by_slug("ripgrep", Drafts::Exclude)
            .unwrap()
            .unwrap();
        assert_eq!(bookmark.meta.url, "https://github.com/BurntSushi/ripgrep");
    }
}
