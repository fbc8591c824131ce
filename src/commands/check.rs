//! Strict validation of every content file

use anyhow::{bail, Result};

use crate::content::{ContentError, ContentKind};
use crate::Folio;

/// Every problem a listing would silently skip, across all kinds
pub fn diagnostics(folio: &Folio) -> Vec<ContentError> {
    let drafts = folio.drafts;
    ContentKind::ALL
        .into_iter()
        .flat_map(|kind| match kind {
            ContentKind::Post => folio.posts().validate(drafts),
            ContentKind::Review => folio.reviews().validate(drafts),
            ContentKind::Project => folio.projects().validate(drafts),
            ContentKind::Recommendation => folio.recommendations().validate(drafts),
            ContentKind::Bookmark => folio.bookmarks().validate(drafts),
        })
        .collect()
}

/// Print diagnostics; an error when there are any
pub fn run(folio: &Folio) -> Result<()> {
    let problems = diagnostics(folio);
    if problems.is_empty() {
        println!("All content is valid.");
        return Ok(());
    }

    for problem in &problems {
        println!("  {}", problem);
    }
    bail!("{} content problem(s) found", problems.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_check_reports_each_bad_file() {
        let tmp = TempDir::new().unwrap();
        let content = tmp.path().join("content");
        fs::create_dir_all(content.join("posts")).unwrap();
        fs::create_dir_all(content.join("bookmarks")).unwrap();
        fs::write(
            content.join("posts/ok.md"),
            "---\ntitle: Ok\ndate: 2024-01-01\n---\n",
        )
        .unwrap();
        fs::write(content.join("posts/bad.md"), "---\ntitle: Bad\n---\n").unwrap();
        fs::write(
            content.join("bookmarks/nourl.md"),
            "---\ntitle: X\ncategory: Dev\nbookmarkType: tool\npublishedAt: 2024-01-01\n---\n",
        )
        .unwrap();

        let folio = Folio::new(tmp.path()).unwrap();
        assert_eq!(diagnostics(&folio).len(), 2);
        assert!(run(&folio).is_err());

        fs::remove_file(content.join("posts/bad.md")).unwrap();
        fs::remove_file(content.join("bookmarks/nourl.md")).unwrap();
        assert!(run(&folio).is_ok());
    }
}
