//! Write the feed, sitemap and robots.txt into the public directory

use anyhow::Result;
use chrono::Utc;
use std::fs;
use std::path::PathBuf;

use crate::Folio;

pub const RSS_FILE: &str = "rss.xml";
pub const SITEMAP_FILE: &str = "sitemap.xml";
pub const ROBOTS_FILE: &str = "robots.txt";

/// Generate every document and return the paths written
pub fn run(folio: &Folio) -> Result<Vec<PathBuf>> {
    let start = std::time::Instant::now();
    let now = Utc::now();

    fs::create_dir_all(&folio.public_dir)?;

    let outputs = [
        (RSS_FILE, folio.rss(now)?),
        (SITEMAP_FILE, folio.sitemap(now)?),
        (ROBOTS_FILE, folio.robots()),
    ];

    let mut written = Vec::with_capacity(outputs.len());
    for (name, text) in outputs {
        let path = folio.public_dir.join(name);
        fs::write(&path, text)?;
        tracing::debug!("Wrote {:?}", path);
        written.push(path);
    }

    tracing::info!(
        "Generated {} files in {:.2}s",
        written.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_writes_documents() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("content/posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("hello.md"),
            "---\ntitle: Hello\ndate: 2024-01-01\nexcerpt: Hi\n---\n\nBody\n",
        )
        .unwrap();
        fs::write(
            posts.join("secret.draft.md"),
            "---\ntitle: Secret\ndate: 2024-02-01\n---\n\nBody\n",
        )
        .unwrap();

        let folio = Folio::new(tmp.path()).unwrap().with_drafts(crate::content::Drafts::Exclude);
        let written = run(&folio).unwrap();
        assert_eq!(written.len(), 3);

        let rss = fs::read_to_string(folio.public_dir.join(RSS_FILE)).unwrap();
        assert!(rss.contains("/blog/hello"));
        assert!(!rss.contains("/blog/secret"));

        let sitemap = fs::read_to_string(folio.public_dir.join(SITEMAP_FILE)).unwrap();
        assert!(sitemap.contains("/blog/hello</loc>"));

        let robots = fs::read_to_string(folio.public_dir.join(ROBOTS_FILE)).unwrap();
        assert!(robots.contains("Sitemap: "));
    }
}
