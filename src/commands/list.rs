//! List site content

use anyhow::{bail, Result};
use std::collections::HashMap;

use crate::content::{ContentError, ContentKind, ContentMeta, Entry, Repository};
use crate::helpers::truncate;
use crate::Folio;

/// List one kind, or the categories / tags across every kind
pub fn run(folio: &Folio, what: &str) -> Result<()> {
    match what {
        "category" | "categories" => {
            let counts = count_all(folio, |e| e.category.map(|c| vec![c]).unwrap_or_default())?;
            print_counts("Categories", counts);
        }
        "tag" | "tags" => {
            let counts = count_all(folio, |e| e.tags)?;
            print_counts("Tags", counts);
        }
        other => {
            let kind: ContentKind = match other.parse() {
                Ok(kind) => kind,
                Err(e) => bail!("{}. Also available: categories, tags", e),
            };
            for line in describe(folio, kind)? {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

/// Title line plus one line per entry
pub fn describe(folio: &Folio, kind: ContentKind) -> Result<Vec<String>> {
    let summaries = summaries(folio, kind)?;
    let mut lines = vec![format!("{} ({}):", capitalize(kind.dir_name()), summaries.len())];
    for s in summaries {
        let draft = if s.is_draft { " (draft)" } else { "" };
        lines.push(format!(
            "  {} - {}{} [{}]",
            s.date,
            truncate(&s.title, 60, None),
            draft,
            s.slug
        ));
    }
    Ok(lines)
}

/// Kind-independent view of an entry
struct Summary {
    slug: String,
    title: String,
    date: String,
    is_draft: bool,
    category: Option<String>,
    tags: Vec<String>,
}

impl<M: ContentMeta> From<Entry<M>> for Summary {
    fn from(entry: Entry<M>) -> Self {
        Self {
            date: entry.date().format("%Y-%m-%d").to_string(),
            title: entry.title().to_string(),
            category: entry.category().map(str::to_string),
            tags: entry.tags().to_vec(),
            is_draft: entry.is_draft,
            slug: entry.slug,
        }
    }
}

fn load<M: ContentMeta>(repo: Repository<M>, folio: &Folio) -> Result<Vec<Summary>, ContentError> {
    Ok(repo
        .list_all(folio.drafts)?
        .into_iter()
        .map(Summary::from)
        .collect())
}

fn summaries(folio: &Folio, kind: ContentKind) -> Result<Vec<Summary>, ContentError> {
    match kind {
        ContentKind::Post => load(folio.posts(), folio),
        ContentKind::Review => load(folio.reviews(), folio),
        ContentKind::Project => load(folio.projects(), folio),
        ContentKind::Recommendation => load(folio.recommendations(), folio),
        ContentKind::Bookmark => load(folio.bookmarks(), folio),
    }
}

fn count_all(
    folio: &Folio,
    keys: impl Fn(Summary) -> Vec<String>,
) -> Result<Vec<(String, usize)>> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for kind in ContentKind::ALL {
        for summary in summaries(folio, kind)? {
            for key in keys(summary) {
                *counts.entry(key).or_insert(0) += 1;
            }
        }
    }
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(counts)
}

fn print_counts(label: &str, counts: Vec<(String, usize)>) {
    println!("{} ({}):", label, counts.len());
    for (name, count) in counts {
        println!("  {} ({})", name, count);
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_describe_reviews() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("content/reviews");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("kindle.md"),
            "---\ntitle: Kindle\nrating: 4\nproductName: Kindle\ncategory: Hardware\npublishedAt: 2024-03-01\n---\n",
        )
        .unwrap();

        let folio = Folio::new(tmp.path()).unwrap();
        let lines = describe(&folio, ContentKind::Review).unwrap();
        assert_eq!(lines, vec!["Reviews (1):", "  2024-03-01 - Kindle [kindle]"]);
    }

    #[test]
    fn test_unknown_kind() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        assert!(run(&folio, "podcasts").is_err());
        assert!(run(&folio, "tags").is_ok());
    }
}
