//! Content repository - typed lookups over a pluggable backing store

use indexmap::IndexSet;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{ContentError, ContentKind, ContentMeta, Drafts, Entry, FrontMatter};

/// Where entries of one kind come from
pub trait Store<M: ContentMeta>: Send + Sync {
    /// Every entry visible under `drafts`, each parsed or failed on its own.
    ///
    /// The outer error is reserved for problems that make the whole set
    /// untrustworthy, such as two files claiming the same slug.
    fn scan(&self, drafts: Drafts) -> Result<Vec<Result<Entry<M>, ContentError>>, ContentError>;

    /// A single entry, `Ok(None)` when nothing carries that slug
    fn fetch(&self, slug: &str, drafts: Drafts) -> Result<Option<Entry<M>>, ContentError>;
}

/// Markdown files in a single directory, one item per file
pub struct FileStore {
    dir: PathBuf,
}

/// A content file name split into slug and draft marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceName {
    pub slug: String,
    pub is_draft: bool,
}

/// Split `hello.md`, `hello.mdx`, `hello.draft.md` and `hello.draft.mdx`.
/// Anything else is not content.
pub fn parse_file_name(name: &str) -> Option<SourceName> {
    let stem = name
        .strip_suffix(".md")
        .or_else(|| name.strip_suffix(".mdx"))?;

    let (slug, is_draft) = match stem.strip_suffix(".draft") {
        Some(slug) => (slug, true),
        None => (stem, false),
    };

    if slug.is_empty() || slug.starts_with('.') {
        return None;
    }

    Some(SourceName {
        slug: slug.to_string(),
        is_draft,
    })
}

/// Slugs that can be turned into a file name inside the store directory
fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && !slug.contains(['/', '\\'])
        && !slug.contains("..")
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Content files visible under `drafts`, sorted by file name
    fn source_files(
        &self,
        kind: ContentKind,
        drafts: Drafts,
    ) -> Result<Vec<(PathBuf, SourceName)>, ContentError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let files: Vec<(PathBuf, SourceName)> = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .filter_map(|e| {
                let name = e.file_name().to_str()?;
                let parsed = parse_file_name(name)?;
                Some((e.path().to_path_buf(), parsed))
            })
            .filter(|(_, name)| drafts.included() || !name.is_draft)
            .collect();

        {
            let mut seen: HashMap<&str, &Path> = HashMap::new();
            for (path, name) in &files {
                if let Some(first) = seen.insert(&name.slug, path) {
                    return Err(ContentError::DuplicateSlug {
                        kind,
                        slug: name.slug.clone(),
                        first: first.to_path_buf(),
                        second: path.clone(),
                    });
                }
            }
        }

        Ok(files)
    }
}

impl<M: ContentMeta> Store<M> for FileStore {
    fn scan(&self, drafts: Drafts) -> Result<Vec<Result<Entry<M>, ContentError>>, ContentError> {
        let files = self.source_files(M::KIND, drafts)?;
        tracing::debug!(
            "Scanning {} {} files in {:?}",
            files.len(),
            M::KIND,
            self.dir
        );
        Ok(files
            .into_iter()
            .map(|(path, name)| load_file::<M>(&path, name))
            .collect())
    }

    fn fetch(&self, slug: &str, drafts: Drafts) -> Result<Option<Entry<M>>, ContentError> {
        if !is_safe_slug(slug) {
            return Ok(None);
        }

        let mut names = vec![format!("{}.md", slug), format!("{}.mdx", slug)];
        if drafts.included() {
            names.push(format!("{}.draft.md", slug));
            names.push(format!("{}.draft.mdx", slug));
        }

        let found: Vec<PathBuf> = names
            .iter()
            .map(|name| self.dir.join(name))
            .filter(|path| path.is_file())
            .collect();

        match found.as_slice() {
            [] => Ok(None),
            [path] => {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(parse_file_name)
                    .ok_or_else(|| ContentError::Invalid {
                        kind: M::KIND,
                        path: path.clone(),
                        reason: "not a content file name".to_string(),
                    })?;
                // `x.draft` names the draft file of `x`, not an entry of its own
                if name.slug != slug {
                    return Ok(None);
                }
                load_file::<M>(path, name).map(Some)
            }
            [first, second, ..] => Err(ContentError::DuplicateSlug {
                kind: M::KIND,
                slug: slug.to_string(),
                first: first.clone(),
                second: second.clone(),
            }),
        }
    }
}

/// Read and validate one content file
fn load_file<M: ContentMeta>(path: &Path, name: SourceName) -> Result<Entry<M>, ContentError> {
    let text = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let fm = FrontMatter::parse(&text).map_err(|source| ContentError::Frontmatter {
        path: path.to_path_buf(),
        source,
    })?;

    if fm.is_empty() {
        return Err(ContentError::Invalid {
            kind: M::KIND,
            path: path.to_path_buf(),
            reason: "missing front-matter header".to_string(),
        });
    }

    let meta: M = fm.decode().map_err(|source| ContentError::Frontmatter {
        path: path.to_path_buf(),
        source,
    })?;

    meta.validate().map_err(|reason| ContentError::Invalid {
        kind: M::KIND,
        path: path.to_path_buf(),
        reason,
    })?;

    Ok(Entry {
        slug: name.slug,
        is_draft: name.is_draft,
        meta,
        content: fm.body.to_string(),
        source: path.to_path_buf(),
    })
}

/// Static records held in memory, such as seed data
pub struct MemoryStore<M> {
    entries: Vec<Entry<M>>,
}

impl<M: ContentMeta> MemoryStore<M> {
    /// Validate every record and reject repeated slugs up front
    pub fn new(entries: Vec<Entry<M>>) -> Result<Self, ContentError> {
        check_unique(&entries)?;
        for entry in &entries {
            entry
                .meta
                .validate()
                .map_err(|reason| ContentError::Invalid {
                    kind: M::KIND,
                    path: entry.source.clone(),
                    reason,
                })?;
        }
        Ok(Self { entries })
    }
}

fn check_unique<M: ContentMeta>(entries: &[Entry<M>]) -> Result<(), ContentError> {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for entry in entries {
        if let Some(first) = seen.insert(&entry.slug, &entry.source) {
            return Err(ContentError::DuplicateSlug {
                kind: M::KIND,
                slug: entry.slug.clone(),
                first: first.to_path_buf(),
                second: entry.source.clone(),
            });
        }
    }
    Ok(())
}

impl<M: ContentMeta> Store<M> for MemoryStore<M> {
    fn scan(&self, drafts: Drafts) -> Result<Vec<Result<Entry<M>, ContentError>>, ContentError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| drafts.included() || !e.is_draft)
            .cloned()
            .map(Ok)
            .collect())
    }

    fn fetch(&self, slug: &str, drafts: Drafts) -> Result<Option<Entry<M>>, ContentError> {
        Ok(self
            .entries
            .iter()
            .find(|e| e.slug == slug && (drafts.included() || !e.is_draft))
            .cloned())
    }
}

/// Lookups for one content kind, independent of where entries live
pub struct Repository<M> {
    store: Box<dyn Store<M>>,
}

impl<M: ContentMeta> Repository<M> {
    pub fn new<S: Store<M> + 'static>(store: S) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Repository over `<content_dir>/<kind dir>`
    pub fn files<P: AsRef<Path>>(content_dir: P) -> Self {
        Self::new(FileStore::new(
            content_dir.as_ref().join(M::KIND.dir_name()),
        ))
    }

    pub fn in_memory(entries: Vec<Entry<M>>) -> Result<Self, ContentError> {
        Ok(Self::new(MemoryStore::new(entries)?))
    }

    /// Every visible entry, newest first.
    ///
    /// Items that fail to parse are logged and left out.
    pub fn list_all(&self, drafts: Drafts) -> Result<Vec<Entry<M>>, ContentError> {
        let mut entries = Vec::new();
        for result in self.store.scan(drafts)? {
            match result {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!("Skipping {}: {}", M::KIND, e),
            }
        }

        entries.sort_by(|a, b| b.date().cmp(&a.date()).then_with(|| a.slug.cmp(&b.slug)));
        Ok(entries)
    }

    /// A single entry; unreadable items count as absent
    pub fn get_by_slug(&self, slug: &str, drafts: Drafts) -> Result<Option<Entry<M>>, ContentError> {
        match self.store.fetch(slug, drafts) {
            Err(e) if e.is_per_item() => {
                tracing::warn!("Ignoring {} `{}`: {}", M::KIND, slug, e);
                Ok(None)
            }
            other => other,
        }
    }

    pub fn get_by_category(
        &self,
        category: &str,
        drafts: Drafts,
    ) -> Result<Vec<Entry<M>>, ContentError> {
        Ok(self
            .list_all(drafts)?
            .into_iter()
            .filter(|e| e.category() == Some(category))
            .collect())
    }

    /// Distinct categories in first-seen order
    pub fn list_categories(&self, drafts: Drafts) -> Result<Vec<String>, ContentError> {
        let categories: IndexSet<String> = self
            .list_all(drafts)?
            .iter()
            .filter_map(|e| e.category().map(str::to_string))
            .collect();
        Ok(categories.into_iter().collect())
    }

    pub fn get_by_tag(&self, tag: &str, drafts: Drafts) -> Result<Vec<Entry<M>>, ContentError> {
        Ok(self
            .list_all(drafts)?
            .into_iter()
            .filter(|e| e.has_tag(tag))
            .collect())
    }

    /// Distinct tags in first-seen order
    pub fn list_tags(&self, drafts: Drafts) -> Result<Vec<String>, ContentError> {
        let tags: IndexSet<String> = self
            .list_all(drafts)?
            .iter()
            .flat_map(|e| e.tags().iter().cloned())
            .collect();
        Ok(tags.into_iter().collect())
    }

    /// Case-insensitive free-text search
    pub fn search(&self, query: &str, drafts: Drafts) -> Result<Vec<Entry<M>>, ContentError> {
        let needle = query.trim().to_lowercase();
        let entries = self.list_all(drafts)?;
        if needle.is_empty() {
            return Ok(entries);
        }
        Ok(entries.into_iter().filter(|e| e.matches(&needle)).collect())
    }

    /// Every problem a strict load would hit, instead of skipping them
    pub fn validate(&self, drafts: Drafts) -> Vec<ContentError> {
        match self.store.scan(drafts) {
            Ok(results) => results.into_iter().filter_map(Result::err).collect(),
            Err(e) => vec![e],
        }
    }
}

/// Create the content directory and one subdirectory per kind.
///
/// Returns the directories that did not exist before.
pub fn ensure_layout(content_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut created = Vec::new();
    let dirs = std::iter::once(content_dir.to_path_buf())
        .chain(ContentKind::ALL.iter().map(|k| content_dir.join(k.dir_name())));

    for dir in dirs {
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            tracing::debug!("Created directory: {:?}", dir);
            created.push(dir);
        }
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{PostMeta, ReviewMeta};
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, text: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), text).unwrap();
    }

    fn post(title: &str, date: &str) -> String {
        format!(
            "---\ntitle: {}\ndate: {}\nexcerpt: About {}\ntags: [notes]\n---\n\nBody of {}.\n",
            title, date, title, title
        )
    }

    fn review(title: &str, category: &str, published: &str) -> String {
        format!(
            "---\ntitle: {}\nrating: 4.5\nproductName: {}\ncategory: {}\npublishedAt: {}\n---\n\nReview body.\n",
            title, title, category, published
        )
    }

    fn posts_repo(tmp: &TempDir) -> (PathBuf, Repository<PostMeta>) {
        let dir = tmp.path().join("posts");
        (dir, Repository::files(tmp.path()))
    }

    #[test]
    fn test_parse_file_name() {
        assert_eq!(
            parse_file_name("hello.md"),
            Some(SourceName {
                slug: "hello".to_string(),
                is_draft: false
            })
        );
        assert_eq!(
            parse_file_name("hello.draft.mdx"),
            Some(SourceName {
                slug: "hello".to_string(),
                is_draft: true
            })
        );
        assert_eq!(parse_file_name("notes.txt"), None);
        assert_eq!(parse_file_name(".md"), None);
        assert_eq!(parse_file_name(".hidden.md"), None);
    }

    #[test]
    fn test_list_all_sorted_newest_first() {
        let tmp = TempDir::new().unwrap();
        let (dir, repo) = posts_repo(&tmp);
        write(&dir, "a.md", &post("A", "2024-01-01"));
        write(&dir, "b.md", &post("B", "2024-02-01"));

        let slugs: Vec<_> = repo
            .list_all(Drafts::Exclude)
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["b", "a"]);
    }

    #[test]
    fn test_list_all_dates_non_increasing() {
        let tmp = TempDir::new().unwrap();
        let (dir, repo) = posts_repo(&tmp);
        for (i, date) in ["2023-05-01", "2024-02-10", "2022-12-31", "2024-02-10"]
            .iter()
            .enumerate()
        {
            write(&dir, &format!("p{}.md", i), &post(&format!("P{}", i), date));
        }

        let posts = repo.list_all(Drafts::Exclude).unwrap();
        assert_eq!(posts.len(), 4);
        assert!(posts.windows(2).all(|w| w[0].date() >= w[1].date()));
    }

    #[test]
    fn test_drafts_toggle() {
        let tmp = TempDir::new().unwrap();
        let (dir, repo) = posts_repo(&tmp);
        write(&dir, "live.md", &post("Live", "2024-01-01"));
        write(&dir, "wip.draft.md", &post("Wip", "2024-03-01"));

        let public = repo.list_all(Drafts::Exclude).unwrap();
        assert_eq!(public.len(), 1);
        assert!(public.iter().all(|p| !p.is_draft));

        let all = repo.list_all(Drafts::Include).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].slug, "wip");
        assert!(all[0].is_draft);

        assert!(repo.get_by_slug("wip", Drafts::Exclude).unwrap().is_none());
        assert!(repo.get_by_slug("wip", Drafts::Include).unwrap().is_some());
    }

    #[test]
    fn test_draft_marker_in_slug_is_absent() {
        let tmp = TempDir::new().unwrap();
        let (dir, repo) = posts_repo(&tmp);
        write(&dir, "secret.draft.md", &post("Secret", "2024-01-01"));

        assert!(repo.list_all(Drafts::Exclude).unwrap().is_empty());
        assert!(repo
            .get_by_slug("secret.draft", Drafts::Exclude)
            .unwrap()
            .is_none());
        assert!(repo
            .get_by_slug("secret.draft", Drafts::Include)
            .unwrap()
            .is_none());

        let fetched = repo.get_by_slug("secret", Drafts::Include).unwrap().unwrap();
        assert_eq!(fetched.slug, "secret");
    }

    #[test]
    fn test_malformed_file_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let (dir, repo) = posts_repo(&tmp);
        write(&dir, "good.md", &post("Good", "2024-01-01"));
        write(&dir, "bad-yaml.md", "---\ntitle: [oops\ndate: 2024-01-01\n---\nx");
        write(&dir, "no-date.md", "---\ntitle: Missing date\n---\nx");
        write(&dir, "bad-date.md", "---\ntitle: Bad\ndate: tomorrow\n---\nx");
        write(&dir, "no-header.md", "# Just text");
        write(&dir, "readme.txt", "not content");

        let posts = repo.list_all(Drafts::Exclude).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "good");

        assert_eq!(repo.validate(Drafts::Exclude).len(), 4);
        assert!(repo.get_by_slug("no-date", Drafts::Exclude).unwrap().is_none());
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let repo: Repository<PostMeta> = Repository::files(tmp.path().join("nowhere"));
        assert!(repo.list_all(Drafts::Exclude).unwrap().is_empty());
        assert!(repo.get_by_slug("anything", Drafts::Exclude).unwrap().is_none());
    }

    #[test]
    fn test_get_by_slug_round_trip() {
        let tmp = TempDir::new().unwrap();
        let (dir, repo) = posts_repo(&tmp);
        write(&dir, "first.md", &post("First", "2024-01-01"));
        write(&dir, "second.mdx", &post("Second", "2024-01-02"));

        for listed in repo.list_all(Drafts::Exclude).unwrap() {
            let fetched = repo.get_by_slug(&listed.slug, Drafts::Exclude).unwrap().unwrap();
            assert_eq!(fetched.slug, listed.slug);
            assert_eq!(fetched.title(), listed.title());
        }
        assert!(repo.get_by_slug("missing", Drafts::Exclude).unwrap().is_none());
    }

    #[test]
    fn test_unsafe_slug_is_absent() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "secret.md", &post("Secret", "2024-01-01"));
        let (dir, repo) = posts_repo(&tmp);
        write(&dir, "ok.md", &post("Ok", "2024-01-01"));

        assert!(repo.get_by_slug("../secret", Drafts::Exclude).unwrap().is_none());
        assert!(repo.get_by_slug("", Drafts::Exclude).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_slug_is_error() {
        let tmp = TempDir::new().unwrap();
        let (dir, repo) = posts_repo(&tmp);
        write(&dir, "same.md", &post("One", "2024-01-01"));
        write(&dir, "same.mdx", &post("Two", "2024-01-02"));

        let err = repo.list_all(Drafts::Exclude).unwrap_err();
        assert!(matches!(err, ContentError::DuplicateSlug { ref slug, .. } if slug == "same"));
        assert!(repo.get_by_slug("same", Drafts::Exclude).is_err());
    }

    #[test]
    fn test_draft_collision_only_counts_when_included() {
        let tmp = TempDir::new().unwrap();
        let (dir, repo) = posts_repo(&tmp);
        write(&dir, "note.md", &post("Note", "2024-01-01"));
        write(&dir, "note.draft.md", &post("Note v2", "2024-02-01"));

        assert_eq!(repo.list_all(Drafts::Exclude).unwrap().len(), 1);
        assert!(repo.list_all(Drafts::Include).is_err());
    }

    #[test]
    fn test_categories_distinct() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("reviews");
        write(&dir, "a.md", &review("A", "Software", "2024-01-01"));
        write(&dir, "b.md", &review("B", "Hardware", "2024-01-02"));
        write(&dir, "c.md", &review("C", "Software", "2024-01-03"));
        let repo: Repository<ReviewMeta> = Repository::files(tmp.path());

        let mut categories = repo.list_categories(Drafts::Exclude).unwrap();
        categories.sort();
        assert_eq!(categories, vec!["Hardware", "Software"]);

        let software = repo.get_by_category("Software", Drafts::Exclude).unwrap();
        let slugs: Vec<_> = software.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["c", "a"]);
        assert!(repo.get_by_category("software", Drafts::Exclude).unwrap().is_empty());
    }

    #[test]
    fn test_tags_and_search() {
        let tmp = TempDir::new().unwrap();
        let (dir, repo) = posts_repo(&tmp);
        write(&dir, "a.md", &post("Backups Made Easy", "2024-01-01"));
        write(
            &dir,
            "b.md",
            "---\ntitle: Homelab\ndate: 2024-01-02\ntags: [server, notes]\n---\nProxmox all the way.",
        );

        assert_eq!(repo.list_tags(Drafts::Exclude).unwrap(), vec!["server", "notes"]);
        assert_eq!(repo.get_by_tag("server", Drafts::Exclude).unwrap().len(), 1);
        assert_eq!(repo.get_by_tag("notes", Drafts::Exclude).unwrap().len(), 2);

        let hits = repo.search("PROXMOX", Drafts::Exclude).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].slug, "b");
        assert_eq!(repo.search("backups", Drafts::Exclude).unwrap()[0].slug, "a");
        assert_eq!(repo.search("  ", Drafts::Exclude).unwrap().len(), 2);
    }

    #[test]
    fn test_memory_store_rejects_duplicates() {
        let meta: PostMeta = serde_yaml::from_str("title: X\ndate: 2024-01-01").unwrap();
        let entries = vec![
            Entry::new("dup", meta.clone(), ""),
            Entry::new("dup", meta, ""),
        ];
        assert!(matches!(
            Repository::in_memory(entries),
            Err(ContentError::DuplicateSlug { .. })
        ));
    }

    #[test]
    fn test_memory_store_lookups() {
        let older: PostMeta = serde_yaml::from_str("title: Old\ndate: 2023-01-01").unwrap();
        let newer: PostMeta = serde_yaml::from_str("title: New\ndate: 2024-01-01").unwrap();
        let mut draft = Entry::new("draft", newer.clone(), "");
        draft.is_draft = true;
        let repo = Repository::in_memory(vec![
            Entry::new("old", older, ""),
            Entry::new("new", newer, ""),
            draft,
        ])
        .unwrap();

        let slugs: Vec<_> = repo
            .list_all(Drafts::Exclude)
            .unwrap()
            .into_iter()
            .map(|e| e.slug)
            .collect();
        assert_eq!(slugs, vec!["new", "old"]);
        assert_eq!(repo.get_by_slug("old", Drafts::Exclude).unwrap().unwrap().title(), "Old");
        assert!(repo.get_by_slug("draft", Drafts::Exclude).unwrap().is_none());
        assert!(repo.get_by_slug("draft", Drafts::Include).unwrap().is_some());
    }

    #[test]
    fn test_ensure_layout_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("content");
        let created = ensure_layout(&root).unwrap();
        assert_eq!(created.len(), 6);
        assert!(root.join("bookmarks").is_dir());
        assert!(ensure_layout(&root).unwrap().is_empty());
    }
}
