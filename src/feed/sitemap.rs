//! sitemaps.org index of the public pages

use anyhow::Result;
use chrono::NaiveDateTime;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Cursor;

use super::push_text;
use crate::content::{ContentMeta, Entry, Post, Project, Review};
use crate::helpers::{date_xml, full_url_for};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl ChangeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapUrl {
    pub loc: String,
    pub last_modified: NaiveDateTime,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

/// Top-level pages; `now` stands in for their modification time
const STATIC_PAGES: [(&str, ChangeFrequency, f32); 6] = [
    ("/", ChangeFrequency::Weekly, 1.0),
    ("/blog", ChangeFrequency::Daily, 0.9),
    ("/projects", ChangeFrequency::Weekly, 0.8),
    ("/reviews", ChangeFrequency::Weekly, 0.8),
    ("/recommendations", ChangeFrequency::Weekly, 0.8),
    ("/about", ChangeFrequency::Monthly, 0.7),
];

/// Static pages, then posts, projects and reviews
pub fn collect(
    base_url: &str,
    now: NaiveDateTime,
    posts: &[Post],
    projects: &[Project],
    reviews: &[Review],
) -> Vec<SitemapUrl> {
    let mut urls: Vec<SitemapUrl> = STATIC_PAGES
        .iter()
        .map(|(path, change_frequency, priority)| SitemapUrl {
            loc: full_url_for(base_url, path),
            last_modified: now,
            change_frequency: *change_frequency,
            priority: *priority,
        })
        .collect();

    urls.extend(
        posts
            .iter()
            .map(|p| entry_url(base_url, p, p.meta.date, 0.6)),
    );
    urls.extend(
        projects
            .iter()
            .map(|p| entry_url(base_url, p, p.meta.updated_at, 0.7)),
    );
    urls.extend(
        reviews
            .iter()
            .map(|r| entry_url(base_url, r, r.meta.last_modified(), 0.7)),
    );

    urls
}

fn entry_url<M: ContentMeta>(
    base_url: &str,
    entry: &Entry<M>,
    last_modified: NaiveDateTime,
    priority: f32,
) -> SitemapUrl {
    SitemapUrl {
        loc: full_url_for(base_url, &entry.path()),
        last_modified,
        change_frequency: ChangeFrequency::Monthly,
        priority,
    }
}

pub fn render(urls: &[SitemapUrl]) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", "http://www.sitemaps.org/schemas/sitemap/0.9"));
    writer.write_event(Event::Start(urlset))?;

    for url in urls {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        push_text(&mut writer, "loc", &url.loc)?;
        push_text(&mut writer, "lastmod", &date_xml(&url.last_modified))?;
        push_text(&mut writer, "changefreq", url.change_frequency.as_str())?;
        push_text(&mut writer, "priority", &format!("{:.1}", url.priority))?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;

    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::parse_date_string;

    fn now() -> NaiveDateTime {
        parse_date_string("2024-06-01").unwrap()
    }

    fn sample() -> Vec<SitemapUrl> {
        let post: Post = Entry::new(
            "hello world",
            serde_yaml::from_str("title: Hello\ndate: 2024-01-01").unwrap(),
            "",
        );
        let project: Project = Entry::new(
            "homelab",
            serde_yaml::from_str(
                "title: Homelab\ncategory: Infra\npublishedAt: 2023-01-01\nupdatedAt: 2024-02-01",
            )
            .unwrap(),
            "",
        );
        let review: Review = Entry::new(
            "kindle",
            serde_yaml::from_str(
                "title: Kindle\nrating: 4\nproductName: Kindle\ncategory: Hardware\npublishedAt: 2024-03-01",
            )
            .unwrap(),
            "",
        );
        collect("https://example.com/", now(), &[post], &[project], &[review])
    }

    #[test]
    fn test_collect_static_pages_first() {
        let urls = sample();
        assert_eq!(urls.len(), 9);
        assert_eq!(urls[0].loc, "https://example.com");
        assert_eq!(urls[0].priority, 1.0);
        assert_eq!(urls[1].loc, "https://example.com/blog");
        assert_eq!(urls[1].change_frequency, ChangeFrequency::Daily);
        assert_eq!(urls[5].change_frequency, ChangeFrequency::Monthly);
    }

    #[test]
    fn test_collect_entries() {
        let urls = sample();
        assert_eq!(urls[6].loc, "https://example.com/blog/hello%20world");
        assert_eq!(urls[6].priority, 0.6);
        assert_eq!(urls[7].loc, "https://example.com/projects/homelab");
        assert_eq!(urls[7].last_modified, parse_date_string("2024-02-01").unwrap());
        // no updatedAt: falls back to publishedAt
        assert_eq!(urls[8].last_modified, parse_date_string("2024-03-01").unwrap());
        assert_eq!(urls[8].priority, 0.7);
    }

    #[test]
    fn test_render() {
        let xml = render(&sample()).unwrap();
        assert!(xml.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
        assert!(xml.contains(
            "<url><loc>https://example.com/blog</loc><lastmod>2024-06-01T00:00:00+00:00</lastmod><changefreq>daily</changefreq><priority>0.9</priority></url>"
        ));
        assert_eq!(xml.matches("<url>").count(), 9);
    }
}
