//! schema.org JSON-LD for detail pages

use serde_json::{json, Value};

use crate::config::SiteConfig;
use crate::content::{
    BookmarkMeta, ContentMeta, Entry, Post, PostMeta, ProjectMeta, RecommendationMeta, Review,
    ReviewMeta,
};
use crate::helpers::{date_xml, full_url_for};

const CONTEXT: &str = "https://schema.org";

/// Kinds whose detail page carries a JSON-LD document
pub trait StructuredData: ContentMeta {
    fn structured_data(_entry: &Entry<Self>, _site: &SiteConfig) -> Option<Value> {
        None
    }
}

impl StructuredData for PostMeta {
    fn structured_data(entry: &Entry<Self>, site: &SiteConfig) -> Option<Value> {
        Some(blog_posting(entry, site))
    }
}

impl StructuredData for ReviewMeta {
    fn structured_data(entry: &Entry<Self>, site: &SiteConfig) -> Option<Value> {
        Some(review(entry, site))
    }
}

impl StructuredData for ProjectMeta {}
impl StructuredData for RecommendationMeta {}
impl StructuredData for BookmarkMeta {}

fn person(site: &SiteConfig, path: &str) -> Value {
    json!({
        "@type": "Person",
        "name": site.author,
        "url": full_url_for(site.base_url(), path),
    })
}

fn web_page<M: ContentMeta>(entry: &Entry<M>, site: &SiteConfig) -> Value {
    json!({
        "@type": "WebPage",
        "@id": full_url_for(site.base_url(), &entry.path()),
    })
}

/// `BlogPosting`; a post has a single date, so it is also the modification date
pub fn blog_posting(post: &Post, site: &SiteConfig) -> Value {
    let date = date_xml(&post.meta.date);
    let mut doc = json!({
        "@context": CONTEXT,
        "@type": "BlogPosting",
        "headline": post.meta.title,
        "description": post.meta.excerpt,
        "datePublished": date,
        "dateModified": date,
        "author": person(site, "/about"),
        "publisher": person(site, "/"),
        "mainEntityOfPage": web_page(post, site),
    });
    if !post.meta.tags.is_empty() {
        insert(&mut doc, "keywords", json!(post.meta.tags.join(", ")));
    }
    doc
}

/// `Review` of a `Product`, rated on a 1 to 5 scale
pub fn review(review: &Review, site: &SiteConfig) -> Value {
    let meta = &review.meta;

    let mut product = json!({
        "@type": "Product",
        "name": meta.product_name,
    });
    if let Some(url) = &meta.product_url {
        insert(&mut product, "url", json!(url));
    }

    let mut doc = json!({
        "@context": CONTEXT,
        "@type": "Review",
        "name": meta.title,
        "reviewBody": meta.excerpt,
        "datePublished": date_xml(&meta.published_at),
        "author": person(site, "/about"),
        "publisher": person(site, "/"),
        "reviewRating": {
            "@type": "Rating",
            "ratingValue": meta.rating,
            "bestRating": "5",
            "worstRating": "1",
        },
        "itemReviewed": product,
        "mainEntityOfPage": web_page(review, site),
    });
    if let Some(updated) = &meta.updated_at {
        insert(&mut doc, "dateModified", json!(date_xml(updated)));
    }
    doc
}

fn insert(doc: &mut Value, key: &str, value: Value) {
    if let Some(map) = doc.as_object_mut() {
        map.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        let mut site = SiteConfig::default();
        site.url = "https://example.com/".to_string();
        site.author = "Ada".to_string();
        site
    }

    #[test]
    fn test_blog_posting() {
        let meta: PostMeta = serde_yaml::from_str(
            "title: Hello\ndate: 2024-01-15\nexcerpt: First words\ntags: [rust, web]",
        )
        .unwrap();
        let post = Entry::new("hello world", meta, "");
        let doc = blog_posting(&post, &site());

        assert_eq!(doc["@context"], "https://schema.org");
        assert_eq!(doc["@type"], "BlogPosting");
        assert_eq!(doc["headline"], "Hello");
        assert_eq!(doc["description"], "First words");
        assert_eq!(doc["datePublished"], "2024-01-15T00:00:00+00:00");
        assert_eq!(doc["dateModified"], doc["datePublished"]);
        assert_eq!(doc["author"]["name"], "Ada");
        assert_eq!(doc["author"]["url"], "https://example.com/about");
        assert_eq!(doc["publisher"]["url"], "https://example.com");
        assert_eq!(
            doc["mainEntityOfPage"]["@id"],
            "https://example.com/blog/hello%20world"
        );
        assert_eq!(doc["keywords"], "rust, web");
    }

    #[test]
    fn test_blog_posting_without_tags_has_no_keywords() {
        let meta: PostMeta = serde_yaml::from_str("title: Bare\ndate: 2024-01-15").unwrap();
        let doc = blog_posting(&Entry::new("bare", meta, ""), &site());
        assert!(doc.get("keywords").is_none());
    }

    #[test]
    fn test_review() {
        let meta: ReviewMeta = serde_yaml::from_str(
            "title: Kindle review\nrating: 4.5\nproductName: Kindle\nproductUrl: https://amazon.com/kindle\ncategory: Hardware\nexcerpt: Great screen\npublishedAt: 2024-03-01\nupdatedAt: 2024-04-01",
        )
        .unwrap();
        let doc = review(&Entry::new("kindle", meta, ""), &site());

        assert_eq!(doc["@type"], "Review");
        assert_eq!(doc["name"], "Kindle review");
        assert_eq!(doc["reviewBody"], "Great screen");
        assert_eq!(doc["datePublished"], "2024-03-01T00:00:00+00:00");
        assert_eq!(doc["dateModified"], "2024-04-01T00:00:00+00:00");
        assert_eq!(doc["reviewRating"]["ratingValue"], 4.5);
        assert_eq!(doc["reviewRating"]["bestRating"], "5");
        assert_eq!(doc["reviewRating"]["worstRating"], "1");
        assert_eq!(doc["itemReviewed"]["@type"], "Product");
        assert_eq!(doc["itemReviewed"]["name"], "Kindle");
        assert_eq!(doc["itemReviewed"]["url"], "https://amazon.com/kindle");
        assert_eq!(
            doc["mainEntityOfPage"]["@id"],
            "https://example.com/reviews/kindle"
        );
    }

    #[test]
    fn test_review_optional_fields_omitted() {
        let meta: ReviewMeta = serde_yaml::from_str(
            "title: T\nrating: 3\nproductName: P\ncategory: C\npublishedAt: 2024-03-01",
        )
        .unwrap();
        let doc = review(&Entry::new("t", meta, ""), &site());
        assert!(doc.get("dateModified").is_none());
        assert!(doc["itemReviewed"].get("url").is_none());
    }

    #[test]
    fn test_other_kinds_have_none() {
        let meta: BookmarkMeta = serde_yaml::from_str(
            "title: ripgrep\nurl: https://github.com/BurntSushi/ripgrep\ncategory: Tools\nbookmarkType: tool\npublishedAt: 2024-01-01",
        )
        .unwrap();
        let entry = Entry::new("rg", meta, "");
        assert!(BookmarkMeta::structured_data(&entry, &site()).is_none());
    }
}
