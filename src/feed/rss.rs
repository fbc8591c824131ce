//! RSS 2.0 feed of blog posts

use anyhow::Result;
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use super::{push_cdata, push_text};
use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{full_url_for, rfc2822};

pub const CONTENT_TYPE: &str = "application/xml";
pub const CACHE_CONTROL: &str = "public, max-age=3600, s-maxage=3600";

pub struct RssChannel<'a> {
    pub title: &'a str,
    /// Site base URL
    pub link: &'a str,
    pub description: &'a str,
    pub language: &'a str,
    /// Path the feed is served from, for the atom self link
    pub self_path: &'a str,
    /// Maximum number of items, 0 for all
    pub limit: usize,
}

impl<'a> RssChannel<'a> {
    pub fn from_config(config: &'a SiteConfig) -> Self {
        Self {
            title: &config.title,
            link: config.base_url(),
            description: &config.description,
            language: &config.language,
            self_path: &config.feed.path,
            limit: config.feed.limit,
        }
    }

    /// Render the channel; `posts` are expected newest first
    pub fn render(&self, posts: &[Post], built_at: DateTime<Utc>) -> Result<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        rss.push_attribute(("xmlns:atom", "http://www.w3.org/2005/Atom"));
        writer.write_event(Event::Start(rss))?;
        writer.write_event(Event::Start(BytesStart::new("channel")))?;

        push_text(&mut writer, "title", self.title)?;
        push_text(&mut writer, "link", self.link)?;
        push_text(&mut writer, "description", self.description)?;
        push_text(&mut writer, "language", self.language)?;
        push_text(&mut writer, "lastBuildDate", &built_at.to_rfc2822())?;

        let self_link = full_url_for(self.link, self.self_path);
        let mut atom = BytesStart::new("atom:link");
        atom.push_attribute(("href", self_link.as_str()));
        atom.push_attribute(("rel", "self"));
        atom.push_attribute(("type", "application/rss+xml"));
        writer.write_event(Event::Empty(atom))?;

        let limit = if self.limit == 0 { posts.len() } else { self.limit };
        for post in posts.iter().take(limit) {
            let link = full_url_for(self.link, &post.path());

            writer.write_event(Event::Start(BytesStart::new("item")))?;
            push_cdata(&mut writer, "title", post.title())?;
            push_text(&mut writer, "link", &link)?;
            push_cdata(&mut writer, "description", &post.meta.excerpt)?;
            push_text(&mut writer, "pubDate", &rfc2822(&post.meta.date))?;

            let mut guid = BytesStart::new("guid");
            guid.push_attribute(("isPermaLink", "true"));
            writer.write_event(Event::Start(guid))?;
            writer.write_event(Event::Text(BytesText::new(&link)))?;
            writer.write_event(Event::End(BytesEnd::new("guid")))?;

            writer.write_event(Event::End(BytesEnd::new("item")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        Ok(String::from_utf8(writer.into_inner().into_inner())?)
    }
}
