//! Markdown rendering with syntax highlighting

use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd,
};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;
use crate::helpers::{html_escape, is_external};

/// Image used when a Markdown image has no source
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";
const IMAGE_WIDTH: u32 = 700;
const IMAGE_HEIGHT: u32 = 475;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    pub fn from_config(config: &HighlightConfig) -> Self {
        Self::with_options(&config.theme, config.line_number)
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        // Front-matter is stripped before this point, so no metadata blocks
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let events = self.highlight_code_blocks(parser);
        let events = rewrite(events);

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Replace fenced and indented code blocks with highlighted HTML
    fn highlight_code_blocks<'a>(&self, parser: Parser<'a>) -> Vec<Event<'a>> {
        let mut events = Vec::new();
        // Some(lang) while inside a code block
        let mut code_block: Option<Option<String>> = None;
        let mut code = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some(lang);
                    code.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let lang = code_block.take().flatten();
                    events.push(Event::Html(CowStr::from(
                        self.code_block(&code, lang.as_deref()),
                    )));
                }
                Event::Text(text) if code_block.is_some() => code.push_str(&text),
                other => events.push(other),
            }
        }

        events
    }

    /// Highlighted code wrapped with a copy button carrying the raw source
    fn code_block(&self, code: &str, lang: Option<&str>) -> String {
        let raw = code.strip_suffix('\n').unwrap_or(code);
        format!(
            r#"<div class="code-block"><button type="button" class="copy-button" data-copy="{}" aria-label="Copy code">Copy</button>{}</div>"#,
            html_escape(raw),
            self.highlight_code(code, lang)
        )
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme
            .and_then(|theme| {
                highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
            });

        match highlighted {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Some(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                html_escape(lang),
                highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                html_escape(lang),
                html_escape(code)
            ),
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();

        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            html_escape(lang),
            gutter,
            lines.join("\n")
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Headings, links, images and task lists
fn rewrite(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut ids = HeadingIds::default();
    // one flag per open list / item: rendered by us rather than push_html
    let mut lists: Vec<Option<&'static str>> = Vec::new();
    let mut items: Vec<bool> = Vec::new();
    // open heading tag name and whether it got a self-link, for the matching close
    let mut heading: Option<(&'static str, bool)> = None;

    let mut i = 0;
    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::Heading {
                level, id, classes, ..
            }) => {
                let end = find_end(&events, i, |e| matches!(e, Event::End(TagEnd::Heading(_))));
                let inner = &events[i + 1..end.min(events.len())];
                let text = plain_text(inner);
                let id = ids.assign(id.as_deref(), &text);
                // anchors cannot nest
                let self_link = !inner
                    .iter()
                    .any(|e| matches!(e, Event::Start(Tag::Link { .. })));
                let tag = heading_tag(*level);
                let class = if classes.is_empty() {
                    String::new()
                } else {
                    let joined: Vec<String> = classes.iter().map(|c| c.to_string()).collect();
                    format!(r#" class="{}""#, html_escape(&joined.join(" ")))
                };
                let id = html_escape(&id);
                let open = if self_link {
                    format!(r##"<{tag} id="{id}"{class}><a href="#{id}">"##)
                } else {
                    format!(r#"<{tag} id="{id}"{class}>"#)
                };
                out.push(Event::Html(CowStr::from(open)));
                heading = Some((tag, self_link));
            }
            Event::End(TagEnd::Heading(_)) => {
                let (tag, self_link) = heading.take().unwrap_or(("h2", true));
                let close = if self_link { "</a>" } else { "" };
                out.push(Event::Html(CowStr::from(format!("{}</{}>\n", close, tag))));
            }

            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            }) => {
                let href = match link_type {
                    LinkType::Email => format!("mailto:{}", dest_url),
                    _ => dest_url.to_string(),
                };
                let mut tag = format!(r#"<a href="{}""#, html_escape(&href));
                if !title.is_empty() {
                    tag.push_str(&format!(r#" title="{}""#, html_escape(title)));
                }
                if is_external(&href) {
                    tag.push_str(r#" target="_blank" rel="noopener noreferrer""#);
                }
                tag.push('>');
                out.push(Event::InlineHtml(CowStr::from(tag)));
            }
            Event::End(TagEnd::Link) => out.push(Event::InlineHtml(CowStr::from("</a>"))),

            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                let end = find_end(&events, i, |e| matches!(e, Event::End(TagEnd::Image)));
                let alt = plain_text(&events[i + 1..end]);
                out.push(Event::InlineHtml(CowStr::from(image_tag(dest_url, title, &alt))));
                i = end + 1;
                continue;
            }

            Event::Start(Tag::List(start)) => {
                if list_has_tasks(&events, i) {
                    let tag = if start.is_some() { "ol" } else { "ul" };
                    let start_attr = match start {
                        Some(n) if *n != 1 => format!(r#" start="{}""#, n),
                        _ => String::new(),
                    };
                    out.push(Event::Html(CowStr::from(format!(
                        "<{} class=\"task-list\"{}>\n",
                        tag, start_attr
                    ))));
                    lists.push(Some(tag));
                } else {
                    out.push(events[i].clone());
                    lists.push(None);
                }
            }
            Event::End(TagEnd::List(_)) => match lists.pop().flatten() {
                Some(tag) => out.push(Event::Html(CowStr::from(format!("</{}>\n", tag)))),
                None => out.push(events[i].clone()),
            },

            Event::Start(Tag::Item) => {
                let end = find_end(&events, i, |e| matches!(e, Event::End(TagEnd::Item)));
                let item = &events[i + 1..end];
                let is_task = item_is_task(item);
                if is_task {
                    out.push(Event::Html(CowStr::from(format!(
                        r#"<li class="task-list-item" data-task-key="{}">"#,
                        task_key(&plain_text(item))
                    ))));
                } else {
                    out.push(events[i].clone());
                }
                items.push(is_task);
            }
            Event::End(TagEnd::Item) => {
                if items.pop().unwrap_or(false) {
                    out.push(Event::Html(CowStr::from("</li>\n")));
                } else {
                    out.push(events[i].clone());
                }
            }
            Event::TaskListMarker(checked) => {
                let checked = if *checked { " checked" } else { "" };
                out.push(Event::InlineHtml(CowStr::from(format!(
                    r#"<input type="checkbox" class="task-list-checkbox"{} /> "#,
                    checked
                ))));
            }

            other => out.push(other.clone()),
        }
        i += 1;
    }

    out
}

/// Index of the first event after `start` matching `is_end` at the same depth
fn find_end(events: &[Event<'_>], start: usize, is_end: impl Fn(&Event<'_>) -> bool) -> usize {
    let mut depth = 0usize;
    for (offset, event) in events[start..].iter().enumerate() {
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 && is_end(event) {
                    return start + offset;
                }
            }
            _ => {}
        }
    }
    events.len()
}

/// Whether any direct item of the list at `start` begins with a task marker
fn list_has_tasks(events: &[Event<'_>], start: usize) -> bool {
    let end = find_end(events, start, |e| matches!(e, Event::End(TagEnd::List(_))));
    let mut depth = 0usize;
    for event in &events[start + 1..end.min(events.len())] {
        match event {
            Event::Start(Tag::List(_)) => depth += 1,
            Event::End(TagEnd::List(_)) => depth = depth.saturating_sub(1),
            Event::TaskListMarker(_) if depth == 0 => return true,
            _ => {}
        }
    }
    false
}

/// A task item's marker comes first, possibly inside a paragraph
fn item_is_task(item: &[Event<'_>]) -> bool {
    item.iter()
        .find(|e| !matches!(e, Event::Start(Tag::Paragraph)))
        .is_some_and(|e| matches!(e, Event::TaskListMarker(_)))
}

/// Text content of a run of events
fn plain_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text.trim().to_string()
}

/// Stable key for a task item, so client-side checked state survives re-renders
fn task_key(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("task-{}", &digest[..16])
}

fn image_tag(src: &str, title: &str, alt: &str) -> String {
    let src = if src.trim().is_empty() {
        PLACEHOLDER_IMAGE
    } else {
        src
    };
    let title = if title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, html_escape(title))
    };
    format!(
        r#"<img src="{}" alt="{}"{} width="{}" height="{}" loading="lazy" />"#,
        html_escape(src),
        html_escape(alt),
        title,
        IMAGE_WIDTH,
        IMAGE_HEIGHT
    )
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

/// Heading ids unique within one document
#[derive(Default)]
struct HeadingIds {
    seen: HashMap<String, usize>,
}

impl HeadingIds {
    fn assign(&mut self, explicit: Option<&str>, text: &str) -> String {
        if let Some(id) = explicit {
            self.seen.entry(id.to_string()).or_insert(0);
            return id.to_string();
        }

        let mut base = slug::slugify(text);
        if base.is_empty() {
            base = "section".to_string();
        }

        match self.seen.get_mut(&base) {
            None => {
                self.seen.insert(base.clone(), 0);
                base
            }
            Some(count) => {
                *count += 1;
                let id = format!("{}-{}", base, count);
                self.seen.insert(id.clone(), 0);
                id
            }
        }
    }
}
