//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::content::Drafts;

/// Environment variables that toggle draft inclusion
pub const DRAFT_ENV_VARS: [&str; 2] = ["INCLUDE_DRAFTS", "NEXT_PUBLIC_INCLUDE_DRAFTS"];

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,

    // Writing
    pub include_drafts: bool,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Outputs
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub robots: RobotsConfig,

    // Assistant
    #[serde(default)]
    pub chat: ChatConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Erich Simon's Blog".to_string(),
            description: "Building in public, sharing what I learn, and connecting the dots."
                .to_string(),
            author: "Erich Simon".to_string(),
            language: "en".to_string(),

            url: "https://erichsimon.com".to_string(),

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),

            include_drafts: false,
            highlight: HighlightConfig::default(),

            feed: FeedConfig::default(),
            robots: RobotsConfig::default(),

            chat: ChatConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Draft policy for this site.
    ///
    /// The config key wins when set; otherwise the process environment
    /// decides. Call once at startup and thread the result through.
    pub fn drafts(&self) -> Drafts {
        let from_env = DRAFT_ENV_VARS
            .iter()
            .any(|name| parse_bool_flag(std::env::var(name).ok().as_deref()));
        Drafts::from(self.include_drafts || from_env)
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

/// `"true"` (any case, surrounding whitespace ignored) and `"1"` enable a flag
pub fn parse_bool_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true") | Some("1")
    )
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// RSS feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Maximum number of items, 0 for all
    pub limit: usize,
    pub path: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            limit: 0,
            path: "/api/rss".to_string(),
        }
    }
}

/// robots.txt configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotsConfig {
    pub disallow: Vec<String>,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            disallow: vec!["/content-editor/".to_string(), "/(admin)/".to_string()],
        }
    }
}

/// Chat assistant upstream configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.cloudflare.com/client/v4".to_string(),
            model: "@cf/meta/llama-2-7b-chat-int8".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.content_dir, "content");
        assert!(!config.include_drafts);
        assert_eq!(config.chat.max_tokens, 1024);
        assert_eq!(config.feed.path, "/api/rss");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Portfolio
url: https://example.com/
include_drafts: true
highlight:
  theme: InspiredGitHub
chat:
  model: "@cf/meta/llama-3-8b-instruct"
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Portfolio");
        assert_eq!(config.base_url(), "https://example.com");
        assert!(config.include_drafts);
        assert_eq!(config.highlight.theme, "InspiredGitHub");
        assert_eq!(config.chat.model, "@cf/meta/llama-3-8b-instruct");
        // untouched sections keep defaults
        assert_eq!(config.chat.max_tokens, 1024);
        assert_eq!(config.content_dir, "content");
    }

    #[test]
    fn test_config_key_forces_drafts() {
        let config = SiteConfig {
            include_drafts: true,
            ..Default::default()
        };
        assert_eq!(config.drafts(), Drafts::Include);
    }

    #[test]
    fn test_parse_bool_flag() {
        assert!(parse_bool_flag(Some("true")));
        assert!(parse_bool_flag(Some(" TRUE ")));
        assert!(parse_bool_flag(Some("1")));
        assert!(!parse_bool_flag(Some("false")));
        assert!(!parse_bool_flag(Some("yes please")));
        assert!(!parse_bool_flag(None));
    }
}
