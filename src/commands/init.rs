//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::SiteConfig;
use crate::content::{ensure_layout, ContentKind};

const CONFIG_TEMPLATE: &str = r#"# Site
title: My Site
description: Building in public, sharing what I learn, and connecting the dots.
author: Your Name
language: en

# URL
url: http://example.com

# Directory
content_dir: content
public_dir: public

# Writing
include_drafts: false
highlight:
  theme: base16-ocean.dark
  line_number: false

# Outputs
feed:
  limit: 0
  path: /api/rss
robots:
  disallow:
    - /content-editor/
    - /(admin)/

# Assistant (credentials come from CLOUDFLARE_ACCOUNT_ID / CLOUDFLARE_API_TOKEN)
chat:
  api_base: https://api.cloudflare.com/client/v4
  model: "@cf/meta/llama-2-7b-chat-int8"
  max_tokens: 1024
  temperature: 0.7
  timeout_secs: 30
"#;

/// Initialize a new site in the given directory.
///
/// Existing files are left alone, so running it twice is harmless.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;

    let config_path = target_dir.join("_config.yml");
    if !config_path.exists() {
        fs::write(&config_path, CONFIG_TEMPLATE)?;
        tracing::debug!("Wrote {:?}", config_path);
    }

    let config = SiteConfig::load(&config_path)?;
    let content_dir = target_dir.join(&config.content_dir);
    for dir in ensure_layout(&content_dir)? {
        tracing::info!("Created {:?}", dir);
    }
    fs::create_dir_all(target_dir.join(&config.public_dir))?;

    let sample = content_dir
        .join(ContentKind::Post.dir_name())
        .join("hello-world.md");
    if !sample.exists() {
        let today = chrono::Local::now().format("%Y-%m-%d");
        fs::write(&sample, sample_post(&today.to_string()))?;
    }

    Ok(())
}

fn sample_post(date: &str) -> String {
    format!(
        r#"---
title: Hello World
date: {}
excerpt: The first post on this site.
tags: [meta]
---

Welcome! This is your very first post. Posts live in `content/posts/`, one
Markdown file each, with a YAML header on top.

## Quick Start

### Create a new post

```bash
$ folio new "My New Post"
```

### Check your content

```bash
$ folio check
```

### Run server

```bash
$ folio server
```

### Things to try

- [ ] Write a review in `content/reviews/`
- [ ] Add a project in `content/projects/`
"#,
        date
    )
}
