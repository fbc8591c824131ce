//! robots.txt

use crate::config::RobotsConfig;
use crate::helpers::full_url_for;

pub fn render(base_url: &str, config: &RobotsConfig) -> String {
    let mut out = String::from("User-Agent: *\nAllow: /\n");
    for path in &config.disallow {
        out.push_str(&format!("Disallow: {}\n", path));
    }
    out.push_str(&format!(
        "\nSitemap: {}\n",
        full_url_for(base_url, "/sitemap.xml")
    ));
    out
}
