//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::DeserializeOwned;
use serde::{Deserializer, Serialize};
use serde_yaml::{Mapping, Value};

/// Custom deserializer that handles both a single string and a list of strings
pub(crate) fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// A parsed content file: the raw header mapping and the Markdown body
#[derive(Debug, Clone)]
pub struct FrontMatter<'a> {
    /// Header key/value pairs, empty when the file has no header
    pub data: Mapping,
    /// Everything after the header
    pub body: &'a str,
}

impl<'a> FrontMatter<'a> {
    /// Split a leading `---` block from the body.
    ///
    /// Text without a header, or whose `---` block does not look like YAML,
    /// comes back whole with an empty mapping. A header that looks like YAML
    /// but fails to parse is an error.
    pub fn parse(content: &'a str) -> Result<Self, serde_yaml::Error> {
        let trimmed = content.trim_start();

        if !trimmed.starts_with("---") {
            return Ok(Self::bare(content));
        }

        let rest = &trimmed[3..];
        let rest = rest.trim_start_matches(['\n', '\r']);

        // `---\n---` is an empty header
        if let Some(after) = rest.strip_prefix("---") {
            return Ok(Self {
                data: Mapping::new(),
                body: after.trim_start_matches(['\n', '\r']),
            });
        }

        let Some(end_pos) = rest.find("\n---") else {
            return Ok(Self::bare(content));
        };

        let yaml_content = &rest[..end_pos];
        let body = rest[end_pos + 4..].trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok(Self {
                data: Mapping::new(),
                body,
            });
        }

        if !has_yaml_structure(yaml_content) {
            return Ok(Self::bare(content));
        }

        let data = match serde_yaml::from_str::<Value>(yaml_content)? {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "front-matter must be a mapping, found {}",
                    value_kind(&other)
                )))
            }
        };

        Ok(Self { data, body })
    }

    fn bare(content: &'a str) -> Self {
        Self {
            data: Mapping::new(),
            body: content,
        }
    }

    /// Deserialize the header into a typed schema
    pub fn decode<M: DeserializeOwned>(&self) -> Result<M, serde_yaml::Error> {
        serde_yaml::from_value(Value::Mapping(self.data.clone()))
    }

    /// Whether the file carried any header keys
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Serialize a header and body back into content-file text
pub fn render<M: Serialize>(meta: &M, body: &str) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(meta)?;
    let mut out = String::with_capacity(yaml.len() + body.len() + 10);
    out.push_str("---\n");
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("---\n\n");
    out.push_str(body);
    Ok(out)
}

/// Valid front-matter has at least one `key:` line; markdown rules and
/// prose containing URLs do not.
fn has_yaml_structure(yaml_content: &str) -> bool {
    yaml_content.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        if let Some(colon_pos) = trimmed.find(':') {
            let before_colon = &trimmed[..colon_pos];
            let is_valid_key = !before_colon.is_empty()
                && before_colon
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
                && before_colon != "http"
                && before_colon != "https"
                && before_colon != "ftp";
            if is_valid_key {
                let after_colon = &trimmed[colon_pos + 1..];
                return after_colon.is_empty() || after_colon.starts_with(' ');
            }
        }
        false
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    // Offsets are normalized to UTC
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Inverse of [`parse_date_string`]: date-only when the time is midnight
pub fn format_date_value(dt: &NaiveDateTime) -> String {
    if dt.time() == NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

/// `#[serde(with = "datetime")]` for required date fields
pub(crate) mod datetime {
    use super::{format_date_value, parse_date_string};
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_date_value(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date_string(&raw).ok_or_else(|| de::Error::custom(format!("invalid date `{}`", raw)))
    }

    /// Same, for `Option<NaiveDateTime>` fields
    pub mod option {
        use super::super::{format_date_value, parse_date_string};
        use chrono::NaiveDateTime;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            dt: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => serializer.serialize_str(&format_date_value(dt)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => parse_date_string(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid date `{}`", raw))),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        title: String,
        #[serde(with = "datetime")]
        date: NaiveDateTime,
        #[serde(default, deserialize_with = "string_or_vec")]
        tags: Vec<String>,
    }

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15 10:30:00
tags:
  - rust
  - blog
---

This is the content.
"#;

        let fm = FrontMatter::parse(content).unwrap();
        let sample: Sample = fm.decode().unwrap();
        assert_eq!(sample.title, "Hello World");
        assert_eq!(sample.tags, vec!["rust", "blog"]);
        assert_eq!(
            sample.date.format("%Y-%m-%d %H:%M").to_string(),
            "2024-01-15 10:30"
        );
        assert!(fm.body.starts_with("This is the content."));
    }

    #[test]
    fn test_single_string_tags() {
        let content = "---\ntitle: One\ndate: 2024-01-15\ntags: Notes\n---\nBody\n";
        let sample: Sample = FrontMatter::parse(content).unwrap().decode().unwrap();
        assert_eq!(sample.tags, vec!["Notes"]);
    }

    #[test]
    fn test_no_frontmatter_keeps_text() {
        let content = "# Just markdown\n\nNo header here.";
        let fm = FrontMatter::parse(content).unwrap();
        assert!(fm.is_empty());
        assert_eq!(fm.body, content);
    }

    #[test]
    fn test_empty_header() {
        let fm = FrontMatter::parse("---\n---\nBody").unwrap();
        assert!(fm.is_empty());
        assert_eq!(fm.body, "Body");
    }

    #[test]
    fn test_missing_required_field_is_error() {
        let fm = FrontMatter::parse("---\ntitle: No date\n---\nBody").unwrap();
        let err = fm.decode::<Sample>().unwrap_err();
        assert!(err.to_string().contains("date"));
    }

    #[test]
    fn test_invalid_date_is_error() {
        let fm = FrontMatter::parse("---\ntitle: Bad\ndate: someday\n---\n").unwrap();
        let err = fm.decode::<Sample>().unwrap_err();
        assert!(err.to_string().contains("invalid date"));
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        let content = "---\ntitle: [unclosed\ndate: 2024-01-01\n---\nBody";
        assert!(FrontMatter::parse(content).is_err());
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = r#"
---

Some random text with markdown lists:
- Item 1
- Item 2

---
More content here.
"#;

        let fm = FrontMatter::parse(content).unwrap();
        assert!(fm.is_empty());
        assert!(fm.body.contains("Some random text"));
    }

    #[test]
    fn test_content_with_url_not_yaml() {
        let content = "---\n\nCheck out https://example.com/path\n\n---\nMore.";
        let fm = FrontMatter::parse(content).unwrap();
        assert!(fm.is_empty());
        assert!(fm.body.contains("https://example.com"));
    }

    #[test]
    fn test_parse_date_formats() {
        let midnight = |y, m, d| {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        assert_eq!(parse_date_string("2024-03-14"), Some(midnight(2024, 3, 14)));
        assert_eq!(parse_date_string("2024/03/14"), Some(midnight(2024, 3, 14)));
        assert_eq!(
            parse_date_string("2024-03-14T12:00:00+02:00"),
            NaiveDate::from_ymd_opt(2024, 3, 14).unwrap().and_hms_opt(10, 0, 0)
        );
        assert_eq!(parse_date_string("March 14"), None);
    }

    #[test]
    fn test_format_date_value_round_trips() {
        for raw in ["2024-01-15", "2024-01-15T09:45:00"] {
            let parsed = parse_date_string(raw).unwrap();
            assert_eq!(format_date_value(&parsed), raw);
        }
    }

    #[test]
    fn test_render_then_parse() {
        let mut map = Mapping::new();
        map.insert("title".into(), "Round trip".into());
        map.insert("date".into(), "2024-05-01".into());
        let text = render(&map, "Body text\n").unwrap();
        assert!(text.starts_with("---\n"));

        let fm = FrontMatter::parse(&text).unwrap();
        let sample: Sample = fm.decode().unwrap();
        assert_eq!(sample.title, "Round trip");
        assert_eq!(fm.body, "Body text\n");
    }
}
