use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    /// Text between this start tag and the next tag, trimmed.
    pub text: String,
}

fn start_tag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"<([A-Za-z][A-Za-z0-9:_-]*)((?:"[^"]*"|'[^']*'|[^'">])*)>"#)
            .expect("start tag regex must compile")
    })
}

fn attribute_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r#"([A-Za-z_:@][-A-Za-z0-9_:.@]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#,
        )
        .expect("attribute regex must compile")
    })
}

/// Every start tag in document order. Works on markup that is not
/// well-formed XML (void elements, unquoted attributes, stray entities).
pub fn scan_start_tags(markup: &str) -> Vec<StartTag> {
    let mut tags = Vec::new();
    for caps in start_tag_regex().captures_iter(markup) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let raw_attributes = caps
            .get(2)
            .map(|m| m.as_str().trim_end_matches('/'))
            .unwrap_or_default();

        let mut attributes = BTreeMap::new();
        for attr in attribute_regex().captures_iter(raw_attributes) {
            let Some(attr_name) = attr.get(1) else {
                continue;
            };
            let value = attr
                .get(2)
                .or_else(|| attr.get(3))
                .or_else(|| attr.get(4))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            attributes
                .entry(attr_name.as_str().to_ascii_lowercase())
                .or_insert(value);
        }

        let rest = &markup[whole.end()..];
        let text = rest[..rest.find('<').unwrap_or(rest.len())].trim().to_string();

        tags.push(StartTag {
            name: name.as_str().to_ascii_lowercase(),
            attributes,
            text,
        });
    }
    tags
}

/// The `id` attribute of the outermost element in `markup`, if it has a
/// non-empty one.
pub fn extract_element_id(markup: &str) -> Option<String> {
    let trimmed = markup.trim();
    let id = match roxmltree::Document::parse(trimmed) {
        Ok(document) => document
            .root_element()
            .attribute("id")
            .map(str::to_string),
        Err(_) => scan_start_tags(trimmed)
            .into_iter()
            .next()
            .and_then(|tag| tag.attributes.get("id").cloned()),
    };
    id.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
