//! Metadata harvesting from `<meta>` tags and the default note properties.
//!
//! Metadata is read from the *original* document, before any transform step
//! runs, so dropping a `<head>` section from the draft never loses the
//! harvested values.
//!
//! Keys come from the `property` attribute when present, falling back to
//! `name`; the value is the `content` attribute. Some OpenGraph properties
//! are arrays: multiple `<meta>` tags with the same property accumulate into
//! a list instead of overwriting each other (see <https://ogp.me/#array>).

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::dom;

/// OpenGraph meta properties harvested as arrays by default.
///
/// Publishers with their own repeated meta schema can extend this list via
/// [`MarkupOptions::meta_arrays`](crate::MarkupOptions::meta_arrays).
pub const DEFAULT_META_ARRAYS: [&str; 11] = [
    "article:author",
    "article:tag",
    "book:author",
    "book:tag",
    "music:album",
    "music:musician",
    "og:locale:alternate",
    "video:actor",
    "video:director",
    "video:tag",
    "video:writer",
];

static META_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta").expect("static selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("static selector"));
static TITLE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s[|·»/—–-]\s").expect("static regex"));

/// A harvested metadata value: a single string, or a list for array
/// properties such as `article:tag`.
///
/// Serializes untagged, so a property map round-trips as plain JSON:
/// `{"og:title": "...", "article:tag": ["a", "b"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    /// A scalar value; later occurrences of the same key overwrite earlier ones
    One(String),
    /// An accumulated array property, in document order
    Many(Vec<String>),
}

impl MetaValue {
    /// The scalar value, or the first element of an array value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::One(value) => Some(value),
            MetaValue::Many(values) => values.first().map(String::as_str),
        }
    }

    /// All values, in document order.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            MetaValue::One(value) => vec![value.clone()],
            MetaValue::Many(values) => values.clone(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            MetaValue::One(existing) => {
                *self = MetaValue::Many(vec![std::mem::take(existing), value]);
            }
            MetaValue::Many(values) => values.push(value),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::One(value.to_string())
    }
}

/// Harvest every `<meta>` tag in the document.
///
/// Tags without a key (`property` or `name`) or without `content` are
/// ignored. Keys listed in [`DEFAULT_META_ARRAYS`] or `extra_arrays`
/// accumulate; all other keys keep the last value seen.
pub(crate) fn gather_meta(document: &Html, extra_arrays: &[String]) -> BTreeMap<String, MetaValue> {
    let mut meta: BTreeMap<String, MetaValue> = BTreeMap::new();

    for tag in document.select(&META_SELECTOR) {
        let key = tag
            .value()
            .attr("property")
            .or_else(|| tag.value().attr("name"));
        let (Some(key), Some(content)) = (key, tag.value().attr("content")) else {
            continue;
        };
        if content.is_empty() {
            continue;
        }

        let is_array =
            DEFAULT_META_ARRAYS.contains(&key) || extra_arrays.iter().any(|k| k == key);

        if is_array {
            match meta.entry(key.to_string()) {
                Entry::Occupied(mut entry) => entry.get_mut().push(content.to_string()),
                Entry::Vacant(entry) => {
                    entry.insert(MetaValue::Many(vec![content.to_string()]));
                }
            }
        } else {
            meta.insert(key.to_string(), MetaValue::One(content.to_string()));
        }
    }

    meta
}

/// Default properties for the note: title, url, description, publisher.
///
/// The title prefers `og:title` and falls back to the `<title>` tag cleaned
/// of a trailing site-name segment. Absent values are simply omitted.
pub(crate) fn default_properties(
    document: &Html,
    meta: &BTreeMap<String, MetaValue>,
    url: Option<&Url>,
) -> BTreeMap<String, MetaValue> {
    let mut properties = BTreeMap::new();

    let site_name = meta.get("og:site_name").and_then(MetaValue::as_str);

    let title = meta
        .get("og:title")
        .and_then(MetaValue::as_str)
        .map(str::to_string)
        .or_else(|| document_title(document, site_name));
    if let Some(title) = title {
        properties.insert("title".to_string(), MetaValue::One(title));
    }

    if let Some(url) = url {
        properties.insert("url".to_string(), MetaValue::One(url.to_string()));
    }

    if let Some(description) = meta.get("og:description").and_then(MetaValue::as_str) {
        properties.insert(
            "description".to_string(),
            MetaValue::One(description.to_string()),
        );
    }

    if let Some(publisher) = site_name {
        properties.insert(
            "publisher".to_string(),
            MetaValue::One(publisher.to_string()),
        );
    }

    properties
}

fn document_title(document: &Html, site_name: Option<&str>) -> Option<String> {
    let raw = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|title| title.text().collect::<String>())?;
    let raw = dom::collapse_whitespace(&raw);
    if raw.is_empty() {
        return None;
    }
    Some(clean_title(&raw, site_name))
}

/// Strip a trailing "| Site Name" segment when it matches the publisher.
fn clean_title(raw: &str, site_name: Option<&str>) -> String {
    let Some(site) = site_name else {
        return raw.to_string();
    };
    if let Some(separator) = TITLE_SEPARATOR.find_iter(raw).last() {
        let head = raw[..separator.start()].trim();
        let tail = raw[separator.end()..].trim();
        if !head.is_empty() && tail.eq_ignore_ascii_case(site) {
            return head.to_string();
        }
    }
    raw.to_string()
}
