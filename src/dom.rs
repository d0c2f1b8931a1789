//! Thin wrappers around the underlying HTML parser.
//!
//! [`NodeRef`] is the reference-counted element tree used for the draft that
//! pipeline steps mutate. Parsing follows the HTML5 specification: an
//! implicit `<html>`, `<head>`, and `<body>` are synthesised when missing,
//! and malformed markup (e.g. an unclosed tag) is recovered, never a parse
//! failure.

use html5ever::{ns, LocalName, QualName};
use kuchikikiki::iter::NodeIterator;
use kuchikikiki::traits::TendrilSink;
use kuchikikiki::{Attribute, ExpandedName, NodeRef};
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Parse an HTML string into a [`NodeRef`] document tree.
///
/// # Examples
///
/// ```rust
/// use markpipe::parse_html;
///
/// let doc = parse_html("<div><p>hello</p></div>");
/// assert!(doc.select_first("p").is_ok());
/// ```
pub fn parse_html(html: &str) -> NodeRef {
    kuchikikiki::parse_html().one(html)
}

/// Build a new element node with attributes and optional text content.
///
/// The counterpart of creating a tag by hand when editing the draft, e.g. to
/// insert a byline or a caption quote.
///
/// # Examples
///
/// ```rust
/// use markpipe::new_element;
///
/// let tag = new_element("p", [("class", "test")], Some("test"));
/// assert_eq!(tag.to_string(), r#"<p class="test">test</p>"#);
/// ```
pub fn new_element<'a, I>(name: &str, attrs: I, literal: Option<&str>) -> NodeRef
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let name = QualName::new(None, ns!(html), LocalName::from(name));
    let attributes = attrs.into_iter().map(|(key, value)| {
        (
            ExpandedName::new(ns!(), LocalName::from(key)),
            Attribute {
                prefix: None,
                value: value.to_string(),
            },
        )
    });
    let node = NodeRef::new_element(name, attributes);
    if let Some(text) = literal {
        node.append(NodeRef::new_text(text));
    }
    node
}

/// First following sibling that is an element, skipping text and comments.
pub(crate) fn next_element_sibling(node: &NodeRef) -> Option<NodeRef> {
    node.following_siblings()
        .elements()
        .next()
        .map(|el| el.as_node().clone())
}

/// Collapse runs of whitespace to single spaces and trim the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}
