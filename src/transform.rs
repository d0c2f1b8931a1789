//! The transform pipeline: locators, steps, and their application order.
//!
//! A [`Pipeline`] is a plain ordered list of [`Step`]s. Each step consumes
//! the draft tree of a [`Markup`](crate::Markup) and mutates it in place; the
//! original tree is never touched, so a draft can always be reset with
//! [`Markup::restore`](crate::Markup::restore). Steps are independent (none
//! reads another step's state beyond the shared tree) and adding a new step
//! variant requires no change to existing ones.
//!
//! Steps degrade gracefully: a locator that matches nothing, a document
//! without a base URL, or an element missing the expected attribute are all
//! no-ops, never errors. Every built-in step is idempotent: applying it to
//! its own output changes nothing.
//!
//! Pipelines can be built in code or deserialized from JSON:
//!
//! ```rust
//! use markpipe::Pipeline;
//!
//! let pipeline = Pipeline::from_json(
//!     r#"[
//!         {"step": "drop", "targets": [{"name": "nav"}, {"name": "footer"}]},
//!         {"step": "filter", "target": {"name": "article"}},
//!         {"step": "quote_captions"},
//!         {"step": "absolute_urls"}
//!     ]"#,
//! ).unwrap();
//! assert_eq!(pipeline.steps().len(), 4);
//! ```

use std::collections::BTreeMap;
use std::rc::Rc;

use kuchikikiki::iter::NodeIterator;
use kuchikikiki::{ElementData, NodeRef};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::dom;
use crate::error::{MarkpipeError, Result};
use crate::markup::Markup;

/// Addresses elements in the draft tree, in the manner of a find-all query.
///
/// An empty `name` matches any tag. Attribute values must match exactly,
/// except `class`, which matches when the wanted value appears as one of the
/// element's class tokens.
///
/// ```rust
/// use markpipe::Locator;
///
/// let sidebars = Locator::tag("div").attr("class", "sidebar");
/// let first_image = Locator::tag("img").limit(1);
/// # let _ = (sidebars, first_image);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locator {
    /// Tag name to match; empty matches any element
    pub name: String,
    /// Required attribute values
    pub attrs: BTreeMap<String, String>,
    /// Search the whole subtree (`true`) or direct children only (`false`)
    pub recursive: bool,
    /// Keep at most this many matches, in document order
    pub limit: Option<usize>,
}

impl Default for Locator {
    fn default() -> Self {
        Self {
            name: String::new(),
            attrs: BTreeMap::new(),
            recursive: true,
            limit: None,
        }
    }
}

impl Locator {
    /// Locator matching elements by tag name
    pub fn tag(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Locator matching any element
    pub fn any() -> Self {
        Self::default()
    }

    /// Require an attribute value (class values match as tokens)
    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.to_string(), value.to_string());
        self
    }

    /// Match direct children only instead of the whole subtree
    pub fn direct(mut self) -> Self {
        self.recursive = false;
        self
    }

    /// Cap the number of matches
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches_element(&self, element: &ElementData) -> bool {
        if !self.name.is_empty() && element.name.local.as_ref() != self.name {
            return false;
        }
        let attributes = element.attributes.borrow();
        self.attrs.iter().all(|(key, want)| {
            match attributes.get(key.as_str()) {
                Some(value) if key == "class" => {
                    value.split_whitespace().any(|token| token == want)
                }
                Some(value) => value == want,
                None => false,
            }
        })
    }
}

/// Collect the nodes under `root` matched by `locator`, in document order.
pub(crate) fn locate(root: &NodeRef, locator: &Locator) -> Vec<NodeRef> {
    let mut matches = Vec::new();
    if locator.recursive {
        for element in root.descendants().elements() {
            if locator.matches_element(&element) {
                matches.push(element.as_node().clone());
            }
        }
    } else {
        for child in root.children() {
            if let Some(element) = child.as_element() {
                if locator.matches_element(element) {
                    matches.push(child.clone());
                }
            }
        }
    }
    if let Some(limit) = locator.limit {
        matches.truncate(limit);
    }
    matches
}

/// A single named transform applied to the draft tree.
///
/// The set of steps is a closed registry: pipeline configuration names a
/// variant, never an arbitrary method. Programmatic edits beyond these go
/// through [`Markup::apply`](crate::Markup::apply) and
/// [`Markup::edit`](crate::Markup::edit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Detach every element matched by any of the target locators
    Drop { targets: Vec<Locator> },
    /// Keep only the elements matching the target locator.
    ///
    /// Outermost matches are re-rooted under a fresh document node in
    /// document order. No match leaves the draft empty; filtering down to
    /// nothing is a valid outcome, not an error.
    Filter { target: Locator },
    /// Replace each matched element with its children (tag stripping)
    Unwrap { targets: Vec<Locator> },
    /// Copy each `<figcaption>` into a `<blockquote>` after its `<figure>`,
    /// so the caption stays readable below the image once rendered.
    QuoteCaptions,
    /// Resolve relative `a[href]` and `img[src]` values against the document
    /// URL. No-op for documents without a URL.
    AbsoluteUrls,
    /// Remove query strings (UTM and referral tags) from absolute `a[href]`
    /// values.
    TrimLinkQueries,
}

impl Step {
    /// Step name as it appears in pipeline configuration
    pub fn name(&self) -> &'static str {
        match self {
            Step::Drop { .. } => "drop",
            Step::Filter { .. } => "filter",
            Step::Unwrap { .. } => "unwrap",
            Step::QuoteCaptions => "quote_captions",
            Step::AbsoluteUrls => "absolute_urls",
            Step::TrimLinkQueries => "trim_link_queries",
        }
    }

    fn apply(&self, markup: &mut Markup) {
        match self {
            Step::Drop { targets } => markup.drop_all(targets),
            Step::Filter { target } => markup.filter(target),
            Step::Unwrap { targets } => markup.unwrap_all(targets),
            Step::QuoteCaptions => markup.apply(&Locator::tag("figure"), quote_caption),
            Step::AbsoluteUrls => absolute_urls(markup),
            Step::TrimLinkQueries => trim_link_queries(markup),
        }
    }
}

/// An ordered sequence of transform steps.
///
/// Serializes transparently as a JSON array of steps, so a pipeline is plain
/// configuration data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    /// Pipeline from an ordered list of steps
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Deserialize a pipeline from a JSON array of step objects
    pub fn from_json(config: &str) -> Result<Self> {
        serde_json::from_str(config).map_err(|e| MarkpipeError::InvalidConfig(e.to_string()))
    }

    /// The configured steps, in application order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Append a step
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Apply every step to the draft, in order.
    pub fn run(&self, markup: &mut Markup) -> Result<()> {
        for step in &self.steps {
            markup.log(&format!("applying step: {}", step.name()));
            step.apply(markup);
        }
        Ok(())
    }
}

/// Copy an image caption below its figure as a blockquote.
///
/// HTML5 captions live in `<figcaption>`; after rendering to Markdown the
/// caption would otherwise disappear into the image alt text. Applied twice
/// to the same figure this is a no-op; the existing quote is detected and
/// kept.
///
/// ```rust
/// use markpipe::{parse_html, quote_caption};
///
/// let doc = parse_html(
///     "<figure><img src=\"coffee.jpg\" alt=\"Coffee.\">\
///      <figcaption>A takeaway coffee with the morning news.</figcaption></figure>",
/// );
/// let figure = doc.select_first("figure").unwrap().as_node().clone();
/// quote_caption(&figure);
/// assert!(doc.select_first("blockquote").is_ok());
/// ```
pub fn quote_caption(figure: &NodeRef) {
    let Ok(caption) = figure.select_first("figcaption") else {
        return;
    };
    let text = dom::collapse_whitespace(&caption.text_contents());
    if text.is_empty() {
        return;
    }
    if let Some(next) = dom::next_element_sibling(figure) {
        if let Some(element) = next.as_element() {
            if element.name.local.as_ref() == "blockquote"
                && dom::collapse_whitespace(&next.text_contents()) == text
            {
                return;
            }
        }
    }
    figure.insert_after(dom::new_element("blockquote", [], Some(&text)));
}

fn absolute_urls(markup: &Markup) {
    let Some(base) = markup.url().cloned() else {
        return;
    };
    rewrite_attr(markup.draft(), "a", "href", |value| resolve(&base, value));
    rewrite_attr(markup.draft(), "img", "src", |value| resolve(&base, value));
}

fn resolve(base: &Url, value: &str) -> Option<String> {
    if value.is_empty() || Url::parse(value).is_ok() {
        return None;
    }
    base.join(value).ok().map(String::from)
}

fn trim_link_queries(markup: &Markup) {
    rewrite_attr(markup.draft(), "a", "href", |value| {
        let mut parsed = Url::parse(value).ok()?;
        parsed.query()?;
        parsed.set_query(None);
        Some(parsed.into())
    });
}

fn rewrite_attr<F>(root: &NodeRef, tag: &str, attr: &str, rewrite: F)
where
    F: Fn(&str) -> Option<String>,
{
    for node in locate(root, &Locator::tag(tag)) {
        let Some(element) = node.as_element() else {
            continue;
        };
        let mut attributes = element.attributes.borrow_mut();
        let Some(current) = attributes.get(attr).map(str::to_string) else {
            continue;
        };
        if let Some(updated) = rewrite(&current) {
            attributes.insert(attr, updated);
        }
    }
}

/// Pointer identity for draft nodes; locators can match nested elements and
/// the filter step must keep only the outermost ones.
pub(crate) fn same_node(a: &NodeRef, b: &NodeRef) -> bool {
    Rc::ptr_eq(&a.0, &b.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Markup;

    fn markup(html: &str) -> Markup {
        Markup::from_html(html, None, None).unwrap()
    }

    #[test]
    fn test_locator_matches_class_token() {
        let doc = dom::parse_html(r#"<div class="post sidebar wide"></div><div class="post"></div>"#);
        let matched = locate(&doc, &Locator::tag("div").attr("class", "sidebar"));
        assert_eq!(matched.len(), 1);
        let matched = locate(&doc, &Locator::tag("div").attr("class", "post"));
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn test_locator_any_name_and_limit() {
        let doc = dom::parse_html("<p>one</p><p>two</p><p>three</p>");
        let matched = locate(&doc, &Locator::tag("p").limit(2));
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].text_contents(), "one");
        let anything = locate(&doc, &Locator::any().attr("class", "missing"));
        assert!(anything.is_empty());
    }

    #[test]
    fn test_locator_direct_children_only() {
        let doc = dom::parse_html("<body><p>top</p><div><p>nested</p></div></body>");
        let body = doc.select_first("body").unwrap().as_node().clone();
        let matched = locate(&body, &Locator::tag("p").direct());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].text_contents(), "top");
    }

    #[test]
    fn test_drop_step_is_idempotent() {
        let mut m = markup("<body><nav>menu</nav><article><p>text</p></article></body>");
        let pipeline = Pipeline::new(vec![Step::Drop {
            targets: vec![Locator::tag("nav")],
        }]);
        pipeline.run(&mut m).unwrap();
        let once = m.to_html();
        pipeline.run(&mut m).unwrap();
        assert_eq!(m.to_html(), once);
        assert!(!once.contains("<nav>"));
        assert!(once.contains("<article>"));
    }

    #[test]
    fn test_filter_keeps_outermost_matches() {
        let mut m = markup(
            "<body><section><p>kept</p><section><p>inner</p></section></section>\
             <aside>dropped</aside></body>",
        );
        m.filter(&Locator::tag("section"));
        let html = m.to_html();
        assert!(html.contains("kept"));
        assert!(html.contains("inner"));
        assert!(!html.contains("dropped"));
        // the nested section must still be nested, not duplicated as a sibling
        assert_eq!(html.matches("inner").count(), 1);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let mut m = markup("<body><figure><figcaption>cap</figcaption></figure><p>x</p></body>");
        m.filter(&Locator::tag("figcaption"));
        let once = m.to_html();
        m.filter(&Locator::tag("figcaption"));
        assert_eq!(m.to_html(), once);
        assert_eq!(once.trim(), "<figcaption>cap</figcaption>");
    }

    #[test]
    fn test_filter_without_matches_empties_draft() {
        let mut m = markup("<body><p>text</p></body>");
        m.filter(&Locator::tag("article"));
        assert_eq!(m.to_html().trim(), "");
    }

    #[test]
    fn test_unwrap_strips_tag_but_keeps_children() {
        let mut m = markup("<body><p>Hello <span>kept <b>world</b></span></p></body>");
        let pipeline = Pipeline::new(vec![Step::Unwrap {
            targets: vec![Locator::tag("span")],
        }]);
        pipeline.run(&mut m).unwrap();
        let once = m.to_html();
        assert!(!once.contains("<span>"));
        assert!(once.contains("kept <b>world</b>"));
        pipeline.run(&mut m).unwrap();
        assert_eq!(m.to_html(), once);
    }

    #[test]
    fn test_quote_captions_inserts_once() {
        let html = "<body><figure><img src=\"coffee.jpg\" alt=\"Coffee.\">\
                    <figcaption>A takeaway coffee with the morning news.</figcaption>\
                    </figure></body>";
        let mut m = markup(html);
        let pipeline = Pipeline::new(vec![Step::QuoteCaptions]);
        pipeline.run(&mut m).unwrap();
        pipeline.run(&mut m).unwrap();
        let html = m.to_html();
        assert_eq!(html.matches("<blockquote>").count(), 1);
        assert!(html.contains("<blockquote>A takeaway coffee with the morning news.</blockquote>"));
    }

    #[test]
    fn test_quote_captions_skips_figures_without_caption() {
        let mut m = markup("<body><figure><img src=\"x.jpg\"></figure></body>");
        Pipeline::new(vec![Step::QuoteCaptions]).run(&mut m).unwrap();
        assert!(!m.to_html().contains("blockquote"));
    }

    #[test]
    fn test_absolute_urls_resolves_relative_only() {
        let html = r#"<body><a href="/about">about</a>
            <a href="https://other.example/page">other</a>
            <img src="images/cat.jpg"></body>"#;
        let mut m = Markup::from_html(html, Some("https://example.com/posts/1"), None).unwrap();
        let pipeline = Pipeline::new(vec![Step::AbsoluteUrls]);
        pipeline.run(&mut m).unwrap();
        let once = m.to_html();
        assert!(once.contains(r#"href="https://example.com/about""#));
        assert!(once.contains(r#"href="https://other.example/page""#));
        assert!(once.contains(r#"src="https://example.com/posts/images/cat.jpg""#));
        pipeline.run(&mut m).unwrap();
        assert_eq!(m.to_html(), once);
    }

    #[test]
    fn test_absolute_urls_without_base_is_noop() {
        let mut m = markup(r#"<body><a href="/about">about</a></body>"#);
        Pipeline::new(vec![Step::AbsoluteUrls]).run(&mut m).unwrap();
        assert!(m.to_html().contains(r#"href="/about""#));
    }

    #[test]
    fn test_trim_link_queries() {
        let html = r#"<body>
            <a href="https://example.com/a?utm_source=feed&utm_medium=rss">tracked</a>
            <a href="https://example.com/b">clean</a>
            <a href="/relative?x=1">relative</a>
        </body>"#;
        let mut m = markup(html);
        let pipeline = Pipeline::new(vec![Step::TrimLinkQueries]);
        pipeline.run(&mut m).unwrap();
        let once = m.to_html();
        assert!(once.contains(r#"href="https://example.com/a""#));
        assert!(once.contains(r#"href="https://example.com/b""#));
        // relative links are left for absolute_urls to handle first
        assert!(once.contains(r#"href="/relative?x=1""#));
        pipeline.run(&mut m).unwrap();
        assert_eq!(m.to_html(), once);
    }

    #[test]
    fn test_pipeline_from_json_round_trip() {
        let config = r#"[
            {"step": "drop", "targets": [{"name": "nav"}, {"name": "script"}]},
            {"step": "filter", "target": {"name": "article"}},
            {"step": "quote_captions"},
            {"step": "absolute_urls"},
            {"step": "trim_link_queries"}
        ]"#;
        let pipeline = Pipeline::from_json(config).unwrap();
        assert_eq!(pipeline.steps().len(), 5);
        assert_eq!(pipeline.steps()[0].name(), "drop");
        assert_eq!(
            pipeline.steps()[1],
            Step::Filter {
                target: Locator::tag("article")
            }
        );
    }

    #[test]
    fn test_pipeline_from_json_rejects_unknown_step() {
        let err = Pipeline::from_json(r#"[{"step": "sparkle"}]"#).unwrap_err();
        assert!(matches!(err, MarkpipeError::InvalidConfig(_)));
    }

    #[test]
    fn test_steps_run_in_order() {
        // dropping the figure first means quote_captions has nothing to do
        let html = "<body><figure><figcaption>cap</figcaption></figure><p>text</p></body>";
        let mut m = markup(html);
        Pipeline::new(vec![
            Step::Drop {
                targets: vec![Locator::tag("figure")],
            },
            Step::QuoteCaptions,
        ])
        .run(&mut m)
        .unwrap();
        assert!(!m.to_html().contains("blockquote"));

        let mut m = markup(html);
        Pipeline::new(vec![
            Step::QuoteCaptions,
            Step::Drop {
                targets: vec![Locator::tag("figure")],
            },
        ])
        .run(&mut m)
        .unwrap();
        assert!(m.to_html().contains("<blockquote>cap</blockquote>"));
    }
}
