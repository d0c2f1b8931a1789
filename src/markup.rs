//! The [`Markup`] document and its editing surface.
//!
//! A `Markup` holds two parses of the same HTML: `original`, which is never
//! mutated, and `draft`, which the transform pipeline edits in place and the
//! render adapter serializes. Metadata is harvested from the original at
//! construction time, so transforms can freely discard `<head>` content.
//!
//! ## Example
//!
//! ```rust
//! use markpipe::{Locator, Markup, Pipeline, Step};
//!
//! let html = r#"
//!     <html>
//!     <head><title>Coffee notes</title></head>
//!     <body>
//!         <nav>Home | Archive</nav>
//!         <article><h1>Coffee</h1><p>Grind <b>fresh</b>.</p></article>
//!     </body>
//!     </html>
//! "#;
//!
//! let mut markup = Markup::from_html(html, None, None)?;
//! let pipeline = Pipeline::new(vec![
//!     Step::Drop { targets: vec![Locator::tag("nav")] },
//!     Step::Filter { target: Locator::tag("article") },
//! ]);
//! markup.process(&pipeline)?;
//!
//! let markdown = markup.to_markdown()?;
//! assert!(markdown.contains("# Coffee"));
//! assert!(markdown.contains("**fresh**"));
//! # Ok::<(), markpipe::MarkpipeError>(())
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use kuchikikiki::NodeRef;
use scraper::Html;
use url::Url;

use crate::dom;
use crate::error::{MarkpipeError, Result};
use crate::loader;
use crate::meta::{self, MetaValue};
use crate::note::Note;
use crate::options::MarkupOptions;
use crate::render;
use crate::transform::{locate, same_node, Locator, Pipeline};

/// An HTML document prepared for conversion to Markdown.
///
/// ## Lifecycle
///
/// Construct with [`from_html`](Markup::from_html),
/// [`from_file`](Markup::from_file), or [`from_url`](Markup::from_url); run a
/// [`Pipeline`] (or the `apply`/`drop_all`/`filter`/`edit` methods directly);
/// then render with [`to_markdown`](Markup::to_markdown) or bundle Markdown
/// and properties with [`to_note`](Markup::to_note).
///
/// Each `Markup` owns its trees and options; conversions are independent and
/// can run in parallel across documents from separate `Markup` values.
pub struct Markup {
    /// Raw HTML, kept for resetting the draft
    html: String,

    /// Document URL, used to resolve relative links
    url: Option<Url>,

    /// The parse the metadata came from; never mutated
    original: NodeRef,

    /// The working tree that pipeline steps edit in place
    draft: NodeRef,

    /// Harvested `<meta>` values
    meta: BTreeMap<String, MetaValue>,

    /// Properties selected for the final note
    properties: BTreeMap<String, MetaValue>,

    /// Configuration options
    options: MarkupOptions,
}

impl Markup {
    /// Create a Markup from an HTML string.
    ///
    /// # Arguments
    /// * `html` - The HTML content to parse
    /// * `url` - Optional document URL for resolving relative links
    /// * `options` - Optional configuration options
    ///
    /// # Errors
    /// [`MarkpipeError::ParseError`] for blank input,
    /// [`MarkpipeError::InvalidUrl`] when `url` does not parse.
    pub fn from_html(html: &str, url: Option<&str>, options: Option<MarkupOptions>) -> Result<Self> {
        if html.trim().is_empty() {
            return Err(MarkpipeError::ParseError(
                "document is empty".to_string(),
            ));
        }

        let url = url
            .map(|u| Url::parse(u).map_err(|_| MarkpipeError::InvalidUrl(u.to_string())))
            .transpose()?;

        let options = options.unwrap_or_default();

        // Metadata comes from a read-only parse of the raw input; the draft
        // is a separate parse that the pipeline is free to mutate.
        let document = Html::parse_document(html);
        let meta = meta::gather_meta(&document, &options.meta_arrays);
        let properties = meta::default_properties(&document, &meta, url.as_ref());

        Ok(Self {
            html: html.to_string(),
            url,
            original: dom::parse_html(html),
            draft: dom::parse_html(html),
            meta,
            properties,
            options,
        })
    }

    /// Create a Markup from a local HTML file.
    pub fn from_file(path: impl AsRef<Path>, options: Option<MarkupOptions>) -> Result<Self> {
        let path = path.as_ref();
        let html = fs::read_to_string(path)
            .map_err(|e| MarkpipeError::FetchError(format!("{}: {}", path.display(), e)))?;
        Self::from_html(&html, None, options)
    }

    /// Fetch a URL and create a Markup from the response body.
    ///
    /// The URL is prepared first according to the options (shortened links
    /// resolved, query string trimmed), and the prepared URL
    /// is stored as the document URL.
    pub fn from_url(url: &str, options: Option<MarkupOptions>) -> Result<Self> {
        let options = options.unwrap_or_default();
        let prepared = loader::prepare_url(
            url,
            options.unshorten,
            options.trim_queries,
            &options.headers,
        )?;
        let html = loader::fetch_html(&prepared, &options.headers)?;
        Self::from_html(&html, Some(&prepared), Some(options))
    }

    /// The document URL, after preparation
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// The untouched tree the metadata was harvested from
    pub fn original(&self) -> &NodeRef {
        &self.original
    }

    /// The working tree the pipeline edits
    pub fn draft(&self) -> &NodeRef {
        &self.draft
    }

    /// Harvested `<meta>` values, keyed by `property` or `name`
    pub fn meta(&self) -> &BTreeMap<String, MetaValue> {
        &self.meta
    }

    /// Properties selected for the final note
    pub fn properties(&self) -> &BTreeMap<String, MetaValue> {
        &self.properties
    }

    /// Add or replace a note property
    pub fn add_property(&mut self, key: &str, value: impl Into<MetaValue>) {
        self.properties.insert(key.to_string(), value.into());
    }

    /// Reset the draft to a fresh parse of the original HTML.
    pub fn restore(&mut self) {
        self.draft = dom::parse_html(&self.html);
    }

    /// Run an editor function on every draft element matching the locator.
    ///
    /// The element-level counterpart of [`edit`](Markup::edit), and the
    /// escape hatch for transforms the built-in [`Step`](crate::Step)
    /// registry does not cover.
    pub fn apply<F>(&self, target: &Locator, editor: F)
    where
        F: Fn(&NodeRef),
    {
        for node in locate(&self.draft, target) {
            editor(&node);
        }
    }

    /// Detach every draft element matched by any of the locators.
    pub fn drop_all(&self, targets: &[Locator]) {
        for target in targets {
            for node in locate(&self.draft, target) {
                node.detach();
            }
        }
    }

    /// Replace each matched draft element with its children.
    pub fn unwrap_all(&self, targets: &[Locator]) {
        for target in targets {
            for node in locate(&self.draft, target) {
                while let Some(child) = node.first_child() {
                    node.insert_before(child);
                }
                node.detach();
            }
        }
    }

    /// Keep only the draft elements matching the locator.
    ///
    /// Outermost matches are re-rooted under a fresh document node in
    /// document order; everything else is discarded. No match leaves the
    /// draft empty.
    pub fn filter(&mut self, target: &Locator) {
        let matches = locate(&self.draft, target);
        let root = NodeRef::new_document();
        for node in &matches {
            let nested = node
                .ancestors()
                .any(|ancestor| matches.iter().any(|m| same_node(m, &ancestor)));
            if !nested {
                root.append(node.clone());
            }
        }
        self.draft = root;
    }

    /// Replace the draft wholesale with the editor's result.
    pub fn edit<F>(&mut self, editor: F)
    where
        F: FnOnce(&NodeRef) -> NodeRef,
    {
        self.draft = editor(&self.draft);
    }

    /// Fallible variant of [`edit`](Markup::edit) for editors with a
    /// structural precondition; their error surfaces as
    /// [`MarkpipeError::TransformError`] and the draft is left unchanged.
    pub fn try_edit<F>(&mut self, editor: F) -> Result<()>
    where
        F: FnOnce(&NodeRef) -> Result<NodeRef>,
    {
        self.draft = editor(&self.draft)?;
        Ok(())
    }

    /// Apply every step of the pipeline to the draft, in order.
    pub fn process(&mut self, pipeline: &Pipeline) -> Result<()> {
        pipeline.run(self)
    }

    /// Serialize the draft as HTML.
    pub fn to_html(&self) -> String {
        self.draft.to_string()
    }

    /// Render the draft to Markdown via the external converter.
    ///
    /// # Errors
    /// [`MarkpipeError::RenderError`] when the converter fails; the error is
    /// surfaced as-is, never retried.
    pub fn to_markdown(&self) -> Result<String> {
        render::to_markdown(&self.to_html(), &self.options.skip_tags)
    }

    /// Render and bundle the result with the note properties.
    pub fn to_note(&self) -> Result<Note> {
        Ok(Note {
            markdown: self.to_markdown()?,
            properties: self.properties.clone(),
        })
    }

    /// Log a debug message (if debug mode is enabled)
    pub(crate) fn log(&self, message: &str) {
        if self.options.debug {
            eprintln!("markpipe: {}", message);
        }
    }
}
