//! # markpipe
//!
//! Convert web pages into clean Markdown notes through a configurable HTML
//! transform pipeline.
//!
//! ## Overview
//!
//! markpipe normalizes an HTML page for note-taking and content-ingestion
//! workflows: the document is parsed into an element tree, an ordered
//! pipeline of transform steps rewrites that tree (dropping navigation,
//! keeping only the article, quoting image captions, resolving links), and
//! the result is handed to an external converter that renders Markdown.
//! Along the way, `<meta>` tags are harvested into a metadata store and
//! distilled into note properties (title, url, description, publisher).
//!
//! ## Basic Usage
//!
//! ```rust
//! use markpipe::{Locator, Markup, Pipeline, Step};
//!
//! let html = r#"
//!     <html>
//!     <head>
//!         <title>Tips for writing a news article</title>
//!         <meta property="og:site_name" content="Webber Publishing">
//!     </head>
//!     <body>
//!         <nav>Home | Archive</nav>
//!         <article>
//!             <h1>Tips for writing a news article</h1>
//!             <p>Always start with the <b>lede</b>.</p>
//!         </article>
//!         <footer>© Webber Publishing</footer>
//!     </body>
//!     </html>
//! "#;
//!
//! let mut markup = Markup::from_html(html, None, None)?;
//!
//! let pipeline = Pipeline::new(vec![
//!     Step::Drop { targets: vec![Locator::tag("nav"), Locator::tag("footer")] },
//!     Step::Filter { target: Locator::tag("article") },
//! ]);
//! markup.process(&pipeline)?;
//!
//! let note = markup.to_note()?;
//! assert!(note.markdown.contains("**lede**"));
//! # Ok::<(), markpipe::MarkpipeError>(())
//! ```
//!
//! ## Pipelines as configuration
//!
//! A pipeline is a plain ordered list of named steps, so it can live in a JSON
//! config file instead of code:
//!
//! ```rust
//! use markpipe::Pipeline;
//!
//! let pipeline = Pipeline::from_json(
//!     r#"[
//!         {"step": "drop", "targets": [{"name": "nav"}]},
//!         {"step": "filter", "target": {"name": "article"}},
//!         {"step": "quote_captions"},
//!         {"step": "absolute_urls"},
//!         {"step": "trim_link_queries"}
//!     ]"#,
//! )?;
//! # let _ = pipeline;
//! # Ok::<(), markpipe::MarkpipeError>(())
//! ```
//!
//! Transforms the step registry does not cover are applied programmatically
//! with [`Markup::apply`] and [`Markup::edit`].
//!
//! ## Error Handling
//!
//! ```rust
//! use markpipe::{Markup, MarkpipeError};
//!
//! match Markup::from_html("<p>Hello</p>", Some("not a url"), None) {
//!     Err(MarkpipeError::InvalidUrl(url)) => eprintln!("invalid URL: {}", url),
//!     Err(e) => eprintln!("error: {}", e),
//!     Ok(_) => {}
//! }
//! ```
//!
//! Parse and render errors propagate to the caller unmodified; transform
//! steps degrade gracefully (a missing target is a no-op, not a failure),
//! and nothing is retried automatically.
//!
//! ## Concurrency
//!
//! The pipeline is single-threaded and synchronous: steps are cheap tree
//! edits and run one document at a time. Each [`Markup`] is independent, so
//! callers that need throughput can convert documents in parallel.

mod dom;
mod error;
mod loader;
mod markup;
mod meta;
mod note;
mod options;
mod render;
mod transform;

// Public exports
pub use dom::{new_element, parse_html};
pub use error::{MarkpipeError, Result};
pub use loader::{download_media, fetch_html, prepare_url, trim_url, unshorten_url};
pub use markup::Markup;
pub use meta::{MetaValue, DEFAULT_META_ARRAYS};
pub use note::Note;
pub use options::{MarkupOptions, MarkupOptionsBuilder};
pub use transform::{quote_caption, Locator, Pipeline, Step};
