//! Configuration options for a conversion.
//!
//! This module provides [`MarkupOptions`] and [`MarkupOptionsBuilder`] for
//! configuring URL preparation, metadata harvesting, and rendering. Options
//! are passed explicitly to each [`Markup`](crate::Markup); there is no
//! process-wide configuration.
//!
//! ## Example
//!
//! ```rust
//! use markpipe::{Markup, MarkupOptions};
//!
//! let html = "<html><body><article><p>Content...</p></article></body></html>";
//!
//! // Using default options
//! let markup = Markup::from_html(html, None, None).unwrap();
//!
//! // Using builder for custom options
//! let options = MarkupOptions::builder()
//!     .meta_arrays(vec!["myschema:tag".to_string()])
//!     .trim_queries(false)
//!     .build();
//!
//! let markup = Markup::from_html(html, None, Some(options)).unwrap();
//! # let _ = markup;
//! ```

/// Configuration options for loading and converting a document.
///
/// ## Creating Options
///
/// ### Using Default
///
/// ```rust
/// use markpipe::MarkupOptions;
///
/// let options = MarkupOptions::default();
/// ```
///
/// ### Using Builder
///
/// ```rust
/// use markpipe::MarkupOptions;
///
/// let options = MarkupOptions::builder()
///     .unshorten(false)
///     .debug(true)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct MarkupOptions {
    /// Enable debug logging to stderr.
    ///
    /// When enabled, the pipeline outputs diagnostic messages to stderr as
    /// each step runs. Useful for understanding why a step had no effect.
    ///
    /// Default: `false`
    pub debug: bool,

    /// Follow redirects to resolve shortened URLs before fetching.
    ///
    /// Social-media short links (t.co, tinyurl, ...) are resolved with a HEAD
    /// request so the stored document URL is the final destination. Only
    /// consulted by [`Markup::from_url`](crate::Markup::from_url).
    ///
    /// Default: `true`
    pub unshorten: bool,

    /// Remove the query string (UTM and referral tags) from the document URL.
    ///
    /// Default: `true`
    pub trim_queries: bool,

    /// Extra headers sent with every loader request, as `(name, value)`
    /// pairs. Useful for pages that gate content on a User-Agent.
    ///
    /// Default: empty
    pub headers: Vec<(String, String)>,

    /// Additional `<meta>` keys harvested as arrays.
    ///
    /// The OpenGraph array properties in
    /// [`DEFAULT_META_ARRAYS`](crate::DEFAULT_META_ARRAYS) are always
    /// accumulated; publishers with their own repeated meta schema can be
    /// accommodated by listing the extra keys here.
    ///
    /// Default: empty
    pub meta_arrays: Vec<String>,

    /// Tags dropped entirely during Markdown rendering.
    ///
    /// Default: `["script", "style", "head"]`
    pub skip_tags: Vec<String>,
}

impl Default for MarkupOptions {
    fn default() -> Self {
        Self {
            debug: false,
            unshorten: true,
            trim_queries: true,
            headers: Vec::new(),
            meta_arrays: Vec::new(),
            skip_tags: vec![
                "script".to_string(),
                "style".to_string(),
                "head".to_string(),
            ],
        }
    }
}

impl MarkupOptions {
    /// Creates a new builder for MarkupOptions
    pub fn builder() -> MarkupOptionsBuilder {
        MarkupOptionsBuilder::default()
    }
}

/// Builder for [`MarkupOptions`].
///
/// ## Example
///
/// ```rust
/// use markpipe::MarkupOptions;
///
/// let options = MarkupOptions::builder()
///     .headers(vec![("User-Agent".to_string(), "markpipe/0.1".to_string())])
///     .unshorten(false)
///     .build();
/// ```
#[derive(Default)]
pub struct MarkupOptionsBuilder {
    debug: Option<bool>,
    unshorten: Option<bool>,
    trim_queries: Option<bool>,
    headers: Option<Vec<(String, String)>>,
    meta_arrays: Option<Vec<String>>,
    skip_tags: Option<Vec<String>>,
}

impl MarkupOptionsBuilder {
    /// Enable or disable debug logging
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Resolve shortened URLs before fetching
    pub fn unshorten(mut self, unshorten: bool) -> Self {
        self.unshorten = Some(unshorten);
        self
    }

    /// Remove query strings from the document URL
    pub fn trim_queries(mut self, trim: bool) -> Self {
        self.trim_queries = Some(trim);
        self
    }

    /// Set loader request headers
    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Set additional meta keys harvested as arrays
    pub fn meta_arrays(mut self, keys: Vec<String>) -> Self {
        self.meta_arrays = Some(keys);
        self
    }

    /// Set tags skipped during rendering
    pub fn skip_tags(mut self, tags: Vec<String>) -> Self {
        self.skip_tags = Some(tags);
        self
    }

    /// Build the MarkupOptions
    pub fn build(self) -> MarkupOptions {
        let defaults = MarkupOptions::default();
        MarkupOptions {
            debug: self.debug.unwrap_or(defaults.debug),
            unshorten: self.unshorten.unwrap_or(defaults.unshorten),
            trim_queries: self.trim_queries.unwrap_or(defaults.trim_queries),
            headers: self.headers.unwrap_or(defaults.headers),
            meta_arrays: self.meta_arrays.unwrap_or(defaults.meta_arrays),
            skip_tags: self.skip_tags.unwrap_or(defaults.skip_tags),
        }
    }
}
