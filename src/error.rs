//! Error types for the markpipe library.

use thiserror::Error;

/// Result type alias for markpipe operations
pub type Result<T> = std::result::Result<T, MarkpipeError>;

/// Errors that can occur while loading, transforming, or rendering a document
#[derive(Error, Debug)]
pub enum MarkpipeError {
    /// Input HTML could not be turned into a usable document.
    ///
    /// The HTML5 parser recovers from malformed markup on its own, so this
    /// only fires for input with no document content at all (e.g. an empty
    /// string).
    #[error("Failed to parse HTML: {0}")]
    ParseError(String),

    /// Invalid URL provided
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Reading a document or media file from the network or filesystem failed
    #[error("Failed to fetch: {0}")]
    FetchError(String),

    /// A custom editor hit an unrecoverable structural precondition.
    ///
    /// Built-in pipeline steps never raise this; they skip instead.
    #[error("Transform failed: {0}")]
    TransformError(String),

    /// The external Markdown converter failed
    #[error("Failed to render Markdown: {0}")]
    RenderError(String),

    /// A pipeline configuration could not be deserialized
    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}
