//! Render adapter: hand the serialized draft to the external Markdown
//! converter.
//!
//! Rendering is a single synchronous call per document. Converter failures
//! surface as [`MarkpipeError::RenderError`] and are never retried here;
//! retrying adds nothing without diagnosing the underlying failure, so that
//! decision stays with the caller.

use htmd::options::{BulletListMarker, CodeBlockFence, CodeBlockStyle, HeadingStyle, Options};
use htmd::HtmlToMarkdown;

use crate::error::{MarkpipeError, Result};

/// Convert serialized HTML to GitHub-flavored-style Markdown.
///
/// ATX headings, `*` bullets, and fenced code blocks; tags in `skip_tags`
/// are dropped wholesale.
pub(crate) fn to_markdown(html: &str, skip_tags: &[String]) -> Result<String> {
    let converter = HtmlToMarkdown::builder()
        .skip_tags(skip_tags.iter().map(String::as_str).collect())
        .options(Options {
            heading_style: HeadingStyle::Atx,
            bullet_list_marker: BulletListMarker::Asterisk,
            code_block_style: CodeBlockStyle::Fenced,
            code_block_fence: CodeBlockFence::Backticks,
            ..Default::default()
        })
        .build();

    converter
        .convert(html)
        .map_err(|e| MarkpipeError::RenderError(e.to_string()))
}
