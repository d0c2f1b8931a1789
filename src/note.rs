//! The conversion result handed to downstream consumers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::meta::MetaValue;

/// The final product of a conversion: Markdown text plus the note
/// properties, ready for a note-taking or ingestion workflow.
///
/// Serializes to plain JSON, so a batch of notes can be written straight to
/// disk or a queue:
///
/// ```rust
/// use markpipe::Markup;
///
/// let markup = Markup::from_html("<article><p>Hello</p></article>", None, None)?;
/// let note = markup.to_note()?;
/// let json = serde_json::to_string_pretty(&note).unwrap();
/// # let _ = json;
/// # Ok::<(), markpipe::MarkpipeError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Rendered Markdown content
    pub markdown: String,

    /// Note properties: `title`, `url`, `description`, `publisher` when the
    /// document provided them, plus anything added with
    /// [`Markup::add_property`](crate::Markup::add_property).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, MetaValue>,
}

impl Note {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_to_plain_json() {
        let mut note = Note::new();
        note.markdown = "# Title".to_string();
        note.properties.insert(
            "tags".to_string(),
            MetaValue::Many(vec!["Publishing".into(), "Article".into()]),
        );
        let json = serde_json::to_string(&note).unwrap();
        assert_eq!(
            json,
            r##"{"markdown":"# Title","properties":{"tags":["Publishing","Article"]}}"##
        );
    }

    #[test]
    fn test_empty_properties_are_omitted() {
        let note = Note {
            markdown: "text".to_string(),
            properties: BTreeMap::new(),
        };
        let json = serde_json::to_string(&note).unwrap();
        assert_eq!(json, r#"{"markdown":"text"}"#);
    }
}
