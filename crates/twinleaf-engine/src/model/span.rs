use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Tri-state mark values keyed by mark name.
///
/// `Some(true)` means the mark is on, `Some(false)` that it was explicitly
/// cleared, `None` that the replica has no opinion.
pub type MarkMap = BTreeMap<String, Option<bool>>;

/// One contiguous run of the flattened replicated document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Span {
    /// Consecutive characters sharing one mark snapshot
    Text {
        value: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        marks: MarkMap,
    },
    /// A single zero-width block boundary marker
    Block { block_type: String },
}

impl Span {
    pub fn text(value: impl Into<String>) -> Self {
        Span::Text {
            value: value.into(),
            marks: MarkMap::new(),
        }
    }

    pub fn marked_text<'a>(
        value: impl Into<String>,
        marks: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Span::Text {
            value: value.into(),
            marks: marks
                .into_iter()
                .map(|name| (name.to_string(), Some(true)))
                .collect(),
        }
    }

    pub fn block(block_type: impl Into<String>) -> Self {
        Span::Block {
            block_type: block_type.into(),
        }
    }
}

/// Names of the marks that are currently on.
///
/// Explicitly cleared (`Some(false)`) and unknown (`None`) marks are skipped.
pub fn active_marks(marks: &MarkMap) -> BTreeSet<String> {
    marks
        .iter()
        .filter(|(_, value)| **value == Some(true))
        .map(|(name, _)| name.clone())
        .collect()
}
