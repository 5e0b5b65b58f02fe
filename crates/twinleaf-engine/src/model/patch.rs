use serde::{Deserialize, Serialize};

use crate::model::span::MarkMap;

/// Attribute key carrying a block marker's type
pub const BLOCK_TYPE_KEY: &str = "type";

/// A change descriptor produced by diffing two replica versions.
///
/// Patches in one list are sequential: each index is expressed in the
/// document produced by applying every earlier patch of the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Patch {
    /// Text inserted at `index`, carrying the marks of the inserted characters
    Splice {
        index: usize,
        value: String,
        #[serde(default)]
        marks: MarkMap,
    },
    /// `length` units removed starting at `index`
    #[serde(rename = "del")]
    Delete { index: usize, length: usize },
    /// A block marker object inserted at `index`; always followed by its `Put`
    Insert { index: usize },
    /// An attribute of the block marker at `index` set to `value`
    Put {
        index: usize,
        key: String,
        value: String,
    },
    /// Named formatting ranges turned on or off
    Mark { marks: Vec<MarkRange> },
}

/// One mark delta inside a [`Patch::Mark`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkRange {
    pub name: String,
    pub start: usize,
    pub end: usize,
    /// `true` when the mark was added, `false` when it was removed
    pub value: bool,
}

impl MarkRange {
    pub fn new(name: impl Into<String>, start: usize, end: usize, value: bool) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            value,
        }
    }
}
