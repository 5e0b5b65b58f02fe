use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::span::Span;
use crate::model::tree::{InlineRun, TreeDocument};
use crate::replica::Heads;

/// Inline content carried by a [`EditOperation::ReplaceRange`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inline {
    Text(InlineRun),
    /// Non-text inline content (images, mentions, ...); never translated
    Atom { node_type: String },
}

/// One step of a view transaction, expressed in tree positions of the
/// document produced by the steps before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditOperation {
    ReplaceRange {
        from: usize,
        to: usize,
        content: Vec<Inline>,
    },
    AddMark {
        from: usize,
        to: usize,
        mark: String,
    },
    RemoveMark {
        from: usize,
        to: usize,
        mark: String,
    },
    /// Split the block at `at`, the tail becoming a new `block_type` block.
    /// `depth` is 2 when the new block is a list item, 1 otherwise.
    SplitBlock {
        at: usize,
        depth: usize,
        block_type: String,
    },
    /// Change the type of the block containing `at`
    UpdateBlockType { at: usize, block_type: String },
}

impl EditOperation {
    /// Insert plain runs at `at` without deleting anything
    pub fn insert(at: usize, runs: impl IntoIterator<Item = InlineRun>) -> Self {
        EditOperation::ReplaceRange {
            from: at,
            to: at,
            content: runs.into_iter().map(Inline::Text).collect(),
        }
    }

    pub fn delete(from: usize, to: usize) -> Self {
        EditOperation::ReplaceRange {
            from,
            to,
            content: Vec::new(),
        }
    }
}

/// Selection in tree positions; `anchor == head` is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn caret(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn range(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }
}

/// Replica snapshot attached to a transaction once it has been synchronised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMeta {
    pub heads: Heads,
    pub spans: Vec<Span>,
}

/// An ordered batch of edit steps against a known starting document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub before: TreeDocument,
    pub steps: Vec<EditOperation>,
    pub selection: Option<Selection>,
    pub meta: Option<SyncMeta>,
}

impl Transaction {
    pub fn new(before: TreeDocument) -> Self {
        Self {
            before,
            steps: Vec::new(),
            selection: None,
            meta: None,
        }
    }

    pub fn step(mut self, step: EditOperation) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_meta(mut self, meta: SyncMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Whether any step touches document content
    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// The document after every step
    pub fn apply(&self) -> Result<TreeDocument> {
        self.steps
            .iter()
            .try_fold(self.before.clone(), |doc, step| doc.apply(step))
    }
}
