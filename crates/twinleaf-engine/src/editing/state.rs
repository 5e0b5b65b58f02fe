use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Selection, Span, SyncMeta, Transaction, TreeDocument};
use crate::replica::Heads;

/// The replica snapshot the view was last synchronised with.
///
/// `version` counts replacements so callers can tell snapshots apart without
/// comparing span lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    pub version: u64,
    pub last_heads: Heads,
    pub last_spans: Vec<Span>,
}

impl SyncState {
    pub fn new(heads: Heads, spans: Vec<Span>) -> Self {
        Self {
            version: 0,
            last_heads: heads,
            last_spans: spans,
        }
    }

    /// The state after a transaction: replaced when it carries sync
    /// metadata, unchanged otherwise.
    pub fn advance(&self, meta: Option<&SyncMeta>) -> Self {
        match meta {
            Some(meta) => Self {
                version: self.version + 1,
                last_heads: meta.heads.clone(),
                last_spans: meta.spans.clone(),
            },
            None => self.clone(),
        }
    }
}

/// View document, selection and sync snapshot, always replaced together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    pub doc: TreeDocument,
    pub selection: Selection,
    pub sync: SyncState,
}

impl EditorState {
    /// A state with the caret at the start of the first block
    pub fn new(doc: TreeDocument, sync: SyncState) -> Self {
        let start = doc.block_starts().first().copied().unwrap_or(1);
        Self {
            doc,
            selection: Selection::caret(start),
            sync,
        }
    }

    /// Apply `tx`, returning the next state. `self` is left untouched when
    /// any step fails.
    ///
    /// The selection is taken from the transaction when it has one and is
    /// otherwise kept, clamped to the new document.
    pub fn apply(&self, tx: &Transaction) -> Result<EditorState> {
        let doc = tx.apply()?;
        let size = doc.content_size();
        let selection = tx.selection.unwrap_or(self.selection);
        let selection = Selection::range(selection.anchor.min(size), selection.head.min(size));
        let sync = self.sync.advance(tx.meta.as_ref());
        if sync.version != self.sync.version {
            debug!("Sync state now v{} at {}", sync.version, sync.last_heads);
        }
        Ok(EditorState {
            doc,
            selection,
            sync,
        })
    }
}
