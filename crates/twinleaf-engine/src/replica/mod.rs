//! The replicated-text collaborator contract.
//!
//! The engine never merges or stores anything itself; it reads snapshots and
//! diffs from a [`ReplicatedText`] and writes through a [`TextMutator`] handed
//! out by [`ReplicatedText::mutate`]. [`memory::MemoryReplica`] is the
//! in-process implementation used by tests and by hosts without a CRDT engine.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{MarkMap, Patch, Span};

pub mod memory;

pub use memory::MemoryReplica;

/// Opaque version identifier: the ids of the latest changes.
///
/// The empty list is the root version, before any change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Heads(pub Vec<Uuid>);

impl Heads {
    pub fn root() -> Self {
        Self::default()
    }
}

impl fmt::Display for Heads {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        let ids: Vec<String> = self.0.iter().map(|id| id.simple().to_string()).collect();
        write!(f, "[{}]", ids.join(", "))
    }
}

/// Whether a mark grows to cover text inserted at its edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expand {
    Before,
    After,
    Both,
    None,
}

impl Expand {
    /// Inherited by text typed right after the mark's last character
    pub fn covers_after(self) -> bool {
        matches!(self, Expand::After | Expand::Both)
    }

    /// Inherited by text typed right before the mark's first character
    pub fn covers_before(self) -> bool {
        matches!(self, Expand::Before | Expand::Both)
    }
}

/// Read and write access to one replicated rich-text field.
pub trait ReplicatedText {
    /// False until the document exists and holds its leading block
    fn is_ready(&self) -> bool;

    fn heads(&self) -> Heads;

    /// The current document flattened into spans
    fn spans(&self) -> Vec<Span>;

    /// Mark state of the character at `index`
    fn marks_at(&self, index: usize) -> MarkMap;

    /// Sequential patches turning version `from` into version `to`
    fn diff(&self, from: &Heads, to: &Heads) -> Result<Vec<Patch>>;

    /// Run `edit` as one atomic change anchored at `heads`.
    ///
    /// Returns the new heads, or `heads` itself when `edit` changed nothing.
    /// When `edit` fails nothing is committed.
    fn mutate<F>(&mut self, heads: &Heads, edit: F) -> Result<Heads>
    where
        F: FnOnce(&mut dyn TextMutator) -> Result<()>;
}

/// Primitive mutators available inside [`ReplicatedText::mutate`].
///
/// Indices are flat indices in the document as modified by the calls made
/// so far in the same change.
pub trait TextMutator {
    /// Delete `delete` units at `index`, then insert `text` there
    fn splice(&mut self, index: usize, delete: usize, text: &str) -> Result<()>;

    fn mark(&mut self, range: Range<usize>, name: &str, expand: Expand) -> Result<()>;

    fn unmark(&mut self, range: Range<usize>, name: &str, expand: Expand) -> Result<()>;

    /// Insert a block marker of `block_type` at `index`
    fn split_block(&mut self, index: usize, block_type: &str) -> Result<()>;

    /// Retype the block marker at `index`
    fn update_block_type(&mut self, index: usize, block_type: &str) -> Result<()>;

    fn marks_at(&self, index: usize) -> MarkMap;
}
