//! Data types shared by both sides of the sync: replica spans and patches,
//! the tree view document and its edit operations.

pub mod flat;
pub mod ops;
pub mod patch;
pub mod schema;
pub mod span;
pub mod tree;

pub use flat::{FlatElement, FlatText};
pub use ops::{EditOperation, Inline, Selection, SyncMeta, Transaction};
pub use patch::{BLOCK_TYPE_KEY, MarkRange, Patch};
pub use schema::Schema;
pub use span::{MarkMap, Span, active_marks};
pub use tree::{BlockNode, InlineRun, TreeDocument, TreeNode};
