/*!
 * # Editing Core Module
 *
 * Bidirectional sync between a replicated flat text and the tree-shaped view
 * document an editor manipulates.
 *
 * ## Two Documents, One Content
 *
 * ### 1. Replicated flat text
 * - A character stream with **zero-width block markers**, each carrying a type
 * - Formatting lives in **range marks** with a per-mark expansion policy
 * - Read and written only through [`crate::replica::ReplicatedText`]
 *
 * ### 2. Tree view document
 * - Root blocks and list wrappers holding list items
 * - Inline runs carry a set of active marks
 * - Positions count node opens and closes, the way tree editors do
 *
 * ## Data Flow
 *
 * ```text
 * view transaction ──► local ──► replica change ──► diff ──► remote ──► view
 *                                                              ▲
 *                              foreign changes ────────────────┘
 * ```
 *
 * The view is never edited directly: a local transaction is written to the
 * replica and the view catches up by replaying the replica's own patches.
 *
 * ## Module Structure
 *
 * - **`mapping`**: `PositionMapper`, tree position ↔ flat index for one snapshot
 * - **`marks`**: mark reconciliation for inserted runs and the expansion table
 * - **`local`**: view transactions written as one replica change
 * - **`remote`**: replica patches translated into a view transaction
 * - **`state`**: `SyncState` and `EditorState`, replaced as a unit
 * - **`parse`**: initial view document from a span snapshot
 * - **`session`**: `SyncSession`, the glue between a view and a replica
 * - **`commands`**: list toggling and block splitting at the caret
 *
 * ## Usage Pattern
 *
 * ```rust
 * use twinleaf_engine::editing::*;
 * use twinleaf_engine::model::{EditOperation, InlineRun, Schema, Transaction};
 * use twinleaf_engine::replica::MemoryReplica;
 *
 * let mut replica = MemoryReplica::new();
 * replica.initialize("paragraph");
 * let mut session = SyncSession::open(replica, Schema::default()).unwrap();
 *
 * let tx = Transaction::new(session.state().doc.clone())
 *     .step(EditOperation::insert(1, [InlineRun::plain("fox")]));
 * session.dispatch(tx).unwrap();
 *
 * assert_eq!(session.state().doc.blocks()[0].text(), "fox");
 * ```
 */

pub mod commands;
pub mod local;
pub mod mapping;
pub mod marks;
pub mod parse;
pub mod remote;
pub mod session;
pub mod state;

pub use commands::{split_block, toggle_list};
pub use local::apply_transaction;
pub use mapping::PositionMapper;
pub use marks::{MarkOps, expand_policy, reconcile};
pub use parse::parse_spans;
pub use remote::translate_patches;
pub use session::SyncSession;
pub use state::{EditorState, SyncState};
