pub mod editing;
pub mod error;
pub mod model;
pub mod replica;

// Re-export key types for easier usage
pub use editing::{EditorState, PositionMapper, SyncSession, SyncState};
pub use error::{Result, SyncError};
pub use model::{EditOperation, Patch, Schema, Span, Transaction, TreeDocument};
pub use replica::{Heads, MemoryReplica, ReplicatedText};
