use crate::replica::Heads;

/// Errors raised while translating between the replicated document and the
/// editor tree.
///
/// Every error is reported synchronously by the call that detected it. Batches
/// are never partially applied, so callers can drop the failed batch and keep
/// using the previous state.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Document is not ready: the replica has not been initialised")]
    UnreadyDocument,
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("Invalid document shape: {0}")]
    InvalidDocumentShape(String),
    #[error("Index {index} is out of range for a document of length {len}")]
    OutOfRange { index: usize, len: usize },
    #[error("Invalid range {from}..{to}")]
    InvalidRange { from: usize, to: usize },
    #[error("No block marker at index {index}")]
    NoBlockAt { index: usize },
    #[error("Unknown heads: {0}")]
    UnknownHeads(Heads),
    #[error("Stale heads: mutation requested from {requested} but the replica is at {current}")]
    StaleHeads { requested: Heads, current: Heads },
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
