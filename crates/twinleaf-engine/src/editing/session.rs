use log::{debug, info};

use crate::editing::local::apply_transaction;
use crate::editing::parse::parse_spans;
use crate::editing::remote::translate_patches;
use crate::editing::state::{EditorState, SyncState};
use crate::error::{Result, SyncError};
use crate::model::{Schema, Selection, Transaction};
use crate::replica::ReplicatedText;

/// One editor view bound to one replica.
///
/// Local transactions go through [`SyncSession::dispatch`]; the host calls
/// [`SyncSession::reconcile`] whenever the replica reports a change from
/// anywhere else. Either way the view only ever changes by replaying replica
/// patches, so it cannot drift from the replica.
#[derive(Debug)]
pub struct SyncSession<R: ReplicatedText> {
    replica: R,
    state: EditorState,
}

impl<R: ReplicatedText> SyncSession<R> {
    pub fn open(replica: R, schema: Schema) -> Result<Self> {
        if !replica.is_ready() {
            return Err(SyncError::UnreadyDocument);
        }
        let spans = replica.spans();
        let doc = parse_spans(&spans, &schema)?;
        let sync = SyncState::new(replica.heads(), spans);
        info!("Opened session at {}", sync.last_heads);
        Ok(Self {
            replica,
            state: EditorState::new(doc, sync),
        })
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn replica(&self) -> &R {
        &self.replica
    }

    /// Direct replica access, for writes that bypass this view
    pub fn replica_mut(&mut self) -> &mut R {
        &mut self.replica
    }

    pub fn into_replica(self) -> R {
        self.replica
    }

    /// Handle a transaction from the view.
    ///
    /// Content transactions are written to the replica and the resulting
    /// change is replayed into the view; selection-only transactions apply
    /// directly.
    pub fn dispatch(&mut self, tx: Transaction) -> Result<()> {
        if !tx.doc_changed() {
            self.state = self.state.apply(&tx)?;
            return Ok(());
        }
        if tx.before != self.state.doc {
            return Err(SyncError::UnsupportedOperation(
                "transaction was built against an outdated document".to_string(),
            ));
        }
        let heads = apply_transaction(&mut self.replica, &self.state.sync.last_heads, &tx)?;
        debug!("Local transaction committed at {heads}");
        self.replay(tx.selection)
    }

    /// Bring the view up to the replica's current heads.
    pub fn reconcile(&mut self) -> Result<()> {
        self.replay(None)
    }

    fn replay(&mut self, selection: Option<Selection>) -> Result<()> {
        let heads = self.replica.heads();
        let sync = &self.state.sync;
        if heads == sync.last_heads {
            if let Some(selection) = selection {
                self.state.selection = selection;
            }
            return Ok(());
        }
        let patches = self.replica.diff(&sync.last_heads, &heads)?;
        let mut tx = translate_patches(&self.state.doc, &sync.last_spans, &patches, &heads)?;
        tx.selection = selection;
        self.state = self.state.apply(&tx)?;
        Ok(())
    }
}
