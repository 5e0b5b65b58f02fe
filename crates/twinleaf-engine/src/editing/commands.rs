//! Block commands bound to editor keys.
//!
//! Each command inspects the caret and returns the transaction to dispatch,
//! or `None` when it does not apply. Only collapsed selections are handled.

use crate::editing::state::EditorState;
use crate::model::{EditOperation, Selection, Transaction};

/// Turn the caret's block into a list item, or a list item back into a
/// paragraph.
pub fn toggle_list(state: &EditorState) -> Option<Transaction> {
    let caret = caret(state)?;
    let doc = &state.doc;
    let (index, _) = doc.resolve(caret).ok()?;
    let block = doc.blocks()[index];
    let block_type = if doc.schema.is_list_item(&block.block_type) {
        doc.schema.paragraph.clone()
    } else {
        doc.schema.list_item.clone()
    };
    let at = doc.block_starts()[index];
    Some(
        Transaction::new(doc.clone())
            .step(EditOperation::UpdateBlockType { at, block_type })
            .with_selection(Selection::caret(caret)),
    )
}

/// Split the caret's block in two. The new block keeps the current block
/// type, so Enter inside a list item opens another list item.
pub fn split_block(state: &EditorState) -> Option<Transaction> {
    let caret = caret(state)?;
    let doc = &state.doc;
    let (index, offset) = doc.resolve(caret).ok()?;
    let block_type = doc.blocks()[index].block_type.clone();
    let at = doc.block_starts()[index] + offset;
    // close + open between the halves
    let selection = Selection::caret(at + 2);
    Some(
        Transaction::new(doc.clone())
            .step(EditOperation::SplitBlock {
                at,
                depth: doc.schema.split_depth(&block_type),
                block_type,
            })
            .with_selection(selection),
    )
}

fn caret(state: &EditorState) -> Option<usize> {
    state.selection.is_empty().then_some(state.selection.head)
}
