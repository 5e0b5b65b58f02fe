//! Remote changes: replica patches replayed as view transactions.
//!
//! Patches arrive in order, each expressed against the document left by the
//! ones before it. The translator keeps a flat working copy of the last
//! synchronised spans, applies every patch to it as it goes, and maps each
//! patch with a mapper built from the working copy at that point. The final
//! working copy becomes the new cached span list.

use log::{debug, trace};

use crate::editing::mapping::PositionMapper;
use crate::error::{Result, SyncError};
use crate::model::{
    BLOCK_TYPE_KEY, EditOperation, FlatText, Inline, InlineRun, MarkMap, MarkRange, Patch, Span,
    SyncMeta, Transaction, TreeDocument, active_marks,
};
use crate::replica::Heads;

/// A patch after `Insert` + `Put` pairs have been folded together
#[derive(Debug, Clone, PartialEq, Eq)]
enum Event<'a> {
    CreateBlock { index: usize, block_type: &'a str },
    SetBlockType { index: usize, block_type: &'a str },
    Splice {
        index: usize,
        value: &'a str,
        marks: &'a MarkMap,
    },
    Delete { index: usize, length: usize },
    Mark(&'a [MarkRange]),
}

/// Turn `patches` into a transaction over `doc`.
///
/// `last_spans` must be the replica snapshot `doc` was synchronised with.
/// The transaction carries `heads` and the patched span list as its
/// [`SyncMeta`].
pub fn translate_patches(
    doc: &TreeDocument,
    last_spans: &[Span],
    patches: &[Patch],
    heads: &Heads,
) -> Result<Transaction> {
    let events = fold_block_patches(patches)?;
    debug!("Replaying {} events up to {heads}", events.len());

    let schema = &doc.schema;
    let mut working = FlatText::from_spans(last_spans);
    let mut tx = Transaction::new(doc.clone());
    for event in events {
        let mapper = PositionMapper::from_flat(&working, schema)?;
        trace!("Replaying {event:?}");
        match event {
            Event::CreateBlock { index, block_type } => {
                guard_leading_marker(index, "insert a block before")?;
                working.insert_block(index, block_type)?;
                tx.steps.push(EditOperation::SplitBlock {
                    at: mapper.flat_to_tree(index),
                    depth: schema.split_depth(block_type),
                    block_type: block_type.to_string(),
                });
            }
            Event::SetBlockType { index, block_type } => {
                working.set_block_type(index, block_type)?;
                tx.steps.push(EditOperation::UpdateBlockType {
                    at: mapper.flat_to_tree(index + 1),
                    block_type: block_type.to_string(),
                });
            }
            Event::Splice {
                index,
                value,
                marks,
            } => {
                guard_leading_marker(index, "insert text before")?;
                working.insert_text(index, value, marks)?;
                let run = InlineRun {
                    text: value.to_string(),
                    marks: active_marks(marks),
                };
                let at = mapper.flat_to_tree(index);
                tx.steps.push(EditOperation::ReplaceRange {
                    from: at,
                    to: at,
                    content: vec![Inline::Text(run)],
                });
            }
            Event::Delete { index, length } => {
                guard_leading_marker(index, "delete")?;
                working.delete(index, length)?;
                tx.steps.push(EditOperation::delete(
                    mapper.flat_to_tree(index),
                    mapper.flat_to_tree(index + length),
                ));
            }
            Event::Mark(ranges) => {
                for range in ranges {
                    working.set_mark(range.start..range.end, &range.name, range.value)?;
                    let from = mapper.flat_to_tree(range.start);
                    let to = mapper.flat_to_tree(range.end);
                    let mark = range.name.clone();
                    tx.steps.push(if range.value {
                        EditOperation::AddMark { from, to, mark }
                    } else {
                        EditOperation::RemoveMark { from, to, mark }
                    });
                }
            }
        }
    }

    Ok(tx.with_meta(SyncMeta {
        heads: heads.clone(),
        spans: working.to_spans(),
    }))
}

fn guard_leading_marker(index: usize, action: &str) -> Result<()> {
    if index == 0 {
        return Err(SyncError::InvalidDocumentShape(format!(
            "patch would {action} the leading block marker"
        )));
    }
    Ok(())
}

/// Fold every `Insert` with the `Put` of its type that must follow it.
fn fold_block_patches(patches: &[Patch]) -> Result<Vec<Event<'_>>> {
    let mut events = Vec::with_capacity(patches.len());
    let mut iter = patches.iter();
    while let Some(patch) = iter.next() {
        let event = match patch {
            Patch::Insert { index } => match iter.next() {
                Some(Patch::Put {
                    index: put_index,
                    key,
                    value,
                }) if put_index == index && key == BLOCK_TYPE_KEY => Event::CreateBlock {
                    index: *index,
                    block_type: value,
                },
                other => {
                    return Err(SyncError::UnsupportedOperation(format!(
                        "block insert at {index} must be followed by its type, got {other:?}"
                    )));
                }
            },
            Patch::Put { index, key, value } if key == BLOCK_TYPE_KEY => Event::SetBlockType {
                index: *index,
                block_type: value,
            },
            Patch::Put { key, .. } => {
                return Err(SyncError::UnsupportedOperation(format!(
                    "block attribute {key} is not supported"
                )));
            }
            Patch::Splice {
                index,
                value,
                marks,
            } => Event::Splice {
                index: *index,
                value,
                marks,
            },
            Patch::Delete { index, length } => Event::Delete {
                index: *index,
                length: *length,
            },
            Patch::Mark { marks } => Event::Mark(marks),
        };
        events.push(event);
    }
    Ok(events)
}
