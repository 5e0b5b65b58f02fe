//! Local edits: view transactions written into the replica.

use log::{debug, trace};

use crate::editing::mapping::PositionMapper;
use crate::editing::marks::{expand_policy, reconcile};
use crate::error::{Result, SyncError};
use crate::model::{EditOperation, Inline, InlineRun, Transaction};
use crate::replica::{Heads, ReplicatedText, TextMutator};

/// Write every step of `tx` into `replica` as one change anchored at `heads`.
///
/// A transaction without steps returns `heads` untouched. Steps are checked
/// against the view document before the replica is touched, and any failure
/// inside the change discards the whole change.
pub fn apply_transaction<R: ReplicatedText>(
    replica: &mut R,
    heads: &Heads,
    tx: &Transaction,
) -> Result<Heads> {
    if !tx.doc_changed() {
        return Ok(heads.clone());
    }
    if !replica.is_ready() {
        return Err(SyncError::UnreadyDocument);
    }
    let plan = plan_steps(tx)?;
    debug!("Writing {} steps from {heads}", plan.len());
    replica.mutate(heads, |text| {
        plan.iter()
            .try_for_each(|(mapper, step)| write_step(text, mapper, step))
    })
}

/// Pair every step with a mapper over the document it applies to.
fn plan_steps(tx: &Transaction) -> Result<Vec<(PositionMapper, &EditOperation)>> {
    let mut doc = tx.before.clone();
    let mut plan = Vec::with_capacity(tx.steps.len());
    for step in &tx.steps {
        let mapper = PositionMapper::from_tree(&doc)?;
        doc = doc.apply(step)?;
        plan.push((mapper, step));
    }
    Ok(plan)
}

fn write_step(
    text: &mut dyn TextMutator,
    mapper: &PositionMapper,
    step: &EditOperation,
) -> Result<()> {
    trace!("Writing step {step:?}");
    match step {
        EditOperation::ReplaceRange { from, to, content } => {
            let start = mapper.tree_to_flat(*from);
            let end = mapper.tree_to_flat(*to);
            if end > start {
                text.splice(start, end - start, "")?;
            }
            let mut at = start;
            for inline in content {
                match inline {
                    Inline::Text(run) => at = insert_run(text, at, run)?,
                    Inline::Atom { node_type } => {
                        return Err(SyncError::UnsupportedOperation(format!(
                            "cannot write inline {node_type} to the replica"
                        )));
                    }
                }
            }
            Ok(())
        }
        EditOperation::AddMark { from, to, mark } => text.mark(
            mapper.tree_to_flat(*from)..mapper.tree_to_flat(*to),
            mark,
            expand_policy(mark),
        ),
        EditOperation::RemoveMark { from, to, mark } => text.unmark(
            mapper.tree_to_flat(*from)..mapper.tree_to_flat(*to),
            mark,
            expand_policy(mark),
        ),
        EditOperation::SplitBlock { at, block_type, .. } => {
            text.split_block(mapper.tree_to_flat(*at), block_type)
        }
        EditOperation::UpdateBlockType { at, block_type } => {
            text.update_block_type(mapper.marker_for(*at), block_type)
        }
    }
}

/// Splice `run` at `at` and fix up whatever marks it inherited.
/// Returns the index just past the inserted text.
fn insert_run(text: &mut dyn TextMutator, at: usize, run: &InlineRun) -> Result<usize> {
    if run.is_empty() {
        return Ok(at);
    }
    text.splice(at, 0, &run.text)?;
    let range = at..at + run.len();
    let ops = reconcile(&text.marks_at(at), &run.marks);
    for mark in &ops.add {
        text.mark(range.clone(), mark, expand_policy(mark))?;
    }
    for mark in &ops.remove {
        text.unmark(range.clone(), mark, expand_policy(mark))?;
    }
    Ok(range.end)
}
