use std::collections::BTreeSet;

use crate::model::{MarkMap, active_marks};
use crate::replica::Expand;

/// Mark changes needed to make inserted text carry exactly its own marks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkOps {
    pub add: BTreeSet<String>,
    pub remove: BTreeSet<String>,
}

impl MarkOps {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// Compare the replica's mark state at an insertion point with the marks of
/// the inserted run.
///
/// Marks the run has that are missing, unknown or cleared at the insertion
/// point are added; marks active there that the run lacks are removed. This
/// stops text typed after a bold word from silently staying bold once the
/// user has switched bold off.
pub fn reconcile(at_insertion: &MarkMap, run_marks: &BTreeSet<String>) -> MarkOps {
    let active = active_marks(at_insertion);
    MarkOps {
        add: run_marks.difference(&active).cloned().collect(),
        remove: active.difference(run_marks).cloned().collect(),
    }
}

/// How a mark grows when text is typed at its edges.
///
/// Emphasis grows forward with typing; links, comments and anything else
/// stay put.
pub fn expand_policy(mark: &str) -> Expand {
    match mark {
        "strong" | "em" => Expand::After,
        _ => Expand::None,
    }
}
