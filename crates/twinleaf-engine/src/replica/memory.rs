use std::collections::BTreeMap;
use std::ops::Range;

use log::{debug, trace};
use uuid::Uuid;

use crate::error::{Result, SyncError};
use crate::model::{BLOCK_TYPE_KEY, FlatElement, FlatText, MarkMap, MarkRange, Patch, Span};
use crate::replica::{Expand, Heads, ReplicatedText, TextMutator};

#[derive(Debug, Clone)]
struct Change {
    id: Uuid,
    patches: Vec<Patch>,
}

/// Single-writer replica with a linear change history.
///
/// Every committed change is kept with the patches that describe it, so
/// `diff` between any earlier and later heads is the concatenation of the
/// changes in between. Mutating from heads other than the current ones fails
/// with [`SyncError::StaleHeads`]; there is no branching or merging.
#[derive(Debug, Clone, Default)]
pub struct MemoryReplica {
    text: FlatText,
    expand: BTreeMap<String, Expand>,
    history: Vec<Change>,
    ready: bool,
}

impl MemoryReplica {
    /// An uninitialised replica; `is_ready` is false until [`Self::initialize`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the document: empty text behind one leading block marker.
    ///
    /// Calling it on a ready replica changes nothing.
    pub fn initialize(&mut self, block_type: &str) -> Heads {
        if self.ready {
            return self.heads();
        }
        let text = FlatText::from_spans(&[Span::block(block_type)]);
        let mut mutator = MemoryMutator::new(&text, &self.expand);
        mutator.patches.extend(block_patches(0, block_type));
        self.ready = true;
        self.commit(mutator)
    }

    /// A ready replica whose root version already holds `spans`.
    pub fn load(spans: &[Span]) -> Result<Self> {
        let text = FlatText::from_spans(spans);
        if !text.starts_with_block() {
            return Err(SyncError::InvalidDocumentShape(
                "document must start with a block".to_string(),
            ));
        }
        Ok(Self {
            text,
            ready: true,
            ..Self::default()
        })
    }

    /// Number of committed changes
    pub fn change_count(&self) -> usize {
        self.history.len()
    }

    fn position(&self, heads: &Heads) -> Result<usize> {
        match heads.0.as_slice() {
            [] => Ok(0),
            [id] => self
                .history
                .iter()
                .position(|change| change.id == *id)
                .map(|index| index + 1)
                .ok_or_else(|| SyncError::UnknownHeads(heads.clone())),
            _ => Err(SyncError::UnknownHeads(heads.clone())),
        }
    }

    fn commit(&mut self, mutator: MemoryMutator) -> Heads {
        let MemoryMutator {
            text,
            expand,
            patches,
        } = mutator;
        self.text = text;
        self.expand = expand;
        if patches.is_empty() {
            return self.heads();
        }
        let id = Uuid::new_v4();
        debug!("Committed {} with {} patches", id.simple(), patches.len());
        self.history.push(Change { id, patches });
        Heads(vec![id])
    }
}

impl ReplicatedText for MemoryReplica {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn heads(&self) -> Heads {
        self.history
            .last()
            .map(|change| Heads(vec![change.id]))
            .unwrap_or_default()
    }

    fn spans(&self) -> Vec<Span> {
        self.text.to_spans()
    }

    fn marks_at(&self, index: usize) -> MarkMap {
        self.text.marks_at(index)
    }

    fn diff(&self, from: &Heads, to: &Heads) -> Result<Vec<Patch>> {
        let start = self.position(from)?;
        let end = self.position(to)?;
        if start > end {
            // Only forward diffs exist in a linear history.
            return Err(SyncError::UnknownHeads(to.clone()));
        }
        Ok(self.history[start..end]
            .iter()
            .flat_map(|change| change.patches.iter().cloned())
            .collect())
    }

    fn mutate<F>(&mut self, heads: &Heads, edit: F) -> Result<Heads>
    where
        F: FnOnce(&mut dyn TextMutator) -> Result<()>,
    {
        if !self.ready {
            return Err(SyncError::UnreadyDocument);
        }
        let current = self.heads();
        if *heads != current {
            self.position(heads)?;
            return Err(SyncError::StaleHeads {
                requested: heads.clone(),
                current,
            });
        }
        let mut mutator = MemoryMutator::new(&self.text, &self.expand);
        edit(&mut mutator)?;
        Ok(self.commit(mutator))
    }
}

fn block_patches(index: usize, block_type: &str) -> [Patch; 2] {
    [
        Patch::Insert { index },
        Patch::Put {
            index,
            key: BLOCK_TYPE_KEY.to_string(),
            value: block_type.to_string(),
        },
    ]
}

/// Working copy of one change; discarded unless the edit succeeds.
struct MemoryMutator {
    text: FlatText,
    expand: BTreeMap<String, Expand>,
    patches: Vec<Patch>,
}

impl MemoryMutator {
    fn new(text: &FlatText, expand: &BTreeMap<String, Expand>) -> Self {
        Self {
            text: text.clone(),
            expand: expand.clone(),
            patches: Vec::new(),
        }
    }

    fn expand_of(&self, name: &str) -> Expand {
        self.expand.get(name).copied().unwrap_or(Expand::None)
    }

    /// Marks that text inserted at `index` picks up from its neighbours
    fn inherited_marks(&self, index: usize) -> MarkMap {
        let mut marks = MarkMap::new();
        let mut inherit = |element: Option<&FlatElement>, covers: fn(Expand) -> bool| {
            if let Some(FlatElement::Char { marks: around, .. }) = element {
                for (name, value) in around {
                    if *value == Some(true) && covers(self.expand_of(name)) {
                        marks.insert(name.clone(), Some(true));
                    }
                }
            }
        };
        if index > 0 {
            inherit(self.text.element(index - 1), Expand::covers_after);
        }
        inherit(self.text.element(index), Expand::covers_before);
        marks
    }

    fn set_mark(
        &mut self,
        range: Range<usize>,
        name: &str,
        expand: Expand,
        value: bool,
    ) -> Result<()> {
        self.text.set_mark(range.clone(), name, value)?;
        self.expand.insert(name.to_string(), expand);
        if range.is_empty() {
            return Ok(());
        }
        trace!("Mark {name} {}..{} set to {value}", range.start, range.end);
        self.patches.push(Patch::Mark {
            marks: vec![MarkRange::new(name, range.start, range.end, value)],
        });
        Ok(())
    }
}

impl TextMutator for MemoryMutator {
    fn splice(&mut self, index: usize, delete: usize, text: &str) -> Result<()> {
        if delete > 0 {
            if index == 0 {
                return Err(SyncError::InvalidDocumentShape(
                    "the leading block marker cannot be deleted".to_string(),
                ));
            }
            self.text.delete(index, delete)?;
            self.patches.push(Patch::Delete {
                index,
                length: delete,
            });
        }
        if !text.is_empty() {
            if index == 0 {
                return Err(SyncError::InvalidDocumentShape(
                    "text cannot precede the leading block marker".to_string(),
                ));
            }
            let marks = self.inherited_marks(index);
            self.text.insert_text(index, text, &marks)?;
            self.patches.push(Patch::Splice {
                index,
                value: text.to_string(),
                marks,
            });
        }
        Ok(())
    }

    fn mark(&mut self, range: Range<usize>, name: &str, expand: Expand) -> Result<()> {
        self.set_mark(range, name, expand, true)
    }

    fn unmark(&mut self, range: Range<usize>, name: &str, expand: Expand) -> Result<()> {
        self.set_mark(range, name, expand, false)
    }

    fn split_block(&mut self, index: usize, block_type: &str) -> Result<()> {
        if index == 0 {
            return Err(SyncError::InvalidDocumentShape(
                "a block cannot precede the leading block marker".to_string(),
            ));
        }
        self.text.insert_block(index, block_type)?;
        self.patches.extend(block_patches(index, block_type));
        Ok(())
    }

    fn update_block_type(&mut self, index: usize, block_type: &str) -> Result<()> {
        self.text.set_block_type(index, block_type)?;
        self.patches.push(Patch::Put {
            index,
            key: BLOCK_TYPE_KEY.to_string(),
            value: block_type.to_string(),
        });
        Ok(())
    }

    fn marks_at(&self, index: usize) -> MarkMap {
        self.text.marks_at(index)
    }
}
