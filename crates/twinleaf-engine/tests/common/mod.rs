//! Editor simulation shared by the integration tests.
//!
//! `Editor` behaves like a minimal editor surface: it turns keystrokes into
//! transactions against its own view document and dispatches them through a
//! `SyncSession` backed by a `MemoryReplica`.

#![allow(dead_code)]

use std::collections::BTreeSet;

use twinleaf_engine::editing::{SyncSession, split_block, toggle_list};
use twinleaf_engine::model::{
    EditOperation, Inline, InlineRun, Schema, Selection, Span, Transaction, TreeDocument,
};
use twinleaf_engine::replica::{MemoryReplica, ReplicatedText};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct Editor {
    pub session: SyncSession<MemoryReplica>,
    /// Marks chosen with an empty selection, used by the next insertion
    stored_marks: Option<BTreeSet<String>>,
}

impl Editor {
    /// A fresh document holding one empty paragraph
    pub fn new() -> Self {
        init_logging();
        let mut replica = MemoryReplica::new();
        replica.initialize("paragraph");
        Self::open(replica)
    }

    pub fn from_spans(spans: &[Span]) -> Self {
        init_logging();
        Self::open(MemoryReplica::load(spans).unwrap())
    }

    fn open(replica: MemoryReplica) -> Self {
        Self {
            session: SyncSession::open(replica, Schema::default()).unwrap(),
            stored_marks: None,
        }
    }

    pub fn doc(&self) -> &TreeDocument {
        &self.session.state().doc
    }

    pub fn outline(&self) -> String {
        self.doc().to_string()
    }

    pub fn spans(&self) -> Vec<Span> {
        self.session.replica().spans()
    }

    pub fn selection(&self) -> Selection {
        self.session.state().selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        let tx = Transaction::new(self.doc().clone()).with_selection(selection);
        self.dispatch(tx);
    }

    pub fn set_caret(&mut self, pos: usize) {
        self.set_selection(Selection::caret(pos));
    }

    pub fn select_all(&mut self) {
        let (start, end) = self.content_bounds();
        self.set_selection(Selection::range(start, end));
    }

    pub fn move_to_start(&mut self) {
        let (start, _) = self.content_bounds();
        self.set_caret(start);
    }

    pub fn move_to_end(&mut self) {
        let (_, end) = self.content_bounds();
        self.set_caret(end);
    }

    /// Type `text` over the selection
    pub fn type_text(&mut self, text: &str) {
        let selection = self.selection();
        let marks = self
            .stored_marks
            .take()
            .unwrap_or_else(|| self.marks_before(selection.from()));
        let run = InlineRun {
            text: text.to_string(),
            marks,
        };
        let caret = selection.from() + run.len();
        let tx = Transaction::new(self.doc().clone())
            .step(EditOperation::ReplaceRange {
                from: selection.from(),
                to: selection.to(),
                content: vec![Inline::Text(run)],
            })
            .with_selection(Selection::caret(caret));
        self.dispatch(tx);
    }

    pub fn backspace(&mut self) {
        self.stored_marks = None;
        let selection = self.selection();
        if !selection.is_empty() {
            self.delete(selection.from(), selection.to());
            return;
        }
        let caret = selection.head;
        let (index, offset) = self.doc().resolve(caret).unwrap();
        if offset > 0 {
            self.delete(caret - 1, caret);
        } else if index > 0 {
            let starts = self.doc().block_starts();
            let previous_end = starts[index - 1] + self.doc().blocks()[index - 1].len();
            self.delete(previous_end, starts[index]);
        }
    }

    pub fn enter(&mut self) {
        let tx = split_block(self.session.state()).expect("enter is handled");
        self.dispatch(tx);
    }

    pub fn toggle_list(&mut self) {
        let tx = toggle_list(self.session.state()).expect("toggle is handled");
        self.dispatch(tx);
    }

    /// Toggle `mark` on the selection, or on the next insertion when the
    /// selection is empty
    pub fn toggle_mark(&mut self, mark: &str) {
        let selection = self.selection();
        if selection.is_empty() {
            let mut marks = self
                .stored_marks
                .take()
                .unwrap_or_else(|| self.marks_before(selection.head));
            if !marks.remove(mark) {
                marks.insert(mark.to_string());
            }
            self.stored_marks = Some(marks);
            return;
        }
        let (from, to) = (selection.from(), selection.to());
        let mark = mark.to_string();
        let step = if self.all_marked(from, to, &mark) {
            EditOperation::RemoveMark { from, to, mark }
        } else {
            EditOperation::AddMark { from, to, mark }
        };
        self.dispatch(
            Transaction::new(self.doc().clone())
                .step(step)
                .with_selection(selection),
        );
    }

    /// Write straight into the replica, as another peer would
    pub fn foreign_edit<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut dyn twinleaf_engine::replica::TextMutator) -> twinleaf_engine::Result<()>,
    {
        let replica = self.session.replica_mut();
        let heads = replica.heads();
        replica.mutate(&heads, edit).unwrap();
    }

    pub fn dispatch(&mut self, tx: Transaction) {
        if tx.doc_changed() {
            self.stored_marks = None;
        }
        self.session.dispatch(tx).unwrap();
    }

    fn delete(&mut self, from: usize, to: usize) {
        let tx = Transaction::new(self.doc().clone())
            .step(EditOperation::delete(from, to))
            .with_selection(Selection::caret(from));
        self.dispatch(tx);
    }

    fn content_bounds(&self) -> (usize, usize) {
        let doc = self.doc();
        let starts = doc.block_starts();
        let blocks = doc.blocks();
        let last = blocks.len() - 1;
        (starts[0], starts[last] + blocks[last].len())
    }

    fn marks_before(&self, pos: usize) -> BTreeSet<String> {
        let doc = self.doc();
        let (index, offset) = doc.resolve(pos).unwrap();
        if offset == 0 {
            return BTreeSet::new();
        }
        doc.blocks()[index]
            .marks_at(offset - 1)
            .cloned()
            .unwrap_or_default()
    }

    fn all_marked(&self, from: usize, to: usize, mark: &str) -> bool {
        let doc = self.doc();
        let blocks = doc.blocks();
        (from..to).all(|pos| {
            let (index, offset) = doc.resolve(pos).unwrap();
            blocks[index]
                .marks_at(offset)
                .is_none_or(|marks| marks.contains(mark))
        })
    }
}

pub fn paragraph(text: &str) -> Vec<Span> {
    block("paragraph", text)
}

pub fn list_item(text: &str) -> Vec<Span> {
    block("list-item", text)
}

fn block(block_type: &str, text: &str) -> Vec<Span> {
    let mut spans = vec![Span::block(block_type)];
    if !text.is_empty() {
        spans.push(Span::text(text));
    }
    spans
}

/// Concatenate block span groups into one document
pub fn doc(blocks: &[Vec<Span>]) -> Vec<Span> {
    blocks.concat()
}
