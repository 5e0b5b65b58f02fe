//! The tree-shaped view document.
//!
//! Root children are plain blocks or list wrappers holding list items. Tree
//! positions count one unit per character and one unit per node open or
//! close, so a list item costs two units to enter (list, then item) while a
//! root block costs one.
//!
//! Structural edits never patch the tree in place. The document is flattened
//! into its block sequence, edited there, and rebuilt with
//! [`TreeDocument::from_blocks`], which groups consecutive list items into a
//! single list. Wrapping, unwrapping, absorption into neighbouring lists and
//! splitting a list around a converted item all fall out of that rebuild.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};
use crate::model::ops::{EditOperation, Inline};
use crate::model::schema::Schema;

/// A run of characters sharing one set of active marks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineRun {
    pub text: String,
    pub marks: BTreeSet<String>,
}

impl InlineRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: BTreeSet::new(),
        }
    }

    pub fn marked<'a>(text: impl Into<String>, marks: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            text: text.into(),
            marks: marks.into_iter().map(str::to_string).collect(),
        }
    }

    /// Length in tree units (characters)
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A content block: paragraph, list item, or any other block type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockNode {
    pub block_type: String,
    /// Never empty; an empty block holds one empty placeholder run
    pub children: Vec<InlineRun>,
}

impl BlockNode {
    pub fn new(block_type: impl Into<String>) -> Self {
        Self::with_runs(block_type, Vec::new())
    }

    pub fn with_runs(block_type: impl Into<String>, runs: Vec<InlineRun>) -> Self {
        let mut block = Self {
            block_type: block_type.into(),
            children: runs,
        };
        block.normalize();
        block
    }

    pub fn len(&self) -> usize {
        self.children.iter().map(InlineRun::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn text(&self) -> String {
        self.children.iter().map(|run| run.text.as_str()).collect()
    }

    /// Active marks of the character at `offset`, if there is one
    pub fn marks_at(&self, offset: usize) -> Option<&BTreeSet<String>> {
        let mut start = 0;
        for run in &self.children {
            let len = run.len();
            if offset < start + len {
                return Some(&run.marks);
            }
            start += len;
        }
        None
    }

    fn insert_runs(&mut self, offset: usize, runs: Vec<InlineRun>) {
        let tail = self.split_off(offset);
        self.children.extend(runs);
        self.children.extend(tail);
        self.normalize();
    }

    fn delete(&mut self, range: Range<usize>) {
        let tail = self.split_off(range.end);
        self.split_off(range.start);
        self.children.extend(tail);
        self.normalize();
    }

    fn set_mark(&mut self, range: Range<usize>, mark: &str, on: bool) {
        let tail = self.split_off(range.end);
        let mut middle = self.split_off(range.start);
        for run in &mut middle {
            if on {
                run.marks.insert(mark.to_string());
            } else {
                run.marks.remove(mark);
            }
        }
        self.children.extend(middle);
        self.children.extend(tail);
        self.normalize();
    }

    /// Keep the runs before `offset` and return the rest.
    fn split_off(&mut self, offset: usize) -> Vec<InlineRun> {
        let mut head = Vec::new();
        let mut tail = Vec::new();
        let mut start = 0;
        for run in self.children.drain(..) {
            let len = run.len();
            if start + len <= offset {
                head.push(run);
            } else if start >= offset {
                tail.push(run);
            } else {
                let cut = run
                    .text
                    .char_indices()
                    .nth(offset - start)
                    .map_or(run.text.len(), |(byte, _)| byte);
                head.push(InlineRun {
                    text: run.text[..cut].to_string(),
                    marks: run.marks.clone(),
                });
                tail.push(InlineRun {
                    text: run.text[cut..].to_string(),
                    marks: run.marks,
                });
            }
            start += len;
        }
        self.children = head;
        tail
    }

    fn normalize(&mut self) {
        let mut runs: Vec<InlineRun> = Vec::new();
        for run in self.children.drain(..).filter(|run| !run.is_empty()) {
            match runs.last_mut() {
                Some(last) if last.marks == run.marks => last.text.push_str(&run.text),
                _ => runs.push(run),
            }
        }
        if runs.is_empty() {
            runs.push(InlineRun::default());
        }
        self.children = runs;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeNode {
    Block(BlockNode),
    List { items: Vec<BlockNode> },
}

impl TreeNode {
    /// Tree units covered by this node, open and close included
    pub fn node_size(&self) -> usize {
        match self {
            TreeNode::Block(block) => block.len() + 2,
            TreeNode::List { items } => items.iter().map(|item| item.len() + 2).sum::<usize>() + 2,
        }
    }
}

/// The editable view document.
///
/// Equality compares content only; two documents built with different
/// schemas but identical children are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeDocument {
    pub children: Vec<TreeNode>,
    pub schema: Schema,
}

impl PartialEq for TreeDocument {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children
    }
}

impl Eq for TreeDocument {}

impl TreeDocument {
    /// A document holding one empty paragraph
    pub fn empty(schema: Schema) -> Self {
        let paragraph = BlockNode::new(&schema.paragraph);
        Self::from_blocks(vec![paragraph], schema)
    }

    /// Build a document from its block sequence, wrapping every run of
    /// consecutive list items in one list.
    pub fn from_blocks(blocks: Vec<BlockNode>, schema: Schema) -> Self {
        let mut children: Vec<TreeNode> = Vec::new();
        for block in blocks {
            if schema.is_list_item(&block.block_type) {
                if let Some(TreeNode::List { items }) = children.last_mut() {
                    items.push(block);
                } else {
                    children.push(TreeNode::List { items: vec![block] });
                }
            } else {
                children.push(TreeNode::Block(block));
            }
        }
        Self { children, schema }
    }

    pub fn blocks(&self) -> Vec<&BlockNode> {
        self.children
            .iter()
            .flat_map(|node| match node {
                TreeNode::Block(block) => std::slice::from_ref(block),
                TreeNode::List { items } => items.as_slice(),
            })
            .collect()
    }

    pub fn into_blocks(self) -> Vec<BlockNode> {
        self.children
            .into_iter()
            .flat_map(|node| match node {
                TreeNode::Block(block) => vec![block],
                TreeNode::List { items } => items,
            })
            .collect()
    }

    /// Size of the document content in tree units
    pub fn content_size(&self) -> usize {
        self.children.iter().map(TreeNode::node_size).sum()
    }

    /// Tree position of the first content unit of every block
    pub fn block_starts(&self) -> Vec<usize> {
        let mut starts = Vec::new();
        let mut pos = 0;
        for node in &self.children {
            match node {
                TreeNode::Block(block) => {
                    starts.push(pos + 1);
                    pos += block.len() + 2;
                }
                TreeNode::List { items } => {
                    pos += 1;
                    for item in items {
                        starts.push(pos + 1);
                        pos += item.len() + 2;
                    }
                    pos += 1;
                }
            }
        }
        starts
    }

    /// Resolve a tree position into `(block index, offset in block)`.
    ///
    /// Positions between blocks resolve to the start of the following block;
    /// positions after the last block's content resolve to its end.
    pub fn resolve(&self, pos: usize) -> Result<(usize, usize)> {
        let size = self.content_size();
        if pos > size {
            return Err(SyncError::OutOfRange {
                index: pos,
                len: size,
            });
        }
        let blocks = self.blocks();
        let starts = self.block_starts();
        for (index, (block, start)) in blocks.iter().zip(&starts).enumerate() {
            if pos <= start + block.len() {
                return Ok((index, pos.saturating_sub(*start)));
            }
        }
        match blocks.last() {
            Some(last) => Ok((blocks.len() - 1, last.len())),
            None => Err(SyncError::InvalidDocumentShape(
                "document has no blocks".to_string(),
            )),
        }
    }

    /// Apply one edit operation, returning the edited document.
    pub fn apply(&self, operation: &EditOperation) -> Result<TreeDocument> {
        let schema = self.schema.clone();
        match operation {
            EditOperation::ReplaceRange { from, to, content } => {
                check_range(*from, *to)?;
                let runs = text_runs(content)?;
                let (start_block, start_offset) = self.resolve(*from)?;
                let (end_block, end_offset) = self.resolve(*to)?;
                let mut blocks = self.clone().into_blocks();
                if start_block == end_block {
                    blocks[start_block].delete(start_offset..end_offset);
                } else {
                    let tail = blocks[end_block].split_off(end_offset);
                    let target = &mut blocks[start_block];
                    target.split_off(start_offset);
                    target.children.extend(tail);
                    target.normalize();
                    blocks.drain(start_block + 1..=end_block);
                }
                blocks[start_block].insert_runs(start_offset, runs);
                Ok(Self::from_blocks(blocks, schema))
            }
            EditOperation::AddMark { from, to, mark } => self.mark_range(*from, *to, mark, true),
            EditOperation::RemoveMark { from, to, mark } => {
                self.mark_range(*from, *to, mark, false)
            }
            EditOperation::SplitBlock {
                at,
                depth,
                block_type,
            } => {
                let expected = schema.split_depth(block_type);
                if *depth != expected {
                    return Err(SyncError::InvalidDocumentShape(format!(
                        "splitting off a {block_type} block needs depth {expected}, got {depth}"
                    )));
                }
                let (index, offset) = self.resolve(*at)?;
                let mut blocks = self.clone().into_blocks();
                let tail = blocks[index].split_off(offset);
                blocks[index].normalize();
                blocks.insert(index + 1, BlockNode::with_runs(block_type, tail));
                Ok(Self::from_blocks(blocks, schema))
            }
            EditOperation::UpdateBlockType { at, block_type } => {
                if block_type.is_empty() {
                    return Err(SyncError::InvalidDocumentShape(
                        "block type must not be empty".to_string(),
                    ));
                }
                let (index, _) = self.resolve(*at)?;
                let mut blocks = self.clone().into_blocks();
                blocks[index].block_type = block_type.clone();
                Ok(Self::from_blocks(blocks, schema))
            }
        }
    }

    fn mark_range(&self, from: usize, to: usize, mark: &str, on: bool) -> Result<TreeDocument> {
        check_range(from, to)?;
        let (start_block, start_offset) = self.resolve(from)?;
        let (end_block, end_offset) = self.resolve(to)?;
        let mut blocks = self.clone().into_blocks();
        for (index, block) in blocks
            .iter_mut()
            .enumerate()
            .take(end_block + 1)
            .skip(start_block)
        {
            let start = if index == start_block {
                start_offset
            } else {
                0
            };
            let end = if index == end_block {
                end_offset
            } else {
                block.len()
            };
            block.set_mark(start..end, mark, on);
        }
        Ok(Self::from_blocks(blocks, self.schema.clone()))
    }
}

fn check_range(from: usize, to: usize) -> Result<()> {
    if from > to {
        return Err(SyncError::InvalidRange { from, to });
    }
    Ok(())
}

fn text_runs(content: &[Inline]) -> Result<Vec<InlineRun>> {
    content
        .iter()
        .map(|inline| match inline {
            Inline::Text(run) => Ok(run.clone()),
            Inline::Atom { node_type } => Err(SyncError::UnsupportedOperation(format!(
                "inserted content of type {node_type} is not plain text"
            ))),
        })
        .collect()
}

/// Indented outline, one block per line, used for snapshots and logging.
impl fmt::Display for TreeDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.children {
            match node {
                TreeNode::Block(block) => writeln!(f, "{}", BlockLine(block))?,
                TreeNode::List { items } => {
                    writeln!(f, "list")?;
                    for item in items {
                        writeln!(f, "  {}", BlockLine(item))?;
                    }
                }
            }
        }
        Ok(())
    }
}

struct BlockLine<'a>(&'a BlockNode);

impl fmt::Display for BlockLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.block_type)?;
        for run in &self.0.children {
            write!(f, " {:?}", run.text)?;
            if !run.marks.is_empty() {
                let marks: Vec<&str> = run.marks.iter().map(String::as_str).collect();
                write!(f, "[{}]", marks.join(","))?;
            }
        }
        Ok(())
    }
}
