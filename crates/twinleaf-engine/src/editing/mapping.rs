//! Position translation between tree positions and flat indices.
//!
//! Both directions read the same per-block layout, so they can never drift
//! apart. For every content block the layout records where its marker sits
//! in the flat document, how many characters it holds, and where its content
//! starts in the tree. Entering a block costs these tree units:
//!
//! | situation                              | units |
//! |----------------------------------------|-------|
//! | first block, plain                     | 1     |
//! | first block, list item                 | 2     |
//! | same nesting as the previous block     | 2     |
//! | different nesting from previous block  | 3     |
//!
//! A mapper describes one snapshot. Build a new one after every structural
//! change instead of adjusting an old one.

use crate::error::{Result, SyncError};
use crate::model::{FlatText, Schema, Span, TreeDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockLayout {
    /// Flat index of the block marker
    marker: usize,
    /// Characters in the block
    len: usize,
    /// Tree position of the first content unit
    tree_start: usize,
    list_item: bool,
}

impl BlockLayout {
    fn flat_end(&self) -> usize {
        self.marker + 1 + self.len
    }

    fn tree_end(&self) -> usize {
        self.tree_start + self.len
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionMapper {
    blocks: Vec<BlockLayout>,
}

impl PositionMapper {
    pub fn from_spans(spans: &[Span], schema: &Schema) -> Result<Self> {
        Self::from_flat(&FlatText::from_spans(spans), schema)
    }

    pub fn from_flat(flat: &FlatText, schema: &Schema) -> Result<Self> {
        let blocks = flat.blocks()?;
        Self::from_layout(
            blocks
                .into_iter()
                .map(|(block_type, len)| (schema.is_list_item(block_type), len)),
        )
    }

    pub fn from_tree(doc: &TreeDocument) -> Result<Self> {
        let schema = &doc.schema;
        Self::from_layout(
            doc.blocks()
                .into_iter()
                .map(|node| (schema.is_list_item(&node.block_type), node.len())),
        )
    }

    /// Lay out `(is list item, content length)` pairs in document order
    fn from_layout(blocks: impl IntoIterator<Item = (bool, usize)>) -> Result<Self> {
        let mut layout: Vec<BlockLayout> = Vec::new();
        let mut marker = 0;
        for (list_item, len) in blocks {
            let tree_start = match layout.last() {
                None if list_item => 2,
                None => 1,
                Some(prev) if prev.list_item == list_item => prev.tree_end() + 2,
                Some(prev) => prev.tree_end() + 3,
            };
            layout.push(BlockLayout {
                marker,
                len,
                tree_start,
                list_item,
            });
            marker += 1 + len;
        }
        if layout.is_empty() {
            return Err(SyncError::InvalidDocumentShape(
                "document has no blocks".to_string(),
            ));
        }
        Ok(Self { blocks: layout })
    }

    /// Total flat length of the mapped snapshot
    pub fn flat_len(&self) -> usize {
        self.last().flat_end()
    }

    /// Flat index for a tree position.
    ///
    /// Positions on block boundaries map to the first content index of the
    /// block they open; positions after the last block map to its end.
    pub fn tree_to_flat(&self, pos: usize) -> usize {
        let block = self.block_for_tree(pos);
        block.marker + 1 + pos.saturating_sub(block.tree_start).min(block.len)
    }

    /// Tree position for a flat index.
    ///
    /// A marker index lands at the end of the preceding block, which is the
    /// insertion point in front of that marker. Index 0 lands at the start
    /// of the first block.
    pub fn flat_to_tree(&self, index: usize) -> usize {
        let block = self
            .blocks
            .iter()
            .find(|block| index <= block.flat_end())
            .unwrap_or_else(|| self.last());
        block.tree_start + index.saturating_sub(block.marker + 1).min(block.len)
    }

    /// Flat index of the marker of the block holding tree position `pos`
    pub fn marker_for(&self, pos: usize) -> usize {
        self.block_for_tree(pos).marker
    }

    fn block_for_tree(&self, pos: usize) -> &BlockLayout {
        self.blocks
            .iter()
            .find(|block| pos <= block.tree_end())
            .unwrap_or_else(|| self.last())
    }

    fn last(&self) -> &BlockLayout {
        // `from_layout` refuses to build an empty mapper.
        &self.blocks[self.blocks.len() - 1]
    }
}
