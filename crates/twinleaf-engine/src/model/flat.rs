//! Character-level working copy of a span list.
//!
//! Spans are convenient to exchange but awkward to edit in place: a splice in
//! the middle of a text span has to split it, a mark change has to split it
//! twice. `FlatText` expands the spans into one element per flat unit so
//! patches can be applied by index, then folds them back with [`FlatText::to_spans`].

use std::ops::Range;

use crate::error::{Result, SyncError};
use crate::model::span::{MarkMap, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatElement {
    Char { ch: char, marks: MarkMap },
    Block { block_type: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatText {
    elements: Vec<FlatElement>,
}

impl FlatText {
    pub fn from_spans(spans: &[Span]) -> Self {
        let mut elements = Vec::new();
        for span in spans {
            match span {
                Span::Text { value, marks } => {
                    elements.extend(value.chars().map(|ch| FlatElement::Char {
                        ch,
                        marks: marks.clone(),
                    }));
                }
                Span::Block { block_type } => elements.push(FlatElement::Block {
                    block_type: block_type.clone(),
                }),
            }
        }
        Self { elements }
    }

    /// Fold the elements back into spans, merging neighbouring characters
    /// whose mark maps are identical.
    pub fn to_spans(&self) -> Vec<Span> {
        let mut spans: Vec<Span> = Vec::new();
        for element in &self.elements {
            match element {
                FlatElement::Block { block_type } => spans.push(Span::block(block_type.clone())),
                FlatElement::Char { ch, marks } => match spans.last_mut() {
                    Some(Span::Text {
                        value,
                        marks: last_marks,
                    }) if last_marks == marks => value.push(*ch),
                    _ => spans.push(Span::Text {
                        value: ch.to_string(),
                        marks: marks.clone(),
                    }),
                },
            }
        }
        spans
    }

    pub fn element(&self, index: usize) -> Option<&FlatElement> {
        self.elements.get(index)
    }

    pub fn starts_with_block(&self) -> bool {
        matches!(self.elements.first(), Some(FlatElement::Block { .. }))
    }

    /// Block types with their content lengths, in document order.
    ///
    /// Fails when the text does not open with a block marker.
    pub fn blocks(&self) -> Result<Vec<(&str, usize)>> {
        let mut blocks: Vec<(&str, usize)> = Vec::new();
        for element in &self.elements {
            match element {
                FlatElement::Block { block_type } => blocks.push((block_type.as_str(), 0)),
                FlatElement::Char { .. } => match blocks.last_mut() {
                    Some((_, len)) => *len += 1,
                    None => {
                        return Err(SyncError::InvalidDocumentShape(
                            "document must start with a block".to_string(),
                        ));
                    }
                },
            }
        }
        Ok(blocks)
    }

    pub fn insert_text(&mut self, index: usize, text: &str, marks: &MarkMap) -> Result<()> {
        self.check_index(index)?;
        let inserted = text.chars().map(|ch| FlatElement::Char {
            ch,
            marks: marks.clone(),
        });
        self.elements.splice(index..index, inserted);
        Ok(())
    }

    pub fn delete(&mut self, index: usize, length: usize) -> Result<()> {
        self.check_range(index..index + length)?;
        self.elements.drain(index..index + length);
        Ok(())
    }

    pub fn insert_block(&mut self, index: usize, block_type: &str) -> Result<()> {
        self.check_index(index)?;
        self.elements.insert(
            index,
            FlatElement::Block {
                block_type: block_type.to_string(),
            },
        );
        Ok(())
    }

    pub fn set_block_type(&mut self, index: usize, new_type: &str) -> Result<()> {
        match self.elements.get_mut(index) {
            Some(FlatElement::Block { block_type }) => {
                *block_type = new_type.to_string();
                Ok(())
            }
            _ => Err(SyncError::NoBlockAt { index }),
        }
    }

    /// Turn `name` on (`value == true`) or clear it over every character in
    /// `range`. Block markers in the range are left untouched.
    pub fn set_mark(&mut self, range: Range<usize>, name: &str, value: bool) -> Result<()> {
        self.check_range(range.clone())?;
        for element in &mut self.elements[range] {
            if let FlatElement::Char { marks, .. } = element {
                if value {
                    marks.insert(name.to_string(), Some(true));
                } else {
                    marks.remove(name);
                }
            }
        }
        Ok(())
    }

    /// Marks of the character at `index`; empty for block markers and for
    /// indices past the end.
    pub fn marks_at(&self, index: usize) -> MarkMap {
        match self.elements.get(index) {
            Some(FlatElement::Char { marks, .. }) => marks.clone(),
            _ => MarkMap::new(),
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index > self.elements.len() {
            return Err(SyncError::OutOfRange {
                index,
                len: self.elements.len(),
            });
        }
        Ok(())
    }

    fn check_range(&self, range: Range<usize>) -> Result<()> {
        if range.start > range.end {
            return Err(SyncError::InvalidRange {
                from: range.start,
                to: range.end,
            });
        }
        self.check_index(range.end)
    }
}
