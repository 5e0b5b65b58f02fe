use crate::error::{Result, SyncError};
use crate::model::{BlockNode, InlineRun, Schema, Span, TreeDocument, active_marks};

/// Build the initial view document from a replica snapshot.
///
/// Every block span opens a new block; text spans become runs carrying only
/// the marks that are switched on.
pub fn parse_spans(spans: &[Span], schema: &Schema) -> Result<TreeDocument> {
    let mut blocks: Vec<(String, Vec<InlineRun>)> = Vec::new();
    for span in spans {
        match span {
            Span::Block { block_type } => {
                if block_type.is_empty() {
                    return Err(SyncError::InvalidDocumentShape(format!(
                        "block {} has no type",
                        blocks.len()
                    )));
                }
                blocks.push((block_type.clone(), Vec::new()));
            }
            Span::Text { value, marks } => match blocks.last_mut() {
                Some((_, runs)) => runs.push(InlineRun {
                    text: value.clone(),
                    marks: active_marks(marks),
                }),
                None => {
                    return Err(SyncError::InvalidDocumentShape(
                        "document must start with a block".to_string(),
                    ));
                }
            },
        }
    }
    if blocks.is_empty() {
        return Err(SyncError::InvalidDocumentShape(
            "document has no blocks".to_string(),
        ));
    }

    let blocks = blocks
        .into_iter()
        .map(|(block_type, runs)| BlockNode::with_runs(block_type, runs))
        .collect();
    Ok(TreeDocument::from_blocks(blocks, schema.clone()))
}
