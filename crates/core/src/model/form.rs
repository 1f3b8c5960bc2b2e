use std::collections::HashSet;

use thiserror::Error;

use crate::model::block::{Block, SpecialRole, presentation_order};
use crate::model::ids::{BlockId, FormId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormError {
    #[error("duplicate block id {0}")]
    DuplicateBlock(BlockId),

    #[error("form has more than one {0:?} block")]
    DuplicateRole(SpecialRole),
}

/// A published form as fetched from the definition store.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDefinition {
    id: FormId,
    title: String,
    blocks: Vec<Block>,
}

impl FormDefinition {
    /// Build a form from blocks already sorted by their explicit order.
    ///
    /// # Errors
    ///
    /// Returns `FormError::DuplicateBlock` when two blocks share an id, or
    /// `FormError::DuplicateRole` when more than one welcome or thank-you
    /// block is present.
    pub fn new(id: FormId, title: impl Into<String>, blocks: Vec<Block>) -> Result<Self, FormError> {
        let mut seen = HashSet::with_capacity(blocks.len());
        let mut welcome = 0_usize;
        let mut thank_you = 0_usize;
        for block in &blocks {
            if !seen.insert(block.id().clone()) {
                return Err(FormError::DuplicateBlock(block.id().clone()));
            }
            match block.special_role() {
                Some(SpecialRole::Welcome) => welcome += 1,
                Some(SpecialRole::ThankYou) => thank_you += 1,
                None => {}
            }
        }
        if welcome > 1 {
            return Err(FormError::DuplicateRole(SpecialRole::Welcome));
        }
        if thank_you > 1 {
            return Err(FormError::DuplicateRole(SpecialRole::ThankYou));
        }

        Ok(Self {
            id,
            title: title.into(),
            blocks,
        })
    }

    #[must_use]
    pub fn id(&self) -> &FormId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Blocks in the order a respondent sees them.
    #[must_use]
    pub fn into_presentation_blocks(self) -> Vec<Block> {
        presentation_order(self.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::block::{BlockDraft, BlockKind};

    #[test]
    fn rejects_duplicate_ids() {
        let a = BlockDraft::new("q1", BlockKind::ShortText, "A").validate().unwrap();
        let b = BlockDraft::new("q1", BlockKind::Email, "B").validate().unwrap();
        let err = FormDefinition::new(FormId::new("f"), "Form", vec![a, b]).unwrap_err();
        assert_eq!(err, FormError::DuplicateBlock(BlockId::new("q1")));
    }

    #[test]
    fn rejects_second_thank_you() {
        let blocks = ["t1", "t2"]
            .into_iter()
            .map(|id| {
                BlockDraft::new(id, BlockKind::Statement, "Bye")
                    .role(SpecialRole::ThankYou)
                    .validate()
                    .unwrap()
            })
            .collect();
        let err = FormDefinition::new(FormId::new("f"), "Form", blocks).unwrap_err();
        assert_eq!(err, FormError::DuplicateRole(SpecialRole::ThankYou));
    }
}
