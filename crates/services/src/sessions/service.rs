use std::collections::BTreeMap;

use form_core::model::{
    Answer, Block, BlockId, BlockKind, FormId, ResponseSnapshot, presentation_order,
};
use form_core::{Validation, ValidationError, validate_answer};

use super::progress::SessionProgress;
use crate::forms_api::SubmissionBody;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Live response-taking state for one form.
///
/// Steps through the form's blocks one at a time. Forward motion is gated on
/// the cached validity of the active block, which is cleared on every move so
/// the next block has to be validated before the respondent can leave it.
#[derive(Debug, Clone, Default)]
pub struct ResponseSession {
    form_id: Option<FormId>,
    blocks: Vec<Block>,
    current: usize,
    /// Highest index the respondent has reached.
    furthest: usize,
    answers: BTreeMap<BlockId, Answer>,
    last_validation: Option<Validation>,
    completed: bool,
}

impl ResponseSession {
    /// An empty, not-started session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate answers and position from a persisted snapshot.
    ///
    /// Blocks are not part of the snapshot; call `initialize` with the same
    /// form id to install them.
    #[must_use]
    pub fn restore(snapshot: ResponseSnapshot) -> Self {
        Self {
            form_id: Some(snapshot.form_id),
            blocks: Vec::new(),
            current: snapshot.current_block_index,
            furthest: snapshot.current_block_index,
            answers: snapshot.responses,
            last_validation: None,
            completed: false,
        }
    }

    /// Load a form's blocks and start from the first one.
    ///
    /// Repeated calls for the already-loaded form are ignored. A session
    /// restored for the same form keeps its answers and position. Returns
    /// true when the session state changed.
    pub fn initialize(&mut self, form_id: FormId, blocks: Vec<Block>) -> bool {
        if self.form_id.as_ref() == Some(&form_id) {
            if !self.blocks.is_empty() {
                tracing::debug!(%form_id, "session already initialized");
                return false;
            }
            self.blocks = presentation_order(blocks);
            let known: Vec<BlockId> = self.blocks.iter().map(|b| b.id().clone()).collect();
            self.answers.retain(|id, _| known.contains(id));
            self.current = self.current.min(self.blocks.len().saturating_sub(1));
            self.furthest = self.current;
            self.last_validation = None;
            tracing::debug!(%form_id, index = self.current, "resumed session");
            return true;
        }

        tracing::debug!(%form_id, blocks = blocks.len(), "initialized session");
        *self = Self {
            form_id: Some(form_id),
            blocks: presentation_order(blocks),
            ..Self::default()
        };
        true
    }

    #[must_use]
    pub fn form_id(&self) -> Option<&FormId> {
        self.form_id.as_ref()
    }

    /// Blocks in presentation order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_block(&self) -> Option<&Block> {
        self.blocks.get(self.current)
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<BlockId, Answer> {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, block_id: &BlockId) -> Option<&Answer> {
        self.answers.get(block_id)
    }

    /// The answer stored for the active block.
    #[must_use]
    pub fn current_answer(&self) -> Option<&Answer> {
        self.current_block()
            .and_then(|block| self.answers.get(block.id()))
    }

    /// True once blocks are loaded.
    #[must_use]
    pub fn is_started(&self) -> bool {
        !self.blocks.is_empty()
    }

    /// True after a successful submission.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Record an answer, then re-validate the active block.
    ///
    /// Answers for unknown blocks or blocks not reached yet are ignored.
    pub fn set_answer(&mut self, block_id: &BlockId, answer: Answer) -> Validation {
        if self.completed {
            tracing::warn!(%block_id, "ignoring answer for a submitted session");
        } else if self.is_reached(block_id) {
            self.answers.insert(block_id.clone(), answer);
        } else {
            tracing::warn!(%block_id, "ignoring answer for a block that has not been reached");
        }
        self.validate_current_block()
    }

    /// Validate the active block against its stored answer and cache the
    /// result for `current_block_valid`.
    pub fn validate_current_block(&mut self) -> Validation {
        let result = match self.current_block() {
            Some(block) => validate_answer(block, self.answers.get(block.id())),
            None => Err(ValidationError::NoCurrentBlock),
        };
        let validation = Validation::from(result);
        self.last_validation = Some(validation.clone());
        validation
    }

    /// Cached validity of the active block; false until validated.
    #[must_use]
    pub fn current_block_valid(&self) -> bool {
        self.last_validation
            .as_ref()
            .is_some_and(|validation| validation.valid)
    }

    /// Whether the active block has been validated since it became active.
    #[must_use]
    pub fn is_validated(&self) -> bool {
        self.last_validation.is_some()
    }

    #[must_use]
    pub fn validation_message(&self) -> Option<&str> {
        self.last_validation
            .as_ref()
            .and_then(|validation| validation.message.as_deref())
    }

    #[must_use]
    pub fn can_go_next(&self) -> bool {
        !self.completed
            && self.current_block_valid()
            && !self.is_last_block()
            && !self.on_thank_you()
    }

    #[must_use]
    pub fn can_go_previous(&self) -> bool {
        !self.completed && self.current > 0 && !self.on_thank_you()
    }

    /// Advance to the next block. Returns true if the position changed.
    pub fn go_to_next(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.leave_current_block();
        self.current += 1;
        self.furthest = self.furthest.max(self.current);
        tracing::debug!(index = self.current, "moved to next block");
        true
    }

    /// Step back one block. Never requires the departed block to be valid.
    pub fn go_to_previous(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        self.leave_current_block();
        self.current -= 1;
        tracing::debug!(index = self.current, "moved to previous block");
        true
    }

    #[must_use]
    pub fn is_last_block(&self) -> bool {
        !self.blocks.is_empty() && self.current == self.blocks.len() - 1
    }

    /// Fraction of the form reached, `0.0` when no blocks are loaded.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        if self.blocks.is_empty() {
            return 0.0;
        }
        (self.current + 1) as f64 / self.blocks.len() as f64
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress_summary(&self) -> SessionProgress {
        SessionProgress {
            position: if self.blocks.is_empty() { 0 } else { self.current + 1 },
            total: self.blocks.len(),
            fraction: self.progress(),
            is_last: self.is_last_block(),
            is_complete: self.completed,
        }
    }

    /// The persistable part of the session, once a form is loaded.
    #[must_use]
    pub fn snapshot(&self) -> Option<ResponseSnapshot> {
        self.form_id.as_ref().map(|form_id| ResponseSnapshot {
            responses: self.answers.clone(),
            form_id: form_id.clone(),
            current_block_index: self.current,
        })
    }

    /// JSON body the response sink receives, once a form is loaded.
    #[must_use]
    pub fn submission_payload(&self) -> Option<SubmissionBody> {
        self.form_id
            .as_ref()
            .map(|_| SubmissionBody::from_answers(&self.answers))
    }

    /// Close the session after a successful submit, landing on the
    /// thankYou block when one follows the active block.
    pub(crate) fn mark_complete(&mut self) {
        let thank_you = self
            .blocks
            .iter()
            .skip(self.current + 1)
            .position(Block::is_thank_you);
        if let Some(offset) = thank_you {
            self.leave_current_block();
            self.current += offset + 1;
            self.furthest = self.furthest.max(self.current);
        }
        self.completed = true;
    }

    fn on_thank_you(&self) -> bool {
        self.current_block().is_some_and(Block::is_thank_you)
    }

    fn is_reached(&self, block_id: &BlockId) -> bool {
        self.blocks
            .iter()
            .take(self.furthest.max(self.current) + 1)
            .any(|block| block.id() == block_id)
    }

    /// Reset validity and drop a stored file that exceeds the block's limit.
    fn leave_current_block(&mut self) {
        self.last_validation = None;
        let Some(block) = self.blocks.get(self.current) else {
            return;
        };
        if block.kind() != BlockKind::FileUpload {
            return;
        }
        let Some(max_bytes) = block.max_file_size_bytes() else {
            return;
        };
        let oversize = self
            .answers
            .get(block.id())
            .and_then(Answer::file_handle)
            .is_some_and(|file| file.size > max_bytes);
        if oversize {
            tracing::debug!(block_id = %block.id(), "clearing oversize file on departure");
            self.answers
                .insert(block.id().clone(), Answer::cleared_file());
        }
    }
}
