use std::sync::Arc;

use form_core::Validation;
use form_core::model::{Answer, BlockId, FormId};
use storage::repository::SnapshotRepository;

use super::service::ResponseSession;
use crate::error::ResponseFlowError;
use crate::forms_api::{FormSource, ResponseSink};

/// Orchestrates a response session with the form store, the response sink,
/// and snapshot persistence.
///
/// The caller owns the `ResponseSession`; every mutating call saves a fresh
/// snapshot so the respondent can pick up after a reload.
#[derive(Clone)]
pub struct ResponseFlowService {
    forms: Arc<dyn FormSource>,
    sink: Arc<dyn ResponseSink>,
    snapshots: Arc<dyn SnapshotRepository>,
}

impl ResponseFlowService {
    #[must_use]
    pub fn new(
        forms: Arc<dyn FormSource>,
        sink: Arc<dyn ResponseSink>,
        snapshots: Arc<dyn SnapshotRepository>,
    ) -> Self {
        Self {
            forms,
            sink,
            snapshots,
        }
    }

    /// Fetch the form and open a session, resuming a saved snapshot if any.
    ///
    /// # Errors
    ///
    /// Returns `ResponseFlowError::Form` if the form cannot be fetched and
    /// `ResponseFlowError::Storage` if the snapshot cannot be read.
    pub async fn start(&self, form_id: &FormId) -> Result<ResponseSession, ResponseFlowError> {
        let form = self
            .forms
            .fetch_form(form_id)
            .await
            .map_err(ResponseFlowError::Form)?;

        let mut session = match self.snapshots.load_snapshot(form_id).await? {
            Some(snapshot) => {
                tracing::info!(%form_id, index = snapshot.current_block_index, "resuming saved responses");
                ResponseSession::restore(snapshot)
            }
            None => ResponseSession::new(),
        };
        session.initialize(form_id.clone(), form.into_presentation_blocks());
        Ok(session)
    }

    /// Record an answer and persist the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ResponseFlowError::Storage` if the snapshot cannot be saved.
    /// The answer is kept in the session either way.
    pub async fn set_answer(
        &self,
        session: &mut ResponseSession,
        block_id: &BlockId,
        answer: Answer,
    ) -> Result<Validation, ResponseFlowError> {
        let validation = session.set_answer(block_id, answer);
        self.persist(session).await?;
        Ok(validation)
    }

    /// Validate the active block and advance when it passes.
    ///
    /// # Errors
    ///
    /// Returns `ResponseFlowError::Storage` if the snapshot cannot be saved.
    pub async fn next(&self, session: &mut ResponseSession) -> Result<bool, ResponseFlowError> {
        session.validate_current_block();
        if !session.go_to_next() {
            return Ok(false);
        }
        self.persist(session).await?;
        Ok(true)
    }

    /// Step back one block.
    ///
    /// # Errors
    ///
    /// Returns `ResponseFlowError::Storage` if the snapshot cannot be saved.
    pub async fn previous(&self, session: &mut ResponseSession) -> Result<bool, ResponseFlowError> {
        if !session.go_to_previous() {
            return Ok(false);
        }
        self.persist(session).await?;
        Ok(true)
    }

    /// Send all answers to the response sink.
    ///
    /// The active block is validated first; nothing is sent while it fails.
    /// On sink failure the session is left untouched so the respondent can
    /// retry. On success the session is marked complete, moved onto the
    /// thankYou block if there is one, and its snapshot removed.
    ///
    /// # Errors
    ///
    /// Returns `ResponseFlowError::NotStarted` when no form is loaded,
    /// `ResponseFlowError::AlreadySubmitted` for a completed session,
    /// `ResponseFlowError::Invalid` when the active block fails validation,
    /// `ResponseFlowError::SubmissionFailed` when the sink rejects the call, and
    /// `ResponseFlowError::Storage` if the snapshot cannot be cleared.
    pub async fn submit(&self, session: &mut ResponseSession) -> Result<(), ResponseFlowError> {
        if session.is_complete() {
            return Err(ResponseFlowError::AlreadySubmitted);
        }
        let form_id = session
            .form_id()
            .cloned()
            .ok_or(ResponseFlowError::NotStarted)?;

        let validation = session.validate_current_block();
        if !validation.valid {
            tracing::debug!(%form_id, "submit blocked by invalid answer");
            return Err(ResponseFlowError::Invalid(validation));
        }

        if let Err(err) = self
            .sink
            .submit_responses(&form_id, session.answers())
            .await
        {
            tracing::warn!(%form_id, error = %err, "failed to submit responses");
            return Err(ResponseFlowError::SubmissionFailed(err));
        }

        session.mark_complete();
        tracing::info!(%form_id, answers = session.answers().len(), "submitted responses");
        self.snapshots.clear_snapshot(&form_id).await?;
        Ok(())
    }

    async fn persist(&self, session: &ResponseSession) -> Result<(), ResponseFlowError> {
        // Submitted sessions keep no snapshot.
        if session.is_complete() {
            return Ok(());
        }
        if let Some(snapshot) = session.snapshot() {
            self.snapshots.save_snapshot(&snapshot).await?;
        }
        Ok(())
    }
}
