use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use form_core::model::{
    Answer, BlockDraft, BlockId, BlockKind, FormDefinition, FormId, SpecialRole,
};
use services::{FormSource, FormsApiError, ResponseFlowError, ResponseFlowService, ResponseSink};
use storage::repository::{InMemoryRepository, SnapshotRepository};

struct FixedForms {
    form: FormDefinition,
}

#[async_trait]
impl FormSource for FixedForms {
    async fn fetch_form(&self, form_id: &FormId) -> Result<FormDefinition, FormsApiError> {
        if form_id == self.form.id() {
            Ok(self.form.clone())
        } else {
            Err(FormsApiError::NotFound(form_id.clone()))
        }
    }
}

#[derive(Default)]
struct RecordingSink {
    fail: Mutex<bool>,
    received: Mutex<Vec<BTreeMap<BlockId, Answer>>>,
}

impl RecordingSink {
    fn failing() -> Self {
        Self {
            fail: Mutex::new(true),
            received: Mutex::default(),
        }
    }

    fn recover(&self) {
        *self.fail.lock().unwrap() = false;
    }
}

#[async_trait]
impl ResponseSink for RecordingSink {
    async fn submit_responses(
        &self,
        _form_id: &FormId,
        responses: &BTreeMap<BlockId, Answer>,
    ) -> Result<(), FormsApiError> {
        if *self.fail.lock().unwrap() {
            return Err(FormsApiError::HttpStatus(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        self.received.lock().unwrap().push(responses.clone());
        Ok(())
    }
}

fn signup_form() -> FormDefinition {
    let blocks = vec![
        BlockDraft::new("thanks", BlockKind::Statement, "Thanks!")
            .role(SpecialRole::ThankYou)
            .validate()
            .unwrap(),
        BlockDraft::new("welcome", BlockKind::Statement, "Hi")
            .role(SpecialRole::Welcome)
            .validate()
            .unwrap(),
        BlockDraft::new("email", BlockKind::Email, "Your email")
            .required(true)
            .validate()
            .unwrap(),
        BlockDraft::new("age", BlockKind::Number, "Your age")
            .bounds(Some(18.0), None)
            .validate()
            .unwrap(),
    ];
    FormDefinition::new(FormId::new("signup"), "Signup", blocks).unwrap()
}

fn flow(sink: Arc<RecordingSink>, repo: InMemoryRepository) -> ResponseFlowService {
    ResponseFlowService::new(
        Arc::new(FixedForms {
            form: signup_form(),
        }),
        sink,
        Arc::new(repo),
    )
}

#[tokio::test]
async fn walks_form_and_submits_answers() {
    let sink = Arc::new(RecordingSink::default());
    let repo = InMemoryRepository::new();
    let flow = flow(Arc::clone(&sink), repo.clone());
    let form_id = FormId::new("signup");

    let mut session = flow.start(&form_id).await.unwrap();
    assert_eq!(session.current_block().unwrap().id().as_str(), "welcome");
    assert!(session.blocks().last().unwrap().is_thank_you());

    assert!(flow.next(&mut session).await.unwrap());

    // Required email blocks the way forward.
    assert!(!flow.next(&mut session).await.unwrap());
    assert_eq!(session.validation_message(), Some("This field is required."));

    let validation = flow
        .set_answer(&mut session, &BlockId::new("email"), Answer::text("a@b.co"))
        .await
        .unwrap();
    assert!(validation.valid);
    assert!(flow.next(&mut session).await.unwrap());

    flow.set_answer(&mut session, &BlockId::new("age"), Answer::number("30"))
        .await
        .unwrap();
    assert!(session.can_go_next());

    let saved = repo.load_snapshot(&form_id).await.unwrap().unwrap();
    assert_eq!(saved.current_block_index, 2);
    assert_eq!(saved.responses.len(), 2);

    flow.submit(&mut session).await.unwrap();
    assert!(session.is_complete());
    assert_eq!(session.current_block().unwrap().id().as_str(), "thanks");
    assert_eq!(session.progress_summary().percent(), 100);
    assert!(!flow.next(&mut session).await.unwrap());
    assert!(repo.load_snapshot(&form_id).await.unwrap().is_none());

    let received = sink.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(
        received[0].get(&BlockId::new("email")),
        Some(&Answer::text("a@b.co"))
    );
    drop(received);

    assert!(matches!(
        flow.submit(&mut session).await,
        Err(ResponseFlowError::AlreadySubmitted)
    ));
}

#[tokio::test]
async fn resumes_from_saved_snapshot() {
    let sink = Arc::new(RecordingSink::default());
    let repo = InMemoryRepository::new();
    let form_id = FormId::new("signup");

    {
        let flow = flow(Arc::clone(&sink), repo.clone());
        let mut session = flow.start(&form_id).await.unwrap();
        flow.next(&mut session).await.unwrap();
        flow.set_answer(&mut session, &BlockId::new("email"), Answer::text("a@b.co"))
            .await
            .unwrap();
        flow.next(&mut session).await.unwrap();
    }

    let flow = flow(sink, repo);
    let session = flow.start(&form_id).await.unwrap();
    assert_eq!(session.current_index(), 2);
    assert_eq!(session.current_block().unwrap().id().as_str(), "age");
    assert_eq!(
        session.answer(&BlockId::new("email")),
        Some(&Answer::text("a@b.co"))
    );
    assert!(!session.is_validated());
}

#[tokio::test]
async fn failed_submission_keeps_session_for_retry() {
    let sink = Arc::new(RecordingSink::failing());
    let repo = InMemoryRepository::new();
    let flow = flow(Arc::clone(&sink), repo.clone());
    let form_id = FormId::new("signup");

    let mut session = flow.start(&form_id).await.unwrap();
    flow.next(&mut session).await.unwrap();
    flow.set_answer(&mut session, &BlockId::new("email"), Answer::text("a@b.co"))
        .await
        .unwrap();

    let err = flow.submit(&mut session).await.unwrap_err();
    assert!(matches!(err, ResponseFlowError::SubmissionFailed(_)));
    assert!(!session.is_complete());
    assert_eq!(session.current_index(), 1);
    assert!(repo.load_snapshot(&form_id).await.unwrap().is_some());

    sink.recover();
    flow.submit(&mut session).await.unwrap();
    assert!(session.is_complete());
}

#[tokio::test]
async fn unknown_form_surfaces_fetch_error() {
    let flow = flow(Arc::new(RecordingSink::default()), InMemoryRepository::new());
    let err = flow.start(&FormId::new("missing")).await.unwrap_err();
    assert!(matches!(
        err,
        ResponseFlowError::Form(FormsApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn previous_steps_back_and_persists() {
    let repo = InMemoryRepository::new();
    let flow = flow(Arc::new(RecordingSink::default()), repo.clone());
    let form_id = FormId::new("signup");

    let mut session = flow.start(&form_id).await.unwrap();
    assert!(!flow.previous(&mut session).await.unwrap());

    flow.next(&mut session).await.unwrap();
    assert!(flow.previous(&mut session).await.unwrap());
    assert_eq!(session.current_index(), 0);

    let saved = repo.load_snapshot(&form_id).await.unwrap().unwrap();
    assert_eq!(saved.current_block_index, 0);
}

#[tokio::test]
async fn submit_rejects_out_of_range_last_answer() {
    let sink = Arc::new(RecordingSink::default());
    let repo = InMemoryRepository::new();
    let flow = flow(Arc::clone(&sink), repo);
    let form_id = FormId::new("signup");

    let mut session = flow.start(&form_id).await.unwrap();
    flow.next(&mut session).await.unwrap();
    flow.set_answer(&mut session, &BlockId::new("email"), Answer::text("a@b.co"))
        .await
        .unwrap();
    flow.next(&mut session).await.unwrap();
    flow.set_answer(&mut session, &BlockId::new("age"), Answer::number("10"))
        .await
        .unwrap();

    let err = flow.submit(&mut session).await.unwrap_err();
    match err {
        ResponseFlowError::Invalid(validation) => assert_eq!(
            validation.message.as_deref(),
            Some("Please enter a number greater than or equal to 18.")
        ),
        other => panic!("unexpected error: {other}"),
    }
    assert!(sink.received.lock().unwrap().is_empty());
    assert!(!session.is_complete());
    assert_eq!(session.current_block().unwrap().id().as_str(), "age");

    flow.set_answer(&mut session, &BlockId::new("age"), Answer::number("18"))
        .await
        .unwrap();
    flow.submit(&mut session).await.unwrap();
    assert_eq!(sink.received.lock().unwrap().len(), 1);
    assert!(session.current_block().unwrap().is_thank_you());
}

#[tokio::test]
async fn submit_rejects_empty_required_answer() {
    let sink = Arc::new(RecordingSink::default());
    let repo = InMemoryRepository::new();
    let flow = flow(Arc::clone(&sink), repo.clone());
    let form_id = FormId::new("signup");

    let mut session = flow.start(&form_id).await.unwrap();
    flow.next(&mut session).await.unwrap();

    let err = flow.submit(&mut session).await.unwrap_err();
    assert!(matches!(err, ResponseFlowError::Invalid(_)));
    assert_eq!(session.validation_message(), Some("This field is required."));
    assert!(sink.received.lock().unwrap().is_empty());
    assert!(repo.load_snapshot(&form_id).await.unwrap().is_some());
}
