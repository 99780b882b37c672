//! End-to-end scenarios for SubmissionCoordinator.
//!
//! Most scenarios use an in-memory gateway that counts calls; the last one
//! runs the real HTTP gateway against wiremock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use parcel_client::{ClientConfig, Gateway, ParcelClient, PollReply, SubmitReply, TransportFailure};
use parcel_core::{
    AttachmentContent, AttachmentSource, DeclarationForm, DeclarationPayload, SessionToken,
    SubmissionOutcome, TrackingNumber, ValidationRules, Validators,
};
use parcel_state::{
    CoordinatorError, Phase, PollPolicy, SubmissionContext, SubmissionCoordinator,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ─── Test gateway ────────────────────────────────────────────────────

struct ScriptedGateway {
    submit_reply: SubmitReply,
    poll_replies: Mutex<VecDeque<PollReply>>,
    submits: AtomicUsize,
    polls: AtomicUsize,
    submitted: Mutex<Option<DeclarationPayload>>,
    submitted_at: Mutex<Option<Instant>>,
    polled_at: Mutex<Vec<Instant>>,
}

impl ScriptedGateway {
    fn new(submit_reply: SubmitReply, poll_replies: Vec<PollReply>) -> Arc<Self> {
        Arc::new(Self {
            submit_reply,
            poll_replies: Mutex::new(poll_replies.into()),
            submits: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            submitted: Mutex::new(None),
            submitted_at: Mutex::new(None),
            polled_at: Mutex::new(Vec::new()),
        })
    }

    fn submits(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn submit(&self, payload: &DeclarationPayload) -> SubmitReply {
        self.submits.fetch_add(1, Ordering::SeqCst);
        *self.submitted.lock().unwrap() = Some(payload.clone());
        *self.submitted_at.lock().unwrap() = Some(Instant::now());
        self.submit_reply.clone()
    }

    async fn poll(&self, _tracking_number: &TrackingNumber) -> PollReply {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.polled_at.lock().unwrap().push(Instant::now());
        self.poll_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default()
    }
}

fn accepted() -> SubmitReply {
    SubmitReply::Accepted {
        tracking_number: Some("ABC12345".into()),
        message: None,
    }
}

fn confirmed() -> PollReply {
    PollReply {
        exists: true,
        confirmed: true,
        error: None,
    }
}

fn not_yet() -> PollReply {
    PollReply {
        exists: true,
        confirmed: false,
        error: None,
    }
}

fn context(session: Option<SessionToken>) -> SubmissionContext {
    SubmissionContext {
        validators: Arc::new(Validators::new(ValidationRules::default()).unwrap()),
        poll: PollPolicy::new(5, Duration::from_millis(5)),
        session,
    }
}

fn form() -> DeclarationForm {
    DeclarationForm {
        tracking_number: "abc12345".into(),
        phone: "0123456789".into(),
        item_description: "Two cotton shirts".into(),
        quantity: "2".into(),
        price: "59.90".into(),
        collection_point: "Gadong".into(),
        item_category: "Clothing".into(),
        attachments: vec![],
    }
}

fn coordinator(gateway: &Arc<ScriptedGateway>) -> SubmissionCoordinator {
    SubmissionCoordinator::new(gateway.clone(), context(None))
}

fn phases(c: &SubmissionCoordinator) -> Vec<Phase> {
    c.transitions().iter().map(|t| t.to).collect()
}

// ─── Poll timing ─────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn first_poll_is_immediate_then_fixed_interval_between_polls() {
    let interval = Duration::from_millis(100);
    let gateway = ScriptedGateway::new(accepted(), vec![]);
    let mut ctx = context(None);
    ctx.poll = PollPolicy::new(5, interval);
    let mut c = SubmissionCoordinator::new(gateway.clone(), ctx);

    let started = Instant::now();
    let outcome = c.run(&form()).await.unwrap();

    assert_eq!(outcome, SubmissionOutcome::Pending(tracking("ABC12345")));
    let submitted_at = (*gateway.submitted_at.lock().unwrap()).expect("submitted");
    let polled_at = gateway.polled_at.lock().unwrap().clone();
    assert_eq!(polled_at.len(), 5);
    assert_eq!(polled_at[0], submitted_at);
    for pair in polled_at.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(
            gap >= interval && gap < interval + Duration::from_millis(1),
            "gap between polls was {gap:?}"
        );
    }
    // Four gaps, no trailing sleep after the last poll.
    assert!(started.elapsed() < interval * 4 + Duration::from_millis(5));
}

// ─── Scenario A: accepted then confirmed ─────────────────────────────

#[tokio::test]
async fn accepted_and_confirmed_on_second_poll() {
    let gateway = ScriptedGateway::new(accepted(), vec![not_yet(), confirmed()]);
    let mut c = coordinator(&gateway);

    let outcome = c.run(&form()).await.unwrap();

    assert_eq!(
        outcome,
        SubmissionOutcome::Confirmed(tracking("ABC12345"))
    );
    assert_eq!(gateway.submits(), 1);
    assert_eq!(gateway.polls(), 2);
    assert_eq!(
        phases(&c),
        vec![
            Phase::Validating,
            Phase::Encoding,
            Phase::Submitting,
            Phase::Verifying,
            Phase::Confirmed
        ]
    );
    assert_eq!(c.phase(), Phase::Confirmed);
    assert_eq!(c.outcome(), Some(&outcome));
}

// ─── Scenario B: transport failure, never confirmed ──────────────────

#[tokio::test]
async fn transport_failure_polls_to_bound_then_pending() {
    let gateway = ScriptedGateway::new(
        SubmitReply::Unreachable(TransportFailure::Timeout),
        vec![],
    );
    let mut c = coordinator(&gateway);

    let outcome = c.run(&form()).await.unwrap();

    assert_eq!(outcome, SubmissionOutcome::Pending(tracking("ABC12345")));
    assert_eq!(gateway.submits(), 1);
    assert_eq!(gateway.polls(), 5);
    assert!(phases(&c).contains(&Phase::Verifying));
}

#[tokio::test]
async fn transport_failure_can_still_confirm() {
    let gateway = ScriptedGateway::new(
        SubmitReply::Unreachable(TransportFailure::HttpStatus(502)),
        vec![not_yet(), not_yet(), confirmed()],
    );
    let mut c = coordinator(&gateway);

    let outcome = c.run(&form()).await.unwrap();
    assert_eq!(outcome, SubmissionOutcome::Confirmed(tracking("ABC12345")));
    assert_eq!(gateway.polls(), 3);
}

#[tokio::test]
async fn exists_without_confirmed_is_not_confirmation() {
    let gateway = ScriptedGateway::new(accepted(), vec![not_yet(); 5]);
    let mut c = coordinator(&gateway);

    let outcome = c.run(&form()).await.unwrap();
    assert_eq!(outcome, SubmissionOutcome::Pending(tracking("ABC12345")));
}

#[tokio::test]
async fn zero_poll_attempts_goes_straight_to_pending() {
    let gateway = ScriptedGateway::new(accepted(), vec![confirmed()]);
    let mut ctx = context(None);
    ctx.poll = PollPolicy::new(0, Duration::ZERO);
    let mut c = SubmissionCoordinator::new(gateway.clone(), ctx);

    let outcome = c.run(&form()).await.unwrap();
    assert!(matches!(outcome, SubmissionOutcome::Pending(_)));
    assert_eq!(gateway.polls(), 0);
}

// ─── Scenario C: backend rejection ───────────────────────────────────

#[tokio::test]
async fn backend_rejection_never_polls() {
    let gateway = ScriptedGateway::new(
        SubmitReply::Rejected {
            message: "Tracking number already declared".into(),
        },
        vec![confirmed()],
    );
    let mut c = coordinator(&gateway);

    let outcome = c.run(&form()).await.unwrap();

    assert_eq!(
        outcome,
        SubmissionOutcome::Rejected("Tracking number already declared".into())
    );
    assert_eq!(gateway.submits(), 1);
    assert_eq!(gateway.polls(), 0);
    assert!(!phases(&c).contains(&Phase::Verifying));
}

// ─── Scenario D: invalid tracking number ─────────────────────────────

#[tokio::test]
async fn short_tracking_number_is_rejected_before_any_call() {
    let gateway = ScriptedGateway::new(accepted(), vec![confirmed()]);
    let mut c = coordinator(&gateway);
    let mut f = form();
    f.tracking_number = "AB".into();

    let outcome = c.run(&f).await.unwrap();

    match outcome {
        SubmissionOutcome::Rejected(reason) => assert!(reason.contains("tracking number")),
        other => panic!("expected Rejected, got: {other:?}"),
    }
    assert_eq!(gateway.submits(), 0);
    assert_eq!(gateway.polls(), 0);
    assert_eq!(phases(&c), vec![Phase::Validating, Phase::Rejected]);
}

// ─── Scenario E: starred category without attachments ───────────────

#[tokio::test]
async fn starred_category_without_files_is_blocked_at_validation() {
    let gateway = ScriptedGateway::new(accepted(), vec![confirmed()]);
    let mut c = coordinator(&gateway);
    let mut f = form();
    f.item_category = "Mobile Phones".into();

    let outcome = c.run(&f).await.unwrap();

    assert!(outcome.is_rejected());
    assert_eq!(gateway.submits(), 0);
    assert!(!phases(&c).contains(&Phase::Encoding));
}

// ─── Encoding ────────────────────────────────────────────────────────

#[tokio::test]
async fn attachments_are_encoded_into_the_payload() {
    let gateway = ScriptedGateway::new(accepted(), vec![confirmed()]);
    let mut c = coordinator(&gateway);
    let mut f = form();
    f.item_category = "Mobile Phones".into();
    f.attachments = vec![
        AttachmentSource::from_bytes("invoice.pdf", "application/pdf", b"%PDF-1.4".to_vec()),
        AttachmentSource::from_bytes("box photo.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF]),
    ];

    let outcome = c.run(&f).await.unwrap();
    assert!(matches!(outcome, SubmissionOutcome::Confirmed(_)));

    let payload = gateway.submitted.lock().unwrap().clone().unwrap();
    let names: Vec<&str> = payload.attachments().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["invoice.pdf", "box_photo.jpg"]);
    assert_eq!(payload.attachments()[1].encoded_data, "/9j/");
}

#[tokio::test]
async fn unreadable_attachment_is_rejected_before_submit() {
    let gateway = ScriptedGateway::new(accepted(), vec![confirmed()]);
    let mut c = coordinator(&gateway);
    let mut f = form();
    f.attachments = vec![AttachmentSource {
        name: "gone.png".into(),
        mime_type: "image/png".into(),
        size_bytes: 10,
        content: AttachmentContent::File("/nonexistent/parcel/gone.png".into()),
    }];

    let outcome = c.run(&f).await.unwrap();

    assert!(outcome.is_rejected());
    assert_eq!(gateway.submits(), 0);
    assert_eq!(
        phases(&c),
        vec![Phase::Validating, Phase::Encoding, Phase::Rejected]
    );
}

// ─── Session and reuse ───────────────────────────────────────────────

#[tokio::test]
async fn blank_phone_is_taken_from_session() {
    let gateway = ScriptedGateway::new(accepted(), vec![confirmed()]);
    let session = SessionToken::new("0198765432", None, "tok", false);
    let mut c = SubmissionCoordinator::new(gateway.clone(), context(Some(session)));
    let mut f = form();
    f.phone = "  ".into();

    c.run(&f).await.unwrap();

    let payload = gateway.submitted.lock().unwrap().clone().unwrap();
    assert_eq!(payload.phone(), "0198765432");
}

#[tokio::test]
async fn finished_coordinator_refuses_second_run() {
    let gateway = ScriptedGateway::new(accepted(), vec![confirmed()]);
    let mut c = coordinator(&gateway);

    c.run(&form()).await.unwrap();
    let err = c.run(&form()).await.unwrap_err();

    assert!(matches!(
        err,
        CoordinatorError::AlreadyFinished {
            phase: Phase::Confirmed,
            ..
        }
    ));
    assert_eq!(gateway.submits(), 1);
}

// ─── HTTP end to end ─────────────────────────────────────────────────

#[tokio::test]
async fn http_gateway_submit_then_confirm() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "trackingNumber": "ABC12345"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("action", "verifyParcel"))
        .and(query_param("trackingNumber", "ABC12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "exists": true,
            "confirmed": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = ClientConfig::new(format!("{}/exec", mock_server.uri()).parse().unwrap());
    config.poll_interval_ms = 5;
    let client = ParcelClient::new(config).unwrap();
    let mut ctx = context(None);
    ctx.poll = PollPolicy::from(client.config());

    let mut c = SubmissionCoordinator::new(Arc::new(client.declarations(None)), ctx);
    let outcome = c.run(&form()).await.unwrap();

    assert_eq!(outcome, SubmissionOutcome::Confirmed(tracking("ABC12345")));
}

#[tokio::test]
async fn http_gateway_server_error_ends_pending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"exists": false})))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client =
        ParcelClient::new(ClientConfig::new(format!("{}/exec", mock_server.uri()).parse().unwrap()))
            .unwrap();
    let mut ctx = context(None);
    ctx.poll = PollPolicy::new(3, Duration::from_millis(5));

    let mut c = SubmissionCoordinator::new(Arc::new(client.declarations(None)), ctx);
    let outcome = c.run(&form()).await.unwrap();

    assert!(matches!(outcome, SubmissionOutcome::Pending(_)));
}

/// Canonical tracking number via the validators.
fn tracking(raw: &str) -> TrackingNumber {
    Validators::new(ValidationRules::default())
        .unwrap()
        .parse_tracking_number(raw)
        .unwrap()
}
