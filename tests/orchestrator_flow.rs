//! End-to-end conversation flows against in-memory ports.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lendline::adapters::{InMemoryAuditSink, InMemorySessionStore, RecordingMessenger};
use lendline::application::{DialogOrchestrator, ProcessError};
use lendline::config::EngineConfig;
use lendline::domain::foundation::{Language, Timestamp, UserIdentity};
use lendline::domain::journey::{FieldName, Journey, StepId};
use lendline::domain::offer::{LoanApplication, Offer};
use lendline::domain::session::Session;
use lendline::ports::{
    ApprovedTerms, AuditKind, DecisionGateway, DecisionOutcome, GatewayError, InboundEvent,
    InboundPayload, MediaKind, PromptKind, SessionStore, StoreError, SupportResponder,
};

// ─────────────────────────────────────────────────────────────────────────
// Test doubles
// ─────────────────────────────────────────────────────────────────────────

struct ScriptedDecisions {
    offers: Vec<Offer>,
    outcome: DecisionOutcome,
}

impl ScriptedDecisions {
    fn approving() -> Self {
        Self {
            offers: vec![
                Offer {
                    amount: 60_000,
                    apr: 18.0,
                    term_months: 6,
                    monthly_emi: 10_600,
                    processing_fee_pct: 3.0,
                },
                Offer {
                    amount: 69_000,
                    apr: 21.0,
                    term_months: 9,
                    monthly_emi: 8_500,
                    processing_fee_pct: 2.5,
                },
                Offer {
                    amount: 81_000,
                    apr: 24.0,
                    term_months: 12,
                    monthly_emi: 7_700,
                    processing_fee_pct: 2.0,
                },
            ],
            outcome: DecisionOutcome::Approved(ApprovedTerms {
                amount: 69_000,
                apr: 21.0,
                term_months: 9,
                reference: "REF-774411".to_string(),
            }),
        }
    }

    fn rejecting(reason: &str) -> Self {
        Self {
            offers: vec![Offer {
                amount: 60_000,
                apr: 18.0,
                term_months: 6,
                monthly_emi: 10_600,
                processing_fee_pct: 3.0,
            }],
            outcome: DecisionOutcome::Rejected {
                reason: reason.to_string(),
            },
        }
    }
}

#[async_trait]
impl DecisionGateway for ScriptedDecisions {
    async fn propose_offers(
        &self,
        _application: &LoanApplication,
    ) -> Result<Vec<Offer>, GatewayError> {
        Ok(self.offers.clone())
    }

    async fn final_decision(
        &self,
        _application: &LoanApplication,
    ) -> Result<DecisionOutcome, GatewayError> {
        Ok(self.outcome.clone())
    }
}

struct CannedSupport {
    answer: Option<String>,
}

#[async_trait]
impl SupportResponder for CannedSupport {
    async fn answer(
        &self,
        _question: &str,
        _language: Language,
    ) -> Result<Option<String>, GatewayError> {
        Ok(self.answer.clone())
    }
}

/// Store wrapper that measures how many load→save windows overlap for the
/// serialization property.
struct ProbeStore {
    inner: InMemorySessionStore,
    in_flight: AtomicUsize,
    max_overlap: AtomicUsize,
}

impl ProbeStore {
    fn new() -> Self {
        Self {
            inner: InMemorySessionStore::new(),
            in_flight: AtomicUsize::new(0),
            max_overlap: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SessionStore for ProbeStore {
    async fn load(&self, identity: &UserIdentity) -> Result<Option<Session>, StoreError> {
        let concurrent = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_overlap.fetch_max(concurrent, Ordering::SeqCst);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        self.inner.load(identity).await
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        let result = self.inner.save(session).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

type Engine<S, D, R> =
    DialogOrchestrator<S, RecordingMessenger, D, R, InMemoryAuditSink>;

struct Harness<S: SessionStore, D: DecisionGateway, R: SupportResponder> {
    store: Arc<S>,
    messenger: Arc<RecordingMessenger>,
    audit: Arc<InMemoryAuditSink>,
    engine: Engine<S, D, R>,
}

fn harness(
    decisions: ScriptedDecisions,
    support: Option<CannedSupport>,
) -> Harness<InMemorySessionStore, ScriptedDecisions, CannedSupport> {
    let store = Arc::new(InMemorySessionStore::new());
    let messenger = Arc::new(RecordingMessenger::new());
    let audit = Arc::new(InMemoryAuditSink::new());
    let engine = DialogOrchestrator::new(
        Arc::clone(&store),
        Arc::clone(&messenger),
        Arc::new(decisions),
        support.map(Arc::new),
        Arc::clone(&audit),
        EngineConfig::default(),
    );
    Harness {
        store,
        messenger,
        audit,
        engine,
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn identity() -> UserIdentity {
    UserIdentity::new("919876543210").unwrap()
}

fn text(body: &str) -> InboundEvent {
    InboundEvent {
        identity: identity(),
        payload: InboundPayload::Text(body.to_string()),
        received_at: Timestamp::now(),
    }
}

fn selection(id: &str) -> InboundEvent {
    InboundEvent {
        identity: identity(),
        payload: InboundPayload::Selection(id.to_string()),
        received_at: Timestamp::now(),
    }
}

fn image() -> InboundEvent {
    InboundEvent {
        identity: identity(),
        payload: InboundPayload::Media(MediaKind::Image),
        received_at: Timestamp::now(),
    }
}

/// Drives a session from first contact to the offer list.
async fn drive_to_offers<S, D, R>(engine: &Engine<S, D, R>)
where
    S: SessionStore,
    D: DecisionGateway,
    R: SupportResponder,
{
    for event in [
        text("loan"),
        text("English"),
        selection("intent_get_loan"),
        text("Jane Doe"),
        text("31-12-1995"),
        selection("emp_0"),
        text("45000"),
        selection("purpose_0"),
        selection("consent_yes"),
    ] {
        engine.process(event).await.unwrap();
    }
}

/// Continues from the offer list through disbursement.
async fn drive_through_kyc<S, D, R>(engine: &Engine<S, D, R>)
where
    S: SessionStore,
    D: DecisionGateway,
    R: SupportResponder,
{
    for event in [
        selection("offer_select_1"),
        selection("kyc_complete"),
        image(),
        text("HDFC0000123\n50100012345678"),
        selection("nach_complete"),
        selection("agree_yes"),
    ] {
        engine.process(event).await.unwrap();
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Full loan flow
// ─────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_onboarding_flow_reaches_disbursement() {
    init_tracing();
    let h = harness(ScriptedDecisions::approving(), None);

    drive_to_offers(&h.engine).await;

    let mid = h.store.snapshot(&identity()).unwrap();
    assert_eq!(mid.journey(), Journey::Onboarding);
    assert_eq!(mid.current_step(), Some(StepId::OfferSelection));
    assert_eq!(mid.offers().len(), 3);
    assert!(mid.flag("consent_given"));

    drive_through_kyc(&h.engine).await;

    let done = h.store.snapshot(&identity()).unwrap();
    assert_eq!(done.journey(), Journey::PostLoan);
    assert_eq!(done.current_step(), Some(StepId::PostLoanMenu));
    assert!(done.flag("kyc_completed"));
    assert!(done.flag("selfie_received"));
    assert!(done.flag("nach_completed"));
    assert!(done.flag("agreement_signed"));
    assert!(done.flag("loan_disbursed"));
    assert_eq!(done.disbursement_reference(), Some("REF-774411"));
    assert_eq!(done.chosen_offer().map(|(i, _)| i), Some(1));
    assert!(done.answer(FieldName::BankDetails).is_some());

    assert_eq!(h.audit.count_of(AuditKind::OffersGenerated), 1);
    assert_eq!(h.audit.count_of(AuditKind::OfferSelected), 1);
    assert_eq!(h.audit.count_of(AuditKind::LoanDisbursed), 1);

    // The approval message carries the sanctioned amount and reference.
    let sent = h.messenger.sent_to(&identity());
    let approval = sent
        .iter()
        .find(|p| p.body.contains("REF-774411"))
        .expect("approval message sent");
    assert!(approval.body.contains("69,000"));
}

#[tokio::test]
async fn final_rejection_returns_to_idle_with_reason() {
    let h = harness(ScriptedDecisions::rejecting("income verification failed"), None);

    drive_to_offers(&h.engine).await;
    for event in [
        selection("offer_select_0"),
        selection("kyc_complete"),
        image(),
        text("HDFC0000123\n50100012345678"),
        selection("nach_complete"),
        selection("agree_yes"),
    ] {
        h.engine.process(event).await.unwrap();
    }

    let done = h.store.snapshot(&identity()).unwrap();
    assert_eq!(done.journey(), Journey::None);
    assert!(!done.flag("loan_disbursed"));

    let sent = h.messenger.sent_to(&identity());
    assert!(sent
        .iter()
        .any(|p| p.body.contains("income verification failed")));
}

#[tokio::test]
async fn declining_the_agreement_ends_the_application() {
    let h = harness(ScriptedDecisions::approving(), None);

    drive_to_offers(&h.engine).await;
    for event in [
        selection("offer_select_0"),
        selection("kyc_complete"),
        image(),
        text("HDFC0000123\n50100012345678"),
        selection("nach_complete"),
    ] {
        h.engine.process(event).await.unwrap();
    }

    let outcome = h.engine.process(selection("agree_no")).await.unwrap();

    assert_eq!(outcome.journey, Journey::None);
    let saved = h.store.snapshot(&identity()).unwrap();
    assert!(!saved.flag("agreement_signed"));
    assert!(!saved.flag("loan_disbursed"));
}

#[tokio::test]
async fn selfie_step_insists_on_media() {
    let h = harness(ScriptedDecisions::approving(), None);

    drive_to_offers(&h.engine).await;
    h.engine.process(selection("offer_select_0")).await.unwrap();
    h.engine.process(selection("kyc_complete")).await.unwrap();

    let outcome = h.engine.process(text("here it is")).await.unwrap();
    assert_eq!(outcome.current_step, Some(StepId::SelfieAck));

    let outcome = h.engine.process(image()).await.unwrap();
    assert_eq!(outcome.current_step, Some(StepId::BankDetails));
}

#[tokio::test]
async fn single_line_bank_details_are_rejected() {
    let h = harness(ScriptedDecisions::approving(), None);

    drive_to_offers(&h.engine).await;
    h.engine.process(selection("offer_select_0")).await.unwrap();
    h.engine.process(selection("kyc_complete")).await.unwrap();
    h.engine.process(image()).await.unwrap();

    let outcome = h.engine.process(text("HDFC0000123")).await.unwrap();
    assert_eq!(outcome.current_step, Some(StepId::BankDetails));
    let saved = h.store.snapshot(&identity()).unwrap();
    assert!(saved.answer(FieldName::BankDetails).is_none());
}

// ─────────────────────────────────────────────────────────────────────────
// Support pipeline
// ─────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn knowledge_base_answers_short_circuit() {
    // A responder is configured but must not be needed.
    let h = harness(
        ScriptedDecisions::approving(),
        Some(CannedSupport {
            answer: Some("model answer".to_string()),
        }),
    );

    h.engine.process(text("help")).await.unwrap();
    h.engine.process(text("how do I pay my emi?")).await.unwrap();

    let sent = h.messenger.sent_to(&identity());
    assert!(sent.iter().any(|p| p.body.contains("PAY LINK")));
    assert!(!sent.iter().any(|p| p.body.contains("model answer")));
    assert_eq!(h.audit.count_of(AuditKind::SupportAnswer), 1);
}

#[tokio::test]
async fn model_answers_when_knowledge_base_misses() {
    let h = harness(
        ScriptedDecisions::approving(),
        Some(CannedSupport {
            answer: Some("You can foreclose from the app.".to_string()),
        }),
    );

    h.engine.process(text("help")).await.unwrap();
    h.engine
        .process(text("can I foreclose my loan early?"))
        .await
        .unwrap();

    let sent = h.messenger.sent_to(&identity());
    assert!(sent.iter().any(|p| p.body.contains("foreclose from the app")));
}

#[tokio::test]
async fn unanswerable_question_offers_escalation() {
    let h = harness(ScriptedDecisions::approving(), None);

    h.engine.process(text("help")).await.unwrap();
    let outcome = h
        .engine
        .process(text("why is the sky blue"))
        .await
        .unwrap();

    // Still in support (re-entrant), with an escalation choice offered.
    assert_eq!(outcome.journey, Journey::Support);
    let last = outcome.prompts.last().unwrap();
    assert_eq!(last.kind, PromptKind::ChoiceSet);
    assert!(last.options.iter().any(|(id, _)| id == "connect_agent"));
}

#[tokio::test]
async fn accepting_escalation_hands_off_and_exits_support() {
    let h = harness(ScriptedDecisions::approving(), None);

    h.engine.process(text("help")).await.unwrap();
    h.engine.process(text("why is the sky blue")).await.unwrap();
    let outcome = h.engine.process(selection("connect_agent")).await.unwrap();

    assert_eq!(outcome.journey, Journey::None);
    assert_eq!(h.audit.count_of(AuditKind::AgentHandoff), 1);
}

#[tokio::test]
async fn loan_keyword_switches_out_of_support() {
    let h = harness(ScriptedDecisions::approving(), None);

    h.engine.process(text("English")).await.unwrap();
    h.engine.process(text("help")).await.unwrap();
    let outcome = h.engine.process(text("I want a loan")).await.unwrap();

    assert_eq!(outcome.journey, Journey::Onboarding);
    // Language already chosen, so onboarding starts at the name step.
    assert_eq!(outcome.current_step, Some(StepId::FullName));
}

#[tokio::test]
async fn mid_onboarding_support_switch_is_honored() {
    let h = harness(ScriptedDecisions::approving(), None);

    for event in [text("loan"), text("English"), selection("intent_get_loan")] {
        h.engine.process(event).await.unwrap();
    }
    let outcome = h.engine.process(text("support")).await.unwrap();

    assert_eq!(outcome.journey, Journey::Support);
}

// ─────────────────────────────────────────────────────────────────────────
// Post-loan menu
// ─────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn post_loan_view_renders_the_disbursed_loan() {
    let h = harness(ScriptedDecisions::approving(), None);
    drive_to_offers(&h.engine).await;
    drive_through_kyc(&h.engine).await;
    h.messenger.clear();

    let outcome = h.engine.process(selection("post_view")).await.unwrap();

    assert_eq!(outcome.journey, Journey::PostLoan);
    let sent = h.messenger.sent_to(&identity());
    let details = &sent[0];
    assert!(details.body.contains("69,000"));
    assert!(details.body.contains("REF-774411"));
}

#[tokio::test]
async fn post_loan_unknown_reply_reshows_menu() {
    let h = harness(ScriptedDecisions::approving(), None);
    drive_to_offers(&h.engine).await;
    drive_through_kyc(&h.engine).await;

    let outcome = h.engine.process(text("what now")).await.unwrap();

    assert_eq!(outcome.journey, Journey::PostLoan);
    assert_eq!(outcome.current_step, Some(StepId::PostLoanMenu));
    let menu = outcome.prompts.last().unwrap();
    assert!(menu.options.iter().any(|(id, _)| id == "post_repay"));
}

// ─────────────────────────────────────────────────────────────────────────
// Language handling
// ─────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn language_keyword_reopens_selection_from_any_state() {
    let h = harness(ScriptedDecisions::approving(), None);
    for event in [text("loan"), text("English"), selection("intent_get_loan")] {
        h.engine.process(event).await.unwrap();
    }

    let outcome = h.engine.process(text("language")).await.unwrap();

    assert_eq!(outcome.journey, Journey::None);
    let saved = h.store.snapshot(&identity()).unwrap();
    assert_eq!(saved.language(), None);
    assert_eq!(outcome.prompts[0].options.len(), 2);
}

#[tokio::test]
async fn hindi_sessions_get_hindi_prompts() {
    let h = harness(ScriptedDecisions::approving(), None);

    h.engine.process(text("loan")).await.unwrap();
    let outcome = h.engine.process(selection("lang_hi")).await.unwrap();

    assert_eq!(outcome.current_step, Some(StepId::IntentConfirm));
    let menu = outcome.prompts.last().unwrap();
    assert!(menu.body.contains("लोन"));
}

// ─────────────────────────────────────────────────────────────────────────
// Concurrency
// ─────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_events_for_one_identity_never_overlap() {
    init_tracing();
    let store = Arc::new(ProbeStore::new());
    let messenger = Arc::new(RecordingMessenger::new());
    let audit = Arc::new(InMemoryAuditSink::new());
    let engine: Arc<Engine<ProbeStore, ScriptedDecisions, CannedSupport>> =
        Arc::new(DialogOrchestrator::new(
            Arc::clone(&store),
            messenger,
            Arc::new(ScriptedDecisions::approving()),
            None,
            audit,
            EngineConfig::default(),
        ));

    let mut handles = Vec::new();
    for _ in 0..6 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine.process(text("hello")).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // At most one load→save window in flight at a time for one identity.
    assert_eq!(store.max_overlap.load(Ordering::SeqCst), 1);
    assert!(store.inner.snapshot(&identity()).is_some());
}

#[tokio::test]
async fn store_failure_does_not_acknowledge_the_event() {
    let h = harness(ScriptedDecisions::approving(), None);
    h.store.set_failing(true);

    let result = h.engine.process(text("loan")).await;

    assert!(matches!(result, Err(ProcessError::Store(_))));
    h.store.set_failing(false);
    // Redelivery after recovery processes normally.
    let outcome = h.engine.process(text("loan")).await.unwrap();
    assert_eq!(outcome.journey, Journey::Onboarding);
}
