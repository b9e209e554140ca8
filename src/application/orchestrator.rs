//! The dialog orchestrator.
//!
//! Consumes one inbound event at a time: loads the session, runs the
//! routing/validation/transition algorithm against the journey tables,
//! invokes the decision and support gateways where a step calls for it,
//! persists the updated session, and emits exactly one outbound prompt set.
//!
//! Apart from the gateway calls, the transition is a pure function of
//! (session, validated input); gateway steps are guarded by completion
//! flags so a retried event never re-invokes them.

use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::domain::foundation::{Language, Timestamp};
use crate::domain::journey::{
    self, FieldBinding, InputKind, Journey, JourneyStep, SideEffect, StepId, Successor,
};
use crate::domain::offer::LoanApplication;
use crate::domain::session::{Session, SessionLifecycle};
use crate::domain::validation::{self, FieldKind, FieldValue};
use crate::ports::{
    AuditKind, AuditSink, DecisionGateway, DecisionOutcome, GatewayError, InboundEvent,
    InboundPayload, Messenger, MessagingError, PromptSpec, SessionStore, StoreError,
    SupportResponder,
};

use super::identity_gate::IdentityGate;
use super::intent::{self, TopLevelIntent};
use super::{prompts, support};

/// Errors that end processing of one event.
///
/// Validation failures and routing misses are handled in-loop (re-prompt)
/// and never surface here. Every failure is scoped to one identity's one
/// event; nothing crashes the process.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// A decision/support gateway call failed or timed out. The session
    /// was left unchanged; the event counts as not yet processed.
    #[error("gateway failure: {0}")]
    Gateway(#[from] GatewayError),

    /// The session store failed. The event is not acknowledged; the
    /// transport layer decides whether to redeliver.
    #[error("session store failure: {0}")]
    Store(#[from] StoreError),

    /// An outbound prompt could not be delivered.
    #[error("message delivery failure: {0}")]
    Messaging(#[from] MessagingError),
}

/// What one processed event did to the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome {
    pub journey: Journey,
    pub current_step: Option<StepId>,
    pub prompts: Vec<PromptSpec>,
}

/// Failure of a step transition, resolved by the outer handler.
enum StepFailure {
    Gateway(GatewayError),
    Corruption(String),
}

fn corruption(err: impl std::fmt::Display) -> StepFailure {
    StepFailure::Corruption(err.to_string())
}

/// Explicit switches into the support journey, honored mid-journey.
fn is_explicit_support_switch(payload: &InboundPayload) -> bool {
    match payload {
        InboundPayload::Selection(id) => matches!(id.as_str(), "intent_support" | "connect_agent"),
        InboundPayload::Text(text) => {
            matches!(text.trim().to_lowercase().as_str(), "support" | "help")
        }
        InboundPayload::Media(_) => false,
    }
}

/// The dialog orchestration engine.
pub struct DialogOrchestrator<S, M, D, R, A>
where
    S: SessionStore,
    M: Messenger,
    D: DecisionGateway,
    R: SupportResponder,
    A: AuditSink,
{
    store: Arc<S>,
    messenger: Arc<M>,
    decisions: Arc<D>,
    support: Option<Arc<R>>,
    audit: Arc<A>,
    config: EngineConfig,
    lifecycle: SessionLifecycle,
    gate: IdentityGate,
}

impl<S, M, D, R, A> DialogOrchestrator<S, M, D, R, A>
where
    S: SessionStore,
    M: Messenger,
    D: DecisionGateway,
    R: SupportResponder,
    A: AuditSink,
{
    /// Creates an orchestrator over the given ports.
    ///
    /// `support` is optional; without it the support pipeline goes from
    /// the knowledge base straight to escalation.
    pub fn new(
        store: Arc<S>,
        messenger: Arc<M>,
        decisions: Arc<D>,
        support: Option<Arc<R>>,
        audit: Arc<A>,
        config: EngineConfig,
    ) -> Self {
        let lifecycle = SessionLifecycle::new(config.staleness_minutes);
        Self {
            store,
            messenger,
            decisions,
            support,
            audit,
            config,
            lifecycle,
            gate: IdentityGate::new(),
        }
    }

    /// Processes one inbound event.
    ///
    /// Events for the same identity are serialized; events for different
    /// identities run fully concurrently.
    pub async fn process(&self, event: InboundEvent) -> Result<ProcessOutcome, ProcessError> {
        let _permit = self.gate.acquire(&event.identity).await;
        let now = event.received_at;

        // 1. Load (or create) the session.
        let mut session = match self.store.load(&event.identity).await? {
            Some(session) => session,
            None => Session::new(event.identity.clone(), now),
        };

        self.audit
            .record(
                &event.identity,
                AuditKind::InboundMessage,
                serde_json::to_value(&event.payload).unwrap_or_default(),
                now,
            )
            .await;

        // 2. Lazy staleness check against the previous activity stamp.
        if self.lifecycle.is_stale(&session, now) {
            tracing::info!(identity = %event.identity, "session idle past threshold; resetting");
            session.reset();
            session.touch(now);
            self.audit
                .record(
                    &event.identity,
                    AuditKind::SessionReset,
                    json!({"reason": "inactivity"}),
                    now,
                )
                .await;
            let menu = prompts::top_level_menu(session.language());
            return self.finish(session, menu).await;
        }
        session.touch(now);

        // 3. Global language switch re-opens language selection.
        if let InboundPayload::Text(text) = &event.payload {
            if text.trim().eq_ignore_ascii_case("language") {
                session.reset();
                session.clear_language();
                return self.finish(session, vec![prompts::language_menu()]).await;
            }
        }

        // 4. Explicit support switch from inside another journey.
        if !matches!(session.journey(), Journey::None | Journey::Support)
            && is_explicit_support_switch(&event.payload)
        {
            if let Err(err) = session.enter(Journey::Support) {
                return self.recover_corruption(session, &err.to_string(), now).await;
            }
            let menu = prompts::support_menu(self.language_of(&session));
            return self.finish(session, vec![menu]).await;
        }

        // 5. Dispatch on the active journey.
        match session.journey() {
            Journey::None => self.route_top_level(session, &event, now).await,
            Journey::Support => self.handle_support(session, &event, now).await,
            Journey::PostLoan => self.handle_post_loan(session, &event, now).await,
            Journey::Onboarding | Journey::Kyc => self.handle_step(session, &event, now).await,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Top-level routing (journey == None)
    // ─────────────────────────────────────────────────────────────────────

    async fn route_top_level(
        &self,
        mut session: Session,
        event: &InboundEvent,
        now: Timestamp,
    ) -> Result<ProcessOutcome, ProcessError> {
        match intent::detect(&event.payload, session.flag("loan_disbursed")) {
            Some(TopLevelIntent::Language(language)) => {
                session.set_language(language);
                self.finish(session, vec![prompts::main_menu(language)]).await
            }
            Some(TopLevelIntent::ShowLanguageMenu) => {
                session.reset();
                session.clear_language();
                self.finish(session, vec![prompts::language_menu()]).await
            }
            Some(TopLevelIntent::StartLoan) => self.start_onboarding(session, now).await,
            Some(TopLevelIntent::OpenSupport) => {
                if let Err(err) = session.enter(Journey::Support) {
                    return self.recover_corruption(session, &err.to_string(), now).await;
                }
                let menu = prompts::support_menu(self.language_of(&session));
                self.finish(session, vec![menu]).await
            }
            Some(TopLevelIntent::OpenPostLoanMenu) => {
                if let Err(err) = session.enter(Journey::PostLoan) {
                    return self.recover_corruption(session, &err.to_string(), now).await;
                }
                self.handle_post_loan(session, event, now).await
            }
            // Routing miss: re-show the top-level menu, no state change.
            None => {
                let menu = prompts::top_level_menu(session.language());
                self.finish(session, menu).await
            }
        }
    }

    async fn start_onboarding(
        &self,
        mut session: Session,
        now: Timestamp,
    ) -> Result<ProcessOutcome, ProcessError> {
        // A new application starts clean (language survives); the audit
        // trail keeps any previous loan record.
        session.reset();
        if let Err(err) = session.enter(Journey::Onboarding) {
            return self.recover_corruption(session, &err.to_string(), now).await;
        }
        // A user who already chose a language and asked for a loan has
        // answered the first two steps; start with the applicant details.
        let step = if session.language().is_some() {
            if let Err(err) = session.advance_to(StepId::FullName) {
                return self.recover_corruption(session, &err.to_string(), now).await;
            }
            StepId::FullName
        } else {
            StepId::LanguageSelect
        };
        let out = prompts::step_prompts(step, &session);
        self.finish(session, out).await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Step machine (onboarding / KYC)
    // ─────────────────────────────────────────────────────────────────────

    async fn handle_step(
        &self,
        mut session: Session,
        event: &InboundEvent,
        now: Timestamp,
    ) -> Result<ProcessOutcome, ProcessError> {
        let step = match session
            .current_step()
            .and_then(|id| journey::step(session.journey(), id))
        {
            Some(step) => *step,
            None => {
                return self
                    .recover_corruption(session, "current step not in journey definition", now)
                    .await;
            }
        };

        if step.input == InputKind::Document {
            return match &event.payload {
                InboundPayload::Media(_) => {
                    match self.accept_document(&mut session, &step, now).await {
                        Ok(out) => self.finish(session, out).await,
                        Err(failure) => self.handle_failure(session, failure, now).await,
                    }
                }
                _ => {
                    // Not the media we asked for: repeat the request.
                    let mut out =
                        vec![PromptSpec::text(prompts::pack(session.language()).invalid_choice)];
                    out.extend(prompts::step_prompts(step.id, &session));
                    self.finish(session, out).await
                }
            };
        }

        let Some(raw) = event.payload.as_input() else {
            // Media sent to a text/choice step: re-prompt, no state change.
            let mut out = vec![PromptSpec::text(prompts::pack(session.language()).invalid_choice)];
            out.extend(prompts::step_prompts(step.id, &session));
            return self.finish(session, out).await;
        };

        let options = prompts::options_for(step.id, &session);
        let kind = self.field_kind_for(&step, &options);
        match validation::validate(kind, raw, now.date()) {
            Err(reason) => {
                tracing::debug!(
                    identity = %session.identity(),
                    step = step.id.label(),
                    ?reason,
                    "input rejected"
                );
                let mut out = vec![prompts::invalid_hint(
                    step.id,
                    &reason,
                    session.language(),
                    self.config.min_applicant_age,
                    self.config.max_applicant_age,
                )];
                out.extend(prompts::step_prompts(step.id, &session));
                self.finish(session, out).await
            }
            Ok(value) => match self.accept_value(&mut session, &step, value, now).await {
                Ok(out) => self.finish(session, out).await,
                Err(failure) => self.handle_failure(session, failure, now).await,
            },
        }
    }

    /// The validation a step asks for. Date, income and yes/no steps use
    /// their dedicated kinds regardless of how the prompt is presented.
    fn field_kind_for<'a>(
        &self,
        step: &JourneyStep,
        options: &'a [(String, String)],
    ) -> FieldKind<'a> {
        match step.id {
            StepId::DateOfBirth => FieldKind::Date {
                min_age: self.config.min_applicant_age,
                max_age: self.config.max_applicant_age,
            },
            StepId::MonthlyIncome => FieldKind::Numeric,
            StepId::Consent | StepId::AgreementAck => FieldKind::Boolean,
            _ => match step.input {
                InputKind::Choice => FieldKind::Choice { options },
                _ => FieldKind::FreeText,
            },
        }
    }

    /// Applies an accepted value to the session and advances.
    async fn accept_value(
        &self,
        session: &mut Session,
        step: &JourneyStep,
        value: FieldValue,
        now: Timestamp,
    ) -> Result<Vec<PromptSpec>, StepFailure> {
        let language = self.language_of(session);
        let p = prompts::pack(session.language());
        let mut acks: Vec<PromptSpec> = Vec::new();

        match step.id {
            StepId::LanguageSelect => {
                let chosen = value
                    .as_text()
                    .and_then(Language::from_input)
                    .ok_or_else(|| {
                        StepFailure::Corruption("language option did not map to a language".into())
                    })?;
                session.set_language(chosen);
            }
            StepId::IntentConfirm => {
                if value.as_text() == Some("intent_support") {
                    session.enter(Journey::Support).map_err(corruption)?;
                    return Ok(vec![prompts::support_menu(self.language_of(session))]);
                }
            }
            StepId::Consent => match value.as_bool() {
                Some(true) => session.set_flag("consent_given", true),
                _ => {
                    let mut out = vec![PromptSpec::text(p.consent_required)];
                    out.extend(prompts::step_prompts(step.id, session));
                    return Ok(out);
                }
            },
            StepId::AgreementAck => match value.as_bool() {
                Some(true) => {
                    session.set_flag("agreement_signed", true);
                    acks.push(PromptSpec::text(p.agreement_signed));
                }
                _ => {
                    session.clear_journey();
                    return Ok(vec![PromptSpec::text(p.agreement_declined)]);
                }
            },
            StepId::Employment => {
                let canonical = value
                    .as_text()
                    .and_then(prompts::employment_value)
                    .ok_or_else(|| {
                        StepFailure::Corruption("employment option id unknown".into())
                    })?;
                session
                    .set_answer(
                        journey::FieldName::Employment,
                        FieldValue::Text(canonical.to_string()),
                    )
                    .map_err(corruption)?;
            }
            StepId::Purpose => {
                let canonical = value
                    .as_text()
                    .and_then(prompts::purpose_value)
                    .ok_or_else(|| StepFailure::Corruption("purpose option id unknown".into()))?;
                session
                    .set_answer(
                        journey::FieldName::Purpose,
                        FieldValue::Text(canonical.to_string()),
                    )
                    .map_err(corruption)?;
            }
            StepId::BankDetails => {
                let raw = value.as_text().unwrap_or_default();
                let mut lines = raw.lines().map(str::trim).filter(|l| !l.is_empty());
                if lines.next().is_none() || lines.next().is_none() {
                    let mut out = vec![PromptSpec::text(p.invalid_bank)];
                    out.extend(prompts::step_prompts(step.id, session));
                    return Ok(out);
                }
                session
                    .set_answer(journey::FieldName::BankDetails, value.clone())
                    .map_err(corruption)?;
                acks.push(PromptSpec::text(p.bank_received));
            }
            StepId::OfferSelection => {
                let index: usize = value
                    .as_text()
                    .and_then(|id| id.strip_prefix("offer_select_"))
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| StepFailure::Corruption("offer option id malformed".into()))?;
                session.choose_offer(index).map_err(corruption)?;
                self.audit
                    .record(
                        session.identity(),
                        AuditKind::OfferSelected,
                        json!({"index": index}),
                        now,
                    )
                    .await;
                if let Some((_, offer)) = session.chosen_offer() {
                    acks.push(prompts::offer_selected_summary(offer, language));
                }
            }
            StepId::KycAck => {
                session.set_flag("kyc_completed", true);
                acks.push(PromptSpec::text(p.kyc_completed));
            }
            StepId::NachAck => {
                session.set_flag("nach_completed", true);
                acks.push(PromptSpec::text(p.nach_completed));
            }
            _ => match step.binding {
                FieldBinding::Answer(field) => {
                    session.set_answer(field, value.clone()).map_err(corruption)?;
                }
                FieldBinding::Flag(name) => {
                    if let Some(b) = value.as_bool() {
                        session.set_flag(name, b);
                    }
                }
                FieldBinding::None => {}
            },
        }

        let mut out = acks;
        out.extend(self.goto_successor(session, step, now).await?);
        Ok(out)
    }

    /// Accepts the requested media at a document step.
    async fn accept_document(
        &self,
        session: &mut Session,
        step: &JourneyStep,
        now: Timestamp,
    ) -> Result<Vec<PromptSpec>, StepFailure> {
        let p = prompts::pack(session.language());
        let mut acks = Vec::new();
        if let FieldBinding::Flag(name) = step.binding {
            session.set_flag(name, true);
        }
        if step.id == StepId::SelfieAck {
            acks.push(PromptSpec::text(p.selfie_received));
        }
        let mut out = acks;
        out.extend(self.goto_successor(session, step, now).await?);
        Ok(out)
    }

    /// Follows a step's successor and produces the prompts for whatever
    /// comes next.
    async fn goto_successor(
        &self,
        session: &mut Session,
        step: &JourneyStep,
        now: Timestamp,
    ) -> Result<Vec<PromptSpec>, StepFailure> {
        match step.successor {
            Successor::Step(next) => self.enter_step(session, next, now).await,
            Successor::Handoff(target) => {
                session.enter(target).map_err(corruption)?;
                let entry = session
                    .current_step()
                    .ok_or_else(|| StepFailure::Corruption("handoff target has no entry".into()))?;
                self.enter_step(session, entry, now).await
            }
            Successor::Terminal => {
                session.clear_journey();
                Ok(prompts::top_level_menu(session.language()))
            }
        }
    }

    /// Positions the session on a step, running its entry side effect if
    /// it has not completed yet.
    async fn enter_step(
        &self,
        session: &mut Session,
        next: StepId,
        now: Timestamp,
    ) -> Result<Vec<PromptSpec>, StepFailure> {
        session.advance_to(next).map_err(corruption)?;
        let step = journey::step(session.journey(), next)
            .ok_or_else(|| StepFailure::Corruption(format!("step {next:?} not resolvable")))?;

        match step.side_effect {
            Some(SideEffect::GenerateOffers) if !session.flag("offers_generated") => {
                return self.generate_offers(session, now).await;
            }
            Some(SideEffect::FinalDecision) if !session.flag("decision_done") => {
                return self.final_decision(session, now).await;
            }
            _ => {}
        }
        Ok(prompts::step_prompts(next, session))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Gateway side effects
    // ─────────────────────────────────────────────────────────────────────

    async fn generate_offers(
        &self,
        session: &mut Session,
        now: Timestamp,
    ) -> Result<Vec<PromptSpec>, StepFailure> {
        let language = self.language_of(session);
        let p = prompts::pack(session.language());
        let application =
            LoanApplication::from_session(session, now.date()).map_err(corruption)?;

        let offers = self
            .with_deadline(self.decisions.propose_offers(&application))
            .await
            .map_err(StepFailure::Gateway)?;

        if offers.is_empty() {
            tracing::info!(identity = %session.identity(), "no offers proposed; application declined");
            self.audit
                .record(
                    session.identity(),
                    AuditKind::FinalDecision,
                    json!({"approved": false, "stage": "offers"}),
                    now,
                )
                .await;
            session.clear_journey();
            let body = p
                .decision_rejected
                .replace("{reason}", "eligibility criteria not met");
            return Ok(vec![
                PromptSpec::text(p.decision_submit),
                PromptSpec::text(body),
            ]);
        }

        // Overflow policy: the channel can only present `cap` offers as
        // direct choices; drop the lowest-ranked excess and record it.
        let mut offers = offers;
        let cap = self.config.offer_presentation_cap;
        if offers.len() > cap {
            let dropped = offers.len() - cap;
            tracing::warn!(
                identity = %session.identity(),
                dropped,
                cap,
                "offer set exceeds presentation cap; truncating"
            );
            self.audit
                .record(
                    session.identity(),
                    AuditKind::OffersTruncated,
                    json!({"dropped": dropped, "cap": cap}),
                    now,
                )
                .await;
            offers.truncate(cap);
        }

        let count = offers.len();
        session.set_offers(offers).map_err(corruption)?;
        session.set_flag("offers_generated", true);
        self.audit
            .record(
                session.identity(),
                AuditKind::OffersGenerated,
                json!({"count": count}),
                now,
            )
            .await;

        let mut out = vec![PromptSpec::text(p.decision_submit)];
        out.extend(prompts::offers_presentation(session.offers(), language));
        Ok(out)
    }

    async fn final_decision(
        &self,
        session: &mut Session,
        now: Timestamp,
    ) -> Result<Vec<PromptSpec>, StepFailure> {
        let language = self.language_of(session);
        let p = prompts::pack(session.language());
        let application =
            LoanApplication::from_session(session, now.date()).map_err(corruption)?;

        let outcome = self
            .with_deadline(self.decisions.final_decision(&application))
            .await
            .map_err(StepFailure::Gateway)?;

        session.set_flag("decision_done", true);
        match outcome {
            DecisionOutcome::Approved(terms) => {
                session.set_flag("loan_disbursed", true);
                session.set_disbursement_reference(terms.reference.clone());
                self.audit
                    .record(
                        session.identity(),
                        AuditKind::FinalDecision,
                        json!({"approved": true, "reference": &terms.reference}),
                        now,
                    )
                    .await;
                self.audit
                    .record(
                        session.identity(),
                        AuditKind::LoanDisbursed,
                        json!({"amount": terms.amount, "reference": &terms.reference}),
                        now,
                    )
                    .await;
                session.enter(Journey::PostLoan).map_err(corruption)?;
                let body = p
                    .final_approval
                    .replace("{amount}", &prompts::format_amount(terms.amount))
                    .replace("{ref}", &terms.reference);
                Ok(vec![
                    PromptSpec::text(body),
                    prompts::post_loan_menu(language),
                ])
            }
            DecisionOutcome::Rejected { reason } => {
                self.audit
                    .record(
                        session.identity(),
                        AuditKind::FinalDecision,
                        json!({"approved": false, "reason": &reason}),
                        now,
                    )
                    .await;
                session.clear_journey();
                Ok(vec![PromptSpec::text(
                    p.final_reject.replace("{reason}", &reason),
                )])
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Support journey
    // ─────────────────────────────────────────────────────────────────────

    async fn handle_support(
        &self,
        mut session: Session,
        event: &InboundEvent,
        now: Timestamp,
    ) -> Result<ProcessOutcome, ProcessError> {
        let language = self.language_of(&session);
        let p = prompts::pack(session.language());
        match &event.payload {
            InboundPayload::Selection(id) => match id.as_str() {
                // Escalation accepted: hand off and leave the journey.
                "connect_agent" => {
                    self.audit
                        .record(
                            session.identity(),
                            AuditKind::AgentHandoff,
                            json!({"source": "support_desk"}),
                            now,
                        )
                        .await;
                    session.clear_journey();
                    self.finish(
                        session,
                        vec![
                            PromptSpec::text(p.support_handoff),
                            PromptSpec::text(p.support_escalation_ack),
                        ],
                    )
                    .await
                }
                "download_app" => {
                    self.finish(
                        session,
                        vec![
                            PromptSpec::text(p.download_app_text),
                            prompts::support_closing(language),
                        ],
                    )
                    .await
                }
                "send_email" => {
                    self.finish(
                        session,
                        vec![
                            PromptSpec::text(p.send_email_text),
                            prompts::support_closing(language),
                        ],
                    )
                    .await
                }
                _ => {
                    self.finish(session, vec![prompts::support_menu(language)])
                        .await
                }
            },
            InboundPayload::Text(text) => {
                let normalized = text.trim().to_lowercase();
                if matches!(normalized.as_str(), "support" | "help") {
                    return self
                        .finish(session, vec![prompts::support_menu(language)])
                        .await;
                }
                if intent::detect(&event.payload, session.flag("loan_disbursed"))
                    == Some(TopLevelIntent::StartLoan)
                {
                    session.clear_journey();
                    return self.start_onboarding(session, now).await;
                }
                if let Some(answer) = support::knowledge_base_answer(text, language) {
                    self.audit
                        .record(
                            session.identity(),
                            AuditKind::SupportAnswer,
                            json!({"source": "kb"}),
                            now,
                        )
                        .await;
                    return self
                        .finish(
                            session,
                            vec![PromptSpec::text(answer), prompts::support_closing(language)],
                        )
                        .await;
                }
                if let Some(responder) = &self.support {
                    match self.with_deadline(responder.answer(text, language)).await {
                        Ok(Some(answer)) => {
                            self.audit
                                .record(
                                    session.identity(),
                                    AuditKind::SupportAnswer,
                                    json!({"source": "model"}),
                                    now,
                                )
                                .await;
                            return self
                                .finish(
                                    session,
                                    vec![
                                        PromptSpec::text(answer),
                                        prompts::support_closing(language),
                                    ],
                                )
                                .await;
                        }
                        Ok(None) => {}
                        Err(err) => {
                            return self
                                .handle_failure(session, StepFailure::Gateway(err), now)
                                .await;
                        }
                    }
                }
                self.finish(session, vec![prompts::escalation_offer(language)])
                    .await
            }
            InboundPayload::Media(_) => {
                self.finish(session, vec![prompts::support_menu(language)])
                    .await
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Post-loan journey
    // ─────────────────────────────────────────────────────────────────────

    async fn handle_post_loan(
        &self,
        mut session: Session,
        event: &InboundEvent,
        now: Timestamp,
    ) -> Result<ProcessOutcome, ProcessError> {
        let language = self.language_of(&session);
        let p = prompts::pack(session.language());
        let options = prompts::options_for(StepId::PostLoanMenu, &session);
        let raw = event.payload.as_input().unwrap_or("");

        match validation::validate(FieldKind::Choice { options: &options }, raw, now.date()) {
            Ok(value) => match value.as_text().unwrap_or("") {
                "post_view" => {
                    let out = vec![
                        prompts::loan_details(&session, language),
                        prompts::post_loan_menu(language),
                    ];
                    self.finish(session, out).await
                }
                "post_statement" => {
                    let out = vec![
                        PromptSpec::document(p.statement_caption),
                        prompts::post_loan_menu(language),
                    ];
                    self.finish(session, out).await
                }
                "post_repay" => {
                    let out = vec![
                        PromptSpec::text(p.repay_text),
                        prompts::post_loan_menu(language),
                    ];
                    self.finish(session, out).await
                }
                "post_support" => {
                    if let Err(err) = session.enter(Journey::Support) {
                        return self.recover_corruption(session, &err.to_string(), now).await;
                    }
                    let menu = prompts::support_menu(language);
                    self.finish(session, vec![menu]).await
                }
                _ => {
                    self.finish(session, vec![prompts::post_loan_menu(language)])
                        .await
                }
            },
            Err(_) => {
                match intent::detect(&event.payload, session.flag("loan_disbursed")) {
                    Some(TopLevelIntent::StartLoan) => {
                        session.clear_journey();
                        self.start_onboarding(session, now).await
                    }
                    Some(TopLevelIntent::OpenPostLoanMenu) => {
                        self.finish(session, vec![prompts::post_loan_menu(language)])
                            .await
                    }
                    // Routing miss: re-show the menu.
                    _ => {
                        let out = vec![
                            PromptSpec::text(p.invalid_choice),
                            prompts::post_loan_menu(language),
                        ];
                        self.finish(session, out).await
                    }
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Failure handling & plumbing
    // ─────────────────────────────────────────────────────────────────────

    async fn handle_failure(
        &self,
        session: Session,
        failure: StepFailure,
        now: Timestamp,
    ) -> Result<ProcessOutcome, ProcessError> {
        match failure {
            StepFailure::Gateway(err) => {
                tracing::error!(
                    identity = %session.identity(),
                    error = %err,
                    "gateway call failed; transition aborted"
                );
                let p = prompts::pack(session.language());
                // The session is intentionally not saved: from the state
                // machine's view this event was never processed.
                self.messenger
                    .send_prompt(session.identity(), PromptSpec::text(p.try_again))
                    .await?;
                Err(ProcessError::Gateway(err))
            }
            StepFailure::Corruption(detail) => {
                self.recover_corruption(session, &detail, now).await
            }
        }
    }

    /// A session referencing an unknown step or journey should never
    /// occur; guessing a recovery state would hide the defect, so the
    /// session is reset and the incident recorded.
    async fn recover_corruption(
        &self,
        mut session: Session,
        detail: &str,
        now: Timestamp,
    ) -> Result<ProcessOutcome, ProcessError> {
        tracing::error!(identity = %session.identity(), detail, "session state corrupt; resetting");
        self.audit
            .record(
                session.identity(),
                AuditKind::StateCorruption,
                json!({"detail": detail}),
                now,
            )
            .await;
        session.reset();
        let menu = prompts::top_level_menu(session.language());
        self.finish(session, menu).await
    }

    /// Persists the session, then emits the prompt set.
    async fn finish(
        &self,
        session: Session,
        out: Vec<PromptSpec>,
    ) -> Result<ProcessOutcome, ProcessError> {
        self.store.save(&session).await?;
        for prompt in &out {
            self.messenger
                .send_prompt(session.identity(), prompt.clone())
                .await?;
        }
        self.audit
            .record(
                session.identity(),
                AuditKind::PromptSent,
                json!({"count": out.len()}),
                session.last_activity_at(),
            )
            .await;
        Ok(ProcessOutcome {
            journey: session.journey(),
            current_step: session.current_step(),
            prompts: out,
        })
    }

    async fn with_deadline<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        match tokio::time::timeout(self.config.gateway_deadline(), fut).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::DeadlineExceeded),
        }
    }

    fn language_of(&self, session: &Session) -> Language {
        session.language().unwrap_or(self.config.default_language)
    }
}
