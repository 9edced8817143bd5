//! The interview controller — owns one session end-to-end and drives the
//! start → step-load → answer-submit → completion transitions.
//!
//! Every operation is an `async fn` that runs to completion before the
//! next event is handled; the service calls inside are the only
//! suspension points. Network failures are reported in-band: the failure
//! path appends exactly one assistant message and the method returns
//! `Ok(())`. An `Err` from these methods means local misuse (wrong phase,
//! rejected validation, duplicate in-flight call) and produces no
//! transcript entry.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::chat::ChatRules;
use crate::config::IntakeConfig;
use crate::error::{CallKind, Error, Result};
use crate::format::display_numeric;
use crate::service::SurveyService;
use crate::session::inflight::InflightGuard;
use crate::session::model::{Session, SessionMode};
use crate::session::progress::{CaptionSink, CaptionTicker};
use crate::step::model::{AnswerValue, FormField, IntakeStep, StepKind};
use crate::step::validate::{self, Candidate};
use crate::step::visibility;
use crate::summary::{ResultSummary, SurveyResult};

/// Fixed assistant-message texts.
pub mod messages {
    pub const START_ACK: &str = "좋아요! 그럼 시작해볼게요. 😊";
    pub const CONNECT_FAILED: &str = "서버 연결에 실패했습니다. 잠시 후 다시 시도해주세요.";
    pub const STEP_LOAD_FAILED: &str = "단계를 불러오는데 실패했습니다.";
    pub const SUBMIT_FAILED: &str = "죄송합니다. 오류가 발생했습니다. 다시 시도해주세요.";
    pub const COMPUTE_FAILED: &str = "결과 계산 중 오류가 발생했습니다. 다시 시도해주세요.";
    pub const FORM_SUBMITTED: &str = "재산 정보 입력 완료";
    pub const FREE_CHAT_INVITE: &str = "위 결과는 입력하신 정보를 바탕으로 한 예상치입니다.\n\n\
        궁금한 점이 있으시면 자유롭게 질문해주세요!\n\
        예: \"도박 빚도 가능한가요?\", \"필요 서류가 뭔가요?\" 등";
}

/// Controller phases.
///
/// `Idle` is initial. `FreeChat` is terminal for the interview portion:
/// the only way back is a full reset to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Starting,
    AwaitingStep,
    AwaitingAnswer,
    Submitting,
    Completing,
    FreeChat,
}

impl Phase {
    /// Check if a transition from `self` to `target` is valid. Reset to
    /// `Idle` is handled separately and is valid from anywhere.
    pub fn can_transition_to(&self, target: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, target),
            (Idle, Starting)
                | (Starting, AwaitingStep)
                | (Starting, Idle)
                | (AwaitingStep, AwaitingAnswer)
                | (AwaitingStep, Completing)
                | (AwaitingAnswer, Submitting)
                | (Submitting, AwaitingStep)
                | (Submitting, Completing)
                | (Submitting, AwaitingAnswer)
                | (Completing, FreeChat)
        )
    }

    /// Whether the interview portion is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::FreeChat)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::AwaitingStep => "awaiting_step",
            Self::AwaitingAnswer => "awaiting_answer",
            Self::Submitting => "submitting",
            Self::Completing => "completing",
            Self::FreeChat => "free_chat",
        };
        write!(f, "{s}")
    }
}

/// Drives one interview session against a survey service.
pub struct InterviewController {
    config: IntakeConfig,
    service: Arc<dyn SurveyService>,
    responder: ChatRules,
    session: Session,
    phase: Phase,
    current_step: Option<IntakeStep>,
    pending_selection: Vec<String>,
    form_values: BTreeMap<String, u64>,
    result: Option<SurveyResult>,
    guard: InflightGuard,
    caption_sink: Option<CaptionSink>,
}

impl InterviewController {
    pub fn new(config: IntakeConfig, service: Arc<dyn SurveyService>) -> Self {
        Self {
            config,
            service,
            responder: ChatRules::default_rules(),
            session: Session::new(),
            phase: Phase::Idle,
            current_step: None,
            pending_selection: Vec::new(),
            form_values: BTreeMap::new(),
            result: None,
            guard: InflightGuard::new(),
            caption_sink: None,
        }
    }

    /// Attach a listener for the compute-phase progress captions.
    pub fn with_caption_sink(mut self, sink: CaptionSink) -> Self {
        self.caption_sink = Some(sink);
        self
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_step(&self) -> Option<&IntakeStep> {
        self.current_step.as_ref()
    }

    pub fn pending_selection(&self) -> &[String] {
        &self.pending_selection
    }

    pub fn form_values(&self) -> &BTreeMap<String, u64> {
        &self.form_values
    }

    pub fn result(&self) -> Option<&SurveyResult> {
        self.result.as_ref()
    }

    /// The current form step's relevant fields, in declaration order.
    pub fn visible_fields(&self) -> Vec<&FormField> {
        match &self.current_step {
            Some(step) => visibility::visible_fields(step, &self.session.answers),
            None => Vec::new(),
        }
    }

    /// Header status line for the front end.
    pub fn status_label(&self) -> &'static str {
        match self.phase {
            Phase::Idle => "대기 중",
            Phase::AwaitingAnswer => "응답 대기 중",
            Phase::FreeChat => "상담 중",
            _ => "분석 중...",
        }
    }

    // ── Interview transitions ───────────────────────────────────────

    /// Open a session and load the first step. Valid from `Idle` only.
    pub async fn start(&mut self) -> Result<()> {
        self.ensure_phase(Phase::Idle, "start")?;
        let token = self
            .guard
            .begin(CallKind::CreateSession)
            .ok_or(Error::RequestInFlight(CallKind::CreateSession))?;
        self.transition(Phase::Starting);

        let created = self.service.create_session().await;
        self.guard.finish(CallKind::CreateSession);
        if !self.guard.is_current(&token) {
            tracing::debug!("discarding session-create response for a reset session");
            return Ok(());
        }

        match created {
            Ok(session_id) => {
                tracing::info!(session_id = %session_id, "session created");
                self.session.id = Some(session_id);
                self.session.push_assistant(messages::START_ACK);
                self.transition(Phase::AwaitingStep);
                self.load_step().await
            }
            Err(e) => {
                tracing::warn!(error = %e, "session create failed");
                self.session.push_assistant(messages::CONNECT_FAILED);
                self.session.id = None;
                self.transition(Phase::Idle);
                Ok(())
            }
        }
    }

    /// Fetch the current step. Valid from `AwaitingStep`; a failure keeps
    /// the phase so the surrounding UI can retry.
    pub async fn load_step(&mut self) -> Result<()> {
        self.ensure_phase(Phase::AwaitingStep, "load_step")?;
        let session_id = self.session.id.clone().ok_or(Error::NoSession)?;
        let token = self
            .guard
            .begin(CallKind::LoadStep)
            .ok_or(Error::RequestInFlight(CallKind::LoadStep))?;

        let fetched = self.service.get_current_step(&session_id).await;
        self.guard.finish(CallKind::LoadStep);
        if !self.guard.is_current(&token) {
            tracing::debug!("discarding step response for a reset session");
            return Ok(());
        }

        match fetched {
            Ok(step) => {
                self.pending_selection.clear();
                self.form_values.clear();
                if step.input_type.is_terminal() {
                    self.current_step = Some(step);
                    self.begin_completion();
                    return self.compute_result().await;
                }
                tokio::time::sleep(self.config.step_message_delay).await;
                self.session
                    .push_assistant(format!("{}\n{}", step.title, step.question));
                self.current_step = Some(step);
                self.transition(Phase::AwaitingAnswer);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "step load failed");
                self.session.push_assistant(messages::STEP_LOAD_FAILED);
                Ok(())
            }
        }
    }

    /// Handle an option selection on the current step. Single-choice and
    /// yes/no selections auto-submit after the configured debounce;
    /// multi-choice selections toggle and wait for `confirm_selection`.
    pub async fn select_option(&mut self, value: &str) -> Result<()> {
        self.ensure_phase(Phase::AwaitingAnswer, "select_option")?;
        let step = self.require_step("select_option")?;
        match step.input_type {
            StepKind::SingleChoice | StepKind::YesNo => {
                self.pending_selection = vec![value.to_string()];
                tokio::time::sleep(self.config.select_debounce).await;
                let answer = validate::validate(
                    &step,
                    &Candidate::Choice(value.to_string()),
                    &self.session.answers,
                )?;
                self.submit_validated(&step, answer).await
            }
            StepKind::MultiChoice => {
                if let Some(at) = self.pending_selection.iter().position(|v| v == value) {
                    self.pending_selection.remove(at);
                } else {
                    self.pending_selection.push(value.to_string());
                }
                Ok(())
            }
            kind => {
                tracing::debug!(%kind, "ignoring option selection on a non-choice step");
                Ok(())
            }
        }
    }

    /// Confirm the accumulated multi-choice selection.
    pub async fn confirm_selection(&mut self) -> Result<()> {
        self.ensure_phase(Phase::AwaitingAnswer, "confirm_selection")?;
        let step = self.require_step("confirm_selection")?;
        let answer = validate::validate(
            &step,
            &Candidate::Selections(self.pending_selection.clone()),
            &self.session.answers,
        )?;
        self.submit_validated(&step, answer).await
    }

    /// Submit raw text entered on a number step.
    pub async fn submit_amount(&mut self, raw: &str) -> Result<()> {
        self.ensure_phase(Phase::AwaitingAnswer, "submit_amount")?;
        let step = self.require_step("submit_amount")?;
        let answer = validate::validate(
            &step,
            &Candidate::Text(raw.to_string()),
            &self.session.answers,
        )?;
        self.submit_validated(&step, answer).await
    }

    /// Set one field of the current form step from raw text. A value that
    /// normalizes to zero clears the field (absent, not zero).
    pub fn set_form_value(&mut self, field_id: &str, raw: &str) -> Result<()> {
        self.ensure_phase(Phase::AwaitingAnswer, "set_form_value")?;
        let step = self.require_step("set_form_value")?;
        if !step.fields().iter().any(|f| f.id == field_id) {
            return Err(Error::Validation(
                crate::error::ValidationError::UnknownField {
                    id: field_id.to_string(),
                },
            ));
        }
        let amount = crate::format::normalize_numeric(raw);
        if amount == 0 {
            self.form_values.remove(field_id);
        } else {
            self.form_values.insert(field_id.to_string(), amount);
        }
        Ok(())
    }

    /// Submit the collected form values.
    pub async fn submit_form(&mut self) -> Result<()> {
        self.ensure_phase(Phase::AwaitingAnswer, "submit_form")?;
        let step = self.require_step("submit_form")?;
        let answer = validate::validate(
            &step,
            &Candidate::Form(self.form_values.clone()),
            &self.session.answers,
        )?;
        self.submit_validated(&step, answer).await
    }

    async fn submit_validated(&mut self, step: &IntakeStep, answer: AnswerValue) -> Result<()> {
        let session_id = self.session.id.clone().ok_or(Error::NoSession)?;
        let token = self
            .guard
            .begin(CallKind::SubmitAnswer)
            .ok_or(Error::RequestInFlight(CallKind::SubmitAnswer))?;

        self.session.push_participant(display_for(step, &answer));
        // The recorded value wins: a retry after transport failure posts
        // what was originally recorded.
        let answer = self.session.record_answer(step.step_id.clone(), answer).clone();
        self.transition(Phase::Submitting);

        let outcome = self
            .service
            .submit_answer(&session_id, &step.step_id, &answer)
            .await;
        self.guard.finish(CallKind::SubmitAnswer);
        if !self.guard.is_current(&token) {
            tracing::debug!("discarding submit response for a reset session");
            return Ok(());
        }

        match outcome {
            Ok(outcome) if outcome.is_complete => {
                self.begin_completion();
                self.compute_result().await
            }
            Ok(outcome) => {
                if outcome.next_step_id.is_none() {
                    tracing::warn!(
                        step_id = %step.step_id,
                        "submit outcome carried neither completion nor a next step"
                    );
                    self.transition(Phase::AwaitingStep);
                    return Ok(());
                }
                self.session.steps_completed += 1;
                self.transition(Phase::AwaitingStep);
                self.load_step().await
            }
            Err(e) => {
                tracing::warn!(error = %e, step_id = %step.step_id, "answer submit failed");
                self.session.push_assistant(messages::SUBMIT_FAILED);
                self.transition(Phase::AwaitingAnswer);
                Ok(())
            }
        }
    }

    // ── Completion ──────────────────────────────────────────────────

    /// Invoke the scoring service and, on success, hand the session over
    /// to free-chat mode. Valid from `Completing`; a failure keeps the
    /// phase so the computation can be retried.
    pub async fn compute_result(&mut self) -> Result<()> {
        self.ensure_phase(Phase::Completing, "compute_result")?;
        let session_id = self.session.id.clone().ok_or(Error::NoSession)?;
        let token = self
            .guard
            .begin(CallKind::ComputeResult)
            .ok_or(Error::RequestInFlight(CallKind::ComputeResult))?;

        let ticker = self
            .caption_sink
            .clone()
            .map(|sink| CaptionTicker::spawn(self.config.caption_interval, sink));
        let computed = self.service.compute_result(&session_id).await;
        // Cancelled on success and failure alike; the ticker must not
        // outlive the call that owns it.
        if let Some(ticker) = ticker {
            ticker.stop();
        }
        self.guard.finish(CallKind::ComputeResult);
        if !self.guard.is_current(&token) {
            tracing::debug!("discarding compute response for a reset session");
            return Ok(());
        }

        match computed {
            Ok(result) => {
                tracing::info!(rate = result.repayment_rate, "result computed");
                self.session
                    .push_assistant(ResultSummary::from_result(&result).render());
                self.result = Some(result);
                tokio::time::sleep(self.config.invite_delay).await;
                self.session.push_assistant(messages::FREE_CHAT_INVITE);
                self.current_step = None;
                self.transition(Phase::FreeChat);
                self.session.mode = SessionMode::FreeChat;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "result compute failed");
                self.session.push_assistant(messages::COMPUTE_FAILED);
                Ok(())
            }
        }
    }

    // ── Free chat ───────────────────────────────────────────────────

    /// Answer a free-text question via the canned-response table.
    pub fn free_chat(&mut self, text: &str) -> Result<()> {
        self.ensure_phase(Phase::FreeChat, "free_chat")?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        self.session.push_participant(trimmed);
        let response = self.responder.respond(trimmed, self.result.as_ref());
        self.session.push_assistant(response);
        Ok(())
    }

    // ── Reset ───────────────────────────────────────────────────────

    /// Discard all state unconditionally and return to a fresh, unstarted
    /// session. Any late-arriving response to the discarded session is
    /// detected via the request generation and ignored.
    pub fn reset(&mut self) {
        tracing::debug!("session reset");
        self.guard.bump_generation();
        self.session = Session::new();
        self.current_step = None;
        self.pending_selection.clear();
        self.form_values.clear();
        self.result = None;
        self.phase = Phase::Idle;
    }

    // ── Helpers ─────────────────────────────────────────────────────

    fn begin_completion(&mut self) {
        self.transition(Phase::Completing);
        self.session.mode = SessionMode::Completing;
    }

    fn transition(&mut self, to: Phase) {
        debug_assert!(
            self.phase.can_transition_to(to),
            "invalid phase transition {} -> {}",
            self.phase,
            to
        );
        tracing::debug!(from = %self.phase, to = %to, "phase transition");
        self.phase = to;
    }

    fn ensure_phase(&self, expected: Phase, op: &'static str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(Error::InvalidPhase {
                op,
                phase: self.phase.to_string(),
            })
        }
    }

    fn require_step(&self, op: &'static str) -> Result<IntakeStep> {
        self.current_step.clone().ok_or(Error::InvalidPhase {
            op,
            phase: self.phase.to_string(),
        })
    }
}

/// The participant-facing rendering of an accepted answer.
fn display_for(step: &IntakeStep, answer: &AnswerValue) -> String {
    match answer {
        AnswerValue::Amount(n) => format!("{}원", display_numeric(*n)),
        AnswerValue::Choice(v) => step.option_label(v).to_string(),
        AnswerValue::Selections(vs) => vs
            .iter()
            .map(|v| step.option_label(v))
            .collect::<Vec<_>>()
            .join(", "),
        AnswerValue::Form(_) => messages::FORM_SUBMITTED.to_string(),
    }
}
