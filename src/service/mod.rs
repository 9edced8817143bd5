//! The remote step-definition and scoring service, as consumed by the
//! controller.
//!
//! The contract is shape-level: implementations own transport. The caller
//! guarantees at most one in-flight call per kind; the service itself may
//! not be idempotent, so retries are the caller's decision.

pub mod http;

pub use http::HttpSurveyService;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::step::model::{AnswerValue, IntakeStep};
use crate::summary::SurveyResult;

/// The service's reply to a submitted answer: either the interview is
/// complete, or a next step is waiting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub is_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step_id: Option<String>,
}

/// One step descriptor at a time, answer acceptance, and final scoring.
#[async_trait]
pub trait SurveyService: Send + Sync {
    /// Open a new interview session, returning its opaque token.
    async fn create_session(&self) -> Result<String, ServiceError>;

    /// Fetch the session's current step descriptor.
    async fn get_current_step(&self, session_id: &str) -> Result<IntakeStep, ServiceError>;

    /// Post an answer for a step.
    async fn submit_answer(
        &self,
        session_id: &str,
        step_id: &str,
        answer: &AnswerValue,
    ) -> Result<AnswerOutcome, ServiceError>;

    /// Compute the final result from the session's full answer set.
    async fn compute_result(&self, session_id: &str) -> Result<SurveyResult, ServiceError>;
}
