//! Error types for Intake Assist.

/// The four kinds of calls made against the remote survey service.
///
/// Used both to tag `ServiceError`s and as the key of the per-kind
/// in-flight guard (`session::inflight`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    CreateSession,
    LoadStep,
    SubmitAnswer,
    ComputeResult,
}

impl std::fmt::Display for CallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CreateSession => "create_session",
            Self::LoadStep => "load_step",
            Self::SubmitAnswer => "submit_answer",
            Self::ComputeResult => "compute_result",
        };
        write!(f, "{s}")
    }
}

/// Top-level error type for the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Operation {op} is not valid in phase {phase}")]
    InvalidPhase { op: &'static str, phase: String },

    #[error("No active session")]
    NoSession,

    #[error("A {0} request is already in flight")]
    RequestInFlight(CallKind),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the remote survey service, one variant per call kind.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Session create failed: {reason}")]
    SessionCreate { reason: String },

    #[error("Step load failed: {reason}")]
    StepLoad { reason: String },

    #[error("Answer submit failed: {reason}")]
    AnswerSubmit { reason: String },

    #[error("Result compute failed: {reason}")]
    Compute { reason: String },
}

impl ServiceError {
    /// Which call kind produced this error.
    pub fn kind(&self) -> CallKind {
        match self {
            Self::SessionCreate { .. } => CallKind::CreateSession,
            Self::StepLoad { .. } => CallKind::LoadStep,
            Self::AnswerSubmit { .. } => CallKind::SubmitAnswer,
            Self::Compute { .. } => CallKind::ComputeResult,
        }
    }
}

/// Local answer validation failures.
///
/// Never triggers a state transition or a network call, and never enters
/// the transcript; the Display text is the user-facing reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("숫자를 입력해주세요.")]
    AmountRequired,

    #[error("항목을 선택해주세요.")]
    SelectionRequired,

    #[error("선택할 수 없는 항목입니다: {value}")]
    UnknownOption { value: String },

    #[error("입력할 수 없는 항목입니다: {id}")]
    UnknownField { id: String },

    #[error("필수 항목을 입력해주세요: {label}")]
    RequiredFieldMissing { label: String },
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, Error>;
