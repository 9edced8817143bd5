//! Owned session state: identity, transcript, and recorded answers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::step::model::AnswerValue;

/// Greeting seeded into every fresh session's transcript.
pub const GREETING: &str = "안녕하세요! 👋 아크로 AI 상담사입니다.\n\
    몇 가지 질문에 답해주시면 예상 변제율과 월 변제금을 계산해드릴게요.\n\
    약 3분 정도 소요됩니다.";

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageOrigin {
    Assistant,
    Participant,
}

/// One entry of the conversation record. The transcript is append-only;
/// entries are never reordered or deleted except on full session reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub id: Uuid,
    pub origin: MessageOrigin,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl TranscriptMessage {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageOrigin::Assistant, content)
    }

    pub fn participant(content: impl Into<String>) -> Self {
        Self::new(MessageOrigin::Participant, content)
    }

    fn new(origin: MessageOrigin, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            content: content.into(),
            sent_at: Utc::now(),
        }
    }
}

/// Which stretch of the conversation the session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Interview,
    Completing,
    FreeChat,
}

/// One interview session, owned by exactly one controller.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque token issued by the survey service; absent until `start`.
    pub id: Option<String>,
    pub transcript: Vec<TranscriptMessage>,
    /// Recorded answers keyed by step id. Keys are unique; an answer is
    /// recorded once and reused on submit retry.
    pub answers: HashMap<String, AnswerValue>,
    pub steps_completed: u32,
    pub mode: SessionMode,
}

impl Session {
    /// A fresh, unstarted session carrying only the greeting.
    pub fn new() -> Self {
        Self {
            id: None,
            transcript: vec![TranscriptMessage::assistant(GREETING)],
            answers: HashMap::new(),
            steps_completed: 0,
            mode: SessionMode::Interview,
        }
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.transcript.push(TranscriptMessage::assistant(content));
    }

    pub fn push_participant(&mut self, content: impl Into<String>) {
        self.transcript.push(TranscriptMessage::participant(content));
    }

    /// Record an answer for a step, returning the recorded value. Answers
    /// are immutable once recorded: a second record for the same step id
    /// keeps (and returns) the first value, so a submit retry posts what
    /// was originally recorded.
    pub fn record_answer(&mut self, step_id: impl Into<String>, value: AnswerValue) -> &AnswerValue {
        self.answers.entry(step_id.into()).or_insert(value)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
