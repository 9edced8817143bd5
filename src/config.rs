//! Configuration types.

use std::time::Duration;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Base URL of the survey step/scoring service.
    pub api_base: String,
    /// Debounce after a single-choice selection before auto-submit.
    pub select_debounce: Duration,
    /// Pause before a loaded step's question is appended to the transcript.
    pub step_message_delay: Duration,
    /// Interval between progress captions while a result is being computed.
    pub caption_interval: Duration,
    /// Pause between the result summary and the free-chat invitation.
    pub invite_delay: Duration,
    /// Base pause before a free-chat reply is shown (jitter is added by the CLI).
    pub reply_delay: Duration,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000/api".to_string(),
            select_debounce: Duration::from_millis(300),
            step_message_delay: Duration::from_millis(500),
            caption_interval: Duration::from_millis(1200),
            invite_delay: Duration::from_millis(800),
            reply_delay: Duration::from_millis(800),
        }
    }
}

impl IntakeConfig {
    /// Build a configuration from environment variables, falling back to
    /// the defaults above.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base: std::env::var("INTAKE_API_BASE").unwrap_or(defaults.api_base),
            select_debounce: env_ms("INTAKE_SELECT_DEBOUNCE_MS", defaults.select_debounce),
            step_message_delay: env_ms("INTAKE_STEP_MESSAGE_DELAY_MS", defaults.step_message_delay),
            caption_interval: env_ms("INTAKE_CAPTION_INTERVAL_MS", defaults.caption_interval),
            invite_delay: env_ms("INTAKE_INVITE_DELAY_MS", defaults.invite_delay),
            reply_delay: env_ms("INTAKE_REPLY_DELAY_MS", defaults.reply_delay),
        }
    }

    /// Configuration with every pacing delay zeroed (for tests).
    pub fn immediate() -> Self {
        Self {
            select_debounce: Duration::ZERO,
            step_message_delay: Duration::ZERO,
            caption_interval: Duration::ZERO,
            invite_delay: Duration::ZERO,
            reply_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

fn env_ms(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}
