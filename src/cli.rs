//! Terminal front end — stdin/stdout REPL driving one interview.
//!
//! Transcript content goes to stdout; prompts, option lists, and status
//! lines go to stderr so a piped transcript stays clean.

use std::time::Duration;

use futures::{Stream, StreamExt};
use rand::Rng;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::{Error, Result};
use crate::format::{display_numeric, normalize_numeric};
use crate::session::controller::{InterviewController, Phase};
use crate::session::model::MessageOrigin;
use crate::step::model::{IntakeStep, StepKind};
use crate::step::visibility::with_group_headers;

const PROGRESS_SEGMENTS: u32 = 10;

const SUGGESTIONS: [&str; 3] = [
    "필요 서류가 뭔가요?",
    "도박 빚도 되나요?",
    "비용이 얼마인가요?",
];

/// Sequential cursor through a form step's visible fields.
struct FormCursor {
    step_id: String,
    index: usize,
}

struct CliFrontend {
    controller: InterviewController,
    printed: usize,
    form: Option<FormCursor>,
    chips_shown: bool,
}

/// Run the REPL until EOF or `/quit`.
pub async fn run(controller: InterviewController) -> Result<()> {
    let mut frontend = CliFrontend {
        controller,
        printed: 0,
        form: None,
        chips_shown: false,
    };
    frontend.flush_transcript();
    frontend.render_prompt();

    let lines = input_lines();
    futures::pin_mut!(lines);
    while let Some(line) = lines.next().await {
        let line = line.trim().to_string();
        match line.as_str() {
            "/quit" => break,
            "/reset" => {
                frontend.controller.reset();
                frontend.printed = 0;
                frontend.form = None;
                frontend.chips_shown = false;
            }
            _ => {
                if let Err(e) = frontend.handle(&line).await {
                    match e {
                        Error::Validation(reason) => eprintln!("⚠️  {reason}"),
                        other => eprintln!("⚠️  {other}"),
                    }
                }
            }
        }
        frontend.flush_transcript();
        frontend.render_prompt();
    }
    Ok(())
}

/// Turn stdin into a line stream on a background task.
fn input_lines() -> impl Stream<Item = String> {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    tokio::spawn(async move {
        let stdin = tokio::io::stdin();
        let reader = BufReader::new(stdin);
        let mut lines = reader.lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });
    futures::stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|l| (l, rx)) })
}

impl CliFrontend {
    async fn handle(&mut self, line: &str) -> Result<()> {
        match self.controller.phase() {
            Phase::Idle => self.controller.start().await,
            // Retryable failure states: any input retries.
            Phase::AwaitingStep => self.controller.load_step().await,
            Phase::Completing => self.controller.compute_result().await,
            Phase::AwaitingAnswer => self.handle_answer(line).await,
            Phase::FreeChat => self.handle_free_chat(line).await,
            // Transient phases are never observed between events.
            Phase::Starting | Phase::Submitting => Ok(()),
        }
    }

    async fn handle_answer(&mut self, line: &str) -> Result<()> {
        let Some(step) = self.controller.current_step().cloned() else {
            return Ok(());
        };
        match step.input_type {
            StepKind::Number => {
                let amount = normalize_numeric(line);
                if amount > 0 {
                    // Echo the grouped rendering before submitting.
                    eprintln!("   = {}원", display_numeric(amount));
                }
                self.controller.submit_amount(line).await
            }
            StepKind::SingleChoice | StepKind::YesNo => {
                match resolve_option(&step, line) {
                    Some(value) => self.controller.select_option(&value).await,
                    None => {
                        eprintln!("⚠️  항목 번호를 입력해주세요.");
                        Ok(())
                    }
                }
            }
            StepKind::MultiChoice => {
                if line.is_empty() || line == "확인" {
                    return self.controller.confirm_selection().await;
                }
                match resolve_option(&step, line) {
                    Some(value) => self.controller.select_option(&value).await,
                    None => {
                        eprintln!("⚠️  항목 번호를 입력해주세요.");
                        Ok(())
                    }
                }
            }
            StepKind::Form => self.handle_form_line(&step, line).await,
            StepKind::Info => Ok(()),
        }
    }

    async fn handle_form_line(&mut self, step: &IntakeStep, line: &str) -> Result<()> {
        let field_ids: Vec<String> = self
            .controller
            .visible_fields()
            .iter()
            .map(|f| f.id.clone())
            .collect();
        let index = match &self.form {
            Some(cursor) if cursor.step_id == step.step_id => cursor.index,
            _ => 0,
        };

        if let Some(field_id) = field_ids.get(index) {
            // An empty line leaves the field absent.
            if !line.is_empty() {
                self.controller.set_form_value(field_id, line)?;
            }
        }

        let next = index + 1;
        if next < field_ids.len() {
            self.form = Some(FormCursor {
                step_id: step.step_id.clone(),
                index: next,
            });
            Ok(())
        } else {
            self.form = None;
            match self.controller.submit_form().await {
                // Start over on a validation bounce so the missing field
                // can be filled in.
                Err(Error::Validation(reason)) => {
                    eprintln!("⚠️  {reason}");
                    self.form = Some(FormCursor {
                        step_id: step.step_id.clone(),
                        index: 0,
                    });
                    Ok(())
                }
                other => other,
            }
        }
    }

    async fn handle_free_chat(&mut self, line: &str) -> Result<()> {
        if line.is_empty() {
            return Ok(());
        }
        // Brief "typing" pause with jitter; response content itself is
        // deterministic.
        let jitter = rand::thread_rng().gen_range(0..400u64);
        tokio::time::sleep(self.controller.config().reply_delay + Duration::from_millis(jitter))
            .await;
        self.controller.free_chat(line)
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn flush_transcript(&mut self) {
        let transcript = &self.controller.session().transcript;
        for message in &transcript[self.printed..] {
            let tag = match message.origin {
                MessageOrigin::Assistant => "AI",
                MessageOrigin::Participant => "나",
            };
            println!("\n[{tag}] {}", message.content);
        }
        self.printed = transcript.len();
    }

    fn render_prompt(&mut self) {
        eprintln!();
        eprintln!("── {} {}", self.controller.status_label(), self.progress_bar());
        match self.controller.phase() {
            Phase::Idle => eprintln!("[Enter를 누르면 상담을 시작합니다. /quit 종료]"),
            Phase::AwaitingStep => eprintln!("[Enter를 누르면 다시 시도합니다]"),
            Phase::Completing => eprintln!("[Enter를 누르면 결과 계산을 다시 시도합니다]"),
            Phase::AwaitingAnswer => self.render_input_area(),
            Phase::FreeChat => {
                if !self.chips_shown {
                    eprintln!("추천 질문: {}", SUGGESTIONS.join(" · "));
                    self.chips_shown = true;
                }
            }
            Phase::Starting | Phase::Submitting => {}
        }
        eprint!("> ");
    }

    fn render_input_area(&mut self) {
        let Some(step) = self.controller.current_step().cloned() else {
            return;
        };
        if let Some(help) = &step.help_text {
            eprintln!("ℹ️  {help}");
        }
        match step.input_type {
            StepKind::SingleChoice | StepKind::YesNo | StepKind::MultiChoice => {
                for (i, option) in step.options.iter().enumerate() {
                    let mark = if self.controller.pending_selection().contains(&option.value) {
                        "✓"
                    } else {
                        " "
                    };
                    eprintln!("  {mark} {}. {}", i + 1, option.label);
                }
                if step.input_type == StepKind::MultiChoice {
                    eprintln!("[번호로 선택/해제, 빈 줄 또는 '확인'으로 완료]");
                }
            }
            StepKind::Number => eprintln!("[금액을 입력해주세요 (원)]"),
            StepKind::Form => self.render_form_field(&step),
            StepKind::Info => {}
        }
    }

    fn render_form_field(&mut self, step: &IntakeStep) {
        let visible = self.controller.visible_fields();
        let index = match &self.form {
            Some(cursor) if cursor.step_id == step.step_id => cursor.index,
            _ => {
                eprintln!("재산 정보 입력 — 해당하는 항목의 금액을 입력해주세요. (없으면 빈 줄)");
                0
            }
        };
        let annotated = with_group_headers(&visible);
        if let Some((field, show_header)) = annotated.get(index) {
            if *show_header {
                if let Some(group) = &field.group {
                    eprintln!("· {group}");
                }
            }
            let required = if field.required { " *" } else { "" };
            eprintln!("  {}{required} ({}/{})", field.label, index + 1, annotated.len());
            if let Some(help) = &field.help {
                eprintln!("    {help}");
            }
        }
        self.form = Some(FormCursor {
            step_id: step.step_id.clone(),
            index,
        });
    }

    fn progress_bar(&self) -> String {
        let done = self
            .controller
            .session()
            .steps_completed
            .min(PROGRESS_SEGMENTS);
        let started = self.controller.phase() != Phase::Idle;
        (0..PROGRESS_SEGMENTS)
            .map(|i| {
                if i < done {
                    '●'
                } else if i == done && started {
                    '◉'
                } else {
                    '○'
                }
            })
            .collect()
    }
}

/// Resolve user input to an option value: a 1-based index, an option
/// value, or an option label.
fn resolve_option(step: &IntakeStep, input: &str) -> Option<String> {
    if let Ok(index) = input.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| step.options.get(i))
            .map(|o| o.value.clone());
    }
    step.options
        .iter()
        .find(|o| o.value == input || o.label == input)
        .map(|o| o.value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::model::ChoiceOption;

    fn step() -> IntakeStep {
        IntakeStep {
            step_id: "s1".into(),
            title: String::new(),
            question: String::new(),
            input_type: StepKind::SingleChoice,
            options: vec![
                ChoiceOption { value: "owned".into(), label: "자가".into() },
                ChoiceOption { value: "rent_deposit".into(), label: "전월세".into() },
            ],
            validation: None,
            category: None,
            progress: None,
            total_steps: None,
            is_first: None,
            is_last: None,
            help_text: None,
        }
    }

    #[test]
    fn resolves_one_based_index() {
        assert_eq!(resolve_option(&step(), "1").as_deref(), Some("owned"));
        assert_eq!(resolve_option(&step(), "2").as_deref(), Some("rent_deposit"));
        assert_eq!(resolve_option(&step(), "0"), None);
        assert_eq!(resolve_option(&step(), "3"), None);
    }

    #[test]
    fn resolves_value_and_label() {
        assert_eq!(resolve_option(&step(), "owned").as_deref(), Some("owned"));
        assert_eq!(resolve_option(&step(), "전월세").as_deref(), Some("rent_deposit"));
        assert_eq!(resolve_option(&step(), "몰라요"), None);
    }
}
