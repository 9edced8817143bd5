//! Step descriptors and typed answers, matching the survey service's wire
//! shapes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The closed set of step input kinds served by the survey service.
///
/// `info` is the terminal marker: reaching it triggers result computation
/// without prompting the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    SingleChoice,
    MultiChoice,
    Number,
    YesNo,
    Form,
    Info,
}

impl StepKind {
    /// Whether selecting an option submits immediately (no confirmation step).
    pub fn auto_submits(&self) -> bool {
        matches!(self, Self::SingleChoice | Self::YesNo)
    }

    /// Whether reaching this step ends the interview.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Info)
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SingleChoice => "single_choice",
            Self::MultiChoice => "multi_choice",
            Self::Number => "number",
            Self::YesNo => "yes_no",
            Self::Form => "form",
            Self::Info => "info",
        };
        write!(f, "{s}")
    }
}

/// One selectable option of a choice step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

/// The field list of a form step, nested under `validation` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepValidation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FormField>,
}

/// One named amount field of a form step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// Fields sharing a group render together under one header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Visibility condition tag, evaluated against prior answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// One question/prompt unit of the guided interview.
///
/// Exactly one step is current at any time; it is replaced wholesale on
/// every successful load, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeStep {
    pub step_id: String,
    pub title: String,
    pub question: String,
    pub input_type: StepKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<StepValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_first: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_last: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

impl IntakeStep {
    /// Form fields declared by this step, in declaration order.
    pub fn fields(&self) -> &[FormField] {
        self.validation
            .as_ref()
            .map(|v| v.fields.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    /// Resolve an option value to its display label, falling back to the
    /// raw value for unknown options.
    pub fn option_label<'a>(&'a self, value: &'a str) -> &'a str {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
            .unwrap_or(value)
    }
}

/// A recorded, typed answer. Serializes untagged to the wire shapes the
/// service expects: number, string, string array, or field/amount object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Amount(u64),
    Choice(String),
    Selections(Vec<String>),
    Form(BTreeMap<String, u64>),
}

impl AnswerValue {
    pub fn as_choice(&self) -> Option<&str> {
        match self {
            Self::Choice(v) => Some(v),
            _ => None,
        }
    }

    /// The selection set of a multi-choice answer; anything else is an
    /// empty set.
    pub fn as_selections(&self) -> &[String] {
        match self {
            Self::Selections(v) => v,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_json() -> serde_json::Value {
        serde_json::json!({
            "step_id": "step_03_housing",
            "title": "주거 형태",
            "question": "현재 주거 형태를 선택해주세요.",
            "input_type": "single_choice",
            "options": [
                {"value": "owned", "label": "자가"},
                {"value": "rent_deposit", "label": "전월세 (보증금 있음)"}
            ],
            "progress": 3,
            "total_steps": 10
        })
    }

    #[test]
    fn step_deserializes_from_wire_shape() {
        let step: IntakeStep = serde_json::from_value(step_json()).unwrap();
        assert_eq!(step.step_id, "step_03_housing");
        assert_eq!(step.input_type, StepKind::SingleChoice);
        assert_eq!(step.options.len(), 2);
        assert!(step.fields().is_empty());
        assert_eq!(step.progress, Some(3));
        assert!(step.is_last.is_none());
    }

    #[test]
    fn form_fields_nested_under_validation() {
        let step: IntakeStep = serde_json::from_value(serde_json::json!({
            "step_id": "step_09_amounts",
            "title": "재산 정보",
            "question": "해당하는 항목의 금액을 입력해주세요.",
            "input_type": "form",
            "validation": {
                "fields": [
                    {"id": "deposit", "label": "예금", "required": true, "group": "금융자산"},
                    {"id": "crypto_value", "label": "가상자산", "condition": "crypto", "group": "금융자산"}
                ]
            }
        }))
        .unwrap();
        let fields = step.fields();
        assert_eq!(fields.len(), 2);
        assert!(fields[0].required);
        assert!(!fields[1].required);
        assert_eq!(fields[1].condition.as_deref(), Some("crypto"));
    }

    #[test]
    fn option_label_falls_back_to_value() {
        let step: IntakeStep = serde_json::from_value(step_json()).unwrap();
        assert_eq!(step.option_label("owned"), "자가");
        assert_eq!(step.option_label("mystery"), "mystery");
    }

    #[test]
    fn answers_serialize_to_wire_shapes() {
        assert_eq!(
            serde_json::to_value(AnswerValue::Amount(3_000_000)).unwrap(),
            serde_json::json!(3_000_000)
        );
        assert_eq!(
            serde_json::to_value(AnswerValue::Choice("owned".into())).unwrap(),
            serde_json::json!("owned")
        );
        assert_eq!(
            serde_json::to_value(AnswerValue::Selections(vec!["crypto".into(), "vehicle".into()]))
                .unwrap(),
            serde_json::json!(["crypto", "vehicle"])
        );
        let mut form = BTreeMap::new();
        form.insert("deposit".to_string(), 1_000_000u64);
        assert_eq!(
            serde_json::to_value(AnswerValue::Form(form)).unwrap(),
            serde_json::json!({"deposit": 1_000_000})
        );
    }

    #[test]
    fn answers_deserialize_untagged() {
        let v: AnswerValue = serde_json::from_value(serde_json::json!("yes")).unwrap();
        assert_eq!(v, AnswerValue::Choice("yes".into()));
        let v: AnswerValue = serde_json::from_value(serde_json::json!(42)).unwrap();
        assert_eq!(v, AnswerValue::Amount(42));
        let v: AnswerValue = serde_json::from_value(serde_json::json!(["a", "b"])).unwrap();
        assert_eq!(v.as_selections(), ["a", "b"]);
    }

    #[test]
    fn step_kind_flags() {
        assert!(StepKind::SingleChoice.auto_submits());
        assert!(StepKind::YesNo.auto_submits());
        assert!(!StepKind::MultiChoice.auto_submits());
        assert!(StepKind::Info.is_terminal());
        assert!(!StepKind::Form.is_terminal());
    }
}
