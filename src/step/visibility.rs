//! Field visibility for form steps.
//!
//! A field's `condition` tag is evaluated against answers recorded in
//! *earlier* steps, never against the current form's in-progress values.
//! Unrecognized tags fail closed: an unvalidated field must never surface
//! by accident.

use std::collections::HashMap;

use crate::step::model::{AnswerValue, FormField, IntakeStep};

/// Step whose answer decides housing-related conditions.
pub const STEP_HOUSING: &str = "step_03_housing";
/// Step whose multi-choice answer lists owned asset categories.
pub const STEP_ASSETS: &str = "step_07_assets";
/// Step whose answer decides the retirement-fund condition.
pub const STEP_RETIREMENT: &str = "step_08_retirement";

/// Asset-category tags that test membership in the assets answer.
const ASSET_CATEGORIES: [&str; 5] = [
    "deposit_over",
    "insurance_savings",
    "securities",
    "crypto",
    "vehicle",
];

/// Decide whether a form field is currently relevant.
pub fn is_visible(field: &FormField, answers: &HashMap<String, AnswerValue>) -> bool {
    let Some(condition) = field.condition.as_deref() else {
        return true;
    };

    if ASSET_CATEGORIES.contains(&condition) {
        return answers
            .get(STEP_ASSETS)
            .map(|a| a.as_selections().iter().any(|v| v == condition))
            .unwrap_or(false);
    }

    match condition {
        "rent_deposit" => choice_equals(answers, STEP_HOUSING, "rent_deposit"),
        "housing_owned" => choice_equals(answers, STEP_HOUSING, "owned"),
        "retirement_fund" => choice_equals(answers, STEP_RETIREMENT, "retirement_fund"),
        _ => {
            tracing::debug!(condition, "unrecognized visibility condition, hiding field");
            false
        }
    }
}

fn choice_equals(answers: &HashMap<String, AnswerValue>, step_id: &str, expected: &str) -> bool {
    answers
        .get(step_id)
        .and_then(|a| a.as_choice())
        .map(|v| v == expected)
        .unwrap_or(false)
}

/// The currently relevant fields of a step, in declaration order.
pub fn visible_fields<'a>(
    step: &'a IntakeStep,
    answers: &HashMap<String, AnswerValue>,
) -> Vec<&'a FormField> {
    step.fields()
        .iter()
        .filter(|f| is_visible(f, answers))
        .collect()
}

/// Pair each visible field with whether a group header precedes it.
///
/// A header is shown at the first field whose group differs from the last
/// shown group; ungrouped fields never show a header and never reset the
/// last shown group.
pub fn with_group_headers<'a>(fields: &[&'a FormField]) -> Vec<(&'a FormField, bool)> {
    let mut current: Option<&str> = None;
    fields
        .iter()
        .map(|field| {
            let show = match field.group.as_deref() {
                Some(group) => current != Some(group),
                None => false,
            };
            if show {
                current = field.group.as_deref();
            }
            (*field, show)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::model::{StepKind, StepValidation};

    fn field(id: &str, condition: Option<&str>) -> FormField {
        FormField {
            id: id.to_string(),
            label: id.to_string(),
            required: false,
            help: None,
            tooltip: None,
            group: None,
            condition: condition.map(String::from),
        }
    }

    fn grouped(id: &str, group: Option<&str>) -> FormField {
        FormField {
            group: group.map(String::from),
            ..field(id, None)
        }
    }

    #[test]
    fn unconditioned_field_is_always_visible() {
        assert!(is_visible(&field("deposit", None), &HashMap::new()));
    }

    #[test]
    fn housing_condition_matches_recorded_choice() {
        let mut answers = HashMap::new();
        answers.insert(
            STEP_HOUSING.to_string(),
            AnswerValue::Choice("rent_deposit".into()),
        );
        assert!(is_visible(&field("deposit_amount", Some("rent_deposit")), &answers));

        answers.insert(STEP_HOUSING.to_string(), AnswerValue::Choice("owned".into()));
        assert!(!is_visible(&field("deposit_amount", Some("rent_deposit")), &answers));
        assert!(is_visible(&field("home_value", Some("housing_owned")), &answers));
    }

    #[test]
    fn unanswered_condition_step_hides_field() {
        assert!(!is_visible(
            &field("deposit_amount", Some("rent_deposit")),
            &HashMap::new()
        ));
    }

    #[test]
    fn asset_condition_tests_membership() {
        let mut answers = HashMap::new();
        answers.insert(
            STEP_ASSETS.to_string(),
            AnswerValue::Selections(vec!["crypto".into(), "vehicle".into()]),
        );
        assert!(is_visible(&field("vehicle_value", Some("vehicle")), &answers));
        assert!(!is_visible(&field("securities_value", Some("securities")), &answers));
    }

    #[test]
    fn non_list_asset_answer_is_empty_set() {
        let mut answers = HashMap::new();
        answers.insert(STEP_ASSETS.to_string(), AnswerValue::Choice("crypto".into()));
        assert!(!is_visible(&field("crypto_value", Some("crypto")), &answers));
    }

    #[test]
    fn retirement_condition_matches_choice() {
        let mut answers = HashMap::new();
        answers.insert(
            STEP_RETIREMENT.to_string(),
            AnswerValue::Choice("retirement_fund".into()),
        );
        assert!(is_visible(&field("fund_value", Some("retirement_fund")), &answers));
    }

    #[test]
    fn unrecognized_condition_fails_closed() {
        let mut answers = HashMap::new();
        answers.insert(
            "step_99_mystery".to_string(),
            AnswerValue::Choice("anything".into()),
        );
        assert!(!is_visible(&field("mystery", Some("not_a_condition")), &answers));
    }

    #[test]
    fn visible_fields_preserve_declaration_order() {
        let step = IntakeStep {
            step_id: "step_09_amounts".into(),
            title: String::new(),
            question: String::new(),
            input_type: StepKind::Form,
            options: vec![],
            validation: Some(StepValidation {
                fields: vec![
                    field("a", None),
                    field("hidden", Some("securities")),
                    field("b", None),
                ],
            }),
            category: None,
            progress: None,
            total_steps: None,
            is_first: None,
            is_last: None,
            help_text: None,
        };
        let visible = visible_fields(&step, &HashMap::new());
        let ids: Vec<&str> = visible.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn group_headers_on_group_changes_only() {
        let fields = [
            grouped("a", Some("금융자산")),
            grouped("b", Some("금융자산")),
            grouped("c", Some("실물자산")),
            grouped("d", None),
            grouped("e", Some("실물자산")),
        ];
        let refs: Vec<&FormField> = fields.iter().collect();
        let headers: Vec<bool> = with_group_headers(&refs).iter().map(|(_, h)| *h).collect();
        // The ungrouped field does not reset the last shown group.
        assert_eq!(headers, [true, false, true, false, false]);
    }
}
