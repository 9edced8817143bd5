//! Per-step-kind validation of a candidate answer before submission.

use std::collections::{BTreeMap, HashMap};

use crate::error::ValidationError;
use crate::format::normalize_numeric;
use crate::step::model::{AnswerValue, IntakeStep, StepKind};
use crate::step::visibility::visible_fields;

/// Candidate input as collected by the front end, before normalization.
#[derive(Debug, Clone)]
pub enum Candidate {
    /// Raw text entered on a number step.
    Text(String),
    /// The selected value of a single-choice or yes/no step.
    Choice(String),
    /// The accumulated selection set of a multi-choice step.
    Selections(Vec<String>),
    /// Collected form values, keyed by field id. Zero/absent means absent.
    Form(BTreeMap<String, u64>),
}

/// Validate a candidate against the current step, returning the normalized
/// answer to record and submit.
///
/// `prior_answers` is consulted only for form steps, to scope required-field
/// enforcement to fields that are currently visible.
pub fn validate(
    step: &IntakeStep,
    candidate: &Candidate,
    prior_answers: &HashMap<String, AnswerValue>,
) -> Result<AnswerValue, ValidationError> {
    match step.input_type {
        StepKind::Number => validate_number(candidate),
        StepKind::SingleChoice | StepKind::YesNo => validate_choice(step, candidate),
        StepKind::MultiChoice => validate_selections(step, candidate),
        StepKind::Form => validate_form(step, candidate, prior_answers),
        // Info steps are never user-submittable; completion is triggered
        // directly by the controller.
        StepKind::Info => Err(ValidationError::SelectionRequired),
    }
}

fn validate_number(candidate: &Candidate) -> Result<AnswerValue, ValidationError> {
    let Candidate::Text(raw) = candidate else {
        return Err(ValidationError::AmountRequired);
    };
    let amount = normalize_numeric(raw);
    if amount == 0 {
        return Err(ValidationError::AmountRequired);
    }
    Ok(AnswerValue::Amount(amount))
}

fn validate_choice(step: &IntakeStep, candidate: &Candidate) -> Result<AnswerValue, ValidationError> {
    let value = match candidate {
        Candidate::Choice(v) => v.as_str(),
        // A single pending selection is also acceptable.
        Candidate::Selections(v) if v.len() == 1 => v[0].as_str(),
        _ => return Err(ValidationError::SelectionRequired),
    };
    if value.is_empty() {
        return Err(ValidationError::SelectionRequired);
    }
    if !step.has_option(value) {
        return Err(ValidationError::UnknownOption {
            value: value.to_string(),
        });
    }
    Ok(AnswerValue::Choice(value.to_string()))
}

fn validate_selections(
    step: &IntakeStep,
    candidate: &Candidate,
) -> Result<AnswerValue, ValidationError> {
    let Candidate::Selections(values) = candidate else {
        return Err(ValidationError::SelectionRequired);
    };
    if values.is_empty() {
        return Err(ValidationError::SelectionRequired);
    }
    for value in values {
        if !step.has_option(value) {
            return Err(ValidationError::UnknownOption {
                value: value.clone(),
            });
        }
    }
    Ok(AnswerValue::Selections(values.clone()))
}

fn validate_form(
    step: &IntakeStep,
    candidate: &Candidate,
    prior_answers: &HashMap<String, AnswerValue>,
) -> Result<AnswerValue, ValidationError> {
    let Candidate::Form(values) = candidate else {
        return Err(ValidationError::AmountRequired);
    };

    let visible = visible_fields(step, prior_answers);

    // Hidden fields are dropped, zero entries stay absent rather than zero.
    let mut kept = BTreeMap::new();
    for field in &visible {
        match values.get(&field.id).copied() {
            Some(amount) if amount > 0 => {
                kept.insert(field.id.clone(), amount);
            }
            _ if field.required => {
                return Err(ValidationError::RequiredFieldMissing {
                    label: field.label.clone(),
                });
            }
            _ => {}
        }
    }
    Ok(AnswerValue::Form(kept))
}
