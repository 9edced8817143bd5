//! Interview step descriptors, answer types, field visibility, and
//! answer validation.

pub mod model;
pub mod validate;
pub mod visibility;

pub use model::{AnswerValue, ChoiceOption, FormField, IntakeStep, StepKind, StepValidation};
pub use validate::{Candidate, validate};
pub use visibility::{is_visible, visible_fields, with_group_headers};
