//! Free-chat mode: keyword-matched canned responses with a result-aware
//! fallback.

pub mod rules;

pub use rules::ChatRules;
