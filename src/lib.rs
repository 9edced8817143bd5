//! Intake Assist — guided financial-intake interview engine.
//!
//! Drives a multi-step eligibility interview against a remote step
//! service, then answers free-text follow-ups from a canned-response
//! table biased by the computed result.

pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod service;
pub mod session;
pub mod step;
pub mod summary;
