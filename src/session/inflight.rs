//! Per-call-kind in-flight guard with a request generation counter.
//!
//! The controller must never issue a second call of the same kind while
//! one is outstanding, and a response that arrives after a reset belongs
//! to a superseded session and must be discarded. A single coarse
//! "loading" flag can express neither; this guard tracks each call kind
//! separately and stamps every request with the generation it was issued
//! under.

use crate::error::CallKind;

/// Token handed out by [`InflightGuard::begin`]; carries the generation
/// the request was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    kind: CallKind,
    generation: u64,
}

impl RequestToken {
    pub fn kind(&self) -> CallKind {
        self.kind
    }
}

#[derive(Debug, Default)]
pub struct InflightGuard {
    active: [bool; 4],
    generation: u64,
}

fn slot(kind: CallKind) -> usize {
    match kind {
        CallKind::CreateSession => 0,
        CallKind::LoadStep => 1,
        CallKind::SubmitAnswer => 2,
        CallKind::ComputeResult => 3,
    }
}

impl InflightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a call kind as in flight. Returns `None` if a call of the
    /// same kind is already outstanding.
    pub fn begin(&mut self, kind: CallKind) -> Option<RequestToken> {
        let s = slot(kind);
        if self.active[s] {
            return None;
        }
        self.active[s] = true;
        Some(RequestToken {
            kind,
            generation: self.generation,
        })
    }

    /// Clear the in-flight mark for a call kind.
    pub fn finish(&mut self, kind: CallKind) {
        self.active[slot(kind)] = false;
    }

    pub fn in_flight(&self, kind: CallKind) -> bool {
        self.active[slot(kind)]
    }

    /// Whether a response bearing this token still belongs to the active
    /// session. False after any intervening reset.
    pub fn is_current(&self, token: &RequestToken) -> bool {
        token.generation == self.generation
    }

    /// Invalidate every outstanding request; called on session reset.
    pub fn bump_generation(&mut self) {
        self.generation += 1;
        self.active = [false; 4];
    }
}
