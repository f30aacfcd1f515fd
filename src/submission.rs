//! Submission lifecycle of the preferences form.
//!
//! `Idle -> Submitting -> Succeeded | Failed`, and back to `Submitting` on the
//! next submit. Each submit carries a sequence number; a response that does
//! not belong to the latest submit is dropped.

use crate::api::Recommendation;
use crate::config::MAX_LOADING_STEP;
use log::debug;
use std::cell::Cell;
use std::rc::Rc;
use yew::Reducible;

pub const GENERIC_FAILURE: &str = "Failed to get recommendations. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionState {
    pub phase: Phase,
    pub request_seq: u64,
    pub loading_step: u8,
    pub recommendations: Rc<Vec<Recommendation>>,
    pub error: Option<String>,
}

impl Default for SubmissionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            request_seq: 0,
            loading_step: 0,
            recommendations: Rc::new(Vec::new()),
            error: None,
        }
    }
}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn has_results(&self) -> bool {
        self.phase == Phase::Succeeded && !self.recommendations.is_empty()
    }
}

pub enum SubmissionAction {
    Begin { seq: u64 },
    /// Loading ticker fired.
    Tick,
    Resolved {
        seq: u64,
        outcome: Result<Vec<Recommendation>, String>,
    },
}

impl Reducible for SubmissionState {
    type Action = SubmissionAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        match action {
            SubmissionAction::Begin { seq } => Rc::new(SubmissionState {
                phase: Phase::Submitting,
                request_seq: seq,
                loading_step: 0,
                recommendations: Rc::new(Vec::new()),
                error: None,
            }),
            SubmissionAction::Tick => {
                if !self.is_submitting() || self.loading_step >= MAX_LOADING_STEP {
                    return self;
                }
                let mut next = (*self).clone();
                next.loading_step += 1;
                Rc::new(next)
            }
            SubmissionAction::Resolved { seq, outcome } => {
                if seq != self.request_seq || !self.is_submitting() {
                    debug!(
                        "Dropping stale response #{} (latest is #{})",
                        seq, self.request_seq
                    );
                    return self;
                }
                let mut next = (*self).clone();
                match outcome {
                    Ok(recommendations) => {
                        next.phase = Phase::Succeeded;
                        next.recommendations = Rc::new(recommendations);
                    }
                    Err(message) => {
                        next.phase = Phase::Failed;
                        next.recommendations = Rc::new(Vec::new());
                        next.error = Some(failure_message(&message));
                    }
                }
                Rc::new(next)
            }
        }
    }
}

/// User-facing text for a failed submit: the error's own message, or the
/// generic fallback when it has none.
pub fn failure_message(message: &str) -> String {
    if message.trim().is_empty() {
        GENERIC_FAILURE.to_string()
    } else {
        message.to_string()
    }
}

/// Monotonic source of submission sequence numbers.
#[derive(Debug, Default)]
pub struct RequestSequence(Cell<u64>);

impl RequestSequence {
    pub fn next(&self) -> u64 {
        let seq = self.0.get() + 1;
        self.0.set(seq);
        seq
    }
}
