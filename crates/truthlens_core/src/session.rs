//! Investigation state machine: `idle -> processing -> complete`.
//!
//! The phase enum carries the claim and result with it, so a result can only
//! exist while `Complete` and a ticket only while `Processing`.

use crate::client::{ApiError, Investigator};
use crate::schema::InvestigationResult;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Idle,
    Processing,
    Complete,
}

impl std::fmt::Display for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            AppState::Idle => "idle",
            AppState::Processing => "processing",
            AppState::Complete => "complete",
        };
        write!(f, "{value}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("Please enter a claim to investigate")]
    EmptyClaim,

    #[error("An investigation is already in progress")]
    Busy,

    #[error("Reset the current result before investigating another claim")]
    ResultShown,
}

/// Identifies one outstanding request. Outcomes for any other ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Completed,
    Failed,
    /// The session was reset (or restarted) while the request was in flight.
    Stale,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Processing { claim: String, ticket: Ticket },
    Complete { claim: String, result: InvestigationResult },
}

/// Read-only snapshot for rendering.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub state: AppState,
    pub claim: Option<&'a str>,
    pub result: Option<&'a InvestigationResult>,
    pub error: Option<&'a ApiError>,
}

pub struct InvestigationSession<I> {
    investigator: I,
    phase: Phase,
    next_ticket: u64,
    error: Option<ApiError>,
}

impl<I: Investigator> InvestigationSession<I> {
    pub fn new(investigator: I) -> Self {
        Self {
            investigator,
            phase: Phase::Idle,
            next_ticket: 0,
            error: None,
        }
    }

    pub fn investigator(&self) -> &I {
        &self.investigator
    }

    pub fn state(&self) -> AppState {
        match self.phase {
            Phase::Idle => AppState::Idle,
            Phase::Processing { .. } => AppState::Processing,
            Phase::Complete { .. } => AppState::Complete,
        }
    }

    pub fn claim(&self) -> Option<&str> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Processing { claim, .. } | Phase::Complete { claim, .. } => Some(claim),
        }
    }

    pub fn result(&self) -> Option<&InvestigationResult> {
        match &self.phase {
            Phase::Complete { result, .. } => Some(result),
            _ => None,
        }
    }

    /// The last failure surfaced to the user, if it has not been dismissed.
    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<ApiError> {
        self.error.take()
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            state: self.state(),
            claim: self.claim(),
            result: self.result(),
            error: self.error(),
        }
    }

    /// `idle -> processing`. Whitespace-only claims leave the session untouched.
    pub fn begin(&mut self, claim: &str) -> Result<Ticket, SubmitError> {
        if claim.trim().is_empty() {
            return Err(SubmitError::EmptyClaim);
        }
        match self.phase {
            Phase::Idle => {}
            Phase::Processing { .. } => return Err(SubmitError::Busy),
            Phase::Complete { .. } => return Err(SubmitError::ResultShown),
        }

        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.error = None;
        self.phase = Phase::Processing {
            claim: claim.to_string(),
            ticket,
        };
        info!(ticket = ticket.0, "investigation started");
        Ok(ticket)
    }

    /// Applies the investigator's outcome for `ticket`.
    pub fn settle(
        &mut self,
        ticket: Ticket,
        outcome: Result<InvestigationResult, ApiError>,
    ) -> Settled {
        let claim = match &mut self.phase {
            Phase::Processing { claim, ticket: current } if *current == ticket => {
                std::mem::take(claim)
            }
            _ => {
                debug!(ticket = ticket.0, "dropping outcome for abandoned investigation");
                return Settled::Stale;
            }
        };

        match outcome {
            Ok(result) => {
                info!(ticket = ticket.0, verdict = %result.verdict, "investigation complete");
                self.phase = Phase::Complete { claim, result };
                Settled::Completed
            }
            Err(err) => {
                warn!(ticket = ticket.0, status = err.status(), error = %err, "investigation failed");
                self.phase = Phase::Idle;
                self.error = Some(err);
                Settled::Failed
            }
        }
    }

    /// Runs a whole investigation. Backend failures end in `Idle` with the
    /// error available from [`Self::error`]; they are not returned here.
    pub async fn submit(&mut self, claim: &str) -> Result<AppState, SubmitError> {
        let ticket = self.begin(claim)?;
        let outcome = self.investigator.investigate(claim).await;
        self.settle(ticket, outcome);
        Ok(self.state())
    }

    /// Back to `idle`, discarding the claim and any result. From `processing`
    /// this abandons the outstanding request. A no-op when already idle.
    pub fn reset(&mut self) {
        match self.phase {
            Phase::Idle => {}
            Phase::Processing { ticket, .. } => {
                info!(ticket = ticket.0, "investigation abandoned");
                self.phase = Phase::Idle;
            }
            Phase::Complete { .. } => {
                debug!("result cleared");
                self.phase = Phase::Idle;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EvidenceGroups;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Scripted {
        outcomes: Mutex<VecDeque<Result<InvestigationResult, ApiError>>>,
    }

    impl Scripted {
        fn new(outcomes: Vec<Result<InvestigationResult, ApiError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
            }
        }
    }

    #[async_trait]
    impl Investigator for Scripted {
        async fn investigate(&self, _claim: &str) -> Result<InvestigationResult, ApiError> {
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted outcome available")
        }
    }

    fn result(verdict: &str) -> InvestigationResult {
        InvestigationResult {
            query: "q".to_string(),
            verdict: verdict.to_string(),
            confidence_level: "70%".to_string(),
            synthesis_explanation: String::new(),
            debate_rounds: 2,
            agent_outputs: None,
            evidence: EvidenceGroups {
                official: Vec::new(),
                social: Vec::new(),
            },
            metadata: None,
            status: None,
            agent_output: None,
        }
    }

    fn unavailable() -> ApiError {
        ApiError::Application {
            status: 503,
            message: "Service unavailable".to_string(),
        }
    }

    #[test]
    fn begin_rejects_blank_claims() {
        let mut session = InvestigationSession::new(Scripted::new(Vec::new()));
        assert_eq!(session.begin(""), Err(SubmitError::EmptyClaim));
        assert_eq!(session.begin(" \t\n"), Err(SubmitError::EmptyClaim));
        assert_eq!(session.state(), AppState::Idle);
        assert!(session.claim().is_none());
    }

    #[test]
    fn second_submission_while_processing_is_refused() {
        let mut session = InvestigationSession::new(Scripted::new(Vec::new()));
        let ticket = session.begin("first").unwrap();
        assert_eq!(session.begin("second"), Err(SubmitError::Busy));
        assert_eq!(session.claim(), Some("first"));
        assert_eq!(session.settle(ticket, Ok(result("True"))), Settled::Completed);
        assert_eq!(session.begin("third"), Err(SubmitError::ResultShown));
    }

    #[test]
    fn reset_from_idle_changes_nothing() {
        let mut session = InvestigationSession::new(Scripted::new(Vec::new()));
        let ticket = session.begin("claim").unwrap();
        session.settle(ticket, Err(unavailable()));

        session.reset();
        assert_eq!(session.state(), AppState::Idle);
        assert_eq!(session.error(), Some(&unavailable()));
        assert!(session.claim().is_none());
    }

    #[test]
    fn reset_while_processing_discards_late_outcome() {
        let mut session = InvestigationSession::new(Scripted::new(Vec::new()));
        let ticket = session.begin("claim").unwrap();
        session.reset();
        assert_eq!(session.state(), AppState::Idle);

        assert_eq!(session.settle(ticket, Ok(result("True"))), Settled::Stale);
        assert_eq!(session.state(), AppState::Idle);
        assert!(session.result().is_none());

        let next = session.begin("again").unwrap();
        assert_eq!(session.settle(ticket, Err(unavailable())), Settled::Stale);
        assert_eq!(session.state(), AppState::Processing);
        assert_eq!(session.settle(next, Ok(result("False"))), Settled::Completed);
    }

    #[tokio::test]
    async fn failure_clears_claim_and_keeps_message() {
        let mut session = InvestigationSession::new(Scripted::new(vec![Err(unavailable())]));
        let state = session.submit("Is the moon made of cheese?").await.unwrap();
        assert_eq!(state, AppState::Idle);
        assert!(session.claim().is_none());
        assert!(session.result().is_none());
        assert_eq!(session.error().map(ApiError::message), Some("Service unavailable"));
    }

    #[tokio::test]
    async fn new_submission_clears_previous_error() {
        let mut session =
            InvestigationSession::new(Scripted::new(vec![Err(unavailable()), Ok(result("True"))]));
        session.submit("one").await.unwrap();
        assert!(session.error().is_some());

        let state = session.submit("two").await.unwrap();
        assert_eq!(state, AppState::Complete);
        assert!(session.error().is_none());
        let view = session.view();
        assert_eq!(view.claim, Some("two"));
        assert_eq!(view.result.map(|r| r.verdict.as_str()), Some("True"));

        session.reset();
        assert!(session.view().result.is_none());
        assert!(session.view().claim.is_none());
    }

    struct TestRng {
        state: u64,
    }

    impl TestRng {
        fn next(&mut self) -> u64 {
            self.state ^= self.state << 13;
            self.state ^= self.state >> 7;
            self.state ^= self.state << 17;
            self.state
        }
    }

    #[test]
    fn result_present_only_when_complete() {
        let mut rng = TestRng { state: 0x9E37_79B9_7F4A_7C15 };
        let mut session = InvestigationSession::new(Scripted::new(Vec::new()));
        let mut tickets: Vec<Ticket> = Vec::new();

        for step in 0..5_000 {
            match rng.next() % 5 {
                0 => {
                    let claim = if rng.next() % 4 == 0 { "   " } else { "claim" };
                    if let Ok(ticket) = session.begin(claim) {
                        tickets.push(ticket);
                    }
                }
                1 => {
                    if let Some(ticket) = tickets.last().copied() {
                        session.settle(ticket, Ok(result("True")));
                    }
                }
                2 => {
                    if let Some(ticket) = tickets.last().copied() {
                        session.settle(ticket, Err(unavailable()));
                    }
                }
                3 => {
                    if !tickets.is_empty() {
                        let stale = tickets[(rng.next() as usize) % tickets.len()];
                        session.settle(stale, Ok(result("False")));
                    }
                }
                _ => session.reset(),
            }

            let view = session.view();
            match view.state {
                AppState::Complete => assert!(view.result.is_some(), "step {step}"),
                AppState::Processing => {
                    assert!(view.result.is_none(), "step {step}");
                    assert!(view.claim.is_some(), "step {step}");
                }
                AppState::Idle => {
                    assert!(view.result.is_none(), "step {step}");
                    assert!(view.claim.is_none(), "step {step}");
                }
            }
        }
    }
}
