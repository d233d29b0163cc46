use rust_fsm::*;

state_machine! {
    submission_flow(Idle)

    Idle(Dispatch) => Sending,
    Sending(Reply) => Rendered,
    Sending(Fail) => Failed,
    Rendered(Settle) => Idle,
    Failed(Settle) => Idle
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Sending,
    Rendered,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionEvent {
    /// The question left for the backend.
    Dispatch,
    /// The backend answered and the answer was rendered.
    Reply,
    /// A fallback message was rendered instead of an answer.
    Fail,
    Settle,
}

/// Lifecycle of one question. Each submission owns its own machine, so
/// overlapping questions never share state.
pub struct Submission {
    machine: submission_flow::StateMachine,
}

impl Default for Submission {
    fn default() -> Self {
        Self::new()
    }
}

impl Submission {
    pub fn new() -> Self {
        Self {
            machine: submission_flow::StateMachine::new(),
        }
    }

    pub fn state(&self) -> SubmissionState {
        match self.machine.state() {
            submission_flow::State::Idle => SubmissionState::Idle,
            submission_flow::State::Sending => SubmissionState::Sending,
            submission_flow::State::Rendered => SubmissionState::Rendered,
            submission_flow::State::Failed => SubmissionState::Failed,
        }
    }

    /// Returns the new state, or `None` when the event is not allowed from
    /// the current one. A rejected event leaves the state unchanged.
    pub fn apply(&mut self, event: SubmissionEvent) -> Option<SubmissionState> {
        let input = match event {
            SubmissionEvent::Dispatch => submission_flow::Input::Dispatch,
            SubmissionEvent::Reply => submission_flow::Input::Reply,
            SubmissionEvent::Fail => submission_flow::Input::Fail,
            SubmissionEvent::Settle => submission_flow::Input::Settle,
        };
        self.machine.consume(&input).ok()?;
        Some(self.state())
    }
}
